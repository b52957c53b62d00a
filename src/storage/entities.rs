use std::fmt::Display;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::{Deserialize, Serialize};

const ID_LEN: usize = 9;

/// Subtype used for entries that were logged without one. Filtering treats such entries as
/// belonging to this subtype.
pub const OTHER_SUBTYPE: &str = "Other";

/// Subtype given to new entries of categories without suggested subtypes.
const FALLBACK_SUBTYPE: &str = "Entry";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    Food,
    Fitness,
    Consumption,
    Note,
}

impl CategoryType {
    pub const ALL: [CategoryType; 4] = [
        CategoryType::Food,
        CategoryType::Fitness,
        CategoryType::Consumption,
        CategoryType::Note,
    ];

    /// Static catalog information for the category.
    pub fn info(self) -> &'static Category {
        match self {
            CategoryType::Food => &CATEGORIES[0],
            CategoryType::Fitness => &CATEGORIES[1],
            CategoryType::Consumption => &CATEGORIES[2],
            CategoryType::Note => &CATEGORIES[3],
        }
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn subtypes(self) -> &'static [&'static str] {
        self.info().subtypes
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryType::Food => write!(f, "FOOD"),
            CategoryType::Fitness => write!(f, "FITNESS"),
            CategoryType::Consumption => write!(f, "CONSUMPTION"),
            CategoryType::Note => write!(f, "NOTE"),
        }
    }
}

/// Entry in the fixed category catalog.
#[derive(Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryType,
    pub label: &'static str,
    /// Suggested subtypes, in display order. Empty when the category has no suggestions.
    pub subtypes: &'static [&'static str],
    /// Display colour as RGB.
    pub color: (u8, u8, u8),
}

pub static CATEGORIES: [Category; 4] = [
    Category {
        id: CategoryType::Food,
        label: "Food",
        subtypes: &["Healthy", "Junk", "Snack", "Meal"],
        color: (0x00, 0xB8, 0x94),
    },
    Category {
        id: CategoryType::Fitness,
        label: "Fitness",
        subtypes: &["Gym", "Cardio", "Walk", "Sport"],
        color: (0x09, 0x84, 0xE3),
    },
    Category {
        id: CategoryType::Consumption,
        label: "Consumption",
        subtypes: &["Alcohol", "Caffeine", "Nicotine", "Water"],
        color: (0xD6, 0x30, 0x31),
    },
    Category {
        id: CategoryType::Note,
        label: "Note",
        subtypes: &[],
        color: (0xFD, 0xCB, 0x6E),
    },
];

/// Payload attached to an entry. Its meaning depends on the category and is only displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl EntryValue {
    /// Interprets user input. `true`/`false` become booleans, numbers become numbers and anything
    /// else is kept as text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed {
            "true" => EntryValue::Bool(true),
            "false" => EntryValue::Bool(false),
            _ => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => EntryValue::Number(v),
                _ => EntryValue::Text(input.to_string()),
            },
        }
    }
}

impl Display for EntryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryValue::Bool(v) => write!(f, "{v}"),
            EntryValue::Number(v) => write!(f, "{v}"),
            EntryValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// A single logged activity. This is also the persisted shape, so field names and the millisecond
/// timestamps must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub category: CategoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<EntryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the activity happened. Can be in the past relative to `created_at`.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Subtype used when matching against a subtype allow-list.
    pub fn subtype_or_other(&self) -> &str {
        self.subtype.as_deref().unwrap_or(OTHER_SUBTYPE)
    }

    /// Name shown in lists: the subtype if there is one, the category otherwise.
    pub fn display_name(&self) -> String {
        match &self.subtype {
            Some(subtype) => subtype.clone(),
            None => self.category.to_string(),
        }
    }
}

pub fn generate_entry_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Data collected by the add form before it becomes an [Entry].
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub category: CategoryType,
    pub subtype: Option<String>,
    pub value: Option<String>,
    pub notes: Option<String>,
    /// Overrides the event time. Defaults to the creation time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl EntryDraft {
    pub fn new(category: CategoryType) -> Self {
        Self {
            category,
            subtype: None,
            value: None,
            notes: None,
            timestamp: None,
        }
    }

    /// Assigns an id and creation time. Blank fields are dropped and a blank subtype falls back to
    /// the first suggestion of the category.
    pub fn into_entry(self, now: DateTime<Utc>) -> Entry {
        let subtype = non_blank(self.subtype).unwrap_or_else(|| {
            self.category
                .subtypes()
                .first()
                .copied()
                .unwrap_or(FALLBACK_SUBTYPE)
                .to_string()
        });

        Entry {
            id: generate_entry_id(),
            category: self.category,
            subtype: Some(subtype),
            value: non_blank(self.value).map(|v| EntryValue::parse(&v)),
            notes: non_blank(self.notes),
            timestamp: self.timestamp.unwrap_or(now),
            created_at: now,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
