use crate::storage::entities::{CategoryType, Entry};

use super::range::DateInterval;

/// Selection applied to entries before they are aggregated.
#[derive(Debug, Clone, Copy)]
pub struct EntryFilter<'a> {
    pub category: CategoryType,
    pub interval: DateInterval,
    /// Allowed subtypes. Empty allows all. Entries without a subtype count as
    /// [OTHER_SUBTYPE](crate::storage::entities::OTHER_SUBTYPE).
    pub subtypes: &'a [String],
}

impl EntryFilter<'_> {
    pub fn matches(&self, entry: &Entry) -> bool {
        entry.category == self.category
            && self.interval.contains(entry.timestamp)
            && (self.subtypes.is_empty()
                || self
                    .subtypes
                    .iter()
                    .any(|v| v.as_str() == entry.subtype_or_other()))
    }

    /// Keeps matching entries in their original order.
    pub fn apply<'e>(&self, entries: &'e [Entry]) -> Vec<&'e Entry> {
        entries.iter().filter(|v| self.matches(v)).collect()
    }
}

pub fn filter_entries<'e>(
    entries: &'e [Entry],
    category: CategoryType,
    interval: &DateInterval,
    subtypes: &[String],
) -> Vec<&'e Entry> {
    EntryFilter {
        category,
        interval: *interval,
        subtypes,
    }
    .apply(entries)
}
