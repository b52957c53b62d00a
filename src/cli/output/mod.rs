pub mod chart;

use ansi_term::{ANSIString, Colour, Style};
use chrono::{DateTime, TimeZone};

use crate::storage::entities::{CategoryType, Entry};

pub fn category_colour(category: CategoryType) -> Colour {
    let (r, g, b) = category.info().color;
    Colour::RGB(r, g, b)
}

pub fn paint_category(category: CategoryType) -> ANSIString<'static> {
    category_colour(category).paint(category.label())
}

pub fn heading(text: &str) -> ANSIString<'_> {
    Style::new().bold().paint(text)
}

/// One line per entry: time, category, name, value, notes and id.
pub fn format_entry<Tz: TimeZone>(entry: &Entry, tz: &Tz, time_format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut line = format!(
        "{}\t{}\t{}",
        entry.timestamp.with_timezone(tz).format(time_format),
        paint_category(entry.category),
        entry.display_name()
    );
    if let Some(value) = &entry.value {
        line.push_str(&format!("\t{value}"));
    }
    if let Some(notes) = &entry.notes {
        line.push_str(&format!("\t\"{notes}\""));
    }
    line.push_str(&format!("\t[{}]", entry.id));
    line
}

pub fn print_entries<'e, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'e Entry>,
    tz: &Tz,
    time_format: &str,
) where
    Tz::Offset: std::fmt::Display,
{
    for entry in entries {
        println!("{}", format_entry(entry, tz, time_format));
    }
}

pub fn format_moment<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    moment.format("%x %H:%M").to_string()
}
