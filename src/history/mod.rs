//! Day by day view of the entry list.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::storage::entities::Entry;

/// Entries of a single local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySection {
    pub date: NaiveDate,
    pub title: String,
    /// Newest first.
    pub entries: Vec<Entry>,
}

pub fn section_title(date: NaiveDate) -> String {
    date.format("%b %-d, %Y (%a)").to_string()
}

/// Short form used when reporting a date back to the user, e.g. `Jan 5, 2025`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Groups `entries` by the day their timestamp falls on in `tz`. Sections are ordered newest day
/// first.
pub fn group_by_day<Tz: TimeZone>(entries: &[Entry], tz: &Tz) -> Vec<HistorySection> {
    let mut days: BTreeMap<NaiveDate, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();
        days.entry(date).or_default().push(entry.clone());
    }

    days.into_iter()
        .rev()
        .map(|(date, mut entries)| {
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            HistorySection {
                date,
                title: section_title(date),
                entries,
            }
        })
        .collect()
}

pub fn find_section(sections: &[HistorySection], date: NaiveDate) -> Option<usize> {
    sections.iter().position(|v| v.date == date)
}

/// Entries logged for the calendar day of `now`, in the order they are given. The state keeps the
/// most recently added entry first.
pub fn entries_today<'e, Tz: TimeZone>(entries: &'e [Entry], now: &DateTime<Tz>) -> Vec<&'e Entry> {
    let tz = now.timezone();
    let today = now.date_naive();
    entries
        .iter()
        .filter(|v| v.timestamp.with_timezone(&tz).date_naive() == today)
        .collect()
}
