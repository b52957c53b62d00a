//! Turns the flat entry list into chart data.
//!
//! The pipeline is [range::resolve_range] → [filter::filter_entries] → [buckets::aggregate].
//! [ChartQuery] bundles the selection that drives all three steps.

pub mod buckets;
pub mod filter;
pub mod range;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use tracing::debug;

use crate::storage::entities::{CategoryType, Entry};

use self::{
    buckets::{aggregate_in, ChartSeries, Granularity},
    filter::EntryFilter,
    range::{resolve_range, DateInterval, DateRange},
};

/// Selection state of the analytics view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartQuery {
    pub category: CategoryType,
    pub range: DateRange,
    /// Empty means every subtype.
    pub subtypes: Vec<String>,
    pub granularity: Granularity,
}

impl Default for ChartQuery {
    fn default() -> Self {
        Self {
            category: CategoryType::ALL[0],
            range: DateRange::Today,
            subtypes: vec![],
            granularity: Granularity::Day,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartResult {
    pub interval: DateInterval,
    /// Number of entries that passed the filter.
    pub matched: usize,
    pub series: ChartSeries,
}

impl ChartQuery {
    /// Adds `subtype` to the allow-list, or removes it if it is already there.
    pub fn toggle_subtype(&mut self, subtype: &str) {
        if let Some(index) = self.subtypes.iter().position(|v| v == subtype) {
            self.subtypes.remove(index);
        } else {
            self.subtypes.push(subtype.to_string());
        }
    }

    /// Runs the pipeline against `entries`, with "now" and calendar days taken from `now`.
    pub fn run<Tz: TimeZone>(&self, entries: &[Entry], now: &DateTime<Tz>) -> Result<ChartResult> {
        let interval = resolve_range(self.range, now)?;
        let filtered = EntryFilter {
            category: self.category,
            interval,
            subtypes: &self.subtypes,
        }
        .apply(entries);
        debug!(
            "{} of {} entries match {:?}",
            filtered.len(),
            entries.len(),
            self
        );

        let series = aggregate_in(&now.timezone(), &filtered, &interval, self.granularity);
        Ok(ChartResult {
            interval,
            matched: filtered.len(),
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::storage::entities::{CategoryType, Entry};

    use super::{buckets::Granularity, range::DateRange, ChartQuery};

    fn entry(id: &str, category: CategoryType, subtype: &str, at: DateTime<Utc>) -> Entry {
        Entry {
            id: id.into(),
            category,
            subtype: Some(subtype.into()),
            value: None,
            notes: None,
            timestamp: at,
            created_at: at,
        }
    }

    #[test]
    fn test_default_query() {
        let query = ChartQuery::default();
        assert_eq!(query.category, CategoryType::Food);
        assert_eq!(query.range, DateRange::Today);
        assert!(query.subtypes.is_empty());
        assert_eq!(query.granularity, Granularity::Day);
    }

    #[test]
    fn test_toggle_subtype() {
        let mut query = ChartQuery::default();
        query.toggle_subtype("Junk");
        query.toggle_subtype("Meal");
        assert_eq!(query.subtypes, vec!["Junk", "Meal"]);
        query.toggle_subtype("Junk");
        assert_eq!(query.subtypes, vec!["Meal"]);
    }

    #[test]
    fn test_last_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 20, 0, 0).unwrap();
        let entries = vec![
            entry("a", CategoryType::Fitness, "Gym", now - Duration::days(1)),
            entry("b", CategoryType::Fitness, "Walk", now - Duration::days(1)),
            entry("c", CategoryType::Fitness, "Gym", now - Duration::days(6)),
            entry("d", CategoryType::Fitness, "Gym", now - Duration::days(7)),
            entry("e", CategoryType::Food, "Meal", now),
        ];
        let query = ChartQuery {
            category: CategoryType::Fitness,
            range: DateRange::Last7,
            subtypes: vec!["Gym".into()],
            granularity: Granularity::Day,
        };

        let result = query.run(&entries, &now).unwrap();
        assert_eq!(result.matched, 2);
        assert_eq!(result.series.len(), 7);
        assert_eq!(result.series.labels[0], "09/03");
        assert_eq!(result.series.labels[6], "15/03");
        assert_eq!(result.series.counts, vec![1, 0, 0, 0, 0, 1, 0]);
        assert_eq!(result.series.total(), result.matched);
    }

    #[test]
    fn test_nothing_matches() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 20, 0, 0).unwrap();
        let entries = vec![entry("a", CategoryType::Food, "Meal", now - Duration::days(3))];
        let result = ChartQuery::default().run(&entries, &now).unwrap();
        assert_eq!(result.matched, 0);
        assert!(result.series.is_empty());
    }
}
