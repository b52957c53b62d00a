use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Days, Duration, Local, Months, NaiveDate, TimeZone, Utc};
use clap::ValueEnum;
use tracing::{instrument, trace, warn};

use crate::{
    storage::entities::Entry,
    utils::time::{month_start, start_of_date, week_start},
};

use super::range::DateInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

impl Granularity {
    /// Calendar date of the bucket `date` belongs to.
    fn bucket_date(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => week_start(date),
            Granularity::Month => month_start(date),
        }
    }

    fn next_bucket_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => date.checked_add_days(Days::new(1)),
            Granularity::Week => date.checked_add_days(Days::new(7)),
            Granularity::Month => date.checked_add_months(Months::new(1)),
        }
    }

    fn label_format(&self) -> &'static str {
        match self {
            Granularity::Day => "%d/%m",
            Granularity::Week => "%d %b",
            Granularity::Month => "%b",
        }
    }
}

/// Closed sub-interval of an aggregated range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Chart-ready counts. `labels` and `counts` always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub granularity: Granularity,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl ChartSeries {
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            labels: vec![],
            counts: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Charts should show a "no data" state instead of a flat line in this case.
    pub fn is_all_zero(&self) -> bool {
        self.counts.iter().all(|v| *v == 0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

/// Splits `interval` into calendar buckets of `tz`. Every bucket whose day, week or month overlaps
/// the interval is produced, so the first and last bucket may reach outside of it.
pub fn buckets<Tz: TimeZone>(
    tz: &Tz,
    interval: &DateInterval,
    granularity: Granularity,
) -> Result<Vec<Bucket>> {
    let local_start = interval.start().with_timezone(tz);
    let local_end = interval.end().with_timezone(tz);

    let last = local_end.date_naive();
    let mut current = granularity.bucket_date(local_start.date_naive());
    let mut buckets = vec![];

    while current <= last {
        let next = granularity
            .next_bucket_date(current)
            .ok_or_else(|| anyhow!("Ran out of dates after {current}"))?;
        let start = start_of_date(tz, current)
            .ok_or_else(|| anyhow!("Start of {current} doesn't exist"))?;
        let end = start_of_date(tz, next)
            .ok_or_else(|| anyhow!("Start of {next} doesn't exist"))?
            - Duration::nanoseconds(1);

        trace!("Bucket {current} {start:?} {end:?}");
        buckets.push(Bucket {
            label: current.format(granularity.label_format()).to_string(),
            start: start.to_utc(),
            end: end.to_utc(),
        });
        current = next;
    }

    Ok(buckets)
}

/// Counts `entries` per bucket of `interval`. Timestamps are compared against the inclusive bounds
/// of each bucket, so entries outside of `interval` can still land in the edge buckets.
///
/// No entries, or buckets that can't be generated, give an empty series.
pub fn aggregate(
    entries: &[&Entry],
    interval: &DateInterval,
    granularity: Granularity,
) -> ChartSeries {
    aggregate_in(&Local, entries, interval, granularity)
}

/// [aggregate] with calendar boundaries taken from `tz`.
#[instrument(skip(tz, entries))]
pub fn aggregate_in<Tz: TimeZone>(
    tz: &Tz,
    entries: &[&Entry],
    interval: &DateInterval,
    granularity: Granularity,
) -> ChartSeries {
    if entries.is_empty() {
        return ChartSeries::empty(granularity);
    }

    let buckets = match buckets(tz, interval, granularity) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to split {interval:?} into buckets {e:?}");
            return ChartSeries::empty(granularity);
        }
    };

    let counts = buckets
        .iter()
        .map(|bucket| {
            entries
                .iter()
                .filter(|v| bucket.start <= v.timestamp && v.timestamp <= bucket.end)
                .count()
        })
        .collect();

    ChartSeries {
        granularity,
        labels: buckets.into_iter().map(|v| v.label).collect(),
        counts,
    }
}
