use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Days, Months, NaiveDate, TimeZone, Utc};
use clap::ValueEnum;

use crate::utils::time::{end_of_day, start_of_date};

/// Closed interval of instants. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateInterval {
    pub fn new_opt(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        self.start <= moment && moment <= self.end
    }
}

/// Named range choices of the analytics view. `Custom` carries the calendar days picked by the
/// user, both included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Yesterday,
    Last7,
    Last14,
    Last21,
    LastMonth,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Today => "Today",
            DateRange::Yesterday => "Yesterday",
            DateRange::Last7 => "Last 7 Days",
            DateRange::Last14 => "Last 14 Days",
            DateRange::Last21 => "Last 21 Days",
            DateRange::LastMonth => "Last Month",
            DateRange::Custom { .. } => "Custom Range",
        }
    }
}

/// Command line form of [DateRange] without the custom bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeOption {
    Today,
    Yesterday,
    Last7,
    Last14,
    Last21,
    LastMonth,
    Custom,
}

impl Display for RangeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeOption::Today => write!(f, "today"),
            RangeOption::Yesterday => write!(f, "yesterday"),
            RangeOption::Last7 => write!(f, "last7"),
            RangeOption::Last14 => write!(f, "last14"),
            RangeOption::Last21 => write!(f, "last21"),
            RangeOption::LastMonth => write!(f, "last-month"),
            RangeOption::Custom => write!(f, "custom"),
        }
    }
}

impl RangeOption {
    /// `Custom` needs both bounds. They are ignored for every other option.
    pub fn into_range(
        self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange> {
        Ok(match self {
            RangeOption::Today => DateRange::Today,
            RangeOption::Yesterday => DateRange::Yesterday,
            RangeOption::Last7 => DateRange::Last7,
            RangeOption::Last14 => DateRange::Last14,
            RangeOption::Last21 => DateRange::Last21,
            RangeOption::LastMonth => DateRange::LastMonth,
            RangeOption::Custom => match (start, end) {
                (Some(start), Some(end)) => DateRange::Custom { start, end },
                _ => return Err(anyhow!("Custom range requires both a start and an end date")),
            },
        })
    }
}

/// Turns a range choice into concrete instants using the calendar days of `now`'s time zone.
///
/// Fails when the first or last day has no midnight in that zone (a DST gap), or when a custom
/// range ends before it starts.
pub fn resolve_range<Tz: TimeZone>(range: DateRange, now: &DateTime<Tz>) -> Result<DateInterval> {
    let tz = now.timezone();
    let today = now.date_naive();
    let (first_day, last_day) = match range {
        DateRange::Today => (today, today),
        DateRange::Yesterday => {
            let yesterday = days_before(today, 1)?;
            (yesterday, yesterday)
        }
        DateRange::Last7 => (days_before(today, 6)?, today),
        DateRange::Last14 => (days_before(today, 13)?, today),
        DateRange::Last21 => (days_before(today, 20)?, today),
        DateRange::LastMonth => {
            let month_ago = today
                .checked_sub_months(Months::new(1))
                .ok_or_else(|| anyhow!("Can't go a month back from {today}"))?;
            (month_ago, today)
        }
        DateRange::Custom { start, end } => {
            if end < start {
                return Err(anyhow!("Range end {end} is before its start {start}"));
            }
            (start, end)
        }
    };

    let start = start_of_date(&tz, first_day)
        .ok_or_else(|| anyhow!("Start of {first_day} doesn't exist in the local time zone"))?;
    let end = start_of_date(&tz, last_day)
        .and_then(|v| end_of_day(&v))
        .ok_or_else(|| anyhow!("End of {last_day} doesn't exist in the local time zone"))?;
    DateInterval::new_opt(start.to_utc(), end.to_utc())
        .ok_or_else(|| anyhow!("Resolved range ends before it starts"))
}

fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| anyhow!("Can't go {days} days back from {date}"))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
    use chrono_tz::America::Santiago;

    use super::{resolve_range, DateInterval, DateRange, RangeOption};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap();
        let interval = resolve_range(DateRange::Today, &now).unwrap();

        assert_eq!(interval.start(), Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(interval.start().date_naive(), interval.end().date_naive());
        assert_eq!(
            interval.end(),
            Utc.with_ymd_and_hms(2025, 3, 16, 0, 0, 0).unwrap() - Duration::nanoseconds(1)
        );
        assert!(interval.contains(now));
    }

    #[test]
    fn test_yesterday() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 10, 0).unwrap();
        let interval = resolve_range(DateRange::Yesterday, &now).unwrap();

        assert_eq!(interval.start().date_naive(), date(2025, 2, 28));
        assert_eq!(interval.end().date_naive(), date(2025, 2, 28));
        assert!(!interval.contains(now));
    }

    #[test]
    fn test_last_n_days_span() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap();
        for (range, days) in [
            (DateRange::Last7, 7),
            (DateRange::Last14, 14),
            (DateRange::Last21, 21),
        ] {
            let interval = resolve_range(range, &now).unwrap();
            assert_eq!(interval.end().date_naive(), date(2025, 3, 15));
            let span = interval.end().date_naive() - interval.start().date_naive();
            assert_eq!(span.num_days() + 1, days, "{range:?}");
            assert_eq!(interval.start().time(), chrono::NaiveTime::MIN);
        }
    }

    #[test]
    fn test_last_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 8, 0, 0).unwrap();
        let interval = resolve_range(DateRange::LastMonth, &now).unwrap();
        // Month arithmetic clamps to the last day of February.
        assert_eq!(interval.start().date_naive(), date(2025, 2, 28));
        assert_eq!(interval.end().date_naive(), date(2025, 3, 31));
    }

    #[test]
    fn test_custom_uses_local_days() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap();
        let interval = resolve_range(
            DateRange::Custom {
                start: date(2025, 1, 1),
                end: date(2025, 1, 2),
            },
            &now,
        )
        .unwrap();

        assert_eq!(
            interval.start(),
            Utc.with_ymd_and_hms(2024, 12, 31, 21, 0, 0).unwrap()
        );
        assert_eq!(
            interval.end(),
            Utc.with_ymd_and_hms(2025, 1, 2, 21, 0, 0).unwrap() - Duration::nanoseconds(1)
        );
    }

    #[test]
    fn test_custom_single_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap();
        let day = date(2025, 2, 10);
        let interval =
            resolve_range(DateRange::Custom { start: day, end: day }, &now).unwrap();
        assert_eq!(interval.start().date_naive(), day);
        assert_eq!(interval.end().date_naive(), day);
    }

    #[test]
    fn test_custom_inverted_is_rejected() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap();
        let result = resolve_range(
            DateRange::Custom {
                start: date(2025, 1, 2),
                end: date(2025, 1, 1),
            },
            &now,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_midnight_is_an_error() {
        // Clocks in Santiago jump from 00:00 to 01:00 on 2024-09-08.
        let now = Santiago.with_ymd_and_hms(2024, 9, 8, 12, 0, 0).unwrap();
        assert!(resolve_range(DateRange::Today, &now).is_err());
        // The day before ends where the missing midnight would be.
        assert!(resolve_range(DateRange::Yesterday, &now).is_err());

        // The gap only matters at the edges of the range.
        let later = Santiago.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap();
        let interval = resolve_range(DateRange::Last7, &later).unwrap();
        assert_eq!(
            interval.start(),
            Santiago.with_ymd_and_hms(2024, 9, 4, 0, 0, 0).unwrap().to_utc()
        );
        assert!(interval.contains(now.to_utc()));
    }

    #[test]
    fn test_interval_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let interval = DateInterval::new_opt(start, end).unwrap();
        assert!(interval.contains(start));
        assert!(interval.contains(end));
        assert!(!interval.contains(end + Duration::nanoseconds(1)));
        assert!(DateInterval::new_opt(end, start).is_none());
    }

    #[test]
    fn test_range_option_conversion() {
        assert_eq!(
            RangeOption::Last14.into_range(None, None).unwrap(),
            DateRange::Last14
        );
        assert!(RangeOption::Custom.into_range(Some(date(2025, 1, 1)), None).is_err());
        assert_eq!(
            RangeOption::Custom
                .into_range(Some(date(2025, 1, 1)), Some(date(2025, 1, 3)))
                .unwrap(),
            DateRange::Custom {
                start: date(2025, 1, 1),
                end: date(2025, 1, 3)
            }
        );
    }
}
