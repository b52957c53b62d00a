use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone};

/// This is the standard way of converting a date to a string in habitlog.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns start of the next day.
pub fn next_day_start<Tz: TimeZone>(moment: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    moment
        .clone()
        .checked_add_days(Days::new(1))?
        .with_time(NaiveTime::MIN)
        .earliest()
}

/// Last instant of the day `moment` falls in.
pub fn end_of_day<Tz: TimeZone>(moment: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    next_day_start(moment).map(|v| v - Duration::nanoseconds(1))
}

/// Midnight of `date` in `tz`. `None` when midnight doesn't exist there (DST gap).
pub fn start_of_date<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
}

/// Weeks start on Sunday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_sunday() as u64)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}
