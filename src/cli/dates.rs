use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

pub const DATE_EXAMPLES: &str =
    "Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\", \"12:00 16/03/2025\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses a human readable moment relative to `now`. Failures are reported as argument
/// validation errors naming `what` was being parsed.
pub fn parse_moment(
    input: &str,
    style: DateStyle,
    now: DateTime<Local>,
    what: &str,
) -> Result<DateTime<Local>> {
    match parse_date_string(input, now, style.into()) {
        Ok(v) => Ok(v),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate {what} \"{input}\": {e}"),
            )
            .into()),
    }
}

/// Same as [parse_moment] but only keeps the calendar day.
pub fn parse_day(
    input: &str,
    style: DateStyle,
    now: DateTime<Local>,
    what: &str,
) -> Result<NaiveDate> {
    parse_moment(input, style, now, what).map(|v| v.date_naive())
}
