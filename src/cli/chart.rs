use anyhow::Result;
use chrono::Local;
use clap::{CommandFactory, Parser};

use crate::{
    analytics::{
        buckets::Granularity,
        range::{DateRange, RangeOption},
        ChartQuery, ChartResult,
    },
    storage::entities::{CategoryType, Entry},
    utils::clock::Clock,
};

use super::{
    dates::{parse_day, DateStyle, DATE_EXAMPLES},
    output::{
        category_colour,
        chart::{render, ChartStyle},
        format_moment, heading,
    },
    Args,
};

#[derive(Debug, Parser)]
pub struct ChartCommand {
    #[arg(short, long, default_value = "food", help = "Category to count")]
    category: CategoryType,
    #[arg(short, long, default_value_t = RangeOption::Today, help = "Range of days to count. custom requires --from and --to")]
    range: RangeOption,
    #[arg(long, help = format!("First day of a custom range. {DATE_EXAMPLES}"))]
    from: Option<String>,
    #[arg(long, help = format!("Last day of a custom range. {DATE_EXAMPLES}"))]
    to: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        short,
        long = "subtype",
        help = "Only count these subtypes. Can be repeated. Entries without a subtype count as Other"
    )]
    subtypes: Vec<String>,
    #[arg(short, long, default_value_t = Granularity::Day, help = "Size of a single data point")]
    group: Granularity,
    #[arg(long, default_value_t = ChartStyle::Bar)]
    style: ChartStyle,
}

/// Builds the query described by the arguments. Custom bounds are only parsed for the custom
/// range.
fn build_query(command: &ChartCommand, clock: &impl Clock) -> Result<ChartQuery> {
    let range = if command.range == RangeOption::Custom {
        let now = clock.local_time();
        let (Some(from), Some(to)) = (&command.from, &command.to) else {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    "Custom range requires both --from and --to",
                )
                .into());
        };
        let start = parse_day(from, command.date_style, now, "start of the range")?;
        let end = parse_day(to, command.date_style, now, "end of the range")?;
        if end < start {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("End of the range {end} is before its start {start}"),
                )
                .into());
        }
        DateRange::Custom { start, end }
    } else {
        command.range.into_range(None, None)?
    };

    Ok(ChartQuery {
        category: command.category,
        range,
        subtypes: command.subtypes.clone(),
        granularity: command.group,
    })
}

pub fn run_chart(command: &ChartCommand, entries: &[Entry], clock: &impl Clock) -> Result<ChartResult> {
    build_query(command, clock)?.run(entries, &clock.local_time())
}

pub fn process_chart_command(
    command: ChartCommand,
    entries: &[Entry],
    clock: &impl Clock,
) -> Result<()> {
    let result = run_chart(&command, entries, clock)?;
    let start = result.interval.start().with_timezone(&Local);
    let end = result.interval.end().with_timezone(&Local);

    println!(
        "{} {} ({} - {})",
        heading(command.category.label()),
        heading(&format!("by {}", command.group)),
        format_moment(&start),
        format_moment(&end),
    );

    if result.series.is_empty() || result.series.is_all_zero() {
        println!("No data for the selected period");
        return Ok(());
    }

    let colour = category_colour(command.category);
    for line in render(&result.series, command.style) {
        println!("{}", colour.paint(line.as_str()));
    }
    println!("{} entries", result.matched);
    Ok(())
}
