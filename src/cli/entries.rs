use anyhow::Result;
use chrono::Local;
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use crate::{
    history::{entries_today, find_section, group_by_day, short_date},
    state::EntryState,
    storage::{
        entities::{CategoryType, EntryDraft, CATEGORIES},
        entry_store::EntryRepository,
        sample::sample_entries,
    },
    utils::clock::Clock,
};

use super::{
    dates::{parse_day, parse_moment, DateStyle, DATE_EXAMPLES},
    output::{heading, paint_category, print_entries},
    Args,
};

const DAY_TIME_FORMAT: &str = "%H:%M";
const FULL_TIME_FORMAT: &str = "%x %H:%M";

#[derive(Debug, Parser)]
pub struct AddCommand {
    #[arg(help = "Category of the entry")]
    category: CategoryType,
    #[arg(
        short,
        long,
        help = "Subtype of the entry. Defaults to the first suggestion of the category"
    )]
    subtype: Option<String>,
    #[arg(short, long, help = "Value of the entry. true/false and numbers are kept as such")]
    value: Option<String>,
    #[arg(short, long, help = "Free text notes")]
    notes: Option<String>,
    #[arg(long, help = format!("When the activity happened. Defaults to now. {DATE_EXAMPLES}"))]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(long, help = format!("Only show the given day. {DATE_EXAMPLES}"))]
    jump: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

pub async fn process_add_command<R: EntryRepository>(
    AddCommand {
        category,
        subtype,
        value,
        notes,
        at,
        date_style,
    }: AddCommand,
    state: &EntryState<R>,
    clock: &impl Clock,
) -> Result<()> {
    let timestamp = match at {
        Some(at) => Some(parse_moment(&at, date_style, clock.local_time(), "time")?.to_utc()),
        None => None,
    };
    let entry = EntryDraft {
        category,
        subtype,
        value,
        notes,
        timestamp,
    }
    .into_entry(clock.time());
    let id = entry.id.clone();

    if state.add_entry(entry).await {
        println!("Added {id}");
    } else {
        println!("Entry {id} could not be saved");
    }
    Ok(())
}

/// Every entry, most recently added first.
pub fn process_list_command<R: EntryRepository>(
    state: &EntryState<R>,
    category: Option<CategoryType>,
) {
    let entries = state.entries();
    print_entries(
        entries
            .iter()
            .filter(|v| category.map_or(true, |category| v.category == category)),
        &Local,
        FULL_TIME_FORMAT,
    );
}

pub fn process_today_command<R: EntryRepository>(state: &EntryState<R>, clock: &impl Clock) {
    let entries = state.entries();
    let today = entries_today(&entries, &clock.local_time());
    if today.is_empty() {
        println!("Nothing logged today");
        return;
    }
    print_entries(today, &Local, DAY_TIME_FORMAT);
}

pub fn process_history_command<R: EntryRepository>(
    HistoryCommand { jump, date_style }: HistoryCommand,
    state: &EntryState<R>,
    clock: &impl Clock,
) -> Result<()> {
    let entries = state.entries();
    let sections = group_by_day(&entries, &Local);

    let shown = match jump {
        Some(jump) => {
            let date = parse_day(&jump, date_style, clock.local_time(), "date")?;
            match find_section(&sections, date) {
                Some(index) => &sections[index..=index],
                None => {
                    println!("No entries found for {}", short_date(date));
                    return Ok(());
                }
            }
        }
        None => &sections[..],
    };

    for section in shown {
        println!("{}", heading(&section.title));
        print_entries(&section.entries, &Local, DAY_TIME_FORMAT);
        println!();
    }
    Ok(())
}

pub async fn process_delete_command<R: EntryRepository>(
    id: &str,
    state: &EntryState<R>,
) -> Result<()> {
    if !state.entries().iter().any(|v| v.id == id) {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("No entry with id {id}"),
            )
            .into());
    }

    if state.delete_entry(id).await {
        println!("Deleted {id}");
    } else {
        println!("Deletion of {id} could not be saved");
    }
    Ok(())
}

pub async fn process_clear_command<R: EntryRepository>(
    state: &EntryState<R>,
    confirmed: bool,
) -> Result<()> {
    let count = state.entries().len();
    if !confirmed {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("This deletes all {count} entries. Pass --yes to confirm"),
            )
            .into());
    }

    if state.clear_entries().await {
        println!("Deleted {count} entries");
    } else {
        println!("Clearing entries could not be saved");
    }
    Ok(())
}

pub async fn process_seed_command<R: EntryRepository>(
    count: usize,
    state: &EntryState<R>,
    clock: &impl Clock,
) -> Result<()> {
    let mut saved = 0;
    for entry in sample_entries(count, clock.time()) {
        if state.add_entry(entry).await {
            saved += 1;
        }
    }
    if saved < count {
        warn!("Only {saved} of {count} sample entries were saved");
    }
    info!("Seeded {saved} entries");
    println!("Added {saved} sample entries");
    Ok(())
}

pub fn process_categories_command() {
    for category in &CATEGORIES {
        let subtypes = if category.subtypes.is_empty() {
            "-".to_string()
        } else {
            category.subtypes.join(", ")
        };
        println!(
            "{}\t{}\t{}",
            category.id.to_string().to_lowercase(),
            paint_category(category.id),
            subtypes
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use clap::Parser;

    use crate::{
        state::EntryState,
        storage::{
            entities::{CategoryType, EntryValue},
            entry_store::{EntryRepository, EntryStore},
            key_value::MemoryKeyValueStore,
        },
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    use super::*;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap())
    }

    fn state() -> EntryState<EntryStore<MemoryKeyValueStore>> {
        EntryState::new(EntryStore::new(MemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn test_add_command() {
        *TEST_LOGGING;
        let state = state();
        let command = AddCommand::try_parse_from([
            "add", "fitness", "--subtype", "Gym", "--value", "45", "--notes", "legs",
        ])
        .unwrap();

        process_add_command(command, &state, &clock()).await.unwrap();

        let entries = state.entries();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.category, CategoryType::Fitness);
        assert_eq!(entry.subtype.as_deref(), Some("Gym"));
        assert_eq!(entry.value, Some(EntryValue::Number(45.)));
        assert_eq!(entry.notes.as_deref(), Some("legs"));
        assert_eq!(entry.timestamp, clock().0);
        assert_eq!(entry.created_at, clock().0);
    }

    #[tokio::test]
    async fn test_add_command_rejects_bad_time() {
        let state = state();
        let command = AddCommand::try_parse_from(["add", "note", "--at", "whenever"]).unwrap();
        assert!(process_add_command(command, &state, &clock()).await.is_err());
        assert!(state.entries().is_empty());
    }

    #[tokio::test]
    async fn test_delete_command() {
        *TEST_LOGGING;
        let state = state();
        process_seed_command(3, &state, &clock()).await.unwrap();
        let id = state.entries()[1].id.clone();

        process_delete_command(&id, &state).await.unwrap();
        assert_eq!(state.entries().len(), 2);
        assert!(state.entries().iter().all(|v| v.id != id));

        assert!(process_delete_command("missing", &state).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        *TEST_LOGGING;
        let store = EntryStore::new(MemoryKeyValueStore::new());
        let state = EntryState::new(&store);
        process_seed_command(5, &state, &clock()).await.unwrap();
        assert_eq!(store.get_all().await.len(), 5);

        assert!(process_clear_command(&state, false).await.is_err());
        assert_eq!(state.entries().len(), 5);

        process_clear_command(&state, true).await.unwrap();
        assert!(state.entries().is_empty());
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_jump_to_missing_day() {
        let state = state();
        let command = HistoryCommand::try_parse_from(["history", "--jump", "01/01/2020"]).unwrap();
        process_history_command(command, &state, &clock()).unwrap();
    }
}
