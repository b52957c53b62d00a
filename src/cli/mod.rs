pub mod chart;
pub mod dates;
pub mod entries;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chart::{process_chart_command, ChartCommand};
use clap::{Parser, Subcommand};
use entries::{
    process_add_command, process_categories_command, process_clear_command,
    process_delete_command, process_history_command, process_list_command,
    process_seed_command, process_today_command, AddCommand, HistoryCommand,
};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    state::EntryState,
    storage::{
        entities::CategoryType, entry_store::EntryStore, key_value::FileKeyValueStore,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir},
        logging::{enable_logging, LogSettings},
    },
};

const DEFAULT_SEED_COUNT: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "habitlog", version, long_about = None)]
#[command(about = "Log food, fitness, consumption and notes, then look back at them", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Maximum log level (error, warn, info, debug, trace). Overrides RUST_LOG"
    )]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Log a new entry")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "List every entry, most recently added first")]
    List {
        #[arg(short, long, help = "Only show entries of this category")]
        category: Option<CategoryType>,
    },
    #[command(about = "Show entries logged for today")]
    Today {},
    #[command(about = "Show entries grouped by day, newest day first")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Count entries of a category over a range of days")]
    Chart {
        #[command(flatten)]
        command: ChartCommand,
    },
    #[command(about = "Delete a single entry")]
    Delete {
        #[arg(help = "Id of the entry, as printed by list")]
        id: String,
    },
    #[command(about = "Delete every entry")]
    Clear {
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
    #[command(about = "Add randomly generated entries from the last 30 days")]
    Seed {
        #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
        count: usize,
    },
    #[command(about = "Show the available categories and their suggested subtypes")]
    Categories {},
}

type FileEntryState = EntryState<EntryStore<FileKeyValueStore>>;

/// Opens the entry store inside `dir` and loads it into memory.
async fn open_state(dir: &Path) -> Result<FileEntryState> {
    let store = EntryStore::new(FileKeyValueStore::new(dir.join("store"))?);
    let state = EntryState::new(store);
    state.load_entries().await;
    Ok(state)
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };

    enable_logging(&LogSettings::from_flags(
        dir.join("logs"),
        args.log,
        args.log_filter,
    ))?;
    debug!("Using application directory {dir:?}");

    if let Commands::Categories {} = args.commands {
        process_categories_command();
        return Ok(());
    }

    let state = open_state(&dir).await?;
    let clock = DefaultClock;

    match args.commands {
        Commands::Add { command } => process_add_command(command, &state, &clock).await,
        Commands::List { category } => {
            process_list_command(&state, category);
            Ok(())
        }
        Commands::Today {} => {
            process_today_command(&state, &clock);
            Ok(())
        }
        Commands::History { command } => process_history_command(command, &state, &clock),
        Commands::Chart { command } => process_chart_command(command, &state.entries(), &clock),
        Commands::Delete { id } => process_delete_command(&id, &state).await,
        Commands::Clear { yes } => process_clear_command(&state, yes).await,
        Commands::Seed { count } => process_seed_command(count, &state, &clock).await,
        Commands::Categories {} => {
            process_categories_command();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use clap::{CommandFactory, Parser};
    use tempfile::tempdir;

    use crate::{
        storage::entities::{CategoryType, EntryDraft},
        utils::logging::TEST_LOGGING,
    };

    use super::{open_state, Args, Commands};

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let args =
            Args::try_parse_from(["habitlog", "list", "--dir", "/tmp/habits", "--log"]).unwrap();
        assert!(args.log);
        assert_eq!(args.dir.unwrap().to_string_lossy(), "/tmp/habits");
        assert!(matches!(args.commands, Commands::List { category: None }));
    }

    #[tokio::test]
    async fn test_state_survives_reopening() {
        *TEST_LOGGING;
        let dir = tempdir().unwrap();

        let state = open_state(dir.path()).await.unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let entry = EntryDraft::new(CategoryType::Consumption).into_entry(now);
        assert!(state.add_entry(entry.clone()).await);

        let reopened = open_state(dir.path()).await.unwrap();
        assert_eq!(reopened.entries(), vec![entry]);
    }
}
