use std::{path::PathBuf, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";

const KEPT_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "debug";

/// Where logs go and how verbose they are.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// File name prefix of the rolling log files.
    pub prefix: &'static str,
    pub dir: PathBuf,
    /// Explicit level. Without one `RUST_LOG` is used, falling back to `debug`.
    pub level: Option<LevelFilter>,
    /// Mirror logs to stdout.
    pub console: bool,
}

impl LogSettings {
    /// Settings for the command line flags. `--log-filter` takes precedence over `--log`, which
    /// means trace.
    pub fn from_flags(dir: PathBuf, log: bool, log_filter: Option<LevelFilter>) -> Self {
        Self {
            prefix: CLI_PREFIX,
            dir,
            level: log_filter.or(log.then_some(LevelFilter::TRACE)),
            console: log,
        }
    }

    /// Filter directive limited to this crate, e.g. `habitlog=debug`.
    fn directive(&self, env_level: Option<String>) -> String {
        let level = self
            .level
            .map(|v| v.to_string().to_lowercase())
            .or(env_level)
            .unwrap_or_else(|| DEFAULT_LEVEL.into());
        format!("{}={level}", env!("CARGO_PKG_NAME").replace("-", "_"))
    }
}

/// Installs the global subscriber: daily rotated files under `settings.dir` plus stdout when
/// `settings.console` is set.
pub fn enable_logging(settings: &LogSettings) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(settings.prefix)
        .build(&settings.dir)?;

    let console = settings.console;
    let stdout = std::io::stdout.with_filter(move |_| console);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            settings.directive(std::env::var("RUST_LOG").ok()),
        ))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tracing::level_filters::LevelFilter;

    use super::{LogSettings, CLI_PREFIX};

    fn settings(log: bool, log_filter: Option<LevelFilter>) -> LogSettings {
        LogSettings::from_flags(PathBuf::from("/tmp/habitlog/logs"), log, log_filter)
    }

    #[test]
    fn test_from_flags() {
        let quiet = settings(false, None);
        assert_eq!(quiet.prefix, CLI_PREFIX);
        assert_eq!(quiet.level, None);
        assert!(!quiet.console);

        let verbose = settings(true, None);
        assert_eq!(verbose.level, Some(LevelFilter::TRACE));
        assert!(verbose.console);

        let filtered = settings(true, Some(LevelFilter::WARN));
        assert_eq!(filtered.level, Some(LevelFilter::WARN));
        assert!(filtered.console);
    }

    #[test]
    fn test_directive_precedence() {
        assert_eq!(settings(false, None).directive(None), "habitlog=debug");
        assert_eq!(
            settings(false, None).directive(Some("info".into())),
            "habitlog=info"
        );
        assert_eq!(
            settings(true, None).directive(Some("info".into())),
            "habitlog=trace"
        );
        assert_eq!(
            settings(false, Some(LevelFilter::ERROR)).directive(Some("info".into())),
            "habitlog=error"
        );
    }
}
