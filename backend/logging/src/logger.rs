//! Structured Logger
//!
//! Wraps `tracing` to provide plain or JSON console output, file rotation
//! (NDJSON), and environment-based level control.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fallback directive when the configured level does not parse.
const FALLBACK_LEVEL: &str = "info";

/// Log file prefix inside the log directory.
const LOG_FILE_PREFIX: &str = "plexus.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Level or filter directive, e.g. `info` or `plexus_extensions=debug,warn`.
    pub level: String,
    /// Emit JSON lines on the console instead of human-readable output.
    pub json: bool,
    /// Directory for the rolling log file. No file output when `None`.
    pub dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: FALLBACK_LEVEL.to_string(),
            json: false,
            dir: None,
        }
    }
}

/// Filter from `RUST_LOG`, else from `level`, else `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Initialize the global structured logger.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logger(options: &LogOptions) -> bool {
    let env_filter = build_filter(&options.level);

    // Logs go to stderr so command output on stdout stays clean.
    let (plain_layer, json_layer) = if options.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            ),
            None,
        )
    };

    // Rolling file appender: writes NDJSON to `<dir>/plexus.log.YYYY-MM-DD`
    let file_layer = options.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(file_appender).with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn directive_filters_parse() {
        let filter = EnvFilter::try_new("plexus_extensions=debug,warn").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn bad_level_falls_back() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert_eq!(build_filter("not a level ===").max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn defaults_are_console_only() {
        let options = LogOptions::default();
        assert_eq!(options.level, "info");
        assert!(!options.json);
        assert!(options.dir.is_none());
    }
}
