// In: src/observability.rs

//! Logging setup and structured lifecycle events.
//!
//! Library code logs through the `log` facade. A host that wants to see those
//! records calls `init_logging` (directly, or through the `Featurizer_EnableVerboseLogging`
//! ABI entry point), which installs an `env_logger` backend once and sets the
//! active level on every call.
//! The `log_event!` macro is the tool for key=value lifecycle records.

use colored::Colorize;
use log::{Level, LevelFilter};
use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::sync::Once;

use crate::error::FeaturizerError;

/// Logs a structured key-value record at debug level.
///
/// # Example
/// ```
/// use featurizer_core::log_event;
/// let handle = 42u64;
/// log_event!("event" = "handle_added", "handle" = handle);
/// ```
#[macro_export]
macro_rules! log_event {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts: Vec<String> = Vec::new();
            $(
                parts.push(format!("{}={}", $key, $value));
            )+
            $crate::__log::debug!("FEATURIZER_EVENT {}", parts.join(" "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Serializes tests that change the global max level.
#[cfg(test)]
pub(crate) static LOG_LEVEL_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn level_tag(level: Level, colorize: bool) -> String {
    let tag = level.to_string();
    if !colorize {
        return tag;
    }
    match level {
        Level::Error => tag.red().bold().to_string(),
        Level::Warn => tag.yellow().to_string(),
        Level::Info => tag.green().to_string(),
        Level::Debug => tag.cyan().to_string(),
        Level::Trace => tag.dimmed().to_string(),
    }
}

/// Installs the process-wide logger and sets the active level.
///
/// The first call installs the backend and fixes its target (stderr, or
/// `log_file` when given). Every call, the first included, sets the level, so a
/// later call can raise or lower verbosity. A `log_file` passed after the
/// backend is installed is opened but not switched to.
pub fn init_logging(level: LevelFilter, log_file: Option<&str>) -> Result<(), FeaturizerError> {
    // Open the file before entering `call_once` so a bad path is reported.
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };
    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        // The backend passes everything; `set_max_level` below does the filtering.
        builder.filter_level(LevelFilter::Trace);
        match file {
            Some(file) => {
                builder.format(|buf, record| {
                    writeln!(buf, "[{}] {}", level_tag(record.level(), false), record.args())?;
                    buf.flush()?;
                    Ok(())
                });
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                let colorize = std::io::stderr().is_terminal();
                if colorize {
                    // `colored` checks stdout by default; the records go to stderr.
                    colored::control::set_override(true);
                }
                builder.format(move |buf, record| {
                    writeln!(buf, "[{}] {}", level_tag(record.level(), colorize), record.args())?;
                    buf.flush()?;
                    Ok(())
                });
            }
        }
        let _ = builder.try_init();
    });
    log::set_max_level(level);
    Ok(())
}
