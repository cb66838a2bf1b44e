//! Logging backend
//!
//! Library crates only use the `log` macros. Executables call [`logger_init`] once after creating
//! their [`Session`], which sends every record to stdout and to the session's log file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Cannot open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Cannot install the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the logger.
///
/// `min_level` must let `INFO` records through, the executables report their results at that
/// level. Can only succeed once per process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message
                )
            ))
        })
        .level(min_level)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {:?}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format one record. Debug and trace records carry their target.
fn format_line(
    elapsed_s: f64,
    level: Level,
    target: &str,
    message: &std::fmt::Arguments,
) -> String {
    if level > Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            level_tag(level),
            target,
            message
        )
    } else {
        format!("[{:10.6} {}] {}", elapsed_s, level_tag(level), message)
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}
