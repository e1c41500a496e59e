//! Logging setup for an executable session
//!
//! Records go to the session log file as plain text and, optionally, to stdout with coloured
//! level tags. Every record is stamped with the seconds since the session epoch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules which would flood the log below this level.
///
/// The simulated devices trace every step.
const NOISY_TARGETS: [(&str, LevelFilter); 1] = [("hal_if::sim", LevelFilter::Debug)];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include INFO, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be `Info` or more verbose. Must only be called once per process.
pub fn logger_init(
    min_level: LevelFilter,
    echo_stdout: bool,
    session: &Session
) -> Result<(), LoggerInitError> {

    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let file_dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "[{:10.6} {:>5}]{} {}",
            session::get_elapsed_seconds(),
            record.level(),
            target_suffix(record),
            message
        )))
        .chain(log_file);

    let mut dispatch = fern::Dispatch::new()
        .level(min_level)
        .chain(file_dispatch);

    for (target, level) in NOISY_TARGETS.iter() {
        dispatch = dispatch.level_for(*target, min_level.min(*level));
    }

    if echo_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| out.finish(format_args!(
                    "[{:10.6} {}]{} {}",
                    session::get_elapsed_seconds(),
                    coloured_level(record.level()),
                    target_suffix(record),
                    message
                )))
                .chain(std::io::stdout())
        );
    }

    dispatch.apply().map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Debug and trace records include their target.
fn target_suffix(record: &Record) -> String {
    match record.level() > Level::Info {
        true => format!(" {}:", record.target()),
        false => String::new()
    }
}

fn coloured_level(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRACE".dimmed().italic(),
        Level::Debug => "DEBUG".dimmed(),
        Level::Info  => " INFO".normal(),
        Level::Warn  => " WARN".yellow(),
        Level::Error => "ERROR".red().bold()
    }
}
