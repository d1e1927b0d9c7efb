use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

/// Installs the console logger. Fails if a logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&CONSOLE_LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Maps a `-v` count onto a level, starting from warnings.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Writes records to stderr so stdout stays reserved for tool output.
pub struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN".yellow().bold(),
            Level::Info => "INFO".green(),
            Level::Debug => "DEBUG".blue(),
            Level::Trace => "TRACE".dimmed(),
        };
        eprintln!("{} ({}) :: {}", level, record.target(), record.args());
    }

    fn flush(&self) {}
}
