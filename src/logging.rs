use std::{io::Write as _, sync::OnceLock};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Writes `[LEVEL module] message` lines to stderr.
pub struct StderrLogger {
    level: LevelFilter,
}

/// `-v` repetitions to level, warnings and errors are always shown.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    let level = level_for(verbosity);
    log::set_logger(LOGGER.get_or_init(|| StderrLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}

pub fn format_record(record: &Record) -> String {
    format!(
        "[{} {}] {}",
        record.level(),
        record.module_path().unwrap_or("unknown"),
        record.args()
    )
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // nowhere left to report a failing stderr
            let _ = writeln!(std::io::stderr().lock(), "{}", format_record(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
