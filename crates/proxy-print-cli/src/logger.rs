use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

/// Logger writing timestamped lines to stderr
pub struct CliLogger {
    level: Level,
}

impl CliLogger {
    pub fn new(verbose: bool) -> Self {
        Self {
            level: if verbose { Level::Debug } else { Level::Info },
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let filter = match self.level {
            Level::Debug => LevelFilter::Debug,
            _ => LevelFilter::Info,
        };
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {:<5} {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
