use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes records to stderr with the level tag coloured.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "[{}] {}: {}",
            level_tag(record.level()),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

fn level_tag(level: Level) -> colored::ColoredString {
    let tag = level.as_str();
    match level {
        Level::Error => tag.red().bold(),
        Level::Warn => tag.yellow(),
        Level::Info => tag.green(),
        Level::Debug => tag.cyan(),
        Level::Trace => tag.dimmed(),
    }
}

/// Installs the logger once; later calls only change the level.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_just_updates_level() {
        init(LevelFilter::Info);
        init(LevelFilter::Error);
        assert_eq!(log::max_level(), LevelFilter::Error);
        log::error!("visible in test output");
    }
}
