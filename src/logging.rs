//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Console logger; backend of the `log` facade used by the library.
//!

#[derive(Copy, Clone, Debug, strum_macros::EnumIter, PartialEq)]
pub enum Level {
    Quiet,
    Info,
    Verbose
}

impl Level {
    fn filter(self) -> log::LevelFilter {
        match self {
            Level::Quiet => log::LevelFilter::Error,
            Level::Info => log::LevelFilter::Info,
            Level::Verbose => log::LevelFilter::Debug
        }
    }
}

pub struct Logger {
    level: Level
}

impl Logger {
    pub fn new(level: Level) -> Logger { Logger{ level } }

    /// Installs a logger of `level` as the global `log` backend.
    pub fn init(level: Level) -> Result<(), log::SetLoggerError> {
        log::set_logger(Box::leak(Box::new(Logger::new(level))))?;
        log::set_max_level(level.filter());
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            log::Level::Error => eprintln!("Error: {}", record.args()),
            log::Level::Warn => eprintln!("Warning: {}", record.args()),
            log::Level::Info => println!("{}", record.args()),
            _ => println!("[{}] {}", record.target(), record.args())
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn level_controls_enabled_records() {
        let metadata = |level| log::Metadata::builder().level(level).build();

        let quiet = Logger::new(Level::Quiet);
        assert!(quiet.enabled(&metadata(log::Level::Error)));
        assert!(!quiet.enabled(&metadata(log::Level::Warn)));

        let info = Logger::new(Level::Info);
        assert!(info.enabled(&metadata(log::Level::Warn)));
        assert!(info.enabled(&metadata(log::Level::Info)));
        assert!(!info.enabled(&metadata(log::Level::Debug)));

        let verbose = Logger::new(Level::Verbose);
        assert!(verbose.enabled(&metadata(log::Level::Debug)));
        assert!(!verbose.enabled(&metadata(log::Level::Trace)));
    }
}
