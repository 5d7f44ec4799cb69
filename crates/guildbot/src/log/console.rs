use std::fmt;

use super::{Level, Location, Logger};

/// Logger forwarding records to `tracing`
///
/// Records at or above `level` become tracing events carrying `pos` and
/// `func` fields; the installed subscriber decides where they go.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger {
    level: Level,
}

impl ConsoleLogger {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Logger for ConsoleLogger {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn log(&self, level: Level, location: &Location, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let pos = format!("[{}:{}]", location.file_name(), location.line);
        let func = location.function_name();
        match level {
            Level::Debug => tracing::debug!(pos = %pos, func = %func, "{}", args),
            Level::Info => tracing::info!(pos = %pos, func = %func, "{}", args),
            Level::Warn => tracing::warn!(pos = %pos, func = %func, "{}", args),
            Level::Error => tracing::error!(pos = %pos, func = %func, "{}", args),
        }
    }
}
