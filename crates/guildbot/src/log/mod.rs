//! SDK logger.
//!
//! A [`Logger`] is constructed explicitly and handed to whatever needs it.
//! Records below the logger's [`Level`] are dropped; the rest carry the call
//! site captured by the `log_*!` macros.
//!
//! ```
//! use guildbot::log::{ConsoleLogger, Level};
//! use guildbot::{log_debug, log_info};
//!
//! let logger = ConsoleLogger::new(Level::Info);
//! log_info!(logger, "connected to shard {}", 0);
//! log_debug!(logger, "dropped, below info");
//! ```

mod console;

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use console::ConsoleLogger;

// ============================================================================
// Level
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(s: String) -> Result<Self, ParseLevelError> {
        s.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Location
// ============================================================================

/// Call site of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    /// Full path of the enclosing function, as reported by `type_name`
    pub function: &'static str,
}

impl Location {
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// File name without its directories
    pub fn file_name(&self) -> &'static str {
        self.file.rsplit(['/', '\\']).next().unwrap_or(self.file)
    }

    /// Last path segment of the enclosing function, ignoring closures
    pub fn function_name(&self) -> &'static str {
        let mut path = self.function;
        while let Some(stripped) = path.strip_suffix("::{{closure}}") {
            path = stripped;
        }
        path.rsplit("::").next().unwrap_or(path)
    }
}

// ============================================================================
// Logger
// ============================================================================

pub trait Logger: Send + Sync {
    fn enabled(&self, level: Level) -> bool;

    fn log(&self, level: Level, location: &Location, args: fmt::Arguments<'_>);

    /// Flush buffered records
    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }

    fn log(&self, level: Level, location: &Location, args: fmt::Arguments<'_>) {
        (**self).log(level, location, args)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }

    fn log(&self, level: Level, location: &Location, args: fmt::Arguments<'_>) {
        (**self).log(level, location, args)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}

// ============================================================================
// Macros
// ============================================================================

/// Values of a `log_*!` call without a format string, space separated
#[doc(hidden)]
pub struct Values<'a>(pub &'a [&'a dyn fmt::Display]);

impl fmt::Display for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_location {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        $crate::log::Location::new(
            file!(),
            line!(),
            match name.strip_suffix("::f") {
                Some(function) => function,
                None => name,
            },
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($logger:expr, $level:expr, $fmt:literal, $($arg:tt)+) => {{
        let logger = &$logger;
        if $crate::log::Logger::enabled(logger, $level) {
            $crate::log::Logger::log(logger, $level, &$crate::__log_location!(), format_args!($fmt, $($arg)+));
        }
    }};
    ($logger:expr, $level:expr, $($value:expr),+ $(,)?) => {{
        let logger = &$logger;
        if $crate::log::Logger::enabled(logger, $level) {
            let values: &[&dyn ::std::fmt::Display] = &[$(&$value),+];
            $crate::log::Logger::log(
                logger,
                $level,
                &$crate::__log_location!(),
                format_args!("{}", $crate::log::Values(values)),
            );
        }
    }};
}

/// Log at debug level.
///
/// A leading literal followed by arguments is a format string:
/// `log_debug!(logger, "shard {}", id)`. Anything else is a list of values
/// written out separated by spaces: `log_debug!(logger, shard, id)`. A lone
/// literal is a value too, so braces in it are printed as they are.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::log::Level::Debug, $($arg)+)
    };
}

/// Log at info level, see [`log_debug!`] for the accepted arguments
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::log::Level::Info, $($arg)+)
    };
}

/// Log at warn level, see [`log_debug!`] for the accepted arguments
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::log::Level::Warn, $($arg)+)
    };
}

/// Log at error level, see [`log_debug!`] for the accepted arguments
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::log::Level::Error, $($arg)+)
    };
}
