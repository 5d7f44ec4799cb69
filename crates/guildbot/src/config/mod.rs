use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::log::Level;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub replay: ReplaySettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogSettings {
    /// Level of the SDK logger
    #[serde(default)]
    pub level: Level,
    /// Directive for the tracing subscriber, `RUST_LOG` wins when set
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::default(),
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReplaySettings {
    /// Stop at the first frame a callback or decoder rejects
    #[serde(default)]
    pub stop_on_error: bool,
    /// Skip lines that are not gateway frames instead of failing
    #[serde(default = "default_true")]
    pub skip_invalid: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            stop_on_error: false,
            skip_invalid: true,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with defaults
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (not tracked by git)
            .add_source(File::with_name("config/local").required(false))
            // e.g. GUILDBOT_LOG__LEVEL=debug
            .add_source(
                Environment::with_prefix("GUILDBOT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Load settings from a single file, format picked by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}
