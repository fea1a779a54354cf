//! Router configuration, supplied at construction.
//!
//! A configuration can be read from a JSON file; missing fields fall back to
//! their defaults.
pub mod style;

pub use style::{Style, StyleSheet};

use crate::logging::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 1500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// How many records the history keeps.
    pub capacity: usize,
    /// Threshold used until the first source registers, and the severity
    /// given to implicitly registered sources.
    pub default_severity: Severity,
    pub show_timestamps: bool,
    pub autoscroll: bool,
    pub style: StyleSheet,
    /// Shown by the welcome message (one at random) and by `tips`.
    pub tips: Vec<String>,
    pub welcome_title: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_severity: Severity::Info,
            show_timestamps: false,
            autoscroll: true,
            style: StyleSheet::default(),
            tips: vec![
                "Type 'help' to list the log commands.".to_string(),
                "Use 'hide <source>' then 'rerender' to drop a noisy source from the view.".to_string(),
                "Use 'level warning' to only show warnings and worse.".to_string(),
                "Use 'timestamps on' to show when each record was emitted.".to_string(),
                "PageUp and PageDown scroll through the log.".to_string(),
            ],
            welcome_title: "Welcome to the log router!".to_string(),
        }
    }
}

impl RouterConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RouterConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid(
                "capacity must be at least 1".to_string(),
            ));
        }
        self.style.validate().map_err(ConfigError::Invalid)
    }
}
