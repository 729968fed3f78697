// In: src/config.rs

//! Runtime-wide configuration for the featurizer library.
//!
//! A `FeaturizerConfig` is created once at the application boundary (from a JSON
//! document handed to `FeaturizerRuntime_Initialize`, or from `Default`) and is
//! owned by the `Runtime`. Components read the fields they need from it.

use serde::{Deserialize, Serialize};

use crate::error::FeaturizerError;

//==================================================================================
// I. Logging Settings
//==================================================================================

/// Verbosity of the `env_logger` backend installed by `observability::init_logging`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

//==================================================================================
// II. The Unified Configuration Struct
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeaturizerConfig {
    /// Seed for the handle generator. `None` seeds from the operating system;
    /// a fixed value makes handle sequences reproducible in tests.
    pub handle_seed: Option<u64>,

    /// Initial capacity of the buffer behind every `ArchiveWriter` the runtime creates.
    #[serde(default = "default_archive_reserve_bytes")]
    pub archive_reserve_bytes: usize,

    /// Upper bound on the number of passes the training driver makes over the data.
    #[serde(default = "default_max_training_passes")]
    pub max_training_passes: usize,

    pub log_level: LogLevel,

    /// When set, log records are appended to this file instead of stderr.
    pub log_file: Option<String>,
}

fn default_archive_reserve_bytes() -> usize {
    64
}

fn default_max_training_passes() -> usize {
    16
}

impl Default for FeaturizerConfig {
    fn default() -> Self {
        Self {
            handle_seed: None,
            archive_reserve_bytes: default_archive_reserve_bytes(),
            max_training_passes: default_max_training_passes(),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

impl FeaturizerConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, FeaturizerError> {
        let config: FeaturizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FeaturizerError> {
        if self.max_training_passes == 0 {
            return Err(FeaturizerError::invalid_argument(
                "max_training_passes must be at least 1",
            ));
        }
        Ok(())
    }
}
