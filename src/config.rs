use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_OVER_ALLOCATION_THRESHOLD: i64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("over_allocation_threshold must be greater than zero (got {0})")]
    InvalidThreshold(i64),
    #[error("unknown validation mode '{0}' (expected 'strict' or 'lenient')")]
    InvalidMode(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the engine treats tasks that break the record invariants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Any violation aborts the report.
    #[default]
    Strict,
    /// Offending tasks are excluded and listed as warnings.
    Lenient,
}

impl ValidationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Options fixed at engine construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A resource is over-allocated above this many active tasks.
    pub over_allocation_threshold: i64,
    pub validation_mode: ValidationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            over_allocation_threshold: DEFAULT_OVER_ALLOCATION_THRESHOLD,
            validation_mode: ValidationMode::Strict,
        }
    }
}

impl EngineConfig {
    pub fn lenient() -> Self {
        Self {
            validation_mode: ValidationMode::Lenient,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.over_allocation_threshold = threshold;
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Reads a JSON config file; absent fields keep their defaults.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    pub(crate) fn checked_threshold(&self) -> Result<usize, ConfigError> {
        if self.over_allocation_threshold <= 0 {
            return Err(ConfigError::InvalidThreshold(self.over_allocation_threshold));
        }
        usize::try_from(self.over_allocation_threshold)
            .map_err(|_| ConfigError::InvalidThreshold(self.over_allocation_threshold))
    }
}
