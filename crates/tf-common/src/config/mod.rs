//! Configuration loading and validation for temporal feature extraction.
//!
//! This module provides:
//! - Typed parameters (column bindings, derived column names, window width)
//! - Deterministic config resolution (explicit path > env > XDG > defaults)
//! - Semantic validation
//! - Config snapshots for audit logging

pub mod params;
pub mod resolve;
pub mod snapshot;

pub use params::{
    params_json_schema, ColumnBindings, DerivedColumns, TemporalParams, DEFAULT_ACTIVITY_KEY,
    DEFAULT_CASE_ID_KEY, DEFAULT_RESOURCE_KEY, DEFAULT_TIMESTAMP_KEY,
};
pub use resolve::{ConfigPaths, ConfigResolver};
pub use snapshot::ConfigSnapshot;

use crate::error::Result;

/// Parameters together with how they were obtained.
#[derive(Debug, Clone)]
pub struct Config {
    pub params: TemporalParams,
    pub snapshot: ConfigSnapshot,
}

impl Config {
    /// Load configuration with resolution from explicit path, env, or defaults.
    pub fn load(resolver: &ConfigResolver) -> Result<Self> {
        let (params, source) = resolver.load_params()?;
        let snapshot = ConfigSnapshot::new(&params, source)?;
        Ok(Config { params, snapshot })
    }

    /// Configuration with built-in defaults only.
    pub fn load_defaults() -> Result<Self> {
        let params = TemporalParams::default();
        let snapshot = ConfigSnapshot::from_defaults(&params)?;
        Ok(Config { params, snapshot })
    }
}

/// Configuration source for a file.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file, or None if using defaults
    pub path: Option<String>,
    /// SHA-256 hash of file contents, or None if defaults
    pub hash: Option<String>,
    /// How this source was resolved
    pub resolution: ConfigResolution,
}

/// How a config file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigResolution {
    /// Path passed explicitly by the caller
    Explicit,
    /// From environment variable
    EnvVar,
    /// From XDG config directory
    XdgConfig,
    /// Using built-in defaults
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::Explicit => write!(f, "explicit"),
            ConfigResolution::EnvVar => write!(f, "env"),
            ConfigResolution::XdgConfig => write!(f, "xdg"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}
