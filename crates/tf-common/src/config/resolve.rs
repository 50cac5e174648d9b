//! Configuration resolution.
//!
//! Resolution order:
//! 1. Explicit path supplied by the caller
//! 2. `TEMPORAL_FEATURES_CONFIG` environment variable (path to a JSON file)
//! 3. `$XDG_CONFIG_HOME/temporal_features/temporal.json`, then the platform
//!    config directory
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use super::{ConfigResolution, ConfigSource, TemporalParams};
use crate::error::{Error, Result};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TEMPORAL_FEATURES_CONFIG";

const CONFIG_DIR_NAME: &str = "temporal_features";
const CONFIG_FILE_NAME: &str = "temporal.json";

/// Configuration file paths.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Directory containing `temporal.json`
    pub config_dir: Option<PathBuf>,
    /// Explicit path to a params file
    pub params_path: Option<PathBuf>,
}

/// Configuration resolver with deterministic resolution order.
#[derive(Debug)]
pub struct ConfigResolver {
    paths: ConfigPaths,
}

impl ConfigResolver {
    pub fn new(paths: ConfigPaths) -> Self {
        ConfigResolver { paths }
    }

    /// Create a resolver with no explicit overrides.
    pub fn with_defaults() -> Self {
        ConfigResolver {
            paths: ConfigPaths::default(),
        }
    }

    /// Resolve the config directory path.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.paths.config_dir {
            return Some(dir.clone());
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
    }

    /// Resolve the params file path.
    pub fn resolve_params_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        if let Some(ref path) = self.paths.params_path {
            return (Some(path.clone()), ConfigResolution::Explicit);
        }

        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return (Some(PathBuf::from(path)), ConfigResolution::EnvVar);
        }

        if let Some(config_dir) = self.resolve_config_dir() {
            let path = config_dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                return (Some(path), ConfigResolution::XdgConfig);
            }
        }

        (None, ConfigResolution::Default)
    }

    /// Load params from the resolved path or defaults.
    pub fn load_params(&self) -> Result<(TemporalParams, ConfigSource)> {
        let (path, resolution) = self.resolve_params_path();

        match path {
            Some(p) => {
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("failed to read params from {}: {}", p.display(), e))
                })?;

                let hash = compute_sha256(&content);

                let params: TemporalParams = serde_json::from_str(&content).map_err(|e| {
                    Error::Config(format!("failed to parse {}: {}", p.display(), e))
                })?;

                params.validate()?;

                Ok((
                    params,
                    ConfigSource {
                        path: Some(p.to_string_lossy().to_string()),
                        hash: Some(hash),
                        resolution,
                    },
                ))
            }
            None => Ok((
                TemporalParams::default(),
                ConfigSource {
                    path: None,
                    hash: None,
                    resolution: ConfigResolution::Default,
                },
            )),
        }
    }
}

/// Compute SHA-256 hash of a string.
pub(crate) fn compute_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
