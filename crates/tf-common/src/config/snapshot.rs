//! Configuration snapshots for audit logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resolve::compute_sha256;
use super::{ConfigResolution, ConfigSource, TemporalParams};
use crate::error::{Error, Result};

/// Snapshot of the active configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Timestamp when snapshot was created
    pub snapshot_at: DateTime<Utc>,

    /// Hash of the effective (normalized) params
    pub params_hash: String,

    /// Path to the file (None if defaults)
    pub path: Option<String>,

    /// SHA-256 hash of the raw file content (None if defaults)
    pub file_hash: Option<String>,

    /// How the config was resolved
    pub resolution: String,

    /// Effective window width alias
    pub grouper_freq: String,
}

impl ConfigSnapshot {
    pub fn new(params: &TemporalParams, source: ConfigSource) -> Result<Self> {
        let params_json = serde_json::to_string(params)
            .map_err(|e| Error::Config(format!("failed to serialize params: {}", e)))?;

        Ok(ConfigSnapshot {
            snapshot_at: Utc::now(),
            params_hash: compute_sha256(&params_json),
            path: source.path,
            file_hash: source.hash,
            resolution: source.resolution.to_string(),
            grouper_freq: params.grouper_freq.to_string(),
        })
    }

    pub fn from_defaults(params: &TemporalParams) -> Result<Self> {
        ConfigSnapshot::new(
            params,
            ConfigSource {
                path: None,
                hash: None,
                resolution: ConfigResolution::Default,
            },
        )
    }

    pub fn is_default(&self) -> bool {
        self.resolution == "default"
    }
}
