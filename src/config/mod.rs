//! Configuration loading and validation utilities.

use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::instrument;

use crate::{DvfsError, DvfsResult};

/// Tunable parameters of the estimator.
///
/// All thresholds the estimation policy depends on live here rather than
/// as constants in the algorithm; a host driver ships its own table and
/// gap thresholds per platform.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DvfsConfig {
    /// Submit intervals below this are treated as a bursty workload.
    pub min_submit_gap_us: u64,
    /// Submit intervals above this are treated as an idle workload.
    pub max_submit_gap_us: u64,
    /// Number of completed-job samples retained per handle.
    pub history_depth: usize,
    /// Conservative frequency used when no history exists yet.
    pub default_freq_hz: u64,
    /// Upper bound on in-flight jobs per handle.
    pub max_queued_jobs: usize,
    /// Period of the unused-history sweep task.
    pub sweep_interval_ms: u64,
}

impl Default for DvfsConfig {
    fn default() -> Self {
        Self {
            min_submit_gap_us: 2_000,
            max_submit_gap_us: 1_000_000,
            history_depth: 10,
            default_freq_hz: 546_000_000,
            max_queued_jobs: 64,
            sweep_interval_ms: 5_000,
        }
    }
}

impl DvfsConfig {
    pub fn validate(&self) -> DvfsResult<()> {
        if self.history_depth == 0 {
            return Err(DvfsError::Config(
                "history depth must be positive".to_string(),
            ));
        }
        if self.max_queued_jobs == 0 {
            return Err(DvfsError::Config(
                "queued-job bound must be positive".to_string(),
            ));
        }
        if self.min_submit_gap_us >= self.max_submit_gap_us {
            return Err(DvfsError::Config(format!(
                "min submit gap {}us must be below max submit gap {}us",
                self.min_submit_gap_us, self.max_submit_gap_us
            )));
        }
        if self.default_freq_hz == 0 {
            return Err(DvfsError::Config(
                "default frequency must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Supported clock rates as provided by the platform clock layer.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    /// Hardware-supported rates in Hz; order and duplicates are tolerated
    /// and normalised when building the runtime table.
    pub rates_hz: Vec<u64>,
}

/// On-disk document combining the tunables and the platform table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DvfsDocument {
    #[serde(default)]
    pub dvfs: DvfsConfig,
    pub table: TableConfig,
}

impl DvfsDocument {
    pub fn from_toml_str(raw: &str) -> DvfsResult<Self> {
        let doc: DvfsDocument = toml::from_str(raw)
            .map_err(|err| DvfsError::Config(format!("invalid dvfs document: {err}")))?;
        doc.dvfs.validate()?;
        Ok(doc)
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> DvfsResult<Self> {
        let raw = fs::read_to_string(path.as_ref())
            .await
            .map_err(|err| DvfsError::Config(format!("failed to read dvfs document: {err}")))?;
        Self::from_toml_str(&raw)
    }
}
