//! # Runtime Configuration
//!
//! `config.yaml`, read from the directory passed with `--config`.
//!
//! ```yaml
//! chain_id: kyve-1
//! worker: 8
//! pools:
//!   - pool_id: 1
//!     target_bundle_id: 120000
//!   - pool_id: 9
//!     target_bundle_id: 0      # until the latest finalized bundle
//! ```
//!
//! Every other key is optional; see [`RuntimeConfig`] for defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mr_03_bundle_source::chain_rest_for;
use mr_04_pipeline::{
    PipelineConfig, PipelineError, RetryPolicy, DEFAULT_PAGE_SIZE, DEFAULT_QUEUE_DEPTH,
};
use serde::Deserialize;
use shared_types::PoolTarget;
use thiserror::Error;

/// File name looked up inside the `--config` directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for this schema.
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// File
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// `chain_id` names no known chain and no `chain_rest` is set.
    #[error("unknown chain_id {0:?}; set chain_rest explicitly")]
    UnknownChain(String),

    /// Values the pipeline cannot run with.
    #[error(transparent)]
    Invalid(#[from] PipelineError),

    /// `log_level` is not a valid filter directive.
    #[error("invalid log_level {level:?}: {reason}")]
    LogLevel {
        /// Configured value
        level: String,
        /// Parser message
        reason: String,
    },
}

/// Contents of `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Selects the ledger REST endpoint.
    pub chain_id: String,
    /// Overrides the endpoint selected by `chain_id`.
    pub chain_rest: String,
    /// Number of collectors.
    pub worker: usize,
    /// Pools to process.
    pub pools: Vec<PoolTarget>,
    /// Directory holding the root logs.
    pub output_dir: PathBuf,
    /// Work queue depth.
    pub queue_depth: usize,
    /// Result queue depth.
    pub result_queue_depth: usize,
    /// Listing page size.
    pub page_size: usize,
    /// Wait between two listing pages, in milliseconds.
    pub request_interval_ms: u64,
    /// Retries of transient upstream failures.
    pub retry: RetryPolicy,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON log lines.
    pub json_logs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            chain_id: "kyve-1".to_string(),
            chain_rest: String::new(),
            worker: 4,
            pools: Vec::new(),
            output_dir: PathBuf::from("."),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            result_queue_depth: DEFAULT_QUEUE_DEPTH,
            page_size: DEFAULT_PAGE_SIZE,
            request_interval_ms: 1000,
            retry: RetryPolicy::default(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RuntimeConfig {
    /// Load and validate `config.yaml` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&raw).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validating.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chain_rest()?;
        self.pipeline_config().validate()?;
        Ok(())
    }

    /// Ledger REST endpoint, without a trailing `/`.
    pub fn chain_rest(&self) -> Result<String, ConfigError> {
        let explicit = self.chain_rest.trim().trim_end_matches('/');
        if !explicit.is_empty() {
            return Ok(explicit.to_string());
        }
        chain_rest_for(&self.chain_id)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::UnknownChain(self.chain_id.clone()))
    }

    /// The pipeline's view of this configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            output_dir: self.output_dir.clone(),
            pools: self.pools.clone(),
            workers: self.worker,
            queue_depth: self.queue_depth,
            result_queue_depth: self.result_queue_depth,
            page_size: self.page_size,
            request_interval: Duration::from_millis(self.request_interval_ms),
            retry: self.retry.clone(),
        }
    }
}
