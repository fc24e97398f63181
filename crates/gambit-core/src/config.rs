//! Configuration for catalog loading and engine behavior.
//!
//! Every field carries a serde default so a partial JSON file is valid.
//!
//! ```
//! use gambit_core::config::GambitConfig;
//!
//! let config = GambitConfig::from_json(r#"{ "engine": { "seed": 7 } }"#).unwrap();
//! assert_eq!(config.engine.seed, Some(7));
//! assert_eq!(config.engine.max_nesting_depth, 10);
//! assert!(!config.catalog.auto_clean_invalid);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GambitError, Result};

/// Top-level configuration, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GambitConfig {
    /// Rule and waypoint loading.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Per-entity engine behavior.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl GambitConfig {
    /// Load configuration from a JSON string.
    ///
    /// # Errors
    /// Returns `GambitError::Config` if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GambitError::Config(e.to_string()))
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Catalog load settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Report rejected rows so the caller can delete them from the backing store.
    #[serde(default)]
    pub auto_clean_invalid: bool,
    /// Reject rows with non-zero parameters beyond their kind's fields instead of warning.
    #[serde(default)]
    pub reject_unused_params: bool,
    /// Decode and validate rows on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel_validation: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            auto_clean_invalid: false,
            reject_unused_params: false,
            parallel_validation: true,
        }
    }
}

/// Settings shared by every [`ScriptEngine`](crate::engine::ScriptEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deepest chain of nested events a single outer call may produce.
    #[serde(default = "default_nesting_depth")]
    pub max_nesting_depth: u32,
    /// RNG seed. When absent each engine derives one from its binding.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Upper bound on the back-off applied when a timed rule's condition fails.
    #[serde(default = "default_retry_cap")]
    pub condition_retry_cap_ms: u32,
    /// Events queued for re-entrant delivery beyond this count are dropped.
    #[serde(default = "default_max_queued")]
    pub max_queued_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_nesting_depth(),
            seed: None,
            condition_retry_cap_ms: default_retry_cap(),
            max_queued_events: default_max_queued(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing-subscriber` env-filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_nesting_depth() -> u32 {
    10
}

fn default_retry_cap() -> u32 {
    5000
}

fn default_max_queued() -> usize {
    256
}

fn default_log_filter() -> String {
    "info".to_string()
}
