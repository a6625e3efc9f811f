//! Engine configuration (§6 "Configuration (recognized options)").
//!
//! A single validated struct, loadable from TOML or built programmatically.
//! Invalid configuration is a fatal `CodegraphError::config` at startup, per
//! §7's propagation policy ("Configuration errors at startup are fatal").

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::models::{CodegraphError, Result};

/// TTLs for the L1 in-process cache tier, keyed by what's being cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L1TtlSeconds {
    #[serde(rename = "lang-detection", default = "default_lang_detection_ttl")]
    pub lang_detection: u64,
    #[serde(rename = "file-parse", default = "default_file_parse_ttl")]
    pub file_parse: u64,
}

fn default_lang_detection_ttl() -> u64 {
    1800
}

fn default_file_parse_ttl() -> u64 {
    7200
}

impl Default for L1TtlSeconds {
    fn default() -> Self {
        Self {
            lang_detection: default_lang_detection_ttl(),
            file_parse: default_file_parse_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Required: the project root to walk and parse.
    pub root_path: PathBuf,
    /// Ignore-file names to look for while scanning upward from the root
    /// (§4.2). Defaults to the platform convention.
    pub ignore_file_names: Vec<String>,
    /// Files larger than this are skipped without reading (§4.4).
    pub max_file_bytes: u64,
    /// 0 means "use cpu-count" (§6 default `parser_parallelism: cpu-count`).
    pub parser_parallelism: usize,
    pub l1_cache_entries: u64,
    pub l1_ttl_seconds: L1TtlSeconds,
    pub l2_enabled: bool,
    pub l2_url: String,
    pub cdc_enabled: bool,
    pub stream_name: String,
    pub traversal_max_depth: usize,
    pub pagination_max_limit: usize,
    pub pagination_default_limit: usize,
    pub hub_percentile: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            ignore_file_names: vec![".gitignore".to_string(), ".codegraphignore".to_string()],
            max_file_bytes: 10 * 1024 * 1024,
            parser_parallelism: 0,
            l1_cache_entries: 100_000,
            l1_ttl_seconds: L1TtlSeconds::default(),
            l2_enabled: true,
            l2_url: String::new(),
            cdc_enabled: true,
            stream_name: "codegraph-events".to_string(),
            traversal_max_depth: 10,
            pagination_max_limit: 500,
            pagination_default_limit: 50,
            hub_percentile: 0.95,
        }
    }
}

impl EngineConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| CodegraphError::config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve `parser_parallelism == 0` ("cpu-count") into a concrete thread
    /// count, applying the same 75%-of-cores heuristic the rest of the
    /// codebase uses for CPU-bound fan-out.
    pub fn resolved_parallelism(&self) -> usize {
        if self.parser_parallelism > 0 {
            return self.parser_parallelism;
        }
        let cores = num_cpus::get();
        std::cmp::max(
            crate::shared::constants::thread_pool::MIN_THREADS,
            (cores as f64 * crate::shared::constants::thread_pool::CPU_UTILIZATION_PERCENT) as usize,
        )
    }

    /// Cross-field and range validation, mirroring the checks a production
    /// config layer runs once at startup rather than per-access.
    pub fn validate(&self) -> Result<()> {
        if self.root_path.as_os_str().is_empty() {
            return Err(CodegraphError::config("root_path must not be empty"));
        }
        if self.max_file_bytes == 0 {
            return Err(CodegraphError::config("max_file_bytes must be > 0"));
        }
        if self.pagination_default_limit == 0
            || self.pagination_default_limit > self.pagination_max_limit
        {
            return Err(CodegraphError::config(
                "pagination_default_limit must be in (0, pagination_max_limit]",
            ));
        }
        if self.pagination_max_limit == 0 || self.pagination_max_limit > 500 {
            return Err(CodegraphError::config(
                "pagination_max_limit must be in (0, 500]",
            ));
        }
        if !(0.0..=1.0).contains(&self.hub_percentile) {
            return Err(CodegraphError::config("hub_percentile must be in [0, 1]"));
        }
        if self.traversal_max_depth == 0 {
            return Err(CodegraphError::config("traversal_max_depth must be > 0"));
        }
        if self.l2_enabled && self.l2_url.is_empty() {
            return Err(CodegraphError::config(
                "l2_url must be set when l2_enabled is true",
            ));
        }
        if self.stream_name.is_empty() {
            return Err(CodegraphError::config("stream_name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_once_l2_disabled() {
        let mut config = EngineConfig::new("/tmp/project");
        config.l2_enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn l2_enabled_without_url_is_rejected() {
        let config = EngineConfig::new("/tmp/project");
        assert!(config.validate().is_err());
    }

    #[test]
    fn pagination_default_above_max_is_rejected() {
        let mut config = EngineConfig::new("/tmp/project");
        config.l2_enabled = false;
        config.pagination_default_limit = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolved_parallelism_falls_back_to_cpu_heuristic() {
        let config = EngineConfig::new("/tmp/project");
        assert!(config.resolved_parallelism() >= 1);
    }
}
