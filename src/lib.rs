//! graphscope
//!
//! Network analysis over tabular edge lists:
//! - Graph construction from CSV edge records (directed or undirected)
//! - Structural statistics, weak/strong components
//! - Degree, closeness, betweenness and eigenvector centrality
//! - Top-N and component subgraphs
//! - A sized node/edge view model for force-directed renderers

pub mod error;
pub mod graph;
pub mod source;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use graph::{AnalyticsConfig, SizeScale};

pub use error::GraphError;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub analytics: AnalyticsConfig,
    pub export: SizeScale,
    pub cache: CacheYamlConfig,
}

/// Dataset cache section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheYamlConfig {
    pub capacity: usize,
}

impl Default for CacheYamlConfig {
    fn default() -> Self {
        Self {
            capacity: source::cache::DEFAULT_CAPACITY,
        }
    }
}

// ============================================================================
// Runtime config
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub analytics: AnalyticsConfig,
    pub size_scale: SizeScale,
    pub cache_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "graphscope.yaml" in CWD. A missing file
    /// falls back to env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        let mut analytics = yaml.analytics;

        if let Some(v) = env_parse("GRAPHSCOPE_EIGENVECTOR_TOLERANCE") {
            analytics.eigenvector_tolerance = v;
        }
        if let Some(v) = env_parse("GRAPHSCOPE_EIGENVECTOR_MAX_ITERATIONS") {
            analytics.eigenvector_max_iterations = v;
        }
        if let Some(v) = env_parse("GRAPHSCOPE_EIGENVECTOR_FALLBACK") {
            analytics.eigenvector_degree_fallback = v;
        }
        if let Some(v) = env_parse("GRAPHSCOPE_BETWEENNESS_NORMALIZED") {
            analytics.betweenness_normalized = v;
        }
        if let Some(v) = env_parse("GRAPHSCOPE_PARALLEL_THRESHOLD") {
            analytics.parallel_threshold = v;
        }
        if let Some(v) = env_parse("GRAPHSCOPE_BUDGET_MS") {
            analytics.budget_ms = Some(v);
        }

        Ok(Self {
            analytics,
            size_scale: yaml.export,
            cache_capacity: env_parse("GRAPHSCOPE_CACHE_CAPACITY").unwrap_or(yaml.cache.capacity),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("graphscope.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Parse an env var, ignoring (with a warning) values that do not parse.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {}={}: not a valid value", name, raw);
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
analytics:
  eigenvector_tolerance: 0.0001
  eigenvector_max_iterations: 500
  eigenvector_degree_fallback: true
  parallel_threshold: 50
  budget_ms: 2000

export:
  base: 5.0
  scale: 25.0

cache:
  capacity: 3
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.analytics.eigenvector_tolerance, 0.0001);
        assert_eq!(config.analytics.eigenvector_max_iterations, 500);
        assert!(config.analytics.eigenvector_degree_fallback);
        assert!(config.analytics.betweenness_normalized);
        assert_eq!(config.analytics.parallel_threshold, 50);
        assert_eq!(config.analytics.budget_ms, Some(2000));
        assert_eq!(config.export.base, 5.0);
        assert_eq!(config.export.scale, 25.0);
        assert_eq!(config.export.default_size, 20.0);
        assert_eq!(config.cache.capacity, 3);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.analytics, AnalyticsConfig::default());
        assert_eq!(config.export, SizeScale::default());
        assert_eq!(config.cache.capacity, source::cache::DEFAULT_CAPACITY);
    }

    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "GRAPHSCOPE_EIGENVECTOR_TOLERANCE",
                "GRAPHSCOPE_EIGENVECTOR_MAX_ITERATIONS",
                "GRAPHSCOPE_EIGENVECTOR_FALLBACK",
                "GRAPHSCOPE_BETWEENNESS_NORMALIZED",
                "GRAPHSCOPE_PARALLEL_THRESHOLD",
                "GRAPHSCOPE_BUDGET_MS",
                "GRAPHSCOPE_CACHE_CAPACITY",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
analytics:
  eigenvector_max_iterations: 250
  parallel_threshold: 10
cache:
  capacity: 2
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("graphscope.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.analytics.eigenvector_max_iterations, 250);
        assert_eq!(config.analytics.parallel_threshold, 10);
        assert_eq!(config.analytics.budget_ms, None);
        assert_eq!(config.cache_capacity, 2);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("GRAPHSCOPE_EIGENVECTOR_MAX_ITERATIONS", "900");
        std::env::set_var("GRAPHSCOPE_BUDGET_MS", "1500");
        std::env::set_var("GRAPHSCOPE_PARALLEL_THRESHOLD", "not-a-number");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.analytics.eigenvector_max_iterations, 900);
        assert_eq!(config.analytics.budget_ms, Some(1500));
        // Unparseable override ignored, YAML value kept
        assert_eq!(config.analytics.parallel_threshold, 10);

        clear_env();

        // --- Phase 3: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-graphscope-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.analytics, AnalyticsConfig::default());
        assert_eq!(config.cache_capacity, source::cache::DEFAULT_CAPACITY);
    }
}
