//! Brain Network Features
//!
//! Graph features from regional brain-signal correlations:
//! - Threshold graphs over a correlation matrix (petgraph)
//! - Connected-component decomposition (rustworkx-core)
//! - Small-world statistics with size-weighted aggregation
//! - Time-series front end (signal variance, Pearson correlation)
//! - YAML + environment configuration

pub mod error;
pub mod graph;
pub mod timeseries;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use graph::models::{ExtractionConfig, SmallWorldConfig};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "brain-features.yaml";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub graph: GraphYamlConfig,
    pub small_world: SmallWorldConfig,
}

/// Graph construction section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphYamlConfig {
    pub thresholds: Vec<f64>,
    /// 0-based region ids; an empty list keeps every region
    pub valid_regions: Vec<usize>,
    pub add_correlation_features: bool,
}

impl Default for GraphYamlConfig {
    fn default() -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            thresholds: defaults.thresholds,
            valid_regions: defaults.valid_regions,
            add_correlation_features: defaults.add_correlation_features,
        }
    }
}

// ============================================================================
// Runtime config (what the extraction actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub extraction: ExtractionConfig,
}

/// Parse a comma- or whitespace-separated list.
fn parse_list<T: FromStr>(raw: &str) -> std::result::Result<Vec<T>, T::Err> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries `brain-features.yaml` in CWD. A missing or
    /// unparsable file falls back to defaults; a malformed env var is an error.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);
        let mut extraction = ExtractionConfig {
            thresholds: yaml.graph.thresholds,
            valid_regions: yaml.graph.valid_regions,
            add_correlation_features: yaml.graph.add_correlation_features,
            small_world: yaml.small_world,
        };

        // 2. Env var overrides
        if let Ok(raw) = std::env::var("BRAIN_FEATURES_THRESHOLDS") {
            extraction.thresholds = parse_list(&raw)
                .with_context(|| format!("BRAIN_FEATURES_THRESHOLDS={:?} is not a list of numbers", raw))?;
        }
        if let Ok(raw) = std::env::var("BRAIN_FEATURES_VALID_REGIONS") {
            extraction.valid_regions = parse_list(&raw).with_context(|| {
                format!("BRAIN_FEATURES_VALID_REGIONS={:?} is not a list of region ids", raw)
            })?;
        }
        if let Ok(raw) = std::env::var("BRAIN_FEATURES_SEED") {
            let seed = raw
                .trim()
                .parse()
                .with_context(|| format!("BRAIN_FEATURES_SEED={:?} is not an integer", raw))?;
            extraction.small_world.seed = Some(seed);
        }
        if let Ok(raw) = std::env::var("BRAIN_FEATURES_CORRELATIONS") {
            extraction.add_correlation_features = parse_flag(&raw)
                .with_context(|| format!("BRAIN_FEATURES_CORRELATIONS={:?} is not a boolean", raw))?;
        }

        if extraction.thresholds.is_empty() {
            tracing::warn!("No thresholds configured, graph features will be empty");
        }

        Ok(Self { extraction })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
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

// ============================================================================
// Tests
// ============================================================================
