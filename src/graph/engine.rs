//! Feature engine: orchestrates the full pipeline.
//!
//! The `FeatureEngine` trait is the single entry point for graph feature
//! consumers (extraction presets, CLI). For every configured threshold it runs:
//!
//! 1. **Build**: correlation matrix → `RegionGraph` via `build_graph`
//! 2. **Decompose**: `connected_components` (skipped when already connected)
//! 3. **Aggregate**: size-bucketed weighted statistics via `aggregate`
//! 4. **Name**: flatten into `"<label> <statistic> at Threshold <t>"` keys
//!
//! Thresholds are independent and run in parallel on the rayon pool. Each
//! threshold owns its RNG, so a seeded run gives the same result regardless
//! of scheduling.
//!
//! The trait also enables mocking in downstream consumer tests.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

use super::aggregate::aggregate;
use super::algorithms::connected_components;
use super::builder::build_graph;
use super::models::{
    CorrelationMatrix, ExtractionConfig, FeatureMap, GraphStatistics, SmallWorldConfig,
};
use super::naming::name_features;
use crate::error::Result;

// ============================================================================
// Trait
// ============================================================================

/// Feature engine trait: single entry point for thresholded graph features.
///
/// Consumers take `&dyn FeatureEngine` so presets can be tested against
/// `MockFeatureEngine` without running the null models.
pub trait FeatureEngine: Send + Sync {
    /// Graph features of `matrix` at every configured threshold.
    ///
    /// Regions outside a non-empty `valid_regions` are excluded from the
    /// graphs. Keys carry `label` as a prefix unless it is empty.
    fn graph_features(
        &self,
        matrix: &CorrelationMatrix,
        valid_regions: &[usize],
        label: &str,
    ) -> Result<FeatureMap>;
}

// ============================================================================
// Concrete implementation
// ============================================================================

/// Real feature engine: build → decompose → aggregate → name, per threshold.
#[derive(Debug, Clone)]
pub struct GraphFeatureEngine {
    thresholds: Vec<f64>,
    small_world: SmallWorldConfig,
}

impl GraphFeatureEngine {
    pub fn new(thresholds: Vec<f64>, small_world: SmallWorldConfig) -> Self {
        Self {
            thresholds,
            small_world,
        }
    }

    /// Engine using the thresholds and null-model settings of `config`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.thresholds.clone(), config.small_world.clone())
    }

    /// RNG for the threshold at `index`: `seed + index` when seeded,
    /// OS entropy otherwise.
    fn rng_for(&self, index: usize) -> StdRng {
        match self.small_world.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Aggregated statistics of the graph built at a single threshold.
    pub fn statistics_at(
        &self,
        matrix: &CorrelationMatrix,
        threshold: f64,
        valid_regions: &[usize],
        rng: &mut StdRng,
    ) -> Result<GraphStatistics> {
        let graph = build_graph(matrix, threshold, valid_regions);
        let components = connected_components(&graph);
        aggregate(&components, &self.small_world, rng)
    }

    /// Statistics for every configured threshold, in threshold order.
    pub fn statistics(
        &self,
        matrix: &CorrelationMatrix,
        valid_regions: &[usize],
    ) -> Result<Vec<GraphStatistics>> {
        let start = Instant::now();
        let statistics = self
            .thresholds
            .par_iter()
            .enumerate()
            .map(|(index, &threshold)| {
                let mut rng = self.rng_for(index);
                self.statistics_at(matrix, threshold, valid_regions, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Computed graph statistics for {} regions at {} thresholds in {}ms",
            matrix.size(),
            self.thresholds.len(),
            start.elapsed().as_millis()
        );
        Ok(statistics)
    }
}

impl Default for GraphFeatureEngine {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl FeatureEngine for GraphFeatureEngine {
    fn graph_features(
        &self,
        matrix: &CorrelationMatrix,
        valid_regions: &[usize],
        label: &str,
    ) -> Result<FeatureMap> {
        let statistics = self.statistics(matrix, valid_regions)?;
        let mut features = FeatureMap::new();
        for (stats, &threshold) in statistics.iter().zip(&self.thresholds) {
            features.extend(name_features(stats, threshold, label));
        }
        Ok(features)
    }
}

// ============================================================================
// Tests
// ============================================================================
