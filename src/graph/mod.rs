//! Graph feature engine.
//!
//! Turns a regional correlation matrix into thresholded graphs and computes a
//! size-weighted aggregate of small-world network statistics per threshold,
//! using petgraph for graph storage and rustworkx-core for decomposition.
//!
//! ## Architecture
//!
//! ```text
//! CorrelationMatrix ──► builder ──► RegionGraph (one per threshold)
//!                                        │
//!                              algorithms::connected_components
//!                                        │
//!                                  Vec<Component>
//!                                        │
//!                 aggregate ◄── algorithms::compute_metrics ◄── null_models
//!                     │
//!              GraphStatistics ──► naming ──► FeatureMap
//!                     │
//!        GraphFeatureEngine (rayon fan-out over thresholds)
//! ```
//!
//! ## Modules
//!
//! - [`models`] - Data structures (CorrelationMatrix, RegionGraph, Component, GraphStatistics, configs)
//! - [`builder`] - Correlation matrix → petgraph conversion
//! - [`algorithms`] - Components, efficiencies, clustering, density, node connectivity
//! - [`null_models`] - Sigma and Omega against rewired reference graphs
//! - [`aggregate`] - Size-bucketed weighted aggregation
//! - [`naming`] - Feature key formatting
//! - [`engine`] - `FeatureEngine` trait and `GraphFeatureEngine` orchestrator
//! - [`mock`] - `MockFeatureEngine` for testing (cfg(test) only)

pub mod aggregate;
pub mod algorithms;
pub mod builder;
pub mod engine;
pub mod models;
pub mod naming;
pub mod null_models;

#[cfg(test)]
pub mod mock;

// Re-export primary types for convenience
pub use engine::{FeatureEngine, GraphFeatureEngine};
pub use models::{
    default_valid_regions, Component, ComponentMetrics, CorrelationMatrix, ExtractionConfig,
    FeatureMap, FeatureValue, GraphStatistic, GraphStatistics, RegionGraph, SmallWorldConfig,
};
