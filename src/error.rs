//! Error types for feature extraction.
//!
//! Two tiers:
//! - [`FeatureError`] aborts a whole extraction call (bad input, or a
//!   deterministic metric that could not be computed).
//! - [`NullModelError`] is local to the Sigma/Omega comparison against
//!   randomized reference graphs. It is never propagated; the aggregator
//!   records it as a zero-denominator tally.

/// Fatal errors for a single extraction call.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("metric computation failed for a {nodes}-node component: {reason}")]
    MetricFailure { nodes: usize, reason: String },
}

impl FeatureError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Reasons a small-world coefficient could not be computed for a component.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NullModelError {
    #[error("reference graph needs at least 4 nodes, component has {nodes}")]
    TooFewNodes { nodes: usize },

    #[error("reference graph needs at least 2 edges, component has {edges}")]
    TooFewEdges { edges: usize },

    #[error("rewiring gave up after {draws} rejected draws")]
    RewiringExhausted { draws: usize },

    #[error("reference graph is disconnected")]
    Disconnected,

    #[error("{quantity} is zero")]
    ZeroDenominator { quantity: &'static str },

    #[error("coefficient is not finite: {value}")]
    NonFinite { value: f64 },
}

pub type Result<T> = std::result::Result<T, FeatureError>;
