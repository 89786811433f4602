//! Size-bucketed aggregation of component statistics.
//!
//! Components of one, two and three nodes are only counted. Larger components
//! are measured with [`compute_metrics`] and folded in with weight
//! `n / non_isolated_nodes`, so a single connected graph contributes its
//! metrics unweighted.

use rand::Rng;

use super::algorithms::compute_metrics;
use super::models::{Component, GraphStatistics, SmallWorldConfig};
use crate::error::Result;

/// Aggregate the components of one thresholded graph into a feature record.
///
/// An empty slice yields the all-zero record.
pub fn aggregate<R: Rng + ?Sized>(
    components: &[Component],
    config: &SmallWorldConfig,
    rng: &mut R,
) -> Result<GraphStatistics> {
    let mut stats = GraphStatistics {
        subgraphs: components.len(),
        ..GraphStatistics::default()
    };

    let mut measured = Vec::new();
    for component in components {
        match component.node_count() {
            0 => {}
            1 => stats.isolated_nodes += 1,
            2 => stats.isolated_pairs += 1,
            3 => stats.isolated_trios += 1,
            n => {
                stats.non_isolated_nodes += n;
                measured.push(component);
            }
        }
    }

    let total = stats.non_isolated_nodes as f64;
    for component in measured {
        let metrics = compute_metrics(component, config, rng)?;
        stats.add_weighted(&metrics, component.node_count() as f64 / total);
    }

    tracing::debug!(
        "Aggregated {} subgraphs: {} isolated, {} pairs, {} trios, {} nodes measured",
        stats.subgraphs,
        stats.isolated_nodes,
        stats.isolated_pairs,
        stats.isolated_trios,
        stats.non_isolated_nodes
    );

    Ok(stats)
}
