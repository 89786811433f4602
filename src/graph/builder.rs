//! Correlation matrix → petgraph construction.
//!
//! An edge joins regions `i` and `j` when the absolute correlation between
//! them exceeds the threshold. Self-correlations never produce edges. Every
//! region keeps its node even without edges, so isolated regions are counted
//! downstream.
//!
//! Regions missing from a non-empty valid set are dropped before any edge is
//! considered; an empty valid set keeps every region.

use std::collections::HashSet;

use super::models::{CorrelationMatrix, RegionGraph};

/// Build the thresholded region graph for one threshold.
///
/// Never fails: a threshold too high for any edge yields a graph of isolated
/// nodes, and a valid set disjoint from the matrix yields an empty graph.
pub fn build_graph(matrix: &CorrelationMatrix, threshold: f64, valid_regions: &[usize]) -> RegionGraph {
    let n = matrix.size();
    let valid: HashSet<usize> = valid_regions.iter().copied().collect();
    let keep = |region: usize| valid.is_empty() || valid.contains(&region);

    let kept: Vec<usize> = (0..n).filter(|&r| keep(r)).collect();
    let mut graph = RegionGraph::with_capacity(kept.len(), kept.len() * 2);
    for &region in &kept {
        graph.add_region(region);
    }

    for (pos, &i) in kept.iter().enumerate() {
        for &j in &kept[pos + 1..] {
            // Either orientation qualifies, matching an edge list built from
            // the full stacked matrix.
            if matrix.get(i, j).abs() > threshold || matrix.get(j, i).abs() > threshold {
                graph.add_edge(i, j);
            }
        }
    }

    tracing::debug!(
        "Built graph at threshold {}: {} nodes, {} edges ({} regions dropped)",
        threshold,
        graph.node_count(),
        graph.edge_count(),
        n - kept.len()
    );

    graph
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// R×R matrix with unit diagonal and a constant off-diagonal value.
    fn make_uniform_matrix(r: usize, off: f64) -> CorrelationMatrix {
        let rows = (0..r)
            .map(|i| (0..r).map(|j| if i == j { 1.0 } else { off }).collect())
            .collect();
        CorrelationMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_uniform_matrix_below_threshold_is_complete() {
        let m = make_uniform_matrix(5, 0.5);
        let g = build_graph(&m, 0.25, &[]);
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 10);
    }

    #[test]
    fn test_high_threshold_keeps_isolated_nodes() {
        let m = make_uniform_matrix(5, 0.5);
        let g = build_graph(&m, 0.9, &[]);
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let m = make_uniform_matrix(3, 0.5);
        let g = build_graph(&m, 0.5, &[]);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_negative_correlations_use_magnitude() {
        let m = CorrelationMatrix::from_rows(vec![
            vec![1.0, -0.8, 0.1],
            vec![-0.8, 1.0, 0.0],
            vec![0.1, 0.0, 1.0],
        ])
        .unwrap();
        let g = build_graph(&m, 0.5, &[]);
        assert_eq!(g.edges(), vec![(0, 1)]);
    }

    #[test]
    fn test_diagonal_never_creates_self_loops() {
        let m = make_uniform_matrix(4, 0.0);
        // Threshold below the diagonal value of 1.0
        let g = build_graph(&m, 0.1, &[]);
        assert_eq!(g.edge_count(), 0);
        for r in 0..4 {
            assert!(!g.has_edge(r, r));
        }
    }

    #[test]
    fn test_invalid_regions_are_removed() {
        let m = make_uniform_matrix(5, 0.5);
        let g = build_graph(&m, 0.25, &[0, 2, 4]);
        assert_eq!(g.regions(), vec![0, 2, 4]);
        assert_eq!(g.edges(), vec![(0, 2), (0, 4), (2, 4)]);
    }

    #[test]
    fn test_valid_regions_outside_matrix_are_ignored() {
        let m = make_uniform_matrix(3, 0.5);
        let g = build_graph(&m, 0.25, &[1, 40]);
        assert_eq!(g.regions(), vec![1]);

        let empty = build_graph(&m, 0.25, &[40]);
        assert_eq!(empty.node_count(), 0);
    }

    #[test]
    fn test_asymmetric_entry_in_either_orientation_creates_edge() {
        let m = CorrelationMatrix::from_rows(vec![vec![1.0, 0.1], vec![0.7, 1.0]]).unwrap();
        let g = build_graph(&m, 0.5, &[]);
        assert_eq!(g.edges(), vec![(0, 1)]);
    }
}
