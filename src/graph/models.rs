//! Graph feature data models.
//!
//! Defines the complete type system for graph feature extraction:
//!
//! ## Input types
//! - [`CorrelationMatrix`] - validated square matrix of regional signal correlations
//!
//! ## Graph types
//! - [`RegionGraph`] - petgraph wrapper with region id ↔ NodeIndex mapping
//! - [`Component`] - a connected fragment in compact adjacency-list form
//!
//! ## Output types
//! - [`ComponentMetrics`] - raw small-world statistics of one component
//! - [`GraphStatistic`] - the fixed statistic vocabulary
//! - [`GraphStatistics`] - the aggregated feature record for one threshold
//! - [`FeatureValue`] / [`FeatureMap`] - the flat named output
//!
//! ## Configuration
//! - [`SmallWorldConfig`] - null-model sampling parameters
//! - [`ExtractionConfig`] - thresholds, valid regions, optional outputs

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{FeatureError, NullModelError, Result};

// ============================================================================
// Input types - correlation matrix
// ============================================================================

/// Square matrix of pairwise correlations between signal-bearing regions.
///
/// Stored row-major. Construction rejects ragged rows and non-finite entries;
/// symmetry and the unit diagonal are assumed, not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    size: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Build a matrix from rows, failing on non-square or non-finite input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(FeatureError::invalid_input(format!(
                    "correlation matrix is not square: row {} has {} entries, expected {}",
                    row_idx,
                    row.len(),
                    size
                )));
            }
            if let Some(col_idx) = row.iter().position(|v| !v.is_finite()) {
                return Err(FeatureError::invalid_input(format!(
                    "correlation matrix entry ({}, {}) is not a finite number",
                    row_idx, col_idx
                )));
            }
            values.extend(row);
        }
        Ok(Self { size, values })
    }

    /// Number of regions (rows == columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }
}

// ============================================================================
// RegionGraph - petgraph wrapper with region id mapping
// ============================================================================

/// Undirected, unweighted graph over region ids.
///
/// Node weights are the region ids (row/column index in the correlation
/// matrix). Self-loops and parallel edges are never stored.
#[derive(Debug, Clone)]
pub struct RegionGraph {
    /// The underlying undirected graph
    pub graph: UnGraph<usize, ()>,
    /// Mapping from region id to petgraph NodeIndex
    pub region_to_index: HashMap<usize, NodeIndex>,
}

impl RegionGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            region_to_index: HashMap::new(),
        }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            region_to_index: HashMap::with_capacity(nodes),
        }
    }

    /// Add a region node. Returns the existing index if the region is present.
    pub fn add_region(&mut self, region: usize) -> NodeIndex {
        if let Some(&idx) = self.region_to_index.get(&region) {
            return idx;
        }
        let idx = self.graph.add_node(region);
        self.region_to_index.insert(region, idx);
        idx
    }

    /// Connect two regions. Returns `None` for self-loops or unknown regions.
    pub fn add_edge(&mut self, a: usize, b: usize) -> Option<EdgeIndex> {
        if a == b {
            return None;
        }
        let ia = *self.region_to_index.get(&a)?;
        let ib = *self.region_to_index.get(&b)?;
        Some(self.graph.update_edge(ia, ib, ()))
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        match (self.region_to_index.get(&a), self.region_to_index.get(&b)) {
            (Some(&ia), Some(&ib)) => self.graph.contains_edge(ia, ib),
            _ => false,
        }
    }

    /// Region ids in ascending order.
    pub fn regions(&self) -> Vec<usize> {
        let mut regions: Vec<usize> = self.graph.node_indices().map(|i| self.graph[i]).collect();
        regions.sort_unstable();
        regions
    }

    /// Edges as `(low, high)` region pairs in ascending order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (ra, rb) = (self.graph[a], self.graph[b]);
                (ra.min(rb), ra.max(rb))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Neighbouring region ids of `region` in ascending order.
    pub fn neighbors(&self, region: usize) -> Vec<usize> {
        let Some(&idx) = self.region_to_index.get(&region) else {
            return vec![];
        };
        let mut out: Vec<usize> = self.graph.neighbors(idx).map(|n| self.graph[n]).collect();
        out.sort_unstable();
        out
    }

    /// True when the graph has at least one node and a single component.
    pub fn is_connected(&self) -> bool {
        self.node_count() > 0 && petgraph::algo::connected_components(&self.graph) == 1
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for RegionGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Component - compact adjacency form used by the metric calculators
// ============================================================================

/// A connected fragment of a [`RegionGraph`].
///
/// Nodes are re-indexed `0..n` (local ids); `regions[local]` recovers the
/// region id. Neighbour lists are sorted so every traversal is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    regions: Vec<usize>,
    adjacency: Vec<Vec<usize>>,
}

impl Component {
    /// Induced subgraph of `graph` on `members` (region ids).
    pub fn induced(graph: &RegionGraph, members: &[usize]) -> Self {
        let mut regions = members.to_vec();
        regions.sort_unstable();
        regions.dedup();
        let local: HashMap<usize, usize> =
            regions.iter().enumerate().map(|(i, &r)| (r, i)).collect();

        let adjacency = regions
            .iter()
            .map(|&r| {
                let mut adj: Vec<usize> = graph
                    .neighbors(r)
                    .into_iter()
                    .filter_map(|n| local.get(&n).copied())
                    .collect();
                adj.sort_unstable();
                adj
            })
            .collect();

        Self { regions, adjacency }
    }

    /// Component over local ids `0..n` from an edge list. Self-loops and
    /// duplicate edges are dropped; out-of-range endpoints are ignored.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in edges {
            if a == b || a >= n || b >= n {
                continue;
            }
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for adj in adjacency.iter_mut() {
            adj.sort_unstable();
            adj.dedup();
        }
        Self {
            regions: (0..n).collect(),
            adjacency,
        }
    }

    pub(crate) fn from_adjacency(regions: Vec<usize>, adjacency: Vec<Vec<usize>>) -> Self {
        Self { regions, adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.regions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Region ids, indexed by local id.
    pub fn regions(&self) -> &[usize] {
        &self.regions
    }

    /// Sorted neighbour lists, indexed by local id.
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }
}

// ============================================================================
// Output types - per-component metrics
// ============================================================================

/// Raw small-world statistics of a single connected component (n >= 2).
///
/// Sigma and Omega are `Err` when the null-model comparison was not
/// computable; every other field is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMetrics {
    pub sigma: std::result::Result<f64, NullModelError>,
    pub omega: std::result::Result<f64, NullModelError>,
    pub local_efficiency: f64,
    pub global_efficiency: f64,
    pub average_shortest_path_length: f64,
    pub average_node_connectivity: f64,
    pub density: f64,
    pub average_clustering: f64,
    pub transitivity: f64,
}

// ============================================================================
// Output types - statistic vocabulary and feature record
// ============================================================================

/// The fixed statistic vocabulary present in every feature record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphStatistic {
    IsolatedNodes,
    IsolatedPairs,
    IsolatedTrios,
    GlobalEfficiency,
    LocalEfficiency,
    OmegaZeroDenominator,
    Omega,
    SigmaZeroDenominator,
    Sigma,
    AverageShortestPathLength,
    AverageNodeConnectivity,
    Density,
    AverageClustering,
    Transitivity,
    Subgraphs,
    NonIsolatedNodes,
}

impl GraphStatistic {
    pub const ALL: [GraphStatistic; 16] = [
        Self::IsolatedNodes,
        Self::IsolatedPairs,
        Self::IsolatedTrios,
        Self::GlobalEfficiency,
        Self::LocalEfficiency,
        Self::OmegaZeroDenominator,
        Self::Omega,
        Self::SigmaZeroDenominator,
        Self::Sigma,
        Self::AverageShortestPathLength,
        Self::AverageNodeConnectivity,
        Self::Density,
        Self::AverageClustering,
        Self::Transitivity,
        Self::Subgraphs,
        Self::NonIsolatedNodes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::IsolatedNodes => "Isolated Nodes",
            Self::IsolatedPairs => "Isolated Pairs",
            Self::IsolatedTrios => "Isolated Trios",
            Self::GlobalEfficiency => "Global Efficiency",
            Self::LocalEfficiency => "Local Efficiency",
            Self::OmegaZeroDenominator => "Omega Zero Denominator",
            Self::Omega => "Omega",
            Self::SigmaZeroDenominator => "Sigma Zero Denominator",
            Self::Sigma => "Sigma",
            Self::AverageShortestPathLength => "Average Shortest Path Length",
            Self::AverageNodeConnectivity => "Average Node Connectivity",
            Self::Density => "Density",
            Self::AverageClustering => "Average Clustering",
            Self::Transitivity => "Transitivity",
            Self::Subgraphs => "Subgraphs",
            Self::NonIsolatedNodes => "Non-isolated Nodes",
        }
    }
}

impl std::fmt::Display for GraphStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single output number: an integer tally or a real-valued statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Count(usize),
    Real(f64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Count(c) => c as f64,
            Self::Real(v) => v,
        }
    }
}

/// Flat, deterministically ordered feature dictionary.
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// Aggregated statistics of one thresholded graph.
///
/// Weighted fields hold `sum(metric * weight)` over the components that
/// were large enough to measure. Zero-denominator fields hold the summed
/// weight of components whose coefficient could not be computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub subgraphs: usize,
    pub isolated_nodes: usize,
    pub isolated_pairs: usize,
    pub isolated_trios: usize,
    pub non_isolated_nodes: usize,
    pub sigma: f64,
    pub sigma_zero_denominator: f64,
    pub omega: f64,
    pub omega_zero_denominator: f64,
    pub local_efficiency: f64,
    pub global_efficiency: f64,
    pub average_shortest_path_length: f64,
    pub average_node_connectivity: f64,
    pub density: f64,
    pub average_clustering: f64,
    pub transitivity: f64,
}

impl GraphStatistics {
    /// Fold one component's metrics in with the given weight.
    pub fn add_weighted(&mut self, metrics: &ComponentMetrics, weight: f64) {
        match metrics.sigma {
            Ok(sigma) => self.sigma += sigma * weight,
            Err(_) => self.sigma_zero_denominator += weight,
        }
        match metrics.omega {
            Ok(omega) => self.omega += omega * weight,
            Err(_) => self.omega_zero_denominator += weight,
        }
        self.local_efficiency += metrics.local_efficiency * weight;
        self.global_efficiency += metrics.global_efficiency * weight;
        self.average_shortest_path_length += metrics.average_shortest_path_length * weight;
        self.average_node_connectivity += metrics.average_node_connectivity * weight;
        self.density += metrics.density * weight;
        self.average_clustering += metrics.average_clustering * weight;
        self.transitivity += metrics.transitivity * weight;
    }

    pub fn get(&self, statistic: GraphStatistic) -> FeatureValue {
        use FeatureValue::{Count, Real};
        match statistic {
            GraphStatistic::IsolatedNodes => Count(self.isolated_nodes),
            GraphStatistic::IsolatedPairs => Count(self.isolated_pairs),
            GraphStatistic::IsolatedTrios => Count(self.isolated_trios),
            GraphStatistic::GlobalEfficiency => Real(self.global_efficiency),
            GraphStatistic::LocalEfficiency => Real(self.local_efficiency),
            GraphStatistic::OmegaZeroDenominator => Real(self.omega_zero_denominator),
            GraphStatistic::Omega => Real(self.omega),
            GraphStatistic::SigmaZeroDenominator => Real(self.sigma_zero_denominator),
            GraphStatistic::Sigma => Real(self.sigma),
            GraphStatistic::AverageShortestPathLength => Real(self.average_shortest_path_length),
            GraphStatistic::AverageNodeConnectivity => Real(self.average_node_connectivity),
            GraphStatistic::Density => Real(self.density),
            GraphStatistic::AverageClustering => Real(self.average_clustering),
            GraphStatistic::Transitivity => Real(self.transitivity),
            GraphStatistic::Subgraphs => Count(self.subgraphs),
            GraphStatistic::NonIsolatedNodes => Count(self.non_isolated_nodes),
        }
    }

    /// Every statistic of the vocabulary, in vocabulary order.
    pub fn entries(&self) -> Vec<(GraphStatistic, FeatureValue)> {
        GraphStatistic::ALL
            .iter()
            .map(|&s| (s, self.get(s)))
            .collect()
    }

    /// Nodes accounted for across every size bucket.
    pub fn accounted_nodes(&self) -> usize {
        self.isolated_nodes
            + 2 * self.isolated_pairs
            + 3 * self.isolated_trios
            + self.non_isolated_nodes
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Sampling parameters for the Sigma/Omega reference graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallWorldConfig {
    /// Rewiring passes per edge for Sigma's random references (default: 100)
    pub sigma_niter: usize,
    /// Random references averaged for Sigma (default: 10)
    pub sigma_nrand: usize,
    /// Rewiring passes per edge for Omega; random references use twice this (default: 5)
    pub omega_niter: usize,
    /// Random/lattice reference pairs generated for Omega (default: 10)
    pub omega_nrand: usize,
    /// Rejected edge draws tolerated in one rewiring pass before giving up (default: 1000)
    pub rewire_draw_limit: usize,
    /// Base RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for SmallWorldConfig {
    fn default() -> Self {
        Self {
            sigma_niter: 100,
            sigma_nrand: 10,
            omega_niter: 5,
            omega_nrand: 10,
            rewire_draw_limit: 1000,
            seed: None,
        }
    }
}

/// UK Biobank rsfMRI good ICA components, 1-based as published.
const UKBB_VALID_ICA_REGIONS: &str = "1  2  3  5  6  7  8  9 10 11 12 13 14 15 16 17 18 19 20 21 22";

/// Default valid regions as 0-based node ids.
pub fn default_valid_regions() -> Vec<usize> {
    UKBB_VALID_ICA_REGIONS
        .split_whitespace()
        .filter_map(|s| s.parse::<usize>().ok())
        .map(|r| r - 1)
        .collect()
}

/// Explicit configuration passed into every extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum absolute correlation for an edge, one graph per value (default: [0.25, 0.35])
    pub thresholds: Vec<f64>,
    /// Regions kept in the graph; empty keeps every region
    pub valid_regions: Vec<usize>,
    /// Also emit the pairwise correlations as features (default: false)
    pub add_correlation_features: bool,
    pub small_world: SmallWorldConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.25, 0.35],
            valid_regions: default_valid_regions(),
            add_correlation_features: false,
            small_world: SmallWorldConfig::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
