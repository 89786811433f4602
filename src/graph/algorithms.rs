//! Graph analytics algorithms.
//!
//! Implements the deterministic small-world statistics on [`Component`]s:
//! - **Connected components** - via `rustworkx_core::connectivity::connected_components`
//! - **Shortest paths** - unweighted BFS distances (average path length, efficiencies)
//! - **Clustering** - local clustering coefficients, average clustering, transitivity
//! - **Node connectivity** - unit-capacity max flow on the node-split graph
//! - **Density** - `2e / (n(n-1))`
//!
//! [`compute_metrics`] assembles these together with Sigma/Omega from
//! [`super::null_models`] into one [`ComponentMetrics`].

use rand::Rng;
use std::collections::VecDeque;

use super::models::{Component, ComponentMetrics, RegionGraph, SmallWorldConfig};
use super::null_models;
use crate::error::{FeatureError, Result};

// ============================================================================
// Connected Components
// ============================================================================

/// Split a graph into its connected components.
///
/// A connected graph is returned whole as a single component without running
/// the decomposition. Components are ordered by descending size, ties broken
/// by smallest region id; the order carries no meaning downstream.
pub fn connected_components(graph: &RegionGraph) -> Vec<Component> {
    if graph.node_count() == 0 {
        return vec![];
    }
    if graph.is_connected() {
        return vec![Component::induced(graph, &graph.regions())];
    }

    let g = &graph.graph;
    let mut memberships: Vec<Vec<usize>> = rustworkx_core::connectivity::connected_components(g)
        .into_iter()
        .map(|members| {
            let mut regions: Vec<usize> = members.into_iter().map(|idx| g[idx]).collect();
            regions.sort_unstable();
            regions
        })
        .collect();
    memberships.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    memberships
        .iter()
        .map(|members| Component::induced(graph, members))
        .collect()
}

// ============================================================================
// Shortest paths
// ============================================================================

/// BFS hop distances from `source`; `None` for unreachable nodes.
pub fn bfs_distances(component: &Component, source: usize) -> Vec<Option<usize>> {
    let adj = component.adjacency();
    let mut dist = vec![None; adj.len()];
    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        let next = dist[current].map_or(0, |d| d + 1);
        for &neighbor in &adj[current] {
            if dist[neighbor].is_none() {
                dist[neighbor] = Some(next);
                queue.push_back(neighbor);
            }
        }
    }
    dist
}

/// True when every node is reachable from node 0.
pub fn is_connected(component: &Component) -> bool {
    if component.node_count() == 0 {
        return false;
    }
    bfs_distances(component, 0).iter().all(Option::is_some)
}

/// Mean hop distance over all ordered pairs of distinct nodes.
///
/// `None` when the component has fewer than two nodes or is disconnected.
pub fn average_shortest_path_length(component: &Component) -> Option<f64> {
    let n = component.node_count();
    if n < 2 {
        return None;
    }
    let mut total = 0usize;
    for source in 0..n {
        for d in bfs_distances(component, source) {
            total += d?;
        }
    }
    Some(total as f64 / (n * (n - 1)) as f64)
}

/// Mean inverse hop distance over all ordered pairs; unreachable pairs add 0.
pub fn global_efficiency(component: &Component) -> f64 {
    let n = component.node_count();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for source in 0..n {
        total += bfs_distances(component, source)
            .into_iter()
            .flatten()
            .filter(|&d| d > 0)
            .map(|d| 1.0 / d as f64)
            .sum::<f64>();
    }
    total / (n * (n - 1)) as f64
}

/// Mean over nodes of the global efficiency of the node's neighbourhood.
pub fn local_efficiency(component: &Component) -> f64 {
    let n = component.node_count();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = (0..n)
        .map(|v| global_efficiency(&neighborhood(component, v)))
        .sum();
    total / n as f64
}

/// Subgraph induced by the neighbours of `node` (the node itself excluded).
fn neighborhood(component: &Component, node: usize) -> Component {
    let members = &component.adjacency()[node];
    let adjacency = members
        .iter()
        .map(|&m| {
            component.adjacency()[m]
                .iter()
                .filter_map(|x| members.binary_search(x).ok())
                .collect()
        })
        .collect();
    Component::from_adjacency(members.clone(), adjacency)
}

// ============================================================================
// Clustering
// ============================================================================

/// Number of triangles through each node.
fn triangles(component: &Component) -> Vec<usize> {
    let adj = component.adjacency();
    (0..adj.len())
        .map(|v| {
            let neighbors = &adj[v];
            let mut count = 0;
            for (i, &a) in neighbors.iter().enumerate() {
                for &b in &neighbors[i + 1..] {
                    if component.has_edge(a, b) {
                        count += 1;
                    }
                }
            }
            count
        })
        .collect()
}

/// Local clustering coefficient of every node (0 for degree < 2).
pub fn clustering(component: &Component) -> Vec<f64> {
    triangles(component)
        .into_iter()
        .enumerate()
        .map(|(v, t)| {
            let k = component.degree(v);
            if k < 2 {
                0.0
            } else {
                2.0 * t as f64 / (k * (k - 1)) as f64
            }
        })
        .collect()
}

/// Mean local clustering coefficient, zeros included.
pub fn average_clustering(component: &Component) -> f64 {
    let n = component.node_count();
    if n == 0 {
        return 0.0;
    }
    clustering(component).iter().sum::<f64>() / n as f64
}

/// Global clustering coefficient: 3 × triangles / connected triples.
pub fn transitivity(component: &Component) -> f64 {
    let closed: usize = triangles(component).iter().sum();
    if closed == 0 {
        return 0.0;
    }
    let triads: usize = (0..component.node_count())
        .map(|v| {
            let k = component.degree(v);
            k * k.saturating_sub(1)
        })
        .sum();
    // `closed` counts each triangle once per corner, `triads` counts each
    // triple twice, so the ratio already carries the factor 3.
    2.0 * closed as f64 / triads as f64
}

/// Fraction of possible edges present. Requires at least two nodes.
pub fn density(component: &Component) -> f64 {
    let n = component.node_count();
    debug_assert!(n >= 2, "density is undefined below two nodes");
    2.0 * component.edge_count() as f64 / (n * (n - 1)) as f64
}

// ============================================================================
// Node connectivity
// ============================================================================

/// Unit-capacity flow network over the node-split graph.
///
/// Node `v` becomes `in(v) = 2v` and `out(v) = 2v + 1` joined by a unit arc,
/// and every undirected edge `{u, v}` becomes the arcs `out(u) → in(v)` and
/// `out(v) → in(u)`. Reverse arcs sit at `edge ^ 1`.
struct SplitFlowNetwork {
    arcs_from: Vec<Vec<usize>>,
    to: Vec<usize>,
    capacity: Vec<i32>,
}

impl SplitFlowNetwork {
    fn new(component: &Component) -> Self {
        let n = component.node_count();
        let mut net = Self {
            arcs_from: vec![Vec::new(); 2 * n],
            to: Vec::new(),
            capacity: Vec::new(),
        };
        for v in 0..n {
            net.add_arc(2 * v, 2 * v + 1);
        }
        for (u, neighbors) in component.adjacency().iter().enumerate() {
            for &v in neighbors {
                net.add_arc(2 * u + 1, 2 * v);
            }
        }
        net
    }

    fn add_arc(&mut self, from: usize, to: usize) {
        self.arcs_from[from].push(self.to.len());
        self.to.push(to);
        self.capacity.push(1);
        self.arcs_from[to].push(self.to.len());
        self.to.push(from);
        self.capacity.push(0);
    }

    /// Edmonds-Karp max flow; leaves capacities untouched for the next call.
    fn max_flow(&self, source: usize, sink: usize) -> usize {
        let mut residual = self.capacity.clone();
        let mut flow = 0;
        loop {
            let mut via: Vec<Option<usize>> = vec![None; self.arcs_from.len()];
            let mut queue = VecDeque::from([source]);
            let mut reached = false;
            while let Some(node) = queue.pop_front() {
                for &arc in &self.arcs_from[node] {
                    let next = self.to[arc];
                    if residual[arc] > 0 && next != source && via[next].is_none() {
                        via[next] = Some(arc);
                        if next == sink {
                            reached = true;
                            break;
                        }
                        queue.push_back(next);
                    }
                }
                if reached {
                    break;
                }
            }
            if !reached {
                return flow;
            }
            let mut node = sink;
            while let Some(arc) = via[node] {
                residual[arc] -= 1;
                residual[arc ^ 1] += 1;
                node = self.to[arc ^ 1];
                if node == source {
                    break;
                }
            }
            flow += 1;
        }
    }
}

/// Maximum number of internally node-disjoint paths between `s` and `t`.
///
/// A direct edge counts as one path.
pub fn local_node_connectivity(component: &Component, s: usize, t: usize) -> usize {
    SplitFlowNetwork::new(component).max_flow(2 * s + 1, 2 * t)
}

/// Mean local node connectivity over all unordered pairs of nodes.
pub fn average_node_connectivity(component: &Component) -> f64 {
    let n = component.node_count();
    if n < 2 {
        return 0.0;
    }
    let network = SplitFlowNetwork::new(component);
    let mut total = 0usize;
    let mut pairs = 0usize;
    for s in 0..n {
        for t in s + 1..n {
            total += network.max_flow(2 * s + 1, 2 * t);
            pairs += 1;
        }
    }
    total as f64 / pairs as f64
}

// ============================================================================
// Orchestrator: compute_metrics
// ============================================================================

/// Compute every statistic of the vocabulary for one connected component.
///
/// Sigma and Omega failures are returned inside the metrics; any failure of
/// a deterministic statistic is fatal for the call.
pub fn compute_metrics<R: Rng + ?Sized>(
    component: &Component,
    config: &SmallWorldConfig,
    rng: &mut R,
) -> Result<ComponentMetrics> {
    let n = component.node_count();
    if n < 2 {
        return Err(FeatureError::MetricFailure {
            nodes: n,
            reason: "statistics need at least two nodes".to_string(),
        });
    }

    let average_shortest_path_length =
        average_shortest_path_length(component).ok_or_else(|| FeatureError::MetricFailure {
            nodes: n,
            reason: "component is not connected".to_string(),
        })?;

    let sigma = null_models::sigma(component, config, rng);
    if let Err(e) = &sigma {
        tracing::debug!("Sigma undefined for {}-node component: {}", n, e);
    }
    let omega = null_models::omega(component, config, rng);
    if let Err(e) = &omega {
        tracing::debug!("Omega undefined for {}-node component: {}", n, e);
    }

    Ok(ComponentMetrics {
        sigma,
        omega,
        local_efficiency: local_efficiency(component),
        global_efficiency: global_efficiency(component),
        average_shortest_path_length,
        average_node_connectivity: average_node_connectivity(component),
        density: density(component),
        average_clustering: average_clustering(component),
        transitivity: transitivity(component),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-9;

    /// Build a complete graph K_n
    fn make_complete_graph(n: usize) -> Component {
        let edges: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        Component::from_edges(n, &edges)
    }

    /// Build a path 0 - 1 - ... - (n-1)
    fn make_chain_graph(n: usize) -> Component {
        let edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Component::from_edges(n, &edges)
    }

    /// Build a star: 0 joined to every leaf
    fn make_star_graph(n_leaves: usize) -> Component {
        let edges: Vec<(usize, usize)> = (1..=n_leaves).map(|i| (0, i)).collect();
        Component::from_edges(n_leaves + 1, &edges)
    }

    /// Build a cycle 0 - 1 - ... - (n-1) - 0
    fn make_cycle_graph(n: usize) -> Component {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Component::from_edges(n, &edges)
    }

    /// Two disjoint triangles plus a pair and a lone node over regions 0..9
    fn make_fragmented_region_graph() -> RegionGraph {
        let mut g = RegionGraph::new();
        for r in 0..9 {
            g.add_region(r);
        }
        for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (6, 7)] {
            g.add_edge(a, b);
        }
        g
    }

    // --- Connected Components Tests ---

    #[test]
    fn test_connected_components_partition_nodes() {
        let g = make_fragmented_region_graph();
        let components = connected_components(&g);

        assert_eq!(components.len(), 4);
        let sizes: Vec<usize> = components.iter().map(Component::node_count).collect();
        assert_eq!(sizes, vec![3, 3, 2, 1]);

        let mut all: Vec<usize> = components
            .iter()
            .flat_map(|c| c.regions().to_vec())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..9).collect::<Vec<_>>());

        assert_eq!(components[0].regions(), &[0, 1, 2]);
        assert_eq!(components[0].edge_count(), 3);
        assert_eq!(components[3].regions(), &[8]);
    }

    #[test]
    fn test_connected_components_connected_graph_is_single() {
        let mut g = RegionGraph::new();
        for r in [2, 4, 6] {
            g.add_region(r);
        }
        g.add_edge(2, 4);
        g.add_edge(4, 6);
        let components = connected_components(&g);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].regions(), &[2, 4, 6]);
        assert_eq!(components[0].edge_count(), 2);
    }

    #[test]
    fn test_connected_components_empty_graph() {
        assert!(connected_components(&RegionGraph::new()).is_empty());
    }

    // --- Shortest Path Tests ---

    #[test]
    fn test_average_shortest_path_chain() {
        // Path of 4: distances 1,2,3,1,2,1 → mean over unordered pairs = 10/6
        let c = make_chain_graph(4);
        let aspl = average_shortest_path_length(&c).unwrap();
        assert!((aspl - 10.0 / 6.0).abs() < EPS, "Got {}", aspl);
    }

    #[test]
    fn test_average_shortest_path_disconnected_is_none() {
        let c = Component::from_edges(4, &[(0, 1), (2, 3)]);
        assert!(average_shortest_path_length(&c).is_none());
        assert!(!is_connected(&c));
    }

    #[test]
    fn test_global_efficiency_complete_and_chain() {
        assert!((global_efficiency(&make_complete_graph(5)) - 1.0).abs() < EPS);
        // Path of 3: (1 + 1/2 + 1) / 3
        let eff = global_efficiency(&make_chain_graph(3));
        assert!((eff - 2.5 / 3.0).abs() < EPS, "Got {}", eff);
    }

    #[test]
    fn test_global_efficiency_counts_unreachable_as_zero() {
        let c = Component::from_edges(4, &[(0, 1), (2, 3)]);
        // 4 reachable ordered pairs of 12
        assert!((global_efficiency(&c) - 4.0 / 12.0).abs() < EPS);
    }

    #[test]
    fn test_local_efficiency() {
        assert!((local_efficiency(&make_complete_graph(5)) - 1.0).abs() < EPS);
        // Star neighbourhoods are edgeless
        assert!(local_efficiency(&make_star_graph(4)).abs() < EPS);
    }

    // --- Clustering Tests ---

    #[test]
    fn test_clustering_triangle_all_one() {
        let c = make_complete_graph(3);
        for coeff in clustering(&c) {
            assert!((coeff - 1.0).abs() < EPS);
        }
        assert!((transitivity(&c) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_clustering_star_center_zero() {
        let c = make_star_graph(5);
        assert!(clustering(&c)[0].abs() < EPS);
        assert!(average_clustering(&c).abs() < EPS);
        assert!(transitivity(&c).abs() < EPS);
    }

    #[test]
    fn test_transitivity_differs_from_average_clustering() {
        // Triangle 0-1-2 with a pendant 3 on node 0
        let c = Component::from_edges(4, &[(0, 1), (1, 2), (0, 2), (0, 3)]);
        // Triangles: 1; triads: node0 C(3,2)=3, node1 1, node2 1 → 3*1/5
        assert!((transitivity(&c) - 0.6).abs() < EPS);
        // Local: node0 1/3, node1 1, node2 1, node3 0
        assert!((average_clustering(&c) - (1.0 / 3.0 + 2.0) / 4.0).abs() < EPS);
    }

    // --- Density Tests ---

    #[test]
    fn test_density_complete_and_empty() {
        assert!((density(&make_complete_graph(4)) - 1.0).abs() < EPS);
        assert!(density(&Component::from_edges(4, &[])).abs() < EPS);
        assert!((density(&make_chain_graph(4)) - 0.5).abs() < EPS);
    }

    // --- Node Connectivity Tests ---

    #[test]
    fn test_node_connectivity_complete_graph() {
        let c = make_complete_graph(5);
        assert_eq!(local_node_connectivity(&c, 0, 4), 4);
        assert!((average_node_connectivity(&c) - 4.0).abs() < EPS);
    }

    #[test]
    fn test_node_connectivity_cycle_and_chain() {
        assert!((average_node_connectivity(&make_cycle_graph(6)) - 2.0).abs() < EPS);
        assert!((average_node_connectivity(&make_chain_graph(5)) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_node_connectivity_star_leaves() {
        let c = make_star_graph(4);
        assert_eq!(local_node_connectivity(&c, 1, 2), 1);
        assert_eq!(local_node_connectivity(&c, 0, 3), 1);
    }

    // --- compute_metrics Tests ---

    #[test]
    fn test_compute_metrics_complete_graph() {
        let c = make_complete_graph(5);
        let mut rng = StdRng::seed_from_u64(11);
        let config = SmallWorldConfig::default();
        let m = compute_metrics(&c, &config, &mut rng).unwrap();

        assert!((m.density - 1.0).abs() < EPS);
        assert!((m.transitivity - 1.0).abs() < EPS);
        assert!((m.average_clustering - 1.0).abs() < EPS);
        assert!((m.global_efficiency - 1.0).abs() < EPS);
        assert!((m.local_efficiency - 1.0).abs() < EPS);
        assert!((m.average_shortest_path_length - 1.0).abs() < EPS);
        assert!((m.average_node_connectivity - 4.0).abs() < EPS);
    }

    #[test]
    fn test_compute_metrics_rejects_single_node() {
        let c = Component::from_edges(1, &[]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = compute_metrics(&c, &SmallWorldConfig::default(), &mut rng).unwrap_err();
        assert!(matches!(err, FeatureError::MetricFailure { nodes: 1, .. }));
    }

    #[test]
    fn test_compute_metrics_rejects_disconnected_input() {
        let c = Component::from_edges(4, &[(0, 1), (2, 3)]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = compute_metrics(&c, &SmallWorldConfig::default(), &mut rng).unwrap_err();
        assert!(matches!(err, FeatureError::MetricFailure { nodes: 4, .. }));
    }

    #[test]
    fn test_compute_metrics_star_has_undefined_small_world() {
        // No degree-preserving swap exists on a star
        let c = make_star_graph(4);
        let mut rng = StdRng::seed_from_u64(3);
        let config = SmallWorldConfig {
            rewire_draw_limit: 50,
            ..SmallWorldConfig::default()
        };
        let m = compute_metrics(&c, &config, &mut rng).unwrap();
        assert!(m.sigma.is_err());
        assert!(m.omega.is_err());
        assert!((m.density - 0.4).abs() < EPS);
    }
}
