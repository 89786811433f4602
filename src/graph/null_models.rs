//! Small-world coefficients against randomized reference graphs.
//!
//! - **Sigma** = `(C / Cr) / (L / Lr)` where `C` is transitivity, `L` the
//!   average shortest path length, and `Cr`/`Lr` their means over
//!   degree-preserving random references.
//! - **Omega** = `Lr / L - C / Cl` where `C` is average clustering, `Lr` the
//!   mean path length of random references, and `Cl` the highest average
//!   clustering seen among the input and its ring-lattice references.
//!
//! Both references are produced by double-edge swaps that keep every degree
//! and keep the graph connected. Swap candidates are drawn with probability
//! proportional to degree. Draws that cannot form a valid swap are rejected;
//! a pass that rejects `rewire_draw_limit` draws fails the whole coefficient
//! with [`NullModelError::RewiringExhausted`] (a star, for instance, admits
//! no swap at all).
//!
//! Results depend on the RNG. Callers needing reproducibility pass a seeded
//! `StdRng`.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::algorithms::{average_clustering, average_shortest_path_length, transitivity};
use super::models::{Component, SmallWorldConfig};
use crate::error::NullModelError;

type NullResult<T> = std::result::Result<T, NullModelError>;

// ============================================================================
// Rewiring
// ============================================================================

/// Which reference the swap loop is steering towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Accept every valid swap
    Random,
    /// Accept only swaps that pull edges towards the ring-lattice diagonal
    Lattice,
}

/// Circular distance between positions `i` and `j` on a ring of `n`.
fn ring_distance(i: usize, j: usize, n: usize) -> usize {
    let d = i.abs_diff(j);
    d.min(n - d)
}

fn insert_sorted(list: &mut Vec<usize>, value: usize) {
    if let Err(pos) = list.binary_search(&value) {
        list.insert(pos, value);
    }
}

fn remove_sorted(list: &mut Vec<usize>, value: usize) {
    if let Ok(pos) = list.binary_search(&value) {
        list.remove(pos);
    }
}

/// Mutable adjacency used while rewiring.
struct Rewiring {
    adjacency: Vec<Vec<usize>>,
}

impl Rewiring {
    fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        insert_sorted(&mut self.adjacency[a], b);
        insert_sorted(&mut self.adjacency[b], a);
    }

    fn remove_edge(&mut self, a: usize, b: usize) {
        remove_sorted(&mut self.adjacency[a], b);
        remove_sorted(&mut self.adjacency[b], a);
    }

    /// Replace `a-b`, `c-d` with `a-d`, `c-b`.
    fn swap(&mut self, a: usize, b: usize, c: usize, d: usize) {
        self.add_edge(a, d);
        self.add_edge(c, b);
        self.remove_edge(a, b);
        self.remove_edge(c, d);
    }

    fn reachable(&self, from: usize, to: usize) -> bool {
        let mut seen = vec![false; self.adjacency.len()];
        let mut stack = vec![from];
        seen[from] = true;
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            for &next in &self.adjacency[node] {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        false
    }
}

/// Degree-preserving, connectivity-preserving rewiring of `component`.
fn rewire<R: Rng + ?Sized>(
    component: &Component,
    niter: usize,
    target: Target,
    draw_limit: usize,
    rng: &mut R,
) -> NullResult<Component> {
    let n = component.node_count();
    let edges = component.edge_count();
    if n < 4 {
        return Err(NullModelError::TooFewNodes { nodes: n });
    }
    if edges < 2 {
        return Err(NullModelError::TooFewEdges { edges });
    }

    let degrees: Vec<usize> = (0..n).map(|v| component.degree(v)).collect();
    let picker: WeightedIndex<usize> =
        WeightedIndex::new(&degrees).map_err(|_| NullModelError::TooFewEdges { edges })?;
    let mut graph = Rewiring {
        adjacency: component.adjacency().to_vec(),
    };

    let passes = niter * edges;
    // Counted swap attempts per pass: floor(n * e / C(n, 2))
    let attempts_per_pass = 2 * edges / (n - 1);
    let draw_limit = draw_limit.max(1);

    for _ in 0..passes {
        let mut attempts = 0;
        let mut rejected = 0;
        while attempts < attempts_per_pass {
            let a = picker.sample(rng);
            let c = picker.sample(rng);
            let draw = if a == c {
                None
            } else {
                let b = graph.adjacency[a][rng.gen_range(0..graph.adjacency[a].len())];
                let d = graph.adjacency[c][rng.gen_range(0..graph.adjacency[c].len())];
                (b != c && b != d && d != a).then_some((b, d))
            };
            let Some((b, d)) = draw else {
                rejected += 1;
                if rejected >= draw_limit {
                    tracing::warn!(
                        "Rewiring a {}-node component rejected {} draws in one pass, giving up",
                        n,
                        rejected
                    );
                    return Err(NullModelError::RewiringExhausted { draws: rejected });
                }
                continue;
            };
            if try_swap(&mut graph, (a, b), (c, d), target, n) {
                break;
            }
            attempts += 1;
        }
    }

    Ok(Component::from_adjacency(
        component.regions().to_vec(),
        graph.adjacency,
    ))
}

/// Attempt one swap of `a-b`, `c-d`; returns true if it was kept.
fn try_swap(
    graph: &mut Rewiring,
    (a, b): (usize, usize),
    (c, d): (usize, usize),
    target: Target,
    n: usize,
) -> bool {
    if graph.has_edge(a, d) || graph.has_edge(c, b) {
        return false;
    }
    if target == Target::Lattice
        && ring_distance(a, b, n) + ring_distance(c, d, n)
            < ring_distance(a, c, n) + ring_distance(b, d, n)
    {
        return false;
    }
    graph.swap(a, b, c, d);
    if !graph.reachable(a, b) {
        graph.swap(a, d, c, b);
        return false;
    }
    true
}

/// Degree-preserving random reference graph (`niter` swap passes per edge).
pub fn random_reference<R: Rng + ?Sized>(
    component: &Component,
    niter: usize,
    draw_limit: usize,
    rng: &mut R,
) -> NullResult<Component> {
    rewire(component, niter, Target::Random, draw_limit, rng)
}

/// Degree-preserving reference rewired towards a ring lattice.
pub fn lattice_reference<R: Rng + ?Sized>(
    component: &Component,
    niter: usize,
    draw_limit: usize,
    rng: &mut R,
) -> NullResult<Component> {
    rewire(component, niter, Target::Lattice, draw_limit, rng)
}

// ============================================================================
// Coefficients
// ============================================================================

fn path_length(component: &Component) -> NullResult<f64> {
    average_shortest_path_length(component).ok_or(NullModelError::Disconnected)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn finite(value: f64) -> NullResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NullModelError::NonFinite { value })
    }
}

/// Small-world coefficient sigma of a connected component.
pub fn sigma<R: Rng + ?Sized>(
    component: &Component,
    config: &SmallWorldConfig,
    rng: &mut R,
) -> NullResult<f64> {
    let mut random_c = Vec::with_capacity(config.sigma_nrand);
    let mut random_l = Vec::with_capacity(config.sigma_nrand);
    for _ in 0..config.sigma_nrand {
        let reference = random_reference(component, config.sigma_niter, config.rewire_draw_limit, rng)?;
        random_c.push(transitivity(&reference));
        random_l.push(path_length(&reference)?);
    }

    let c = transitivity(component);
    let l = path_length(component)?;
    let cr = mean(&random_c);
    let lr = mean(&random_l);

    if cr == 0.0 {
        return Err(NullModelError::ZeroDenominator {
            quantity: "random-reference transitivity",
        });
    }
    if l == 0.0 {
        return Err(NullModelError::ZeroDenominator {
            quantity: "average shortest path length",
        });
    }
    finite((c / cr) / (l / lr))
}

/// Small-world coefficient omega of a connected component.
pub fn omega<R: Rng + ?Sized>(
    component: &Component,
    config: &SmallWorldConfig,
    rng: &mut R,
) -> NullResult<f64> {
    let mut cl = average_clustering(component);
    let mut random_l = Vec::with_capacity(config.omega_nrand);
    for _ in 0..config.omega_nrand {
        let random = random_reference(
            component,
            config.omega_niter * 2,
            config.rewire_draw_limit,
            rng,
        )?;
        random_l.push(path_length(&random)?);

        let lattice = lattice_reference(component, config.omega_niter, config.rewire_draw_limit, rng)?;
        cl = cl.max(average_clustering(&lattice));
    }

    let c = average_clustering(component);
    let l = path_length(component)?;
    let lr = mean(&random_l);

    if cl == 0.0 {
        return Err(NullModelError::ZeroDenominator {
            quantity: "lattice-reference average clustering",
        });
    }
    finite(lr / l - c / cl)
}

// ============================================================================
// Tests
// ============================================================================
