use brain_network_features::graph::aggregate::aggregate;
use brain_network_features::graph::algorithms::connected_components;
use brain_network_features::graph::builder::build_graph;
use brain_network_features::graph::{CorrelationMatrix, SmallWorldConfig};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Symmetric matrix with unit diagonal, 2..=10 regions.
fn arb_matrix() -> impl Strategy<Value = CorrelationMatrix> {
    (2usize..=10).prop_flat_map(|n| {
        prop::collection::vec(-1.0f64..1.0, n * n).prop_map(move |raw| {
            let rows = (0..n)
                .map(|i| {
                    (0..n)
                        .map(|j| {
                            if i == j {
                                1.0
                            } else {
                                raw[i.min(j) * n + i.max(j)]
                            }
                        })
                        .collect()
                })
                .collect();
            CorrelationMatrix::from_rows(rows).unwrap()
        })
    })
}

fn fast_small_world() -> SmallWorldConfig {
    SmallWorldConfig {
        sigma_niter: 1,
        sigma_nrand: 1,
        omega_niter: 1,
        omega_nrand: 1,
        rewire_draw_limit: 50,
        seed: Some(0),
    }
}

proptest! {
    #[test]
    fn threshold_monotonicity(m in arb_matrix(), t1 in 0.0f64..1.0, t2 in 0.0f64..1.0) {
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let low: HashSet<(usize, usize)> = build_graph(&m, lo, &[]).edges().into_iter().collect();
        let high: HashSet<(usize, usize)> = build_graph(&m, hi, &[]).edges().into_iter().collect();
        prop_assert!(high.is_subset(&low));
    }

    #[test]
    fn builder_has_no_self_loops_or_invalid_nodes(
        m in arb_matrix(),
        t in 0.0f64..1.0,
        valid in prop::collection::vec(0usize..12, 0..6),
    ) {
        let g = build_graph(&m, t, &valid);
        for (a, b) in g.edges() {
            prop_assert_ne!(a, b);
        }
        if !valid.is_empty() {
            for r in g.regions() {
                prop_assert!(valid.contains(&r));
            }
        } else {
            prop_assert_eq!(g.node_count(), m.size());
        }
    }

    #[test]
    fn components_partition_nodes(m in arb_matrix(), t in 0.0f64..1.0) {
        let g = build_graph(&m, t, &[]);
        let components = connected_components(&g);
        let mut seen: Vec<usize> = components.iter().flat_map(|c| c.regions().to_vec()).collect();
        let total: usize = components.iter().map(|c| c.node_count()).sum();
        prop_assert_eq!(total, g.node_count());
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen, g.regions());
        let edges: usize = components.iter().map(|c| c.edge_count()).sum();
        prop_assert_eq!(edges, g.edge_count());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn aggregate_accounts_for_every_node(m in arb_matrix(), t in 0.0f64..1.0) {
        let g = build_graph(&m, t, &[]);
        let components = connected_components(&g);
        let mut rng = StdRng::seed_from_u64(1);
        let stats = aggregate(&components, &fast_small_world(), &mut rng).unwrap();

        prop_assert_eq!(stats.accounted_nodes(), g.node_count());
        prop_assert_eq!(stats.subgraphs, components.len());
        // Each measured component adds its weight to exactly one of value / tally
        if stats.non_isolated_nodes > 0 {
            prop_assert!(stats.sigma_zero_denominator <= 1.0 + 1e-9);
            prop_assert!(stats.omega_zero_denominator <= 1.0 + 1e-9);
            prop_assert!(stats.density > 0.0 && stats.density <= 1.0 + 1e-9);
        } else {
            prop_assert_eq!(stats.density, 0.0);
            prop_assert_eq!(stats.sigma_zero_denominator, 0.0);
        }
    }
}
