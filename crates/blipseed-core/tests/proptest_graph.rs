use std::collections::HashSet;

use blipseed_core::memory::MemoryStore;
use blipseed_core::oracle::check_graph;
use blipseed_core::{CancellationToken, GraphSeeder};
use proptest::prelude::*;

use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn generated_graph_is_simple(request in arb_request()) {
        let generated = GraphSeeder::default()
            .generate(&request, &mut MemoryStore::default(), &CancellationToken::new())
            .expect("valid request");

        let n = request.clamped_users();
        prop_assert_eq!(generated.graph.node_count(), n);

        let mut seen = HashSet::new();
        for edge in generated.graph.edges() {
            prop_assert_ne!(edge.source, edge.target);
            prop_assert!(edge.source < n && edge.target < n);
            prop_assert!(seen.insert(*edge), "duplicate edge {:?}", edge);
        }

        let oracle = check_graph(&generated);
        prop_assert!(oracle.passed, "{:?}", oracle.violations);
    }

    #[test]
    fn statistics_stay_in_range(request in arb_request()) {
        let generated = GraphSeeder::default()
            .generate(&request, &mut MemoryStore::default(), &CancellationToken::new())
            .expect("valid request");
        let stats = &generated.stats;

        prop_assert!((0.0..=1.0).contains(&stats.reciprocity));
        prop_assert!((0.0..=1.0).contains(&stats.gini_followers));
        prop_assert!((stats.avg_out - stats.avg_in).abs() < f64::EPSILON);
        prop_assert!(stats.top_hubs.len() <= 10);
        prop_assert!(stats.top_hubs.windows(2).all(|w| w[0].followers >= w[1].followers));
    }

    #[test]
    fn same_seed_same_graph(request in arb_small_request()) {
        let seeder = GraphSeeder::default();
        let cancel = CancellationToken::new();
        let a = seeder.generate(&request, &mut MemoryStore::default(), &cancel).expect("run a");
        let b = seeder.generate(&request, &mut MemoryStore::default(), &cancel).expect("run b");

        prop_assert_eq!(a.graph.edges(), b.graph.edges());
        prop_assert_eq!(&a.stats, &b.stats);
        prop_assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn identities_are_catalogue_prefix(request in arb_small_request()) {
        let mut store = MemoryStore::default();
        let generated = GraphSeeder::default()
            .generate(&request, &mut store, &CancellationToken::new())
            .expect("valid request");

        let expected: Vec<&str> = blipseed_core::catalog::USERNAMES
            .iter()
            .take(request.clamped_users())
            .copied()
            .collect();
        prop_assert_eq!(generated.pool.external_ids(), expected.as_slice());
        for identity in generated.pool.identities() {
            prop_assert_ne!(identity.interests[0], identity.interests[1]);
        }
    }
}

#[test]
fn two_users_follow_each_other_at_most_once() {
    for seed in 0..200 {
        let request = blipseed_core::GraphSeedRequest {
            users: 2,
            seed: Some(seed),
            ..blipseed_core::GraphSeedRequest::default()
        };
        let generated = GraphSeeder::default()
            .generate(&request, &mut MemoryStore::default(), &CancellationToken::new())
            .expect("valid request");

        // Both identities draw an out-degree of exactly 1 and the only
        // candidate is the other identity.
        assert_eq!(generated.graph.edge_count(), 2, "seed {seed}");
        assert_eq!(generated.stats.triadic_added, 0);
        assert_eq!(generated.stats.reciprocal_added, 0);
        assert!((generated.stats.reciprocity - 0.5).abs() < 1e-12);
    }
}
