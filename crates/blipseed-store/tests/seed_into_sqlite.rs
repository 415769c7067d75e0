use blipseed_core::stats::{PassCounts, edge_fingerprint, summarize};
use blipseed_core::{CancellationToken, GraphSeedRequest, GraphSeeder};
use blipseed_store::{StoreCharges, open_store};

fn request(seed: u64) -> GraphSeedRequest {
    GraphSeedRequest {
        users: 40,
        seed: Some(seed),
        avg_follows: 3.0,
        ..GraphSeedRequest::default()
    }
}

#[test]
fn persisted_graph_reloads_with_same_statistics() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("graph.sqlite3");

    let result = {
        let mut store = open_store(&path, StoreCharges::default()).expect("open store");
        GraphSeeder::default()
            .seed(&request(5), &mut store, &CancellationToken::new())
            .expect("seed run")
    };
    assert!(result.persistence.is_complete(result.stats.edges));

    let store = open_store(&path, StoreCharges::default()).expect("reopen store");
    let stored = store.load_graph().expect("load graph");
    assert_eq!(stored.graph.edge_count(), result.stats.edges);
    assert_eq!(
        edge_fingerprint(&stored.external_ids, stored.graph.edges()),
        result.edge_fingerprint
    );

    let reloaded = summarize(
        &stored.external_ids,
        &stored.graph,
        PassCounts {
            accounts_created: result.stats.accounts_created,
            triadic_added: result.stats.triadic_added,
            reciprocal_added: result.stats.reciprocal_added,
        },
        10,
    );
    assert_eq!(reloaded, result.stats);
}

#[test]
#[allow(clippy::cast_precision_loss)]
fn charges_follow_configured_row_costs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let charges = StoreCharges {
        account: 1.0,
        person: 2.0,
        follow: 0.5,
    };
    let mut store = open_store(&dir.path().join("graph.sqlite3"), charges).expect("open store");
    let result = GraphSeeder::default()
        .seed(&request(8), &mut store, &CancellationToken::new())
        .expect("seed run");

    let expected = 40.0 * 3.0 + result.stats.edges as f64 * 0.5;
    assert!((result.total_request_charge - expected).abs() < 1e-9);
}

#[test]
fn reseeding_without_reset_keeps_one_row_per_identity() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store =
        open_store(&dir.path().join("graph.sqlite3"), StoreCharges::default()).expect("open store");
    let seeder = GraphSeeder::default();
    let cancel = CancellationToken::new();

    let first = seeder.seed(&request(1), &mut store, &cancel).expect("first run");
    let second = seeder.seed(&request(2), &mut store, &cancel).expect("second run");

    let counts = store.counts().expect("counts");
    assert_eq!(counts.accounts, 40);
    assert_eq!(counts.persons, 40);
    assert!(counts.follows >= first.stats.edges.max(second.stats.edges));
    assert!(counts.follows <= first.stats.edges + second.stats.edges);

    store.reset().expect("reset");
    let third = seeder.seed(&request(2), &mut store, &cancel).expect("third run");
    assert_eq!(third.edge_fingerprint, second.edge_fingerprint);
    assert_eq!(store.counts().expect("counts").follows, third.stats.edges);
}
