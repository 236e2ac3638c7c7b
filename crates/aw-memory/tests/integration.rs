//! End-to-end flows across store, recall, evolution, dreaming, and the
//! JSON snapshot bridge.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::tempdir;

use aw_memory::{ConnectionKind, MemoryStore, StoreConfig};

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

#[test]
fn test_full_lifecycle() {
    let store = MemoryStore::open_in_memory().unwrap();
    let now = 1_700_000_000.0;

    let river_cold = store
        .store_at(
            "the river runs cold and clear",
            "calm",
            HashMap::new(),
            now - 10.0,
        )
        .unwrap();
    let river_flood = store
        .store_at(
            "the river floods in spring",
            "fear",
            HashMap::new(),
            now - 5.0,
        )
        .unwrap();
    store
        .store_at("markets open early today", "neutral", HashMap::new(), now)
        .unwrap();

    // Jaccard 2/5 beats 2/6; the unrelated record shares no token
    let results = store.recall_at("the river", None, 10, now).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.id, river_flood);
    assert_eq!(results[1].0.id, river_cold);

    let stats = store.evolve_at(now).unwrap();
    assert_eq!(stats.strengthened, 0);
    assert_eq!(stats.faded, 0);

    let config = StoreConfig::from_toml(
        "[dream]\npairs = 2\nlink_probability = 1.0\nmax_strength = 0.5\n",
    )
    .unwrap();
    let created = store.dream(&config.dream, &mut rng()).unwrap();
    // Three records yield a single complete pair
    assert_eq!(created, 1);

    let stats = store.get_statistics().unwrap();
    assert_eq!(stats.total_memories, 3);
    assert_eq!(stats.total_connections, 1);
    assert_eq!(stats.by_emotion["calm"], 1);

    let snapshot = store.export_json().unwrap();
    let restored = MemoryStore::open_in_memory().unwrap();
    restored.import_json(&snapshot).unwrap();

    let replayed = restored.recall_at("the river", None, 10, now).unwrap();
    let ids: Vec<_> = replayed.iter().map(|(r, _)| r.id).collect();
    assert_eq!(ids, vec![river_flood, river_cold]);
}

#[test]
fn test_strengthen_and_fade_compose_in_one_pass() {
    let store = MemoryStore::open_in_memory().unwrap();
    let now = 1_700_000_000.0;
    let ten_days = 10.0 * 86_400.0;
    let nine_days = 9.0 * 86_400.0;

    let id = store
        .store_at("old favorite thought", "warm", HashMap::new(), now - ten_days)
        .unwrap();
    for _ in 0..11 {
        store.recall_at("favorite", None, 5, now - nine_days).unwrap();
    }

    let before = store.get(id).unwrap().unwrap().resonance;
    let stats = store.evolve_at(now).unwrap();
    assert_eq!(stats.strengthened, 1);
    assert_eq!(stats.faded, 1);

    let after = store.get(id).unwrap().unwrap().resonance;
    assert!((after - before * 1.01 * 0.99).abs() < 1e-10);
}

#[test]
fn test_weak_dream_links_get_pruned() {
    let store = MemoryStore::open_in_memory().unwrap();
    store.store("moon bright", "wonder").unwrap();
    store.store("coffee bitter", "morning").unwrap();
    store.store("music everywhere", "joy").unwrap();
    store.store("numbers dancing", "curious").unwrap();

    let config = StoreConfig::from_toml(
        "[dream]\npairs = 4\nlink_probability = 1.0\nmax_strength = 0.05\n",
    )
    .unwrap();
    let created = store.dream(&config.dream, &mut rng()).unwrap();
    assert_eq!(created, 2);

    // Every drawn strength sits below the prune floor
    let stats = store.evolve().unwrap();
    assert_eq!(stats.pruned, 2);
    assert_eq!(store.get_statistics().unwrap().total_connections, 0);
}

#[test]
fn test_connection_graph_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memories.db");

    let (id1, id2) = {
        let store = MemoryStore::open(&path).unwrap();
        let id1 = store.store("the patterns are beautiful", "wonder").unwrap();
        let id2 = store.store("the patterns are strange", "unease").unwrap();
        (id1, id2)
    };

    let store = MemoryStore::open(&path).unwrap();
    let edges = store.connections_from(id1).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, id2);
    assert_eq!(edges[0].kind, ConnectionKind::Semantic);

    let results = store.recall("patterns", None, 5).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_snapshot_moves_store_between_files() {
    let dir = tempdir().unwrap();
    let db_a = dir.path().join("a.db");
    let db_b = dir.path().join("b.db");
    let snapshot = dir.path().join("snapshot.json");

    let id = {
        let store = MemoryStore::open(&db_a).unwrap();
        let id = store.store("portable memory", "calm").unwrap();
        store.export_json_file(&snapshot).unwrap();
        id
    };

    let store = MemoryStore::open(&db_b).unwrap();
    store.import_json_file(&snapshot).unwrap();
    let record = store.get(id).unwrap().unwrap();
    assert_eq!(record.content, "portable memory");
}
