// End-to-end reference bookkeeping against an on-disk database

use refgraph::graph::{GraphLink, GraphNode};
use refgraph::{ReferenceRequest, ReferenceService, SqliteStore};
use tempfile::TempDir;

const USER: i64 = 1;

fn create_test_store() -> (TempDir, SqliteStore) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("refs.db");
    let store = SqliteStore::open(&db_path).unwrap();
    (temp_dir, store)
}

// ============================================================================
// Bind / Delete / Check
// ============================================================================

#[test]
fn test_bind_round_trip() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);

    let references = vec![
        ReferenceRequest::inner(2, "/articles/2", "Guide"),
        ReferenceRequest::external("https://x.com", "X"),
        ReferenceRequest::external("https://y.com/img.png", "diagram"),
    ];
    service.bind(USER, 1, "Intro", references).unwrap();

    let records = service.references_of(1).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.user_id == USER && r.source_id == 1 && r.source_name == "Intro"));
}

#[test]
fn test_references_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("refs.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        ReferenceService::new(&store)
            .bind(USER, 1, "Intro", vec![ReferenceRequest::external("https://x.com", "X")])
            .unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    assert!(ReferenceService::new(&store).check("https://x.com").unwrap());
}

#[test]
fn test_empty_bind_releases_only_own_urls() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);

    service
        .bind(USER, 1, "Intro", vec![
            ReferenceRequest::external("https://only-intro.com", "Mine"),
            ReferenceRequest::external("https://shared.com", "Shared"),
        ])
        .unwrap();
    service
        .bind(USER, 2, "Guide", vec![ReferenceRequest::external("https://shared.com", "Shared")])
        .unwrap();

    service.bind(USER, 1, "Intro", Vec::new()).unwrap();

    assert!(!service.check("https://only-intro.com").unwrap());
    assert!(service.check("https://shared.com").unwrap());
}

#[test]
fn test_delete_is_idempotent() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);
    service
        .bind(USER, 1, "Intro", vec![ReferenceRequest::inner(2, "/articles/2", "Guide")])
        .unwrap();

    service.delete(1).unwrap();
    let after_once = store.stats().unwrap().references;
    service.delete(1).unwrap();
    let after_twice = store.stats().unwrap().references;

    assert_eq!(after_once, 0);
    assert_eq!(after_once, after_twice);
}

// ============================================================================
// Graph
// ============================================================================

#[test]
fn test_graph_external_scenario() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);
    service
        .bind(USER, 1, "Intro", vec![ReferenceRequest::external("https://x.com", "X")])
        .unwrap();

    let graph = service.list_all(false, USER).unwrap();
    assert_eq!(graph.nodes, vec![
        GraphNode::article("Intro", Some(1)),
        GraphNode::external("X", "https://x.com"),
    ]);
    assert_eq!(graph.links, vec![GraphLink::new("Intro", "X")]);
}

#[test]
fn test_graph_mutual_inner_scenario() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);
    service
        .bind(USER, 1, "Intro", vec![ReferenceRequest::inner(2, "/articles/2", "Guide")])
        .unwrap();
    service
        .bind(USER, 2, "Guide", vec![ReferenceRequest::inner(1, "/articles/1", "Intro")])
        .unwrap();

    let graph = service.list_all(true, USER).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.links.len(), 2);
    assert!(graph.has_link("Intro", "Guide"));
    assert!(graph.has_link("Guide", "Intro"));
}

#[test]
fn test_graph_collapses_same_named_sources() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);
    service
        .bind(USER, 1, "Daily", vec![ReferenceRequest::external("https://a.com", "A")])
        .unwrap();
    service
        .bind(USER, 2, "Daily", vec![ReferenceRequest::external("https://b.com", "B")])
        .unwrap();

    let graph = service.list_all(false, USER).unwrap();
    assert_eq!(graph.nodes.iter().filter(|n| n.name == "Daily").count(), 1);
}

#[test]
fn test_graph_only_inner_has_no_external_nodes() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);
    service
        .bind(USER, 1, "Intro", vec![
            ReferenceRequest::inner(2, "/articles/2", "Guide"),
            ReferenceRequest::external("https://x.com", "X"),
        ])
        .unwrap();
    service
        .bind(USER, 3, "Links", vec![ReferenceRequest::external("https://y.com", "Y")])
        .unwrap();

    let graph = service.list_all(true, USER).unwrap();
    assert!(!graph.nodes.is_empty());
    assert!(graph.nodes.iter().all(|n| n.is_inner()));
    // An article with only external references drops out entirely
    assert!(graph.node("Links").is_none());
}

#[test]
fn test_graph_repeated_pair_is_one_link() {
    let (_temp_dir, store) = create_test_store();
    let service = ReferenceService::new(&store);
    let repeated: Vec<_> = (0..4)
        .map(|_| ReferenceRequest::external("https://x.com", "X"))
        .collect();
    service.bind(USER, 1, "Intro", repeated).unwrap();

    let graph = service.list_all(false, USER).unwrap();
    assert_eq!(store.stats().unwrap().references, 4);
    assert_eq!(graph.links.len(), 1);
}
