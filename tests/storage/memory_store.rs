//! Integration tests for MemoryStore
//!
//! Tests graph lifecycle, staged inserts, lookups and snapshots.

use strata_foundation::{ErrorKind, GraphId, Node, Triple};
use strata_storage::{GraphStore, Lookup, MemoryStore};

fn n(local: &str) -> Node {
    Node::resource(format!("http://example.org/{local}"))
}

fn t(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(n(s), n(p), n(o))
}

fn collect(store: &MemoryStore, lookup: &Lookup, graphs: &[GraphId]) -> Vec<Triple> {
    let mut out: Vec<_> = store.get_statements(lookup, graphs).unwrap().collect();
    out.sort();
    out
}

// =============================================================================
// Graph Lifecycle
// =============================================================================

#[test]
fn graphs_are_listed_in_creation_order() {
    let mut store = MemoryStore::new();
    let b = store.create_graph(&"urn:b".into()).unwrap();
    let a = store.create_graph(&"urn:a".into()).unwrap();
    let names: Vec<_> = store
        .graphs()
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();
    assert_eq!(names, vec![(b, "urn:b".to_string()), (a, "urn:a".to_string())]);
    assert_eq!(store.find_graph(&"urn:a".into()), Some(a));
    assert_eq!(store.find_graph(&"urn:c".into()), None);
}

#[test]
fn removed_graph_is_gone() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.insert_all(g, &[t("a", "p", "b")]).unwrap();
    store.remove_graph(g).unwrap();

    assert!(store.graph_name(g).is_none());
    assert!(store.find_graph(&"urn:g".into()).is_none());
    let err = store.get_statements(&Lookup::any(), &[g]).err().unwrap();
    assert!(matches!(err.kind, ErrorKind::UnknownGraph(_)));
    assert!(store.remove_graph(g).is_err());
}

#[test]
fn recreated_graph_gets_a_fresh_handle() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.remove_graph(g).unwrap();
    let g2 = store.create_graph(&"urn:g".into()).unwrap();
    assert_ne!(g, g2);
    assert_eq!(store.len(g2).unwrap(), 0);
}

// =============================================================================
// Transactions
// =============================================================================

#[test]
fn staged_inserts_are_invisible_until_commit() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.add_base(g, &[t("a", "p", "b")]).unwrap();

    assert_eq!(store.staged_len(), 1);
    assert!(!store.contains(&t("a", "p", "b"), &[g]).unwrap());

    store.commit().unwrap();
    assert_eq!(store.staged_len(), 0);
    assert!(store.contains(&t("a", "p", "b"), &[g]).unwrap());
    assert_eq!(store.commit_count(), 1);
}

#[test]
fn rollback_discards_staged_inserts() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.add_base(g, &[t("a", "p", "b"), t("b", "p", "c")]).unwrap();
    store.rollback();
    store.commit().unwrap();

    assert_eq!(store.len(g).unwrap(), 0);
    assert_eq!(store.commit_count(), 0);
}

#[test]
fn add_base_to_unknown_graph_fails() {
    let mut store = MemoryStore::new();
    let err = store.add_base(GraphId::new(99), &[t("a", "p", "b")]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownGraph(_)));
    assert_eq!(store.staged_len(), 0);
}

#[test]
fn duplicate_inserts_are_stored_once() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.insert_all(g, &[t("a", "p", "b"), t("a", "p", "b")]).unwrap();
    store.insert_all(g, &[t("a", "p", "b")]).unwrap();
    assert_eq!(store.len(g).unwrap(), 1);
}

// =============================================================================
// Lookups
// =============================================================================

#[test]
fn lookups_by_position() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store
        .insert_all(g, &[t("a", "p", "b"), t("a", "q", "c"), t("d", "p", "b")])
        .unwrap();

    let by_subject = Lookup::new(Some(n("a")), None, None);
    assert_eq!(collect(&store, &by_subject, &[g]).len(), 2);

    let by_object = Lookup::new(None, None, Some(n("b")));
    assert_eq!(
        collect(&store, &by_object, &[g]),
        vec![t("a", "p", "b"), t("d", "p", "b")]
    );

    let two_bound = Lookup::new(Some(n("a")), Some(n("p")), None);
    assert_eq!(collect(&store, &two_bound, &[g]), vec![t("a", "p", "b")]);

    let miss = Lookup::new(Some(n("zz")), None, None);
    assert!(collect(&store, &miss, &[g]).is_empty());
}

#[test]
fn statements_shared_by_graphs_are_yielded_once() {
    let mut store = MemoryStore::new();
    let g1 = store.create_graph(&"urn:g1".into()).unwrap();
    let g2 = store.create_graph(&"urn:g2".into()).unwrap();
    store.insert_all(g1, &[t("a", "p", "b"), t("x", "p", "y")]).unwrap();
    store.insert_all(g2, &[t("a", "p", "b"), t("c", "p", "d")]).unwrap();

    let all = collect(&store, &Lookup::any(), &[g1, g2]);
    assert_eq!(all.len(), 3);
    assert_eq!(store.total_len(), 4);
}

#[test]
fn lookups_are_fresh_sequences() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.insert_all(g, &[t("a", "p", "b"), t("b", "p", "c")]).unwrap();

    let mut first = store.get_statements(&Lookup::any(), &[g]).unwrap();
    first.next();
    let second = store.get_statements(&Lookup::any(), &[g]).unwrap();
    assert_eq!(second.count(), 2);
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn clone_is_an_isolated_snapshot() {
    let mut store = MemoryStore::new();
    let g = store.create_graph(&"urn:g".into()).unwrap();
    store.insert_all(g, &[t("a", "p", "b")]).unwrap();

    let snapshot = store.clone();
    store.insert_all(g, &[t("b", "p", "c")]).unwrap();

    assert_eq!(snapshot.len(g).unwrap(), 1);
    assert_eq!(store.len(g).unwrap(), 2);
    assert!(snapshot.graph(g).unwrap().contains(&t("a", "p", "b")));
}
