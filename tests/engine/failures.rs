//! Failure handling
//!
//! Store failures propagate with their rule and round, malformed rules are
//! rejected before anything is written, and caps stop runaway rule sets.

use std::cell::Cell;

use strata_engine::{Reasoner, ReasonerConfig, apply_axioms, apply_rules};
use strata_foundation::{Error, ErrorKind, GraphId, GraphName, Result, SemanticLimit, Triple};
use strata_storage::{GraphStore, Lookup, MemoryStore, Statements};

use crate::{rules, store_with};

/// A store that fails on demand and otherwise forwards to a `MemoryStore`.
struct FailingStore {
    inner: MemoryStore,
    fail_commit: bool,
    fail_remove: bool,
    /// Lookups left before lookups start failing.
    lookups_left: Cell<Option<usize>>,
}

impl FailingStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_commit: false,
            fail_remove: false,
            lookups_left: Cell::new(None),
        }
    }
}

impl GraphStore for FailingStore {
    fn create_graph(&mut self, name: &GraphName) -> Result<GraphId> {
        self.inner.create_graph(name)
    }

    fn find_graph(&self, name: &GraphName) -> Option<GraphId> {
        self.inner.find_graph(name)
    }

    fn graph_name(&self, id: GraphId) -> Option<GraphName> {
        self.inner.graph_name(id)
    }

    fn graphs(&self) -> Vec<(GraphId, GraphName)> {
        self.inner.graphs()
    }

    fn remove_graph(&mut self, id: GraphId) -> Result<()> {
        if self.fail_remove {
            return Err(Error::store("graph is locked"));
        }
        self.inner.remove_graph(id)
    }

    fn get_statements(&self, lookup: &Lookup, graphs: &[GraphId]) -> Result<Statements<'_>> {
        if let Some(left) = self.lookups_left.get() {
            if left == 0 {
                return Err(Error::store("connection lost"));
            }
            self.lookups_left.set(Some(left - 1));
        }
        self.inner.get_statements(lookup, graphs)
    }

    fn add_base(&mut self, graph: GraphId, triples: &[Triple]) -> Result<()> {
        self.inner.add_base(graph, triples)
    }

    fn commit(&mut self) -> Result<()> {
        if self.fail_commit {
            self.inner.rollback();
            return Err(Error::store("commit refused"));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) {
        self.inner.rollback();
    }
}

const TRANS: &str = "[trans: (?x ex:lt ?y) (?y ex:lt ?z) -> (?x ex:lt ?z)]";

// =============================================================================
// Store Failures
// =============================================================================

#[test]
fn failed_commit_discards_the_round() {
    let (inner, base) = store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c)");
    let mut store = FailingStore::new(inner);
    store.fail_commit = true;

    let err = apply_rules(&mut store, base, base, &rules(TRANS)).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Store(ref m) if m == "commit refused"));
    let frames = err.context.map(|c| c.stack).unwrap_or_default();
    assert_eq!(frames, vec!["round 1"]);
    assert!(store.find_graph(&"urn:base#stratum-1".into()).is_none());
    assert_eq!(store.inner.total_len(), 2);
    assert_eq!(store.inner.staged_len(), 0);
}

#[test]
fn failed_stratum_cleanup_is_reported() {
    let (inner, base) = store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c)");
    let mut store = FailingStore::new(inner);
    store.fail_commit = true;
    store.fail_remove = true;

    let err = apply_rules(&mut store, base, base, &rules(TRANS)).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Store(ref m) if m == "commit refused"));
    let frames = err.context.map(|c| c.stack).unwrap_or_default();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("urn:base#stratum-1"), "{frames:?}");
    assert!(frames[0].contains("graph is locked"), "{frames:?}");
    assert_eq!(frames[1], "round 1");
}

#[test]
fn failed_lookup_names_rule_and_round() {
    let (inner, base) = store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c)");
    let mut store = FailingStore::new(inner);
    store.lookups_left.set(Some(2));

    let err = apply_rules(&mut store, base, base, &rules(TRANS)).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Store(_)));
    let frames = err.context.map(|c| c.stack).unwrap_or_default();
    assert_eq!(frames.last().map(String::as_str), Some("round 1"));
    assert!(store.find_graph(&"urn:base#stratum-1".into()).is_none());
}

#[test]
fn earlier_strata_survive_a_later_failure() {
    let (inner, base) = store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c) (ex:c ex:lt ex:d)");
    let mut store = FailingStore::new(inner);
    let rules = rules(TRANS);

    // Stop after round 1, then fail the next call's first commit.
    let mut reasoner = Reasoner::with_config(ReasonerConfig::new().with_max_rounds(1));
    assert!(reasoner.apply_rules(&mut store, base, base, &rules).is_err());
    assert!(store.find_graph(&"urn:base#stratum-1".into()).is_some());

    store.fail_commit = true;
    let err = Reasoner::new()
        .apply_rules(&mut store, base, base, &rules)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Store(_)));
    assert!(store.find_graph(&"urn:base#stratum-1".into()).is_some());
    assert!(store.find_graph(&"urn:base#stratum-2".into()).is_none());
}

#[test]
fn failed_axiom_commit_writes_nothing() {
    let (inner, base) = store_with("");
    let mut store = FailingStore::new(inner);
    store.fail_commit = true;

    let err = apply_axioms(&mut store, base, &rules("-> (ex:a ex:b ex:c) .")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Store(_)));
    assert_eq!(store.inner.total_len(), 0);
}

// =============================================================================
// Rule Shape Errors
// =============================================================================

#[test]
fn unbound_head_variable_is_rejected_before_any_round() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b)");
    let rules = rules("[bad: (?x ex:p ?y) -> (?x ex:q ?z)]");

    let err = apply_rules(&mut store, base, base, &rules).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::UnboundVariable { ref rule, ref variable } if rule == "bad" && variable.contains('z')
    ));
    assert_eq!(store.graphs().len(), 1);
}

#[test]
fn head_variable_seen_only_by_a_test_builtin_is_rejected() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b)");
    let rules = rules("[r: (?a ex:p ?b) notLiteral(?x) -> (?a ex:q ?x)]");

    let err = apply_rules(&mut store, base, base, &rules).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::UnboundVariable { ref variable, .. } if variable == "?x"
    ));
    assert_eq!(store.graphs().len(), 1);
}

#[test]
fn unknown_builtin_is_rejected() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b)");
    let rules = rules("[odd: (?x ex:p ?y) frobnicate(?x) -> (?y ex:p ?x)]");
    let err = apply_rules(&mut store, base, base, &rules).unwrap_err();
    assert!(err.is_rule_error());
    assert!(err.to_string().contains("frobnicate"));
}

#[test]
fn non_ground_axiom_is_rejected() {
    let (mut store, base) = store_with("");
    let err = apply_axioms(&mut store, base, &rules("-> (?x ex:b ex:c) .")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidRule { .. }));
}

#[test]
fn unknown_graph_is_an_error() {
    let (mut store, _) = store_with("");
    let err = apply_rules(&mut store, GraphId::new(42), GraphId::new(42), &rules(TRANS))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownGraph(_)));
}

// =============================================================================
// Caps
// =============================================================================

#[test]
fn unbounded_generator_is_stopped_by_a_derivation_cap() {
    let (mut store, base) = store_with("(ex:zero ex:count 0)");
    let rules = rules("[next: (?x ex:count ?n) sum(?n, 1, ?m) -> (?x ex:count ?m)]");

    let mut reasoner = Reasoner::with_config(ReasonerConfig::new().with_max_derivations(25));
    let err = reasoner.apply_rules(&mut store, base, base, &rules).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::MaxDerivations { limit: 25, .. })
    ));
    assert_eq!(reasoner.stats().strata_created, 25);
}

#[test]
fn unbounded_generator_is_stopped_by_a_round_cap() {
    let (mut store, base) = store_with("(ex:zero ex:count 0)");
    let rules = rules("[next: (?x ex:count ?n) sum(?n, 1, ?m) -> (?x ex:count ?m)]");

    let mut reasoner = Reasoner::with_config(ReasonerConfig::new().with_max_rounds(10));
    let err = reasoner.apply_rules(&mut store, base, base, &rules).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::MaxRounds { limit: 10 })
    ));
    assert_eq!(reasoner.stats().strata_created, 10);
    assert_eq!(store.total_len(), 11);
}
