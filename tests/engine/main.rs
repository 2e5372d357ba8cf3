//! Integration tests for Layer 3: Engine
//!
//! Tests for the reasoner over the in-memory store: fixpoint scenarios,
//! candidate filtering, failure handling and binding environments.

mod bindings;
mod failures;
mod filtering;
mod scenarios;

use strata_engine::Reasoner;
use strata_foundation::{GraphId, Node, Triple};
use strata_language::{RuleSet, parse_facts, parse_rules};
use strata_storage::{GraphStore, Lookup, MemoryStore};

pub const PREFIX: &str = "@prefix ex: <http://example.org/> .\n";

pub fn ex(local: &str) -> Node {
    Node::resource(format!("http://example.org/{local}"))
}

pub fn rdf_type() -> Node {
    Node::resource(strata_foundation::vocab::rdf::TYPE)
}

/// A store holding the given facts in `urn:base`.
pub fn store_with(facts: &str) -> (MemoryStore, GraphId) {
    let mut store = MemoryStore::new();
    let base = store.create_graph(&"urn:base".into()).unwrap();
    let triples = parse_facts(&format!("{PREFIX}{facts}")).unwrap();
    store.insert_all(base, &triples).unwrap();
    (store, base)
}

pub fn rules(source: &str) -> RuleSet {
    parse_rules(&format!("{PREFIX}{source}")).unwrap()
}

pub fn facts_in<S: GraphStore>(store: &S, graph: GraphId) -> Vec<Triple> {
    let mut facts: Vec<_> = store
        .get_statements(&Lookup::any(), &[graph])
        .unwrap()
        .collect();
    facts.sort();
    facts
}

/// Runs axioms then rules with the given reasoner; returns the strata.
pub fn run(reasoner: &mut Reasoner, store: &mut MemoryStore, base: GraphId, rules: &RuleSet) -> Vec<GraphId> {
    reasoner.apply_axioms(store, base, rules).unwrap();
    reasoner.apply_rules(store, base, base, rules).unwrap()
}
