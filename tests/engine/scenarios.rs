//! Fixpoint scenarios
//!
//! Tests the round structure, stratum contents, idempotence and axiom
//! handling of the reasoner.

use strata_engine::{Reasoner, apply_axioms, apply_rules};
use strata_foundation::Triple;
use strata_language::parse_facts;
use strata_storage::GraphStore;

use crate::{PREFIX, ex, facts_in, rdf_type, rules, run, store_with};

// =============================================================================
// Round Structure
// =============================================================================

#[test]
fn single_rule_derives_one_stratum() {
    let (mut store, base) = store_with("(ex:alice rdf:type ex:Employee)");
    let rules = rules("[r: (?x rdf:type ex:Employee) -> (?x rdf:type ex:Person)]");

    let mut reasoner = Reasoner::new();
    let strata = reasoner.apply_rules(&mut store, base, base, &rules).unwrap();

    assert_eq!(strata.len(), 1);
    assert_eq!(
        facts_in(&store, strata[0]),
        vec![Triple::new(ex("alice"), rdf_type(), ex("Person"))]
    );
    // Round 2 derived nothing and its graph is gone.
    assert_eq!(reasoner.stats().rounds, 2);
    assert!(store.find_graph(&"urn:base#stratum-2".into()).is_none());
}

#[test]
fn chained_rules_take_one_stratum_each() {
    let (mut store, base) = store_with("(ex:x rdf:type ex:A)");
    let rules = rules(
        "[ab: (?x rdf:type ex:A) -> (?x rdf:type ex:B)]
         [bc: (?x rdf:type ex:B) -> (?x rdf:type ex:C)]",
    );

    let strata = apply_rules(&mut store, base, base, &rules).unwrap();

    assert_eq!(strata.len(), 2);
    assert_eq!(
        facts_in(&store, strata[0]),
        vec![Triple::new(ex("x"), rdf_type(), ex("B"))]
    );
    assert_eq!(
        facts_in(&store, strata[1]),
        vec![Triple::new(ex("x"), rdf_type(), ex("C"))]
    );
}

#[test]
fn derived_facts_are_not_matched_in_the_round_that_made_them() {
    // Both rules could fire in one round if staged facts were visible.
    let (mut store, base) = store_with("(ex:x rdf:type ex:A)");
    let rules = rules(
        "[ab: (?x rdf:type ex:A) -> (?x rdf:type ex:B)]
         [bc: (?x rdf:type ex:B) -> (?x rdf:type ex:C)]",
    );
    let strata = apply_rules(&mut store, base, base, &rules).unwrap();
    assert_eq!(store.len(strata[0]).unwrap(), 1);
}

#[test]
fn transitive_closure_layers_by_path_length() {
    let (mut store, base) =
        store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c) (ex:c ex:lt ex:d) (ex:d ex:lt ex:e)");
    let rules = rules("[trans: (?x ex:lt ?y) (?y ex:lt ?z) -> (?x ex:lt ?z)]");

    let strata = apply_rules(&mut store, base, base, &rules).unwrap();

    let sizes: Vec<_> = strata.iter().map(|g| store.len(*g).unwrap()).collect();
    // Paths of length 2, then 3 and 4.
    assert_eq!(sizes, vec![3, 3]);
    let total: usize = sizes.iter().sum();
    assert_eq!(total, 6);
}

#[test]
fn empty_rule_set_creates_no_strata() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b)");
    let strata = apply_rules(&mut store, base, base, &rules("")).unwrap();
    assert!(strata.is_empty());
    assert_eq!(store.graphs().len(), 1);
}

// =============================================================================
// Idempotence and Duplicates
// =============================================================================

#[test]
fn second_run_derives_nothing_and_numbers_continue() {
    let (mut store, base) = store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c)");
    let rules = rules("[trans: (?x ex:lt ?y) (?y ex:lt ?z) -> (?x ex:lt ?z)]");

    let mut reasoner = Reasoner::new();
    assert_eq!(run(&mut reasoner, &mut store, base, &rules).len(), 1);
    let before = store.total_len();
    assert!(run(&mut reasoner, &mut store, base, &rules).is_empty());
    assert_eq!(store.total_len(), before);

    // New input lands in the next stratum number.
    let extra = parse_facts(&format!("{PREFIX}(ex:c ex:lt ex:d)")).unwrap();
    store.insert_all(base, &extra).unwrap();
    let strata = run(&mut reasoner, &mut store, base, &rules);
    assert_eq!(
        store.graph_name(strata[0]).unwrap().as_str(),
        "urn:base#stratum-2"
    );
}

#[test]
fn facts_already_known_are_suppressed() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b) (ex:b ex:q ex:a)");
    let rules = rules(
        "[flip: (?x ex:p ?y) -> (?y ex:q ?x)]
         [also: (?x ex:p ?y) -> (?y ex:r ?x)]
         [same: (?x ex:p ?y) -> (?y ex:r ?x)]",
    );

    let mut reasoner = Reasoner::new();
    let strata = reasoner.apply_rules(&mut store, base, base, &rules).unwrap();

    assert_eq!(strata.len(), 1);
    assert_eq!(
        facts_in(&store, strata[0]),
        vec![Triple::new(ex("b"), ex("r"), ex("a"))]
    );
    // One from flip (already in base), one from same (staged by also).
    assert_eq!(reasoner.stats().duplicates_suppressed, 2);
    assert_eq!(reasoner.stats().facts_derived, 1);
}

// =============================================================================
// Axioms
// =============================================================================

#[test]
fn axiom_already_in_base_is_not_inserted() {
    let (mut store, base) = store_with("(ex:schema rdf:type ex:Root)");
    let rules = rules("-> (ex:schema rdf:type ex:Root) .");

    assert_eq!(apply_axioms(&mut store, base, &rules).unwrap(), 0);
    assert!(store.find_graph(&"urn:base#axioms".into()).is_none());
    assert_eq!(store.total_len(), 1);
}

#[test]
fn axioms_feed_the_first_round() {
    let (mut store, base) = store_with("");
    let rules = rules(
        "-> (ex:Manager rdfs:subClassOf ex:Employee) .
         -> (ex:ann rdf:type ex:Manager) .
         [sub: (?x rdf:type ?c) (?c rdfs:subClassOf ?d) -> (?x rdf:type ?d)]",
    );

    let mut reasoner = Reasoner::new();
    let strata = run(&mut reasoner, &mut store, base, &rules);

    let axioms = store.find_graph(&"urn:base#axioms".into()).unwrap();
    assert_eq!(store.len(axioms).unwrap(), 2);
    assert_eq!(
        facts_in(&store, strata[0]),
        vec![Triple::new(ex("ann"), rdf_type(), ex("Employee"))]
    );
}

#[test]
fn axioms_take_precedence_over_rule_derivations() {
    // The rule would derive the axiom fact; asserting axioms first keeps
    // it out of every stratum.
    let (mut store, base) = store_with("(ex:x rdf:type ex:A)");
    let rules = rules(
        "-> (ex:x rdf:type ex:B) .
         [ab: (?x rdf:type ex:A) -> (?x rdf:type ex:B)]",
    );

    let mut reasoner = Reasoner::new();
    let strata = run(&mut reasoner, &mut store, base, &rules);

    assert!(strata.is_empty());
    assert_eq!(reasoner.stats().duplicates_suppressed, 1);
    assert_eq!(reasoner.stats().axioms_asserted, 1);
}

#[test]
fn axioms_derived_earlier_are_not_reasserted() {
    let (mut store, base) = store_with("(ex:x rdf:type ex:A)");
    let derive = rules("[ab: (?x rdf:type ex:A) -> (?x rdf:type ex:B)]");
    apply_rules(&mut store, base, base, &derive).unwrap();

    let axiom = rules("-> (ex:x rdf:type ex:B) .");
    assert_eq!(apply_axioms(&mut store, base, &axiom).unwrap(), 0);
}

#[test]
fn multi_triple_axiom_heads_insert_each_fact() {
    let (mut store, base) = store_with("");
    let rules = rules("[both: -> (ex:a ex:p ex:b) (ex:b ex:p ex:c)]");
    assert_eq!(apply_axioms(&mut store, base, &rules).unwrap(), 2);
}
