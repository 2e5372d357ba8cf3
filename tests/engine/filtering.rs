//! Candidate rule filtering
//!
//! Rules whose body cannot match the previous round's output are skipped
//! and never attempted.

use std::sync::{Arc, Mutex};

use strata_engine::{Reasoner, ReasonerConfig, ReasonerEvent};
use strata_storage::{GraphStore, Lookup};

use crate::{ex, rules, store_with};

type Recorder = Arc<Mutex<Vec<ReasonerEvent>>>;

const UNICORNS: &str = "[people: (?x rdf:type ex:Employee) -> (?x rdf:type ex:Person)]
     [never: (?x rdf:type ex:Unicorn) -> (?x ex:magic true)]";

#[test]
fn unmatchable_rule_is_never_attempted() {
    let (mut store, base) = store_with("(ex:alice rdf:type ex:Employee)");
    let rules = rules(UNICORNS);
    let recorder = Recorder::default();
    let mut reasoner = Reasoner::new().with_trace_sink(Box::new(Arc::clone(&recorder)));

    let strata = reasoner.apply_rules(&mut store, base, base, &rules).unwrap();

    assert_eq!(reasoner.stats().attempts("never"), 0);
    assert_eq!(reasoner.stats().attempts("people"), 1);
    // never twice, people in round 2.
    assert_eq!(reasoner.stats().rules_skipped, 3);

    let magic = Lookup::new(None, Some(ex("magic")), None);
    assert_eq!(store.get_statements(&magic, &strata).unwrap().count(), 0);

    let events = recorder.lock().unwrap();
    let skipped_never = events
        .iter()
        .filter(|e| matches!(e, ReasonerEvent::RuleSkipped { rule, .. } if rule == "never"))
        .count();
    assert_eq!(skipped_never, 2);
    assert!(!events
        .iter()
        .any(|e| matches!(e, ReasonerEvent::RuleEvaluated { rule, .. } if rule == "never")));
}

#[test]
fn without_filtering_every_rule_runs_every_round() {
    let (mut filtered_store, base) = store_with("(ex:alice rdf:type ex:Employee)");
    let mut unfiltered_store = filtered_store.clone();
    let rules = rules(UNICORNS);

    let mut filtered = Reasoner::new();
    let mut unfiltered = Reasoner::with_config(ReasonerConfig::new().without_rule_filtering());
    let a = filtered
        .apply_rules(&mut filtered_store, base, base, &rules)
        .unwrap();
    let b = unfiltered
        .apply_rules(&mut unfiltered_store, base, base, &rules)
        .unwrap();

    assert_eq!(unfiltered.stats().attempts("never"), 2);
    assert_eq!(unfiltered.stats().attempts("people"), 2);
    assert_eq!(unfiltered.stats().rules_skipped, 0);

    // Filtering changes the work done, not the result.
    assert_eq!(a.len(), b.len());
    assert_eq!(filtered_store.total_len(), unfiltered_store.total_len());
}

#[test]
fn builtin_only_body_runs_in_the_first_round_only() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b)");
    let rules = rules(
        "[seed: equal(1, 1) -> (ex:k ex:v 1)]
         [copy: (?x ex:p ?y) -> (?x ex:q ?y)]
         [more: (?x ex:q ?y) -> (?y ex:r ?x)]",
    );

    let mut reasoner = Reasoner::new();
    let strata = reasoner.apply_rules(&mut store, base, base, &rules).unwrap();

    assert_eq!(strata.len(), 2);
    assert_eq!(reasoner.stats().attempts("seed"), 1);
}

#[test]
fn trivial_pattern_is_always_a_candidate() {
    let (mut store, base) = store_with("(ex:a ex:p ex:b)");
    let rules = rules("[seen: (?s ?p ?o) -> (ex:log ex:saw ex:something)]");

    let mut reasoner = Reasoner::new();
    let strata = reasoner.apply_rules(&mut store, base, base, &rules).unwrap();

    assert_eq!(strata.len(), 1);
    assert_eq!(reasoner.stats().attempts("seen"), 2);
    assert_eq!(reasoner.stats().rules_skipped, 0);
    assert!(reasoner.stats().duplicates_suppressed >= 1);
}

#[test]
fn rule_evaluations_report_what_they_derived() {
    let (mut store, base) = store_with("(ex:a ex:lt ex:b) (ex:b ex:lt ex:c)");
    let rules = rules("[trans: (?x ex:lt ?y) (?y ex:lt ?z) -> (?x ex:lt ?z)]");
    let recorder = Recorder::default();
    let mut reasoner = Reasoner::new().with_trace_sink(Box::new(Arc::clone(&recorder)));

    reasoner.apply_rules(&mut store, base, base, &rules).unwrap();

    let derived: Vec<_> = recorder
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            ReasonerEvent::RuleEvaluated { round, derived, .. } => Some((*round, *derived)),
            _ => None,
        })
        .collect();
    assert_eq!(derived, vec![(1, 1), (2, 0)]);
    assert!(matches!(
        recorder.lock().unwrap().last(),
        Some(ReasonerEvent::Converged { rounds: 2, strata: 1 })
    ));
}
