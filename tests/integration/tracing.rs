//! Tracing a reasoner run through the debug layer

use std::sync::{Arc, Mutex};

use strata_debug::{ObservabilityConfig, Tracer, TracerConfig};
use strata_engine::{Reasoner, ReasonerEvent};
use strata_language::{parse_facts, parse_rules};
use strata_storage::{GraphStore, MemoryStore};

const RULES: &str = "@prefix ex: <http://example.org/> .
    -> (ex:root ex:lt ex:a) .
    [trans: (?x ex:lt ?y) (?y ex:lt ?z) -> (?x ex:lt ?z)]
    [note: (?x ex:lt ex:c) -> print(\"reaches c:\", ?x)]";

const FACTS: &str = "@prefix ex: <http://example.org/> .
    (ex:a ex:lt ex:b) (ex:b ex:lt ex:c)";

fn traced_run(config: TracerConfig) -> Arc<Mutex<Tracer>> {
    let rules = parse_rules(RULES).unwrap();
    let mut store = MemoryStore::new();
    let base = store.create_graph(&"urn:t".into()).unwrap();
    store.insert_all(base, &parse_facts(FACTS).unwrap()).unwrap();

    let mut tracer = Tracer::new(config);
    tracer.set_prefixes(rules.prefixes.clone());
    let tracer = Arc::new(Mutex::new(tracer));
    let mut reasoner = Reasoner::new().with_trace_sink(Box::new(Arc::clone(&tracer)));
    reasoner.apply_axioms(&mut store, base, &rules).unwrap();
    reasoner.apply_rules(&mut store, base, base, &rules).unwrap();
    tracer
}

#[test]
fn records_are_grouped_by_round() {
    let tracer = traced_run(TracerConfig::new().enabled());
    let tracer = tracer.lock().unwrap();
    let buffer = tracer.buffer();

    assert_eq!(buffer.rounds(), vec![0, 1, 2, 3]);
    assert_eq!(buffer.records_for_round(0).len(), 1);
    assert_eq!(buffer.by_event_type("axiom").len(), 1);
    assert_eq!(buffer.by_event_type("converged").len(), 1);
    assert!(buffer.last().is_some_and(|r| r.event_type() == "converged"));
}

#[test]
fn derived_facts_and_prints_are_traced_per_rule() {
    let tracer = traced_run(TracerConfig::new().enabled());
    let tracer = tracer.lock().unwrap();
    let buffer = tracer.buffer();

    // root<b and a<c in round 1; root<c in round 2.
    let derived = buffer.by_event_type("derived");
    assert_eq!(derived.len(), 3);

    let printed: Vec<_> = buffer
        .by_rule("note")
        .into_iter()
        .filter_map(|r| match &r.event {
            ReasonerEvent::Printed { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(printed.len(), 3);
    assert!(printed.iter().all(|t| t.starts_with("reaches c:")));
}

#[test]
fn event_filter_keeps_only_named_kinds() {
    let tracer = traced_run(
        TracerConfig::new()
            .enabled()
            .filter_events(vec!["round-start".into(), "round-end".into()]),
    );
    let tracer = tracer.lock().unwrap();
    let stats = tracer.stats();
    assert_eq!(stats.record_count, 6);
    assert_eq!(stats.event_counts.get("round-start"), Some(&3));
}

#[test]
fn json_lines_use_prefixes() {
    let tracer = traced_run(TracerConfig::new().enabled().json());
    let tracer = tracer.lock().unwrap();
    let derived = tracer.buffer().by_event_type("derived");
    let line = tracer.format_record(derived[0]);
    assert!(line.starts_with("{\"id\":"));
    assert!(line.contains("\"type\":\"derived\""));
    assert!(line.contains("ex:lt"));
}

#[test]
fn small_buffer_keeps_the_newest_records() {
    let tracer = traced_run(TracerConfig::new().enabled().with_buffer_size(4));
    let tracer = tracer.lock().unwrap();
    let stats = tracer.stats();
    assert_eq!(stats.record_count, 4);
    assert_eq!(stats.newest_round, Some(3));
}

#[test]
fn disabled_tracer_records_nothing() {
    let tracer = traced_run(ObservabilityConfig::default().tracer_config());
    assert!(tracer.lock().unwrap().buffer().is_empty());
}
