//! Provenance and why-queries across engine and debug layers

use strata_debug::{Origin, WhyQuery};
use strata_engine::{ProvenanceVerbosity, Reasoner, ReasonerConfig};
use strata_foundation::{Node, Triple};
use strata_language::{PrefixMap, parse_facts, parse_rules};
use strata_storage::{GraphStore, MemoryStore};

const SOURCE: &str = "@prefix ex: <http://example.org/> .
    -> (ex:Manager rdfs:subClassOf ex:Employee) .
    [inst: (?x rdf:type ?c) (?c rdfs:subClassOf ?d) -> (?x rdf:type ?d)]
    [paid: (?x rdf:type ex:Employee) -> (?x ex:receives ex:salary)]";

fn ex(local: &str) -> Node {
    Node::resource(format!("http://example.org/{local}"))
}

fn rdf_type() -> Node {
    Node::resource(strata_foundation::vocab::rdf::TYPE)
}

fn reasoned(verbosity: ProvenanceVerbosity) -> Reasoner {
    let rules = parse_rules(SOURCE).unwrap();
    let facts = parse_facts(
        "@prefix ex: <http://example.org/> .
         (ex:ann rdf:type ex:Manager)",
    )
    .unwrap();
    let mut store = MemoryStore::new();
    let base = store.create_graph(&"urn:org".into()).unwrap();
    store.insert_all(base, &facts).unwrap();

    let mut reasoner = Reasoner::with_config(ReasonerConfig::new().with_provenance(verbosity));
    reasoner.apply_axioms(&mut store, base, &rules).unwrap();
    reasoner.apply_rules(&mut store, base, base, &rules).unwrap();
    reasoner
}

#[test]
fn explanation_reaches_axioms_and_given_facts() {
    let reasoner = reasoned(ProvenanceVerbosity::Standard);
    let query = WhyQuery::new(reasoner.provenance());
    let salary = Triple::new(ex("ann"), ex("receives"), ex("salary"));

    let tree = query.why_depth(&salary, 5);

    assert_eq!(tree.rule(), Some("paid"));
    assert_eq!(tree.round(), Some(2));
    assert_eq!(tree.depth(), 3);

    let employee = &tree.premises[0];
    assert_eq!(employee.fact, Triple::new(ex("ann"), rdf_type(), ex("Employee")));
    assert_eq!(employee.rule(), Some("inst"));

    let origins: Vec<_> = employee.premises.iter().map(|p| &p.origin).collect();
    assert_eq!(origins[0], &Origin::Given);
    assert!(matches!(origins[1], Origin::Axiom(r) if r.round == 0));
}

#[test]
fn depth_limit_truncates_the_tree() {
    let reasoner = reasoned(ProvenanceVerbosity::Standard);
    let query = WhyQuery::new(reasoner.provenance());
    let salary = Triple::new(ex("ann"), ex("receives"), ex("salary"));

    let tree = query.why_depth(&salary, 1);

    assert_eq!(tree.depth(), 2);
    assert!(!tree.truncated);
    assert!(tree.premises[0].truncated);

    let mut prefixes = PrefixMap::new();
    prefixes.insert("ex", "http://example.org/");
    let text = tree.render(Some(&prefixes));
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "(ex:ann ex:receives ex:salary)  [paid, round 2]",
            "  (ex:ann rdf:type ex:Employee)  [inst, round 1]",
            "    ...",
        ]
    );
}

#[test]
fn minimal_provenance_has_no_premises() {
    let reasoner = reasoned(ProvenanceVerbosity::Minimal);
    let query = WhyQuery::new(reasoner.provenance());
    let salary = Triple::new(ex("ann"), ex("receives"), ex("salary"));

    let tree = query.why_depth(&salary, 5);
    assert!(tree.found());
    assert!(tree.premises.is_empty());
    assert_eq!(query.produced_by("inst").len(), 1);
}

#[test]
fn full_provenance_shows_bindings() {
    let reasoner = reasoned(ProvenanceVerbosity::Full);
    let query = WhyQuery::new(reasoner.provenance());
    let employee = Triple::new(ex("ann"), rdf_type(), ex("Employee"));

    let text = query.why_depth(&employee, 0).render(None);
    assert!(text.contains("with "));
    assert!(text.contains("?d=<http://example.org/Employee>"));
}

#[test]
fn nothing_is_recorded_when_provenance_is_off() {
    let reasoner = reasoned(ProvenanceVerbosity::Off);
    let query = WhyQuery::new(reasoner.provenance());
    let salary = Triple::new(ex("ann"), ex("receives"), ex("salary"));
    assert!(query.why(&salary).is_none());
    assert!(!query.why_depth(&salary, 3).found());
}
