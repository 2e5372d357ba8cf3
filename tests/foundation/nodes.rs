//! Integration tests for nodes, triples and graph names

use strata_foundation::vocab::{rdf, xsd};
use strata_foundation::{GraphName, Iri, Literal, Node, Structure, Triple};

// =============================================================================
// Nodes
// =============================================================================

#[test]
fn node_kinds() {
    let r = Node::resource("http://example.org/a");
    let b = Node::blank("b0");
    let l = Node::literal("text");
    assert!(r.is_resource() && !r.is_literal() && !r.is_blank());
    assert!(b.is_blank());
    assert!(l.is_literal());
    assert_eq!(r.as_iri().map(Iri::as_str), Some("http://example.org/a"));
    assert!(b.as_literal().is_none());
}

#[test]
fn node_display() {
    assert_eq!(Node::resource("urn:x").to_string(), "<urn:x>");
    assert_eq!(Node::blank("b1").to_string(), "_:b1");
    assert_eq!(Node::literal("say \"hi\"").to_string(), "\"say \\\"hi\\\"\"");
    assert_eq!(
        Node::Literal(Literal::lang("chat", "fr")).to_string(),
        "\"chat\"@fr"
    );
}

#[test]
fn numeric_literals() {
    let n = Node::integer(42);
    let lit = n.as_literal().unwrap();
    assert_eq!(lit.as_integer(), Some(42));
    assert_eq!(lit.as_f64(), Some(42.0));
    assert_eq!(lit.lexical(), Some("42"));

    let d = Literal::decimal(2.0);
    assert_eq!(d.lexical(), Some("2.0"));
    assert_eq!(d.as_integer(), None);

    let typed = Literal::typed("7", Iri::new(xsd::INTEGER));
    assert_eq!(Node::Literal(typed), Node::integer(7));
    assert_eq!(Literal::plain("7").as_integer(), None);
}

#[test]
fn structured_literals() {
    let s = Structure::new("pair", vec![Node::integer(1), Node::literal("a")]);
    let node = Node::Literal(Literal::Structured(s.into()));
    assert!(node.is_structure());
    let lit = node.as_literal().unwrap();
    assert_eq!(lit.as_structure().unwrap().args.len(), 2);
    assert!(lit.lexical().is_none());
    assert!(node.to_string().starts_with("pair("));
}

// =============================================================================
// Triples
// =============================================================================

#[test]
fn valid_statements() {
    let p = Node::resource(rdf::TYPE);
    let ok = Triple::new(Node::blank("x"), p.clone(), Node::literal("v"));
    assert!(ok.is_valid_statement());

    let literal_subject = Triple::new(Node::literal("v"), p, Node::blank("x"));
    assert!(!literal_subject.is_valid_statement());

    let blank_predicate = Triple::new(Node::blank("x"), Node::blank("p"), Node::blank("y"));
    assert!(!blank_predicate.is_valid_statement());
}

#[test]
fn triples_order_and_hash_by_value() {
    use std::collections::HashSet;
    let t = |o: &str| {
        Triple::new(
            Node::resource("urn:s"),
            Node::resource("urn:p"),
            Node::resource(o),
        )
    };
    let set: HashSet<_> = [t("urn:a"), t("urn:a"), t("urn:b")].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert!(t("urn:a") < t("urn:b"));
}

// =============================================================================
// Graph names
// =============================================================================

#[test]
fn derived_graph_names() {
    let base = GraphName::from("urn:g");
    assert_eq!(base.stratum(1).as_str(), "urn:g#stratum-1");
    assert_eq!(base.stratum(12).as_str(), "urn:g#stratum-12");
    assert_eq!(base.axioms().as_str(), "urn:g#axioms");
}
