//! Parser integration tests
//!
//! Tests whole rule files mixing directives, axioms, bracketed and
//! unbracketed rules.

use strata_foundation::{ErrorKind, Node};
use strata_language::{
    ClauseEntry, Lexer, Parser, PrefixMap, TokenKind, parse_facts_with, parse_rules,
};

const FAMILY: &str = r#"
@prefix ex: <http://example.org/family#> .

# Every parent is a person.
-> (ex:Person rdf:type rdfs:Class) .

[parents: (?c ex:parent ?p) -> (?p rdf:type ex:Person)]

ancestor: (?c ex:parent ?p) -> (?c ex:ancestor ?p) .

[trans: (?a ex:ancestor ?b) (?b ex:ancestor ?c) -> (?a ex:ancestor ?c)]

[older: (?a ex:age ?x) (?b ex:age ?y) greaterThan(?x, ?y)
    -> (?a ex:olderThan ?b) print("older", ?a)]
"#;

#[test]
fn whole_file_in_source_order() {
    let set = parse_rules(FAMILY).unwrap();
    assert_eq!(set.len(), 5);
    assert_eq!(set.axioms().count(), 1);
    let names: Vec<_> = set.ordinary().map(|r| r.label()).collect();
    assert_eq!(names, vec!["parents", "ancestor", "trans", "older"]);
    assert!(set.get("trans").is_some());
    assert!(set.get("missing").is_none());
}

#[test]
fn anonymous_rules_are_labelled_by_line() {
    let set = parse_rules("\n\n[(?x rdf:type ?c) -> (?c rdf:type rdfs:Class)]").unwrap();
    assert_eq!(set.rules[0].label(), "<rule at line 3>");
}

#[test]
fn head_builtins_are_functor_clauses() {
    let set = parse_rules(FAMILY).unwrap();
    let older = set.get("older").unwrap();
    assert_eq!(older.body.len(), 3);
    assert!(matches!(&older.head[1], ClauseEntry::Functor(f) if f.name.as_ref() == "print"));
}

#[test]
fn prefixes_carry_into_fact_sources() {
    let set = parse_rules(FAMILY).unwrap();
    let facts = parse_facts_with("(ex:carol ex:parent ex:alice)", &set.prefixes).unwrap();
    assert_eq!(
        facts[0].object,
        Node::resource("http://example.org/family#alice")
    );
}

#[test]
fn parser_reports_prefixes_it_declared() {
    let mut parser = Parser::with_prefixes("@prefix a: <urn:a#> .\n(a:x a:y a:z)", PrefixMap::empty());
    let facts = parser.parse_facts().unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(parser.prefixes().get("a"), Some("urn:a#"));
    assert_eq!(parser.prefixes().get("rdf"), None);
}

#[test]
fn errors_point_at_the_offending_line() {
    let source = "@prefix ex: <urn:ex#> .\n[ok: (?x ex:p ?y) -> (?y ex:p ?x)]\n[bad: (?x ex:p ?y) -> (?y ex:p ?x)";
    let err = parse_rules(source).unwrap_err();
    match err.kind {
        ErrorKind::ParseError { line, .. } => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn lexer_spans_cover_the_source() {
    let source = "[r: (?x ex:p \"v\"@en) -> (?x ex:q 42)]";
    let tokens = Lexer::tokenize_all(source);
    assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
    for pair in tokens.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Arrow));
}
