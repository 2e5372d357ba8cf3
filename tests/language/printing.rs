//! Printer integration tests

use strata_foundation::{Node, Triple};
use strata_language::{PrefixMap, PrettyConfig, RulePrinter, format_node, format_triple, parse_rules};

#[test]
fn printed_rule_set_reparses_to_the_same_rules() {
    let source = "@prefix ex: <http://example.org/> .\n\
        [r1: (?a ex:p ?b) notEqual(?a, ?b) -> (?b ex:p ?a)]\n\
        [r2: (?a ex:q pair(?b, 3)) -> (?a ex:r \"x\"@en)]\n\
        [-> (ex:s ex:t ex:u)]";
    let set = parse_rules(source).unwrap();
    let printed = set.to_string();
    let reparsed = parse_rules(&printed).unwrap();
    assert_eq!(reparsed.len(), set.len());
    for (a, b) in set.rules.iter().zip(&reparsed.rules) {
        assert_eq!(a.body, b.body);
        assert_eq!(a.head, b.head);
        assert_eq!(a.name, b.name);
    }
}

#[test]
fn multi_line_rules_put_clauses_on_lines() {
    let set = parse_rules("[r: (?a rdf:type ?b) (?b rdf:type ?c) -> (?a rdf:type ?c)]").unwrap();
    let text = RulePrinter::new(&set.rules[0])
        .with_prefixes(&set.prefixes)
        .with_config(PrettyConfig { multi_line: true })
        .to_string();
    assert!(text.lines().count() > 1);
    assert!(parse_rules(&text).is_ok());
}

#[test]
fn statements_compact_with_prefixes() {
    let mut prefixes = PrefixMap::new();
    prefixes.insert("ex", "http://example.org/");
    let triple = Triple::new(
        Node::resource("http://example.org/a"),
        Node::resource("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
        Node::resource("urn:other"),
    );
    assert_eq!(
        format_triple(&triple, Some(&prefixes)),
        "(ex:a rdf:type <urn:other>)"
    );
    assert_eq!(format_node(&triple.subject, None), "<http://example.org/a>");
}
