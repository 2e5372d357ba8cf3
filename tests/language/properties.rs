//! Property tests over the rule language

use proptest::prelude::*;
use strata_foundation::{Node, Triple};
use strata_language::{PrefixMap, format_triple, parse_facts_with, parse_rules};

fn resource() -> impl Strategy<Value = Node> {
    "[a-z][a-z0-9]{0,6}".prop_map(|local| Node::resource(format!("http://example.org/{local}")))
}

fn object() -> impl Strategy<Value = Node> {
    prop_oneof![
        resource(),
        any::<i32>().prop_map(|n| Node::integer(i64::from(n))),
        "[a-zA-Z ]{0,12}".prop_map(Node::literal),
    ]
}

fn prefixes() -> PrefixMap {
    let mut map = PrefixMap::new();
    map.insert("ex", "http://example.org/");
    map
}

proptest! {
    #[test]
    fn printed_statements_parse_back(s in resource(), p in resource(), o in object()) {
        let triple = Triple::new(s, p, o);
        let map = prefixes();
        let text = format_triple(&triple, Some(&map));
        let parsed = parse_facts_with(&text, &map).unwrap();
        prop_assert_eq!(parsed, vec![triple]);
    }

    #[test]
    fn compact_then_expand_is_identity(local in "[a-z][a-z0-9]{0,8}") {
        let map = prefixes();
        let iri = format!("http://example.org/{local}");
        let short = map.compact(&iri).unwrap();
        let (prefix, rest) = short.split_once(':').unwrap();
        prop_assert_eq!(map.expand(prefix, rest), Some(iri));
    }

    #[test]
    fn variable_count_matches_distinct_names(names in prop::collection::vec("[a-e]", 1..6)) {
        let body: Vec<String> = names.iter().map(|n| format!("(?{n} rdf:p ?{n})")).collect();
        let source = format!("[r: {} -> (?{} rdf:q rdf:o)]", body.join(" "), names[0]);
        let set = parse_rules(&source).unwrap();
        let mut distinct = names.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(set.rules[0].var_count(), distinct.len());
    }
}
