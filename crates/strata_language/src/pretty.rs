//! Pretty-printer for rules, statements, and nodes.
//!
//! Output is valid rule-language source: printing a rule and parsing the
//! result with the same prefixes yields an equal rule.
//!
//! # Example
//!
//! ```
//! use strata_language::{parse_rules, RulePrinter};
//!
//! let set = parse_rules("[r: (?x rdf:type ?c) -> (?c rdf:type rdfs:Class)]").unwrap();
//! let text = RulePrinter::new(&set.rules[0]).with_prefixes(&set.prefixes).to_string();
//! assert_eq!(text, "[r: (?x rdf:type ?c) -> (?c rdf:type rdfs:Class)]");
//! ```

use std::fmt::{self, Write};

use strata_foundation::vocab::xsd;
use strata_foundation::{Literal, Node, Triple};

use crate::prefix::PrefixMap;
use crate::rule::{ClauseEntry, Functor, PatternNode, Rule, RuleSet, Term};

/// Formatting options.
#[derive(Debug, Clone, Default)]
pub struct PrettyConfig {
    /// Put each clause on its own line.
    pub multi_line: bool,
}

/// Displays a rule in surface syntax.
pub struct RulePrinter<'a> {
    rule: &'a Rule,
    prefixes: Option<&'a PrefixMap>,
    config: PrettyConfig,
}

impl<'a> RulePrinter<'a> {
    /// Creates a printer that writes full IRIs.
    #[must_use]
    pub fn new(rule: &'a Rule) -> Self {
        Self {
            rule,
            prefixes: None,
            config: PrettyConfig::default(),
        }
    }

    /// Shortens IRIs using the given prefixes.
    #[must_use]
    pub fn with_prefixes(mut self, prefixes: &'a PrefixMap) -> Self {
        self.prefixes = Some(prefixes);
        self
    }

    /// Sets formatting options.
    #[must_use]
    pub fn with_config(mut self, config: PrettyConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Display for RulePrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer {
            rule: self.rule,
            prefixes: self.prefixes,
            multi_line: self.config.multi_line,
            output: String::new(),
        };
        printer.print_rule(self.rule, 0);
        f.write_str(&printer.output)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        RulePrinter::new(self).fmt(f)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prefix, ns) in self.prefixes.iter() {
            writeln!(f, "@prefix {prefix}: <{ns}> .")?;
        }
        for rule in &self.rules {
            writeln!(f, "{}", RulePrinter::new(rule).with_prefixes(&self.prefixes))?;
        }
        Ok(())
    }
}

/// Formats a node, shortening IRIs where a prefix matches.
#[must_use]
pub fn format_node(node: &Node, prefixes: Option<&PrefixMap>) -> String {
    let mut out = String::new();
    write_node(&mut out, node, prefixes);
    out
}

/// Formats a statement as `(s p o)`.
#[must_use]
pub fn format_triple(triple: &Triple, prefixes: Option<&PrefixMap>) -> String {
    let mut out = String::from("(");
    write_node(&mut out, &triple.subject, prefixes);
    out.push(' ');
    write_node(&mut out, &triple.predicate, prefixes);
    out.push(' ');
    write_node(&mut out, &triple.object, prefixes);
    out.push(')');
    out
}

fn write_node(out: &mut String, node: &Node, prefixes: Option<&PrefixMap>) {
    match node {
        Node::Resource(iri) => write_iri(out, iri.as_str(), prefixes),
        Node::Blank(id) => {
            let _ = write!(out, "_:{}", id.as_str());
        }
        Node::Literal(literal) => write_literal(out, literal, prefixes),
    }
}

fn write_iri(out: &mut String, iri: &str, prefixes: Option<&PrefixMap>) {
    match prefixes.and_then(|p| p.compact(iri)) {
        Some(short) if is_printable_local(&short) => out.push_str(&short),
        _ => {
            let _ = write!(out, "<{iri}>");
        }
    }
}

/// A compacted name is only usable if its local part lexes back as one
/// name token.
fn is_printable_local(short: &str) -> bool {
    let local = short.split_once(':').map_or("", |(_, l)| l);
    !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

fn write_literal(out: &mut String, literal: &Literal, prefixes: Option<&PrefixMap>) {
    match literal {
        Literal::Typed { lexical, datatype } => {
            let bare = match datatype.as_str() {
                xsd::INTEGER => lexical.parse::<i64>().is_ok(),
                xsd::DECIMAL => {
                    lexical.contains('.') && lexical.parse::<f64>().is_ok_and(f64::is_finite)
                }
                xsd::BOOLEAN => matches!(lexical.as_ref(), "true" | "false"),
                _ => false,
            };
            if bare {
                out.push_str(lexical);
            } else {
                write_string(out, lexical);
                out.push_str("^^");
                write_iri(out, datatype.as_str(), prefixes);
            }
        }
        Literal::Plain(text) => write_string(out, text),
        Literal::Lang { lexical, language } => {
            write_string(out, lexical);
            let _ = write!(out, "@{language}");
        }
        Literal::Structured(structure) => {
            out.push_str(&structure.name);
            out.push('(');
            for (i, arg) in structure.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_node(out, arg, prefixes);
            }
            out.push(')');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Printer state for one rule. Variable names come from the outermost rule.
struct Printer<'a> {
    rule: &'a Rule,
    prefixes: Option<&'a PrefixMap>,
    multi_line: bool,
    output: String,
}

impl Printer<'_> {
    fn print_rule(&mut self, rule: &Rule, depth: usize) {
        self.output.push('[');
        if let Some(name) = &rule.name {
            let _ = write!(self.output, "{name}: ");
        }
        self.print_clauses(&rule.body, depth);
        if rule.body.is_empty() {
            self.output.push_str("->");
        } else {
            self.separator(depth);
            self.output.push_str("->");
        }
        if !rule.head.is_empty() {
            self.separator(depth);
        }
        self.print_clauses(&rule.head, depth);
        self.output.push(']');
    }

    fn separator(&mut self, depth: usize) {
        if self.multi_line {
            self.output.push('\n');
            for _ in 0..=depth {
                self.output.push_str("    ");
            }
        } else {
            self.output.push(' ');
        }
    }

    fn print_clauses(&mut self, clauses: &[ClauseEntry], depth: usize) {
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                self.separator(depth);
            }
            match clause {
                ClauseEntry::Triple(pattern) => {
                    self.output.push('(');
                    self.print_pattern_node(&pattern.subject);
                    self.output.push(' ');
                    self.print_term(&pattern.predicate);
                    self.output.push(' ');
                    self.print_pattern_node(&pattern.object);
                    self.output.push(')');
                }
                ClauseEntry::Functor(functor) => self.print_functor(functor),
                ClauseEntry::Rule(nested) => self.print_rule(nested, depth + 1),
            }
        }
    }

    fn print_pattern_node(&mut self, node: &PatternNode) {
        match node {
            PatternNode::Term(term) => self.print_term(term),
            PatternNode::Functor(functor) => self.print_functor(functor),
        }
    }

    fn print_functor(&mut self, functor: &Functor) {
        self.output.push_str(&functor.name);
        self.output.push('(');
        for (i, arg) in functor.args.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.print_term(arg);
        }
        self.output.push(')');
    }

    fn print_term(&mut self, term: &Term) {
        match term {
            Term::Constant(node) => write_node(&mut self.output, node, self.prefixes),
            Term::Variable(var) => {
                let _ = write!(self.output, "?{}", self.rule.var_name(*var));
            }
            Term::Wildcard => self.output.push('*'),
        }
    }
}
