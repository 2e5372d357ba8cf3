//! Lexer, parser, and rule model for the strata rule language.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of rule and fact sources
//! - [`Parser`] - Parsing tokens into [`Rule`]s and ground statements
//! - [`Rule`], [`ClauseEntry`], [`Term`] - The rule representation
//! - [`PrefixMap`] - Namespace prefix resolution
//! - [`RulePrinter`] - Printing rules back to source
//!
//! # Syntax
//!
//! ```text
//! @prefix ex: <http://example.org/> .
//!
//! [employees: (?x rdf:type ex:Employee) -> (?x rdf:type ex:Person)]
//!
//! older: (?a ex:age ?n) (?b ex:age ?m) greaterThan(?n, ?m)
//!     -> (?a ex:olderThan ?b) .
//!
//! -> (ex:schema rdf:type ex:Root) .
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod lexer;
pub mod parser;
pub mod prefix;
pub mod pretty;
pub mod rule;
pub mod token;

pub use lexer::Lexer;
pub use parser::{Parser, parse_facts, parse_facts_with, parse_rules, parse_rules_with};
pub use prefix::PrefixMap;
pub use pretty::{PrettyConfig, RulePrinter, format_node, format_triple};
pub use rule::{ClauseEntry, Functor, PatternNode, Rule, RuleSet, Term, TriplePattern, Var};
pub use token::{Span, Token, TokenKind};
