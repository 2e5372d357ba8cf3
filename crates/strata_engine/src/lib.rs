//! Forward-chaining reasoner for strata.
//!
//! This crate provides:
//! - [`Reasoner`] - Axiom application and the stratified fixpoint loop
//! - [`BindingEnv`] - Variable bindings with a backtracking trail
//! - [`RuleContext`] - Per-round graph bindings and pending buffer
//! - [`RulePlan`] - Compiled join order for a rule body
//! - [`BuiltinRegistry`] - Builtin predicates and head actions
//! - [`Diagnostics`] - Per-session statistics and trace events
//! - [`ProvenanceTracker`] - Which rule derived which fact
//!
//! # Example
//!
//! ```
//! use strata_engine::Reasoner;
//! use strata_language::{parse_facts, parse_rules};
//! use strata_storage::{GraphStore, MemoryStore};
//!
//! let rules = parse_rules(
//!     "@prefix ex: <http://example.org/> .
//!      [r: (?x rdf:type ex:Employee) -> (?x rdf:type ex:Person)]",
//! )?;
//! let facts = parse_facts(
//!     "@prefix ex: <http://example.org/> .
//!      (ex:alice rdf:type ex:Employee)",
//! )?;
//!
//! let mut store = MemoryStore::new();
//! let base = store.create_graph(&"urn:example".into())?;
//! store.insert_all(base, &facts)?;
//!
//! let mut reasoner = Reasoner::new();
//! reasoner.apply_axioms(&mut store, base, &rules)?;
//! let strata = reasoner.apply_rules(&mut store, base, base, &rules)?;
//! assert_eq!(strata.len(), 1);
//! # Ok::<(), strata_foundation::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binding;
pub mod builtin;
pub mod config;
pub mod context;
pub mod diagnostics;
mod matcher;
pub mod plan;
pub mod provenance;
pub mod reasoner;

pub use binding::BindingEnv;
pub use builtin::{Arity, Builtin, BuiltinRegistry, Call, FactSource};
pub use config::ReasonerConfig;
pub use context::{Delta, RuleContext};
pub use diagnostics::{Diagnostics, ReasonerEvent, ReasonerStats, TraceSink};
pub use plan::{HeadAction, RulePlan, Step, validate_axiom};
pub use provenance::{DerivationRecord, ProvenanceTracker, ProvenanceVerbosity};
pub use reasoner::{Reasoner, apply_axioms, apply_rules};
