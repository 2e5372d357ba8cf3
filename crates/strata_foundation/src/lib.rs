//! Core types for strata.
//!
//! This crate provides:
//! - [`Node`] - Ground RDF terms (resources, blank nodes, literals)
//! - [`Triple`] - A subject/predicate/object statement
//! - [`GraphId`] - Opaque handles to named graphs
//! - [`Error`] - Rich error types with context
//! - [`vocab`] - Well-known namespace constants

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod graph;
pub mod node;
pub mod vocab;

pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use graph::{GraphId, GraphName};
pub use node::{BlankId, Iri, Literal, Node, Structure, Triple};

/// Result type alias using strata's Error.
pub type Result<T> = std::result::Result<T, Error>;
