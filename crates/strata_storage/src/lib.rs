//! Graph store contract and in-memory triple storage for strata.
//!
//! This crate provides:
//! - [`GraphStore`] - The connection contract the reasoner runs against
//! - [`Lookup`] - Pattern lookups with wildcard positions
//! - [`MemoryStore`] - Transactional in-memory store with structural sharing
//! - [`GraphIndex`] - Per-graph subject/predicate/object indices

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod index;
pub mod memory;
pub mod store;

pub use index::GraphIndex;
pub use memory::MemoryStore;
pub use store::{GraphStore, Lookup, Statements};
