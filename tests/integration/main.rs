//! Cross-layer integration tests for Strata
//!
//! Tests that verify correct interaction between multiple crates.

mod explain;
mod repl_session;
mod tracing;
