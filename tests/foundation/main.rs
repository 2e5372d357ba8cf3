//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Node, Triple, GraphName, Error.

mod errors;
mod nodes;
