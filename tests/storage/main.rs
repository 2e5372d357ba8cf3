//! Integration tests for Layer 1: Storage
//!
//! Tests for the graph store contract as implemented by MemoryStore.

mod memory_store;
