//! Strata - forward-chaining rule engine over named graphs
//!
//! This crate re-exports every layer of the Strata system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: strata_runtime    - REPL, CLI, sessions
//! Layer 4: strata_debug      - Tracing, provenance queries
//! Layer 3: strata_engine     - Reasoner, rule plans, builtins
//! Layer 2: strata_language   - Lexer, parser, rule printing
//! Layer 1: strata_storage    - Graph store trait, in-memory store
//! Layer 0: strata_foundation - Nodes, triples, errors
//! ```

pub use strata_debug as debug;
pub use strata_engine as engine;
pub use strata_foundation as foundation;
pub use strata_language as language;
pub use strata_runtime as runtime;
pub use strata_storage as storage;
