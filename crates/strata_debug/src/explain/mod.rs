//! Explanation system for strata.
//!
//! Answers "why is this fact here?" from the provenance records kept by
//! the reasoner:
//! - `:why <triple>` - the rule and round that derived it
//! - `:why <triple> <depth>` - the derivation tree down to `depth` levels

pub mod why;

pub use why::{Explanation, Origin, WhyQuery};
