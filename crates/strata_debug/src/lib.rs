//! Tracing and derivation explanations for strata.
//!
//! This crate provides:
//! - [`Tracer`] - A [`TraceSink`](strata_engine::TraceSink) that buffers and prints reasoner events
//! - [`TraceBuffer`] - Bounded ring of trace records, queryable by round
//! - [`HumanFormatter`] / [`JsonFormatter`] - Trace output formats
//! - [`WhyQuery`] - "Why is this fact here?" over provenance records
//! - [`ObservabilityConfig`] - One place to switch all of the above on

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod explain;
pub mod trace;

pub use config::ObservabilityConfig;
pub use explain::{Explanation, Origin, WhyQuery};
pub use trace::{
    HumanFormatter, JsonFormatter, TraceBuffer, TraceBufferStats, TraceFormatter, TraceOutput,
    TraceRecord, Tracer, TracerConfig,
};
