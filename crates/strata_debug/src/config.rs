//! Configuration for the observability system.

use strata_engine::{ProvenanceVerbosity, ReasonerConfig};

use crate::trace::TracerConfig;

/// Configuration for tracing and provenance.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Whether trace events are collected.
    pub tracing: bool,

    /// Provenance verbosity for the reasoner.
    pub verbosity: ProvenanceVerbosity,

    /// Trace buffer size (records).
    pub buffer_size: usize,

    /// Default depth for why-queries.
    pub why_depth: usize,

    /// Output trace to stderr as events arrive.
    pub trace_to_stderr: bool,

    /// Output format: true for JSON, false for human-readable.
    pub json_output: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            tracing: false,
            verbosity: ProvenanceVerbosity::Standard,
            buffer_size: 10_000,
            why_depth: 1,
            trace_to_stderr: false,
            json_output: false,
        }
    }
}

impl ObservabilityConfig {
    /// Creates a configuration with tracing to stderr.
    #[must_use]
    pub fn tracing() -> Self {
        Self {
            tracing: true,
            trace_to_stderr: true,
            ..Self::default()
        }
    }

    /// Creates a configuration for debugging: full provenance and deep
    /// why-queries.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            tracing: true,
            verbosity: ProvenanceVerbosity::Full,
            why_depth: 10,
            ..Self::default()
        }
    }

    /// Builder method to set provenance verbosity.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: ProvenanceVerbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Builder method to set the default why depth.
    #[must_use]
    pub fn with_why_depth(mut self, depth: usize) -> Self {
        self.why_depth = depth;
        self
    }

    /// Builder method to enable/disable JSON output.
    #[must_use]
    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// Returns the matching tracer configuration.
    #[must_use]
    pub fn tracer_config(&self) -> TracerConfig {
        let mut config = TracerConfig::new().with_buffer_size(self.buffer_size);
        if self.tracing {
            config = config.enabled();
        }
        if self.trace_to_stderr {
            config = config.to_stderr();
        }
        if self.json_output {
            config = config.json();
        }
        config
    }

    /// Applies the provenance setting to a reasoner configuration.
    #[must_use]
    pub fn apply_to(&self, reasoner: ReasonerConfig) -> ReasonerConfig {
        reasoner.with_provenance(self.verbosity)
    }
}
