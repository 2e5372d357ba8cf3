//! Tracing of reasoner sessions.
//!
//! A [`Tracer`] is a [`TraceSink`]: install it on a reasoner and every
//! event lands in a bounded [`TraceBuffer`], optionally echoed to stderr
//! as it happens. Nothing is recorded while the tracer is disabled, and
//! the reasoner skips building events altogether.
//!
//! ```text
//! :trace on        enable tracing
//! :run             events are printed as the fixpoint runs
//! :trace last 20   show recent records
//! :trace round 2   show one round
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::TraceRecord;

use std::io::{self, Write};
use std::time::Instant;

use strata_engine::{ReasonerEvent, TraceSink};
use strata_language::PrefixMap;

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Where trace output is sent as events arrive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// Buffer only.
    #[default]
    None,
    /// Also write each record to stderr.
    Stderr,
}

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in the buffer.
    pub buffer_size: usize,
    /// Where to echo records.
    pub output: TraceOutput,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Event types to keep (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to echo to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to keep only some event types.
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records reasoner events.
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    current_round: u32,
    start_time: Instant,
    prefixes: Option<PrefixMap>,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl Tracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer = TraceBuffer::new(config.buffer_size);
        Self {
            config,
            buffer,
            current_round: 0,
            start_time: Instant::now(),
            prefixes: None,
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a disabled tracer.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that echoes to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Sets where records are echoed.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Sets the prefixes used to shorten IRIs in formatted output.
    pub fn set_prefixes(&mut self, prefixes: PrefixMap) {
        self.prefixes = Some(prefixes);
    }

    /// Returns the round of the most recent round-start event.
    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Records an event. Returns immediately when disabled.
    #[inline]
    pub fn push(&mut self, event: ReasonerEvent) {
        if !self.config.enabled {
            return;
        }
        self.push_internal(event);
    }

    fn push_internal(&mut self, event: ReasonerEvent) {
        match &event {
            ReasonerEvent::RoundStarted { round, .. } => self.current_round = *round,
            ReasonerEvent::AxiomAsserted { .. } | ReasonerEvent::AxiomPresent { .. } => {
                self.current_round = 0;
            }
            _ => {}
        }

        if !self.config.event_filter.is_empty()
            && !self.config.event_filter.iter().any(|t| t == event.kind())
        {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        self.buffer.push(self.current_round, timestamp_ns, event);

        if self.config.output == TraceOutput::Stderr {
            if let Some(record) = self.buffer.last() {
                let line = self.format_record(record);
                let _ = writeln!(io::stderr(), "{line}");
            }
        }
    }

    /// Formats a record using the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord) -> String {
        if self.config.json_format {
            self.json_formatter.format(record, self.prefixes.as_ref())
        } else {
            self.human_formatter.format(record, self.prefixes.as_ref())
        }
    }

    /// Formats several records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord]) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records, self.prefixes.as_ref())
        } else {
            self.human_formatter.format_many(records, self.prefixes.as_ref())
        }
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Clears the trace buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl TraceSink for Tracer {
    fn record(&mut self, event: ReasonerEvent) {
        self.push(event);
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}
