//! Trace record type.

use strata_engine::ReasonerEvent;

/// A reasoner event with its position in the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Unique record ID within the session.
    pub id: u64,
    /// The round the event belongs to; 0 before the first round.
    pub round: u32,
    /// Timestamp in nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The event.
    pub event: ReasonerEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, round: u32, timestamp_ns: u64, event: ReasonerEvent) -> Self {
        Self {
            id,
            round,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.kind()
    }

    /// Returns true for round start, round end and convergence events.
    #[must_use]
    pub fn is_round_boundary(&self) -> bool {
        matches!(
            self.event,
            ReasonerEvent::RoundStarted { .. }
                | ReasonerEvent::RoundCompleted { .. }
                | ReasonerEvent::Converged { .. }
        )
    }

    /// Returns true for events that add or reject a fact.
    #[must_use]
    pub fn is_fact_event(&self) -> bool {
        matches!(
            self.event,
            ReasonerEvent::FactDerived { .. }
                | ReasonerEvent::DuplicateSuppressed { .. }
                | ReasonerEvent::AxiomAsserted { .. }
                | ReasonerEvent::AxiomPresent { .. }
        )
    }
}
