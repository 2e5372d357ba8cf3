//! Per-session statistics and trace events.
//!
//! Every [`Reasoner`](crate::Reasoner) owns one [`Diagnostics`] handle:
//! counters that accumulate across calls until reset, plus an optional
//! [`TraceSink`] that receives a [`ReasonerEvent`] for every step of
//! evaluation. No state is shared between reasoners.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use strata_foundation::Triple;

// =============================================================================
// Statistics
// =============================================================================

/// Counters accumulated by one reasoner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReasonerStats {
    /// Rounds run by `apply_rules`, including the final empty round.
    pub rounds: u64,
    /// Stratum graphs kept.
    pub strata_created: u64,
    /// Body match attempts per rule label.
    pub rule_attempts: BTreeMap<String, u64>,
    /// Rules skipped by candidate filtering.
    pub rules_skipped: u64,
    /// Facts derived and inserted.
    pub facts_derived: u64,
    /// Head instantiations that were already known.
    pub duplicates_suppressed: u64,
    /// Head instantiations dropped because they are not legal statements.
    pub invalid_heads_dropped: u64,
    /// Axiom facts inserted.
    pub axioms_asserted: u64,
}

impl ReasonerStats {
    /// Returns the number of match attempts made for a rule.
    #[must_use]
    pub fn attempts(&self, rule: &str) -> u64 {
        self.rule_attempts.get(rule).copied().unwrap_or(0)
    }

    /// Returns the total number of match attempts.
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.rule_attempts.values().sum()
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for ReasonerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rounds:                {}", self.rounds)?;
        writeln!(f, "strata created:        {}", self.strata_created)?;
        writeln!(f, "facts derived:         {}", self.facts_derived)?;
        writeln!(f, "axioms asserted:       {}", self.axioms_asserted)?;
        writeln!(f, "duplicates suppressed: {}", self.duplicates_suppressed)?;
        writeln!(f, "invalid heads dropped: {}", self.invalid_heads_dropped)?;
        writeln!(f, "rules skipped:         {}", self.rules_skipped)?;
        write!(f, "match attempts:        {}", self.total_attempts())?;
        for (rule, count) in &self.rule_attempts {
            write!(f, "\n  {rule}: {count}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Events
// =============================================================================

/// Events emitted while applying axioms and rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReasonerEvent {
    /// An axiom fact was inserted.
    AxiomAsserted {
        /// The fact.
        fact: Triple,
    },

    /// An axiom fact was already present and not inserted again.
    AxiomPresent {
        /// The fact.
        fact: Triple,
    },

    /// A round has started.
    RoundStarted {
        /// Round number (1-based within the call).
        round: u32,
        /// Name of the stratum graph the round writes to.
        stratum: String,
    },

    /// A rule was skipped by candidate filtering.
    RuleSkipped {
        /// The round.
        round: u32,
        /// The rule label.
        rule: String,
    },

    /// A rule was evaluated.
    RuleEvaluated {
        /// The round.
        round: u32,
        /// The rule label.
        rule: String,
        /// Number of new facts it staged.
        derived: usize,
    },

    /// A new fact was derived.
    FactDerived {
        /// The round.
        round: u32,
        /// The rule label.
        rule: String,
        /// The fact.
        fact: Triple,
    },

    /// A head instantiation was already known.
    DuplicateSuppressed {
        /// The round.
        round: u32,
        /// The rule label.
        rule: String,
        /// The fact.
        fact: Triple,
    },

    /// The `print` builtin produced a line.
    Printed {
        /// The rule label.
        rule: String,
        /// The printed text.
        text: String,
    },

    /// A round has finished.
    RoundCompleted {
        /// The round.
        round: u32,
        /// Facts inserted by the round.
        inserted: usize,
    },

    /// A round derived nothing; the fixpoint is reached.
    Converged {
        /// Rounds run, including the empty one.
        rounds: u32,
        /// Strata kept.
        strata: usize,
    },
}

impl ReasonerEvent {
    /// Short name of the event kind, used by trace filters and formatters.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AxiomAsserted { .. } => "axiom",
            Self::AxiomPresent { .. } => "axiom-present",
            Self::RoundStarted { .. } => "round-start",
            Self::RuleSkipped { .. } => "rule-skipped",
            Self::RuleEvaluated { .. } => "rule",
            Self::FactDerived { .. } => "derived",
            Self::DuplicateSuppressed { .. } => "duplicate",
            Self::Printed { .. } => "print",
            Self::RoundCompleted { .. } => "round-end",
            Self::Converged { .. } => "converged",
        }
    }

    /// Returns the round the event belongs to, if any.
    #[must_use]
    pub fn round(&self) -> Option<u32> {
        match self {
            Self::RoundStarted { round, .. }
            | Self::RuleSkipped { round, .. }
            | Self::RuleEvaluated { round, .. }
            | Self::FactDerived { round, .. }
            | Self::DuplicateSuppressed { round, .. }
            | Self::RoundCompleted { round, .. } => Some(*round),
            _ => None,
        }
    }

    /// Returns the rule the event concerns, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::RuleSkipped { rule, .. }
            | Self::RuleEvaluated { rule, .. }
            | Self::FactDerived { rule, .. }
            | Self::DuplicateSuppressed { rule, .. }
            | Self::Printed { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

/// Receiver of reasoner events.
pub trait TraceSink: Send {
    /// Records one event.
    fn record(&mut self, event: ReasonerEvent);

    /// Returns false if events would be discarded, letting the reasoner
    /// skip building them.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl TraceSink for Vec<ReasonerEvent> {
    fn record(&mut self, event: ReasonerEvent) {
        self.push(event);
    }
}

/// A sink shared with its owner, so the owner can read what was recorded
/// while the reasoner holds the other handle.
impl<T: TraceSink> TraceSink for Arc<Mutex<T>> {
    fn record(&mut self, event: ReasonerEvent) {
        if let Ok(mut sink) = self.lock() {
            sink.record(event);
        }
    }

    fn is_enabled(&self) -> bool {
        self.lock().is_ok_and(|sink| sink.is_enabled())
    }
}

// =============================================================================
// Diagnostics handle
// =============================================================================

/// Statistics plus an optional trace sink, owned by one reasoner.
#[derive(Default)]
pub struct Diagnostics {
    stats: ReasonerStats,
    sink: Option<Box<dyn TraceSink>>,
}

impl Diagnostics {
    /// Creates a handle with zeroed counters and no sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counters.
    #[must_use]
    pub fn stats(&self) -> &ReasonerStats {
        &self.stats
    }

    /// Returns the counters for update.
    pub fn stats_mut(&mut self) -> &mut ReasonerStats {
        &mut self.stats
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) -> Option<Box<dyn TraceSink>> {
        self.sink.replace(sink)
    }

    /// Removes the trace sink.
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// Returns true if events are being collected.
    #[must_use]
    pub fn is_tracing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.is_enabled())
    }

    /// Sends an event to the sink, if tracing. The event is only built when
    /// someone is listening.
    pub fn emit(&mut self, event: impl FnOnce() -> ReasonerEvent) {
        if let Some(sink) = self.sink.as_mut().filter(|sink| sink.is_enabled()) {
            sink.record(event());
        }
    }

    /// Zeroes the counters. The sink is kept.
    pub fn reset(&mut self) {
        self.stats.reset();
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("stats", &self.stats)
            .field("tracing", &self.is_tracing())
            .finish()
    }
}
