//! Provenance tracking.
//!
//! Records which rule derived each fact, in which round, and from which
//! premises, so the debugger can answer "why is this fact here?".
//! Only the first derivation of a fact is kept; later rounds can never
//! re-derive it because duplicates are suppressed.

use std::collections::HashMap;

use strata_foundation::{Node, Triple};

/// Verbosity level for provenance tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProvenanceVerbosity {
    /// Nothing is recorded.
    #[default]
    Off,

    /// Rule and round only.
    Minimal,

    /// Rule, round, and the premises the body matched.
    Standard,

    /// Standard plus a snapshot of the variable bindings.
    Full,
}

impl ProvenanceVerbosity {
    /// Returns true if anything is recorded.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }

    /// Returns true if premises are recorded.
    #[must_use]
    pub fn keeps_premises(self) -> bool {
        self >= Self::Standard
    }
}

/// How one fact came to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationRecord {
    /// Label of the rule that produced the fact.
    pub rule: String,

    /// Round in which it was produced; 0 for axioms.
    pub round: u32,

    /// Statements matched by the rule body (Standard+).
    pub premises: Vec<Triple>,

    /// Variable bindings at derivation time (Full only).
    pub bindings: Option<Vec<(String, Node)>>,
}

impl DerivationRecord {
    /// Creates a record with no premises.
    #[must_use]
    pub fn new(rule: impl Into<String>, round: u32) -> Self {
        Self {
            rule: rule.into(),
            round,
            premises: Vec::new(),
            bindings: None,
        }
    }

    /// Sets the matched premises.
    #[must_use]
    pub fn with_premises(mut self, premises: Vec<Triple>) -> Self {
        self.premises = premises;
        self
    }

    /// Sets the bindings snapshot.
    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<(String, Node)>) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Returns true if the fact was asserted as an axiom.
    #[must_use]
    pub fn is_axiom(&self) -> bool {
        self.round == 0
    }
}

/// Derivation records keyed by fact.
#[derive(Clone, Debug, Default)]
pub struct ProvenanceTracker {
    records: HashMap<Triple, DerivationRecord>,
    verbosity: ProvenanceVerbosity,
}

impl ProvenanceTracker {
    /// Creates a tracker that records nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker with the given verbosity.
    #[must_use]
    pub fn with_verbosity(verbosity: ProvenanceVerbosity) -> Self {
        Self {
            records: HashMap::new(),
            verbosity,
        }
    }

    /// Returns the current verbosity level.
    #[must_use]
    pub fn verbosity(&self) -> ProvenanceVerbosity {
        self.verbosity
    }

    /// Sets the verbosity level. Switching off clears existing records.
    pub fn set_verbosity(&mut self, verbosity: ProvenanceVerbosity) {
        if !verbosity.is_enabled() {
            self.records.clear();
        }
        self.verbosity = verbosity;
    }

    /// Records the derivation of a fact, trimmed to the current verbosity.
    /// The first record for a fact wins.
    pub fn record(&mut self, fact: Triple, mut record: DerivationRecord) {
        if !self.verbosity.is_enabled() {
            return;
        }
        if !self.verbosity.keeps_premises() {
            record.premises.clear();
        }
        if self.verbosity != ProvenanceVerbosity::Full {
            record.bindings = None;
        }
        self.records.entry(fact).or_insert(record);
    }

    /// Answers "why is this fact here?".
    #[must_use]
    pub fn why(&self, fact: &Triple) -> Option<&DerivationRecord> {
        self.records.get(fact)
    }

    /// Returns the round in which a fact was derived.
    #[must_use]
    pub fn derived_in_round(&self, fact: &Triple) -> Option<u32> {
        self.records.get(fact).map(|r| r.round)
    }

    /// Returns every fact produced by a rule, ordered by round.
    #[must_use]
    pub fn facts_by_rule(&self, rule: &str) -> Vec<(&Triple, &DerivationRecord)> {
        let mut facts: Vec<_> = self
            .records
            .iter()
            .filter(|(_, r)| r.rule == rule)
            .collect();
        facts.sort_by(|a, b| (a.1.round, a.0).cmp(&(b.1.round, b.0)));
        facts
    }

    /// Returns the number of recorded facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates all records.
    pub fn iter(&self) -> impl Iterator<Item = (&Triple, &DerivationRecord)> {
        self.records.iter()
    }

    /// Clears all provenance data.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
