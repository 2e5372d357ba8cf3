//! Reasoner configuration.

use crate::provenance::ProvenanceVerbosity;

/// Configuration for a [`Reasoner`](crate::Reasoner).
///
/// The defaults run the fixpoint to completion with no caps, filter
/// candidate rules per round, and keep no provenance.
#[derive(Clone, Debug)]
pub struct ReasonerConfig {
    /// Maximum number of rounds, counting the final round that derives
    /// nothing. `None` means unbounded.
    pub max_rounds: Option<u32>,

    /// Maximum number of facts derived by one `apply_rules` call.
    pub max_derivations: Option<usize>,

    /// Skip rules whose body cannot match anything in the previous round's
    /// output.
    pub filter_rules: bool,

    /// How much derivation history to keep.
    pub provenance: ProvenanceVerbosity,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            max_derivations: None,
            filter_rules: true,
            provenance: ProvenanceVerbosity::Off,
        }
    }
}

impl ReasonerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that records full provenance.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            provenance: ProvenanceVerbosity::Full,
            ..Self::default()
        }
    }

    /// Builder method to cap the number of rounds.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Builder method to cap the number of derived facts.
    #[must_use]
    pub fn with_max_derivations(mut self, derivations: usize) -> Self {
        self.max_derivations = Some(derivations);
        self
    }

    /// Builder method to evaluate every rule in every round.
    #[must_use]
    pub fn without_rule_filtering(mut self) -> Self {
        self.filter_rules = false;
        self
    }

    /// Builder method to set provenance verbosity.
    #[must_use]
    pub fn with_provenance(mut self, verbosity: ProvenanceVerbosity) -> Self {
        self.provenance = verbosity;
        self
    }
}
