//! Multi-hop "why" queries over derivation records.
//!
//! # Example
//!
//! ```text
//! :why ex:a ex:ancestor ex:c
//! (ex:a ex:ancestor ex:c)  [ancestor-trans, round 2]
//!   (ex:a ex:parent ex:b)  [given]
//!   (ex:b ex:ancestor ex:c)  [ancestor-base, round 1]
//!     (ex:b ex:parent ex:c)  [given]
//! ```

use std::fmt::Write;

use strata_engine::{DerivationRecord, ProvenanceTracker};
use strata_foundation::Triple;
use strata_language::{format_node, format_triple, PrefixMap};

// =============================================================================
// Origin
// =============================================================================

/// Where a fact in an explanation came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Derived by a rule in a given round.
    Derived(DerivationRecord),
    /// Asserted by an axiom rule.
    Axiom(DerivationRecord),
    /// No record: the fact was loaded as data, or provenance was off.
    Given,
}

impl Origin {
    fn from_record(record: Option<&DerivationRecord>) -> Self {
        match record {
            Some(r) if r.is_axiom() => Self::Axiom(r.clone()),
            Some(r) => Self::Derived(r.clone()),
            None => Self::Given,
        }
    }

    /// Returns the derivation record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&DerivationRecord> {
        match self {
            Self::Derived(r) | Self::Axiom(r) => Some(r),
            Self::Given => None,
        }
    }
}

// =============================================================================
// Explanation
// =============================================================================

/// A derivation tree rooted at one fact.
#[derive(Clone, Debug)]
pub struct Explanation {
    /// The explained fact.
    pub fact: Triple,

    /// How the fact came to be.
    pub origin: Origin,

    /// Explanations of the premises, in body order.
    pub premises: Vec<Explanation>,

    /// True if the depth limit cut off further premises.
    pub truncated: bool,
}

impl Explanation {
    /// Returns the rule that derived the fact, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.origin.record().map(|r| r.rule.as_str())
    }

    /// Returns the round the fact was derived in, if any.
    #[must_use]
    pub fn round(&self) -> Option<u32> {
        self.origin.record().map(|r| r.round)
    }

    /// Returns true if the fact has a derivation record.
    #[must_use]
    pub fn found(&self) -> bool {
        self.origin != Origin::Given
    }

    /// Returns the depth of the tree (1 for a leaf).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.premises.iter().map(Explanation::depth).max().unwrap_or(0)
    }

    /// Renders the tree as indented text, one fact per line.
    #[must_use]
    pub fn render(&self, prefixes: Option<&PrefixMap>) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, prefixes);
        out
    }

    fn render_into(&self, out: &mut String, indent: usize, prefixes: Option<&PrefixMap>) {
        let pad = "  ".repeat(indent);
        let origin = match &self.origin {
            Origin::Derived(r) => format!("{}, round {}", r.rule, r.round),
            Origin::Axiom(r) => format!("axiom {}", r.rule),
            Origin::Given => "given".to_string(),
        };
        let _ = writeln!(out, "{pad}{}  [{origin}]", format_triple(&self.fact, prefixes));

        if let Some(bindings) = self.origin.record().and_then(|r| r.bindings.as_ref()) {
            let shown: Vec<_> = bindings
                .iter()
                .map(|(name, node)| format!("{name}={}", format_node(node, prefixes)))
                .collect();
            let _ = writeln!(out, "{pad}  with {}", shown.join(", "));
        }

        for premise in &self.premises {
            premise.render_into(out, indent + 1, prefixes);
        }
        if self.truncated {
            let _ = writeln!(out, "{pad}  ...");
        }
    }
}

// =============================================================================
// Why Query
// =============================================================================

/// Performs "why" queries against a provenance tracker.
pub struct WhyQuery<'a> {
    tracker: &'a ProvenanceTracker,
}

impl<'a> WhyQuery<'a> {
    /// Creates a new why query against the given tracker.
    #[must_use]
    pub fn new(tracker: &'a ProvenanceTracker) -> Self {
        Self { tracker }
    }

    /// Single-hop answer: the record of the rule that derived `fact`.
    #[must_use]
    pub fn why(&self, fact: &Triple) -> Option<&'a DerivationRecord> {
        self.tracker.why(fact)
    }

    /// Builds the derivation tree of `fact` down to `depth` levels.
    ///
    /// Depth 0 returns just the root with no premises expanded.
    #[must_use]
    pub fn why_depth(&self, fact: &Triple, depth: usize) -> Explanation {
        let record = self.tracker.why(fact);
        let origin = Origin::from_record(record);
        let premises = record.map(|r| r.premises.as_slice()).unwrap_or_default();

        if depth == 0 {
            return Explanation {
                fact: fact.clone(),
                origin,
                truncated: !premises.is_empty(),
                premises: Vec::new(),
            };
        }

        Explanation {
            fact: fact.clone(),
            origin,
            premises: premises
                .iter()
                .map(|p| self.why_depth(p, depth - 1))
                .collect(),
            truncated: false,
        }
    }

    /// Lists every fact a rule produced, ordered by round.
    #[must_use]
    pub fn produced_by(&self, rule: &str) -> Vec<&'a Triple> {
        self.tracker
            .facts_by_rule(rule)
            .into_iter()
            .map(|(fact, _)| fact)
            .collect()
    }
}
