//! Per-round rule context.
//!
//! A [`RuleContext`] binds one round to its graphs: everything known
//! before the round, the delta produced by the previous round, and the
//! stratum the round writes to. Derived facts are buffered in memory and
//! written with a single insert and commit by [`RuleContext::flush_pending`],
//! so nothing derived in a round is matchable until the next one.

use std::collections::HashSet;

use strata_foundation::{GraphId, Result, Triple};
use strata_storage::{GraphStore, Lookup};

use crate::builtin::FactSource;

/// Facts that count as new for a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delta {
    /// Every known fact is new (the first round).
    All,
    /// Only facts in these graphs are new.
    Graphs(Vec<GraphId>),
}

/// Graph bindings and pending buffer for one round.
pub struct RuleContext<'s, S: GraphStore + ?Sized> {
    store: &'s mut S,
    /// Graphs visible before this round, including the delta.
    known: Vec<GraphId>,
    /// Known graphs minus the delta.
    old: Vec<GraphId>,
    delta: Delta,
    stratum: GraphId,
    pending: Vec<Triple>,
    pending_set: HashSet<Triple>,
    first_round: bool,
}

impl<'s, S: GraphStore + ?Sized> RuleContext<'s, S> {
    /// Creates a context writing to `stratum`.
    pub fn new(
        store: &'s mut S,
        known: Vec<GraphId>,
        delta: Delta,
        stratum: GraphId,
        first_round: bool,
    ) -> Self {
        let old = match &delta {
            Delta::All => Vec::new(),
            Delta::Graphs(graphs) => known
                .iter()
                .copied()
                .filter(|g| !graphs.contains(g))
                .collect(),
        };
        Self {
            store,
            known,
            old,
            delta,
            stratum,
            pending: Vec::new(),
            pending_set: HashSet::new(),
            first_round,
        }
    }

    /// Returns the stratum this round writes to.
    #[must_use]
    pub fn stratum(&self) -> GraphId {
        self.stratum
    }

    /// Returns true in the first round of an `apply_rules` call.
    #[must_use]
    pub fn is_first_round(&self) -> bool {
        self.first_round
    }

    /// Returns the facts that count as new this round.
    #[must_use]
    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    /// Returns the number of facts staged so far.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Stages a derived fact. No store I/O happens until the flush.
    pub fn add(&mut self, triple: Triple) {
        if self.pending_set.insert(triple.clone()) {
            self.pending.push(triple);
        }
    }

    /// Returns true if the fact is already staged, known, or in the
    /// current stratum.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn contains(&self, triple: &Triple) -> Result<bool> {
        if self.pending_set.contains(triple) {
            return Ok(true);
        }
        if self.store.contains(triple, &self.known)? {
            return Ok(true);
        }
        self.store.contains(triple, &[self.stratum])
    }

    /// Looks up facts that were known before the previous round.
    ///
    /// In the first round every known fact is new, so this finds nothing.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn find_base(&self, lookup: &Lookup) -> Result<Vec<Triple>> {
        if self.old.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.get_statements(lookup, &self.old)?.collect())
    }

    /// Looks up facts that are new this round.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn find_update(&self, lookup: &Lookup) -> Result<Vec<Triple>> {
        let graphs = match &self.delta {
            Delta::All => &self.known,
            Delta::Graphs(graphs) => graphs,
        };
        if graphs.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.get_statements(lookup, graphs)?.collect())
    }

    /// Looks up every visible fact, tagging each with whether it is new.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn find(&self, lookup: &Lookup) -> Result<Vec<(Triple, bool)>> {
        let mut found: Vec<_> = self
            .find_base(lookup)?
            .into_iter()
            .map(|t| (t, false))
            .collect();
        found.extend(self.find_update(lookup)?.into_iter().map(|t| (t, true)));
        Ok(found)
    }

    /// Returns true if any new fact matches, for candidate filtering.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn delta_has_match(&self, lookup: &Lookup) -> Result<bool> {
        let graphs = match &self.delta {
            Delta::All => &self.known,
            Delta::Graphs(graphs) => graphs,
        };
        if graphs.is_empty() {
            return Ok(false);
        }
        Ok(self.store.get_statements(lookup, graphs)?.next().is_some())
    }

    /// Writes the pending facts to the stratum in one insert and commits.
    /// Returns the number written. Staged inserts are rolled back if the
    /// insert or commit fails.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn flush_pending(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let count = self.pending.len();
        let written = self
            .store
            .add_base(self.stratum, &self.pending)
            .and_then(|()| self.store.commit());
        if let Err(err) = written {
            self.store.rollback();
            return Err(err);
        }
        self.pending.clear();
        self.pending_set.clear();
        Ok(count)
    }
}

impl<S: GraphStore + ?Sized> FactSource for RuleContext<'_, S> {
    fn has_match(&self, lookup: &Lookup) -> Result<bool> {
        if self.pending.iter().any(|t| lookup.matches(t)) {
            return Ok(true);
        }
        Ok(self.store.get_statements(lookup, &self.known)?.next().is_some())
    }
}
