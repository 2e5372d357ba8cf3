//! Per-graph triple indices.
//!
//! Each graph keeps its statements in an ordered set plus one index per
//! position. All collections are persistent (`im`), so cloning a graph is
//! O(1) and snapshots share structure with the live store.

use im::{HashMap, OrdSet};
use strata_foundation::{Node, Triple};

use crate::store::Lookup;

/// Indexed statements of one named graph.
#[derive(Clone, Debug, Default)]
pub struct GraphIndex {
    /// All statements, ordered.
    triples: OrdSet<Triple>,
    /// Statements by subject.
    by_subject: HashMap<Node, OrdSet<Triple>>,
    /// Statements by predicate.
    by_predicate: HashMap<Node, OrdSet<Triple>>,
    /// Statements by object.
    by_object: HashMap<Node, OrdSet<Triple>>,
}

impl GraphIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns true if the statement is present.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Inserts a statement. Returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }
        self.by_subject
            .entry(triple.subject.clone())
            .or_insert_with(OrdSet::new)
            .insert(triple.clone());
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_insert_with(OrdSet::new)
            .insert(triple.clone());
        self.by_object
            .entry(triple.object.clone())
            .or_insert_with(OrdSet::new)
            .insert(triple.clone());
        self.triples.insert(triple);
        true
    }

    /// Iterates all statements in order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Iterates the statements matching a lookup.
    ///
    /// Uses the most selective bound position as the access path and
    /// filters the rest.
    pub fn scan(&self, lookup: Lookup) -> Box<dyn Iterator<Item = &Triple> + '_> {
        if let (Some(s), Some(p), Some(o)) = (&lookup.subject, &lookup.predicate, &lookup.object)
        {
            let exact = Triple::new(s.clone(), p.clone(), o.clone());
            return Box::new(self.triples.range(exact.clone()..=exact));
        }

        let candidates = [
            lookup
                .subject
                .as_ref()
                .map(|s| self.by_subject.get(s)),
            lookup
                .predicate
                .as_ref()
                .map(|p| self.by_predicate.get(p)),
            lookup.object.as_ref().map(|o| self.by_object.get(o)),
        ];

        // A bound position with no index entry means nothing can match.
        if candidates.iter().any(|c| matches!(c, Some(None))) {
            return Box::new(std::iter::empty());
        }

        let narrowest = candidates
            .into_iter()
            .flatten()
            .flatten()
            .min_by_key(|set| set.len());

        match narrowest {
            Some(set) => Box::new(set.iter().filter(move |t| lookup.matches(t))),
            None => Box::new(self.triples.iter()),
        }
    }
}
