//! In-memory graph store.
//!
//! `MemoryStore` keeps every named graph as a [`GraphIndex`] inside
//! persistent maps, so cloning the whole store is O(1) and a clone acts as
//! an immutable snapshot of the committed state.

use std::collections::HashSet;

use im::{HashMap, OrdMap};
use strata_foundation::{Error, GraphId, GraphName, Result, Triple};

use crate::index::GraphIndex;
use crate::store::{GraphStore, Lookup, Statements};

/// A transactional in-memory store of named graphs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    /// Committed statements per graph.
    graphs: OrdMap<GraphId, GraphIndex>,
    /// Graph names by handle.
    names: OrdMap<GraphId, GraphName>,
    /// Graph handles by name.
    ids: HashMap<GraphName, GraphId>,
    /// Next handle to allocate.
    next_id: u32,
    /// Inserts staged since the last commit.
    staged: Vec<(GraphId, Triple)>,
    /// Number of commits that staged at least one statement.
    commits: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of statements staged but not yet committed.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Returns the number of non-empty commits performed so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Returns the committed index of a graph.
    #[must_use]
    pub fn graph(&self, id: GraphId) -> Option<&GraphIndex> {
        self.graphs.get(&id)
    }

    /// Returns the total number of committed statements across all graphs.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.graphs.values().map(GraphIndex::len).sum()
    }

    /// Inserts statements into a graph and commits immediately.
    ///
    /// Convenience for loading fixtures; any previously staged statements
    /// are committed along with these.
    ///
    /// # Errors
    /// Returns an error if the graph is unknown.
    pub fn insert_all(&mut self, graph: GraphId, triples: &[Triple]) -> Result<()> {
        self.add_base(graph, triples)?;
        self.commit()
    }

    fn check_graph(&self, id: GraphId) -> Result<()> {
        if self.graphs.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::unknown_graph(id))
        }
    }
}

impl GraphStore for MemoryStore {
    fn create_graph(&mut self, name: &GraphName) -> Result<GraphId> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }
        let id = GraphId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Error::store("graph handle space exhausted"))?;
        self.graphs.insert(id, GraphIndex::new());
        self.names.insert(id, name.clone());
        self.ids.insert(name.clone(), id);
        Ok(id)
    }

    fn find_graph(&self, name: &GraphName) -> Option<GraphId> {
        self.ids.get(name).copied()
    }

    fn graph_name(&self, id: GraphId) -> Option<GraphName> {
        self.names.get(&id).cloned()
    }

    fn graphs(&self) -> Vec<(GraphId, GraphName)> {
        self.names
            .iter()
            .map(|(id, name)| (*id, name.clone()))
            .collect()
    }

    fn remove_graph(&mut self, id: GraphId) -> Result<()> {
        self.check_graph(id)?;
        self.graphs.remove(&id);
        if let Some(name) = self.names.remove(&id) {
            self.ids.remove(&name);
        }
        self.staged.retain(|(g, _)| *g != id);
        Ok(())
    }

    fn get_statements(&self, lookup: &Lookup, graphs: &[GraphId]) -> Result<Statements<'_>> {
        let mut indices = Vec::with_capacity(graphs.len());
        for id in graphs {
            let index = self.graphs.get(id).ok_or_else(|| Error::unknown_graph(*id))?;
            indices.push(index);
        }

        let lookup = lookup.clone();
        if indices.len() == 1 {
            let index = indices[0];
            return Ok(Box::new(index.scan(lookup).cloned()));
        }

        let mut seen = HashSet::new();
        Ok(Box::new(
            indices
                .into_iter()
                .flat_map(move |index| index.scan(lookup.clone()))
                .filter(move |t| seen.insert((*t).clone()))
                .cloned(),
        ))
    }

    fn add_base(&mut self, graph: GraphId, triples: &[Triple]) -> Result<()> {
        self.check_graph(graph)?;
        self.staged.extend(triples.iter().map(|t| (graph, t.clone())));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }
        for (graph, triple) in std::mem::take(&mut self.staged) {
            // Graphs removed after staging have already dropped their inserts.
            if let Some(index) = self.graphs.get_mut(&graph) {
                index.insert(triple);
            }
        }
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged.clear();
    }

    fn len(&self, graph: GraphId) -> Result<usize> {
        self.graphs
            .get(&graph)
            .map(GraphIndex::len)
            .ok_or_else(|| Error::unknown_graph(graph))
    }
}
