//! The graph store connection contract.
//!
//! The reasoner never touches storage directly: everything it reads goes
//! through [`GraphStore::get_statements`], and everything it writes goes
//! through [`GraphStore::add_base`] followed by [`GraphStore::commit`].

use strata_foundation::{GraphId, GraphName, Node, Result, Triple};

/// A lazy sequence of statements returned by a lookup.
///
/// Each call to [`GraphStore::get_statements`] produces a fresh sequence;
/// sequences are never shared between calls.
pub type Statements<'a> = Box<dyn Iterator<Item = Triple> + 'a>;

/// A triple lookup pattern. `None` positions match any node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Lookup {
    /// Subject to match, or any.
    pub subject: Option<Node>,
    /// Predicate to match, or any.
    pub predicate: Option<Node>,
    /// Object to match, or any.
    pub object: Option<Node>,
}

impl Lookup {
    /// Creates a lookup from optional positions.
    #[must_use]
    pub fn new(subject: Option<Node>, predicate: Option<Node>, object: Option<Node>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// A lookup matching every statement.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A lookup matching exactly one statement.
    #[must_use]
    pub fn exact(triple: &Triple) -> Self {
        Self::new(
            Some(triple.subject.clone()),
            Some(triple.predicate.clone()),
            Some(triple.object.clone()),
        )
    }

    /// Returns true if every position is a wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }

    /// Returns true if every position is bound.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.subject.is_some() && self.predicate.is_some() && self.object.is_some()
    }

    /// Returns true if the triple satisfies this lookup.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        fn position(want: Option<&Node>, have: &Node) -> bool {
            want.is_none_or(|w| w == have)
        }
        position(self.subject.as_ref(), &triple.subject)
            && position(self.predicate.as_ref(), &triple.predicate)
            && position(self.object.as_ref(), &triple.object)
    }
}

/// A connection to a store of named graphs.
///
/// Lookups only ever see committed statements. Inserts made with
/// [`add_base`](Self::add_base) are staged until [`commit`](Self::commit)
/// and discarded by [`rollback`](Self::rollback).
pub trait GraphStore {
    /// Returns the handle of the graph with the given name, creating an
    /// empty graph if none exists.
    ///
    /// # Errors
    /// Returns an error if the store cannot create graphs.
    fn create_graph(&mut self, name: &GraphName) -> Result<GraphId>;

    /// Returns the handle of an existing graph.
    fn find_graph(&self, name: &GraphName) -> Option<GraphId>;

    /// Returns the name of a graph.
    fn graph_name(&self, id: GraphId) -> Option<GraphName>;

    /// Lists all graphs in creation order.
    fn graphs(&self) -> Vec<(GraphId, GraphName)>;

    /// Removes a graph and all of its statements.
    ///
    /// # Errors
    /// Returns an error if the graph is unknown.
    fn remove_graph(&mut self, id: GraphId) -> Result<()>;

    /// Returns the committed statements of the given graphs matching the
    /// lookup. A statement held by several of the graphs is yielded once.
    ///
    /// # Errors
    /// Returns an error if any graph is unknown or the lookup fails.
    fn get_statements(&self, lookup: &Lookup, graphs: &[GraphId]) -> Result<Statements<'_>>;

    /// Stages statements for insertion into a graph.
    ///
    /// # Errors
    /// Returns an error if the graph is unknown.
    fn add_base(&mut self, graph: GraphId, triples: &[Triple]) -> Result<()>;

    /// Makes all staged statements visible to lookups.
    ///
    /// # Errors
    /// Returns an error if the commit fails; staged statements are then
    /// discarded.
    fn commit(&mut self) -> Result<()>;

    /// Discards all staged statements.
    fn rollback(&mut self);

    /// Returns true if the statement is committed in any of the graphs.
    ///
    /// # Errors
    /// Returns an error if the lookup fails.
    fn contains(&self, triple: &Triple, graphs: &[GraphId]) -> Result<bool> {
        Ok(self
            .get_statements(&Lookup::exact(triple), graphs)?
            .next()
            .is_some())
    }

    /// Returns the number of committed statements in a graph.
    ///
    /// # Errors
    /// Returns an error if the graph is unknown.
    fn len(&self, graph: GraphId) -> Result<usize> {
        Ok(self.get_statements(&Lookup::any(), &[graph])?.count())
    }
}
