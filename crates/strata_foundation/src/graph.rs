//! Named graph handles.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque handle to a named graph in a store.
///
/// Handles are only meaningful to the store that issued them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphId(u32);

impl GraphId {
    /// Creates a handle from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this handle.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphId({})", self.0)
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// The name of a graph.
///
/// The reasoner derives the names of the graphs it creates from the name of
/// the base graph, see [`GraphName::stratum`] and [`GraphName::axioms`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphName(Arc<str>);

impl GraphName {
    /// Creates a graph name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the name text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the `n`th stratum (1-based) derived from this base graph.
    #[must_use]
    pub fn stratum(&self, n: u32) -> Self {
        Self::new(format!("{}#stratum-{n}", self.0))
    }

    /// Name of the graph holding axioms asserted for this base graph.
    #[must_use]
    pub fn axioms(&self) -> Self {
        Self::new(format!("{}#axioms", self.0))
    }
}

impl From<&str> for GraphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphName({})", self.0)
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
