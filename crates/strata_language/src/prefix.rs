//! Namespace prefix resolution.

use std::collections::BTreeMap;

use strata_foundation::vocab::DEFAULT_PREFIXES;

/// Maps short prefixes to namespace IRIs.
///
/// `rdf`, `rdfs`, `owl` and `xsd` are registered by default; `@prefix`
/// directives add to or override them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixMap {
    entries: BTreeMap<String, String>,
}

impl PrefixMap {
    /// Creates a map holding only the default prefixes.
    #[must_use]
    pub fn new() -> Self {
        let entries = DEFAULT_PREFIXES
            .iter()
            .map(|(p, ns)| ((*p).to_string(), (*ns).to_string()))
            .collect();
        Self { entries }
    }

    /// Creates a map with no prefixes at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers a prefix, replacing any previous binding.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.entries.insert(prefix.into(), namespace.into());
    }

    /// Returns the namespace bound to a prefix.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    /// Expands `prefix:local` into a full IRI.
    #[must_use]
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.get(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Shortens an IRI to `prefix:local` using the longest matching namespace.
    #[must_use]
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.entries
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{prefix}:{}", &iri[ns.len()..]))
    }

    /// Merges another map into this one. Bindings in `other` win.
    pub fn extend(&mut self, other: &PrefixMap) {
        for (prefix, ns) in &other.entries {
            self.entries.insert(prefix.clone(), ns.clone());
        }
    }

    /// Iterates `(prefix, namespace)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self::new()
    }
}
