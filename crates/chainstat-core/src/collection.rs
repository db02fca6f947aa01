//! Named collections of graphs.
//!
//! A [`GraphCollection`] maps entity (community) names to their graphs. It
//! is filled once by the loader and only read afterward. Logical groups of
//! entities (from a [`Grouping`]) are resolved against it with
//! [`GraphCollection::select`], which borrows rather than clones the graphs.

use std::collections::BTreeMap;

use crate::graph::DirectedGraph;
use crate::grouping::Grouping;

/// Entity name → graph, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct GraphCollection {
    graphs: BTreeMap<String, DirectedGraph>,
}

/// A borrowed subset of a collection.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Present entities, ordered by name.
    pub entries: Vec<(&'a str, &'a DirectedGraph)>,
    /// Requested names with no graph in the collection, sorted.
    pub missing: Vec<String>,
}

impl GraphCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a graph.
    pub fn insert(&mut self, name: impl Into<String>, graph: DirectedGraph) {
        self.graphs.insert(name.into(), graph);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DirectedGraph> {
        self.graphs.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Entity names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.graphs.keys().map(String::as_str)
    }

    /// `(name, graph)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectedGraph)> + '_ {
        self.graphs.iter().map(|(name, graph)| (name.as_str(), graph))
    }

    /// Borrow every graph as a [`Selection`].
    #[must_use]
    pub fn all(&self) -> Selection<'_> {
        Selection {
            entries: self.iter().collect(),
            missing: Vec::new(),
        }
    }

    /// Borrow the graphs named in `names`.
    #[must_use]
    pub fn select<'a, I, S>(&'a self, names: I) -> Selection<'a>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.graphs.get_key_value(name) {
                Some((key, graph)) => entries.push((key.as_str(), graph)),
                None => missing.push(name.to_string()),
            }
        }
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.dedup_by(|a, b| a.0 == b.0);
        missing.sort_unstable();
        missing.dedup();
        Selection { entries, missing }
    }

    /// Resolve every category of `grouping` to a [`Selection`].
    #[must_use]
    pub fn select_groups<'a>(&'a self, grouping: &Grouping) -> BTreeMap<String, Selection<'a>> {
        grouping
            .iter()
            .map(|(group, members)| (group.to_string(), self.select(members)))
            .collect()
    }
}

impl FromIterator<(String, DirectedGraph)> for GraphCollection {
    fn from_iter<T: IntoIterator<Item = (String, DirectedGraph)>>(iter: T) -> Self {
        Self {
            graphs: iter.into_iter().collect(),
        }
    }
}
