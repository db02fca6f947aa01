//! Category groupings of identifiers.
//!
//! A grouping maps a category name to a set of identifiers, e.g.
//! `{"science": ["askscience", "physics"], "media": ["pics"]}`. Categories
//! may overlap: one identifier can sit in several categories.
//!
//! The same shape serves two roles: grouping community names into logical
//! groups of graphs for the metrics tables, and holding a categorization to
//! be reconciled against an authoritative identifier set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GroupingError;

/// Category name → identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grouping {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl Grouping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a grouping from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GroupingError::Malformed`] if `json` is not an object whose
    /// values are arrays of strings.
    pub fn from_json(json: &str) -> Result<Self, GroupingError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a grouping file.
    ///
    /// # Errors
    ///
    /// Returns [`GroupingError::Io`] if the file cannot be read, otherwise
    /// the errors of [`Grouping::from_json`].
    pub fn load(path: &Path) -> Result<Self, GroupingError> {
        let content = std::fs::read_to_string(path).map_err(|source| GroupingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serialize as pretty JSON (categories and members sorted).
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization errors.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Members of one category.
    #[must_use]
    pub fn members(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(category)
    }

    /// Mutable members of one category, created empty if absent.
    pub fn members_mut(&mut self, category: &str) -> &mut BTreeSet<String> {
        self.categories.entry(category.to_string()).or_default()
    }

    /// Add an identifier to a category, creating the category if needed.
    pub fn insert(&mut self, category: impl Into<String>, identifier: impl Into<String>) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(identifier.into());
    }

    /// Category names in order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.keys().map(String::as_str)
    }

    /// `(category, members)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> + '_ {
        self.categories.iter().map(|(c, m)| (c.as_str(), m))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Union of all members across categories.
    #[must_use]
    pub fn all_identifiers(&self) -> BTreeSet<String> {
        self.categories.values().flatten().cloned().collect()
    }
}

impl<C, M, S> FromIterator<(C, M)> for Grouping
where
    C: Into<String>,
    M: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (C, M)>>(iter: T) -> Self {
        let mut grouping = Self::new();
        for (category, members) in iter {
            let category: String = category.into();
            grouping
                .members_mut(&category)
                .extend(members.into_iter().map(Into::into));
        }
        grouping
    }
}
