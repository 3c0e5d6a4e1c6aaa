//! Generic entity records exchanged with the protocol layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque version tag of an entity, used for optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered mapping from column name to canonical text or null.
///
/// A column that is absent differs from one that is present with a null
/// value. Insertion order is preserved; setting an existing column replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    values: Vec<(String, Option<String>)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<VersionTag>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Entity::set`] with a non-null value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    /// Builder form of [`Entity::set`] with a null value.
    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.set(column, None);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: Option<String>) {
        let column = column.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    /// `None` when the column is absent, `Some(None)` when it is null.
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_deref())
    }

    /// Non-null value of a column.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column).flatten()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn version(&self) -> Option<&VersionTag> {
        self.version.as_ref()
    }

    pub fn set_version(&mut self, tag: VersionTag) {
        self.version = Some(tag);
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (column, value) in iter {
            entity.set(column, value);
        }
        entity
    }
}
