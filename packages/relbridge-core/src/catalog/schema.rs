//! Immutable table descriptions built by introspection.

use serde::{Deserialize, Serialize};

use crate::datasource::ColumnDescriptor;
use crate::entity::Entity;
use crate::types::{classify, CanonicalType, RawType};

/// Metadata of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub canonical_type: CanonicalType,
    pub raw_type: RawType,
    /// 1-based position in the table
    pub ordinal: usize,
    pub nullable: bool,
    pub size: u32,
    pub default_value: Option<String>,
    /// Only recorded for Double, Single and Decimal columns
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl ColumnMeta {
    pub fn from_descriptor(descriptor: ColumnDescriptor, ordinal: usize) -> Self {
        let canonical_type = classify(descriptor.raw_type);
        let has_precision = matches!(
            canonical_type,
            CanonicalType::Double | CanonicalType::Single | CanonicalType::Decimal
        );
        Self {
            name: descriptor.name,
            canonical_type,
            raw_type: descriptor.raw_type,
            ordinal,
            nullable: descriptor.nullable,
            size: descriptor.size,
            default_value: descriptor.default_value,
            precision: has_precision.then_some(descriptor.precision),
            scale: has_precision.then_some(descriptor.scale),
        }
    }
}

/// One (parent column, child column) pair of a navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationKey {
    pub parent_column: String,
    pub child_column: String,
}

/// Foreign-key relationship from a parent table to a referencing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLink {
    pub child_table: String,
    pub keys: Vec<NavigationKey>,
}

/// Columns, primary key and navigation links of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Catalog order
    pub columns: Vec<ColumnMeta>,
    /// Key sequence order, possibly empty
    pub primary_keys: Vec<String>,
    /// One link per child table, in discovery order
    pub navigation: Vec<NavigationLink>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_keys.iter().any(|key| key == name)
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_keys.is_empty()
    }

    pub fn navigation_link(&self, child_table: &str) -> Option<&NavigationLink> {
        self.navigation
            .iter()
            .find(|link| link.child_table == child_table)
    }

    /// Reorders `entry` into catalog order, with absent columns as null.
    /// Columns unknown to the table are dropped.
    pub fn normalize(&self, entry: &Entity) -> Entity {
        self.columns
            .iter()
            .map(|column| {
                let value = entry.value(&column.name).map(str::to_string);
                (column.name.clone(), value)
            })
            .collect()
    }
}
