//! Metadata catalog: table schemas and navigation links discovered once
//! at startup.

mod introspect;
mod navigation;
mod schema;

use std::collections::HashMap;

use crate::datasource::DataSourceError;
use crate::error::{Result, ServiceFault};

pub use introspect::{build_schema, discover_tables, introspect};
pub use navigation::group_exported_keys;
pub use schema::{ColumnMeta, NavigationKey, NavigationLink, TableSchema};

/// Immutable set of table schemas with unique names.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<TableSchema>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from schemas in discovery order.
    /// Fails if two schemas share a name.
    pub fn from_schemas(tables: Vec<TableSchema>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tables.len());
        for (position, table) in tables.iter().enumerate() {
            if index.insert(table.name.clone(), position).is_some() {
                return Err(ServiceFault::Introspection {
                    context: "table list".to_string(),
                    source: DataSourceError::new(format!("duplicate table '{}'", table.name)),
                });
            }
        }
        Ok(Self { tables, index })
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Result<&TableSchema> {
        self.index
            .get(name)
            .map(|&position| &self.tables[position])
            .ok_or_else(|| ServiceFault::UnknownTable {
                table: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Primary-key columns per table.
    pub fn primary_keys(&self) -> HashMap<String, Vec<String>> {
        self.tables
            .iter()
            .map(|table| (table.name.clone(), table.primary_keys.clone()))
            .collect()
    }

    /// Navigation links per parent table.
    pub fn navigation_links(&self) -> HashMap<String, Vec<NavigationLink>> {
        self.tables
            .iter()
            .map(|table| (table.name.clone(), table.navigation.clone()))
            .collect()
    }

    /// Adjacency mapping from parent table to child tables.
    pub fn navigation_graph(&self) -> HashMap<String, Vec<String>> {
        navigation::adjacency(&self.tables)
    }

    /// Every table reachable from `table` through navigation links.
    pub fn related_tables(&self, table: &str) -> Result<Vec<String>> {
        self.table(table)?;
        Ok(navigation::reachable(&self.navigation_graph(), table))
    }
}
