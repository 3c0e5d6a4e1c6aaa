//! Parameterized statement synthesis from catalog metadata.
//!
//! Identifiers always come from the catalog, never from the request; only
//! values are parameterized. Every [`Statement`] carries the bind plan that
//! was recorded while its text was written, and [`Statement::prepare`]
//! binds by walking that plan, so placeholder order and bind order cannot
//! drift apart.

mod dialect;

use crate::catalog::TableSchema;
use crate::datasource::PreparedStatement;
use crate::entity::Entity;
use crate::error::{Result, ServiceFault};
use crate::types::{self, RawType};

pub use dialect::{IdentifierQuote, PlaceholderStyle, SqlDialect};

/// Whether a bound column may carry a null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindRole {
    /// Written value; null binds a typed null
    Value,
    /// Filter or key value; must be present and non-null
    Key,
}

/// One positional parameter of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub column: String,
    pub raw_type: RawType,
    pub role: BindRole,
}

/// Synthesized statement text with its bind plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    bindings: Vec<Binding>,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in placeholder order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn parameter_count(&self) -> usize {
        self.bindings.len()
    }

    /// Bound column names in placeholder order.
    pub fn bound_columns(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.column.as_str()).collect()
    }

    /// Binds values from `entry` by walking the bind plan.
    pub fn prepare(&self, table: &str, entry: &Entity) -> Result<PreparedStatement> {
        let mut prepared = PreparedStatement::new(self.sql.clone(), self.bindings.len());
        for (index, binding) in self.bindings.iter().enumerate() {
            let value = entry.value(&binding.column);
            if binding.role == BindRole::Key && value.is_none() {
                return Err(ServiceFault::MissingKeyValue {
                    table: table.to_string(),
                    column: binding.column.clone(),
                });
            }
            types::encode(binding.raw_type, value, index + 1, &mut prepared).map_err(|source| {
                ServiceFault::Bind {
                    table: table.to_string(),
                    column: binding.column.clone(),
                    source,
                }
            })?;
        }
        Ok(prepared)
    }
}

/// Builds statements for one dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSynthesizer {
    dialect: SqlDialect,
}

impl SqlSynthesizer {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &SqlDialect {
        &self.dialect
    }

    /// Full scan listing every column in catalog order.
    pub fn select_all(&self, table: &TableSchema) -> Statement {
        let builder = self.select_head(table);
        builder.finish()
    }

    /// Conjunctive filter over the catalog columns that have a non-null
    /// value in `entry`, in catalog order. `None` when no column qualifies.
    pub fn select_by_keys(&self, table: &TableSchema, entry: &Entity) -> Option<Statement> {
        let filters: Vec<_> = table
            .columns
            .iter()
            .filter(|column| entry.value(&column.name).is_some())
            .collect();
        if filters.is_empty() {
            return None;
        }

        let mut builder = self.select_head(table);
        builder.push(" WHERE ");
        for (i, column) in filters.into_iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            builder.push_assignment(&column.name, column.raw_type, BindRole::Key);
        }
        Some(builder.finish())
    }

    /// Inserts every catalog column in catalog order.
    pub fn insert(&self, table: &TableSchema) -> Statement {
        let mut builder = StatementBuilder::new(self.dialect);
        builder.push("INSERT INTO ");
        builder.push_identifier(&table.name);
        builder.push(" (");
        for (i, column) in table.columns.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push_identifier(&column.name);
        }
        builder.push(") VALUES (");
        for (i, column) in table.columns.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push_placeholder(&column.name, column.raw_type, BindRole::Value);
        }
        builder.push(")");
        builder.finish()
    }

    /// SET over the entry's non-key catalog columns in entry order, WHERE
    /// over every primary-key column in key order. Entry columns unknown to
    /// the catalog are skipped.
    pub fn update(&self, table: &TableSchema, entry: &Entity) -> Result<Statement> {
        require_primary_key(table)?;
        let assignments: Vec<_> = entry
            .names()
            .filter(|name| !table.is_primary_key(name))
            .filter_map(|name| table.column(name))
            .collect();
        if assignments.is_empty() {
            return Err(ServiceFault::NoUpdatableColumns {
                table: table.name.clone(),
            });
        }

        let mut builder = StatementBuilder::new(self.dialect);
        builder.push("UPDATE ");
        builder.push_identifier(&table.name);
        builder.push(" SET ");
        for (i, column) in assignments.into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push_assignment(&column.name, column.raw_type, BindRole::Value);
        }
        self.push_key_filter(&mut builder, table)?;
        Ok(builder.finish())
    }

    /// Keyed update of the named properties only. Every non-key name in
    /// `entry` must be a column of the table.
    pub fn update_property(&self, table: &TableSchema, entry: &Entity) -> Result<Statement> {
        if let Some(unknown) = entry.names().find(|name| table.column(name).is_none()) {
            return Err(ServiceFault::UnknownProperty {
                table: table.name.clone(),
                property: unknown.to_string(),
            });
        }
        self.update(table, entry)
    }

    /// Deletes by every primary-key column in key order.
    pub fn delete(&self, table: &TableSchema) -> Result<Statement> {
        require_primary_key(table)?;
        let mut builder = StatementBuilder::new(self.dialect);
        builder.push("DELETE FROM ");
        builder.push_identifier(&table.name);
        self.push_key_filter(&mut builder, table)?;
        Ok(builder.finish())
    }

    fn select_head(&self, table: &TableSchema) -> StatementBuilder {
        let mut builder = StatementBuilder::new(self.dialect);
        builder.push("SELECT ");
        for (i, column) in table.columns.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push_identifier(&column.name);
        }
        builder.push(" FROM ");
        builder.push_identifier(&table.name);
        builder
    }

    fn push_key_filter(&self, builder: &mut StatementBuilder, table: &TableSchema) -> Result<()> {
        builder.push(" WHERE ");
        for (i, key) in table.primary_keys.iter().enumerate() {
            let column = table.column(key).ok_or_else(|| ServiceFault::MissingKey {
                table: table.name.clone(),
            })?;
            if i > 0 {
                builder.push(" AND ");
            }
            builder.push_assignment(&column.name, column.raw_type, BindRole::Key);
        }
        Ok(())
    }
}

fn require_primary_key(table: &TableSchema) -> Result<()> {
    if table.has_primary_key() {
        Ok(())
    } else {
        Err(ServiceFault::MissingKey {
            table: table.name.clone(),
        })
    }
}

/// Writes statement text and records a binding for every placeholder.
struct StatementBuilder {
    dialect: SqlDialect,
    sql: String,
    bindings: Vec<Binding>,
}

impl StatementBuilder {
    fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            bindings: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn push_identifier(&mut self, identifier: &str) {
        let quoted = self.dialect.quote(identifier);
        self.sql.push_str(&quoted);
    }

    fn push_placeholder(&mut self, column: &str, raw_type: RawType, role: BindRole) {
        self.bindings.push(Binding {
            column: column.to_string(),
            raw_type,
            role,
        });
        let placeholder = self.dialect.placeholder(self.bindings.len());
        self.sql.push_str(&placeholder);
    }

    /// `column = <placeholder>`
    fn push_assignment(&mut self, column: &str, raw_type: RawType, role: BindRole) {
        self.push_identifier(column);
        self.push(" = ");
        self.push_placeholder(column, raw_type, role);
    }

    fn finish(self) -> Statement {
        tracing::debug!(
            "Synthesized statement with {} parameters: {}",
            self.bindings.len(),
            self.sql
        );
        Statement {
            sql: self.sql,
            bindings: self.bindings,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
