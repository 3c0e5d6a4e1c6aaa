//! Interface consumed from the relational datasource.
//!
//! A [`DataSource`] hands out exclusive [`Session`]s. A session exposes
//! catalog introspection and positional statement execution. Dropping a
//! session releases it; implementations must not panic on drop.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{BindError, RawType, SqlValue};

/// Failure reported by a datasource driver.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DataSourceError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl DataSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Transaction isolation level requested from a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    #[default]
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IsolationLevel::ReadUncommitted => "read_uncommitted",
            IsolationLevel::ReadCommitted => "read_committed",
            IsolationLevel::RepeatableRead => "repeatable_read",
            IsolationLevel::Serializable => "serializable",
        })
    }
}

impl FromStr for IsolationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "read_uncommitted" => Ok(IsolationLevel::ReadUncommitted),
            "read_committed" => Ok(IsolationLevel::ReadCommitted),
            "repeatable_read" => Ok(IsolationLevel::RepeatableRead),
            "serializable" => Ok(IsolationLevel::Serializable),
            other => Err(format!("unknown isolation level '{}'", other)),
        }
    }
}

/// Column metadata as reported by the datasource catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub raw_type: RawType,
    /// Declared length or precision, 0 when unknown
    pub size: u32,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub precision: u32,
    pub scale: u32,
}

/// One column pair of a foreign key that references the inspected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedKey {
    /// Referenced column in the inspected (parent) table
    pub pk_column: String,
    /// Referencing (child) table
    pub fk_table: String,
    /// Referencing column in the child table
    pub fk_column: String,
    /// 1-based position of the pair within its foreign key
    pub key_seq: u32,
}

/// A bound parameter value with the raw type of its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub raw_type: RawType,
    pub value: SqlValue,
}

/// Statement text plus positional parameter slots.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    sql: String,
    params: Vec<Option<Parameter>>,
}

impl PreparedStatement {
    /// Creates a statement with `slots` unbound parameters.
    pub fn new(sql: impl Into<String>, slots: usize) -> Self {
        Self {
            sql: sql.into(),
            params: vec![None; slots],
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn slot_count(&self) -> usize {
        self.params.len()
    }

    /// Binds a value at 1-based `position`.
    pub fn bind(
        &mut self,
        position: usize,
        raw_type: RawType,
        value: SqlValue,
    ) -> Result<(), BindError> {
        let slots = self.params.len();
        let slot = position
            .checked_sub(1)
            .and_then(|index| self.params.get_mut(index))
            .ok_or(BindError::PositionOutOfRange { position, slots })?;
        *slot = Some(Parameter { raw_type, value });
        Ok(())
    }

    /// Binds a NULL typed with `raw_type` at 1-based `position`.
    pub fn bind_null(&mut self, position: usize, raw_type: RawType) -> Result<(), BindError> {
        self.bind(position, raw_type, SqlValue::Null)
    }

    /// Returns the parameter at 1-based `position`, if bound.
    pub fn parameter(&self, position: usize) -> Option<&Parameter> {
        position
            .checked_sub(1)
            .and_then(|index| self.params.get(index))
            .and_then(Option::as_ref)
    }

    /// All slots in position order.
    pub fn parameters(&self) -> &[Option<Parameter>] {
        &self.params
    }

    /// Fails if any slot is still unbound.
    pub fn ensure_bound(&self) -> Result<(), BindError> {
        match self.params.iter().position(Option::is_none) {
            Some(index) => Err(BindError::Unbound {
                position: index + 1,
            }),
            None => Ok(()),
        }
    }
}

/// Rows returned by a query, fully materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An exclusive datasource session.
///
/// Catalog methods take the catalog context returned by
/// [`Session::catalog_name`] so introspection is scoped consistently.
pub trait Session: Send {
    /// Active catalog of this session, if the datasource has one.
    fn catalog_name(&mut self) -> Result<Option<String>, DataSourceError>;

    /// Names of base tables, in catalog order.
    fn tables(&mut self, catalog: Option<&str>) -> Result<Vec<String>, DataSourceError>;

    /// Columns of `table` in ordinal order.
    fn columns(
        &mut self,
        catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, DataSourceError>;

    /// Primary-key column names of `table` in key sequence order.
    fn primary_keys(
        &mut self,
        catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<String>, DataSourceError>;

    /// Foreign-key column pairs in other tables that reference `table`.
    fn exported_keys(
        &mut self,
        catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<ExportedKey>, DataSourceError>;

    /// Runs a query and materializes its rows.
    fn query(&mut self, statement: &PreparedStatement) -> Result<ResultSet, DataSourceError>;

    /// Runs a write statement and returns the affected row count.
    fn execute(&mut self, statement: &PreparedStatement) -> Result<u64, DataSourceError>;

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DataSourceError>;

    fn set_isolation(&mut self, level: IsolationLevel) -> Result<(), DataSourceError>;

    fn commit(&mut self) -> Result<(), DataSourceError>;

    fn rollback(&mut self) -> Result<(), DataSourceError>;
}

/// Source of exclusive sessions.
pub trait DataSource: Send + Sync {
    type Session: Session;

    /// Acquires a new session. The caller owns it until it is dropped.
    fn acquire(&self) -> Result<Self::Session, DataSourceError>;
}
