//! Service error types.

use thiserror::Error;

use crate::datasource::DataSourceError;
use crate::types::BindError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ServiceFault>;

/// Errors raised by catalog, binding, execution and transaction operations.
#[derive(Error, Debug)]
pub enum ServiceFault {
    /// A session could not be acquired
    #[error("Connection error occurred: {source}")]
    Connection {
        #[source]
        source: DataSourceError,
    },

    /// Catalog introspection failed; construction is aborted
    #[error("Error in reading {context}: {source}")]
    Introspection {
        context: String,
        #[source]
        source: DataSourceError,
    },

    /// Table is not part of the catalog
    #[error("Table '{table}' not found")]
    UnknownTable { table: String },

    /// A value could not be bound or a cell could not be decoded
    #[error("Error occurred while binding column '{column}' of table '{table}': {source}")]
    Bind {
        table: String,
        column: String,
        #[source]
        source: BindError,
    },

    /// Statement execution failed
    #[error("Error occurred while {operation} {table} table: {source}")]
    Execution {
        operation: &'static str,
        table: String,
        #[source]
        source: DataSourceError,
    },

    /// Update or delete against a table without a primary key
    #[error("Couldn't find keys in table '{table}'")]
    MissingKey { table: String },

    /// A primary-key value was absent or null in the request
    #[error("Missing value for key column '{column}' of table '{table}'")]
    MissingKeyValue { table: String, column: String },

    /// An update request named no non-key column to change
    #[error("No updatable columns provided for table '{table}'")]
    NoUpdatableColumns { table: String },

    /// A point update named a column the table does not have
    #[error("Property '{property}' not found in table '{table}'")]
    UnknownProperty { table: String, property: String },

    /// No transactional session is bound to the handler
    #[error("Transactional connection lost while {context}")]
    TransactionLost { context: String },

    /// A transaction is already open on this handler
    #[error("A transaction is already open; close it before opening another")]
    TransactionAlreadyOpen,

    /// Transaction control (autocommit, isolation, commit) failed
    #[error("Transaction error while {operation}: {source}")]
    Transaction {
        operation: &'static str,
        #[source]
        source: DataSourceError,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}
