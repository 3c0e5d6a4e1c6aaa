//! Schema-driven adapter between relational datasources and generic entities.
//!
//! Provides catalog introspection, a total mapping between raw column types
//! and canonical text values, parameterized statement synthesis, version
//! tags for optimistic concurrency, and a transactional session model.

pub mod catalog;
pub mod config;
pub mod datasource;
pub mod entity;
pub mod error;
pub mod handler;
pub mod sql;
pub mod transaction;
pub mod types;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{Catalog, ColumnMeta, NavigationKey, NavigationLink, TableSchema};
pub use config::BridgeConfig;
pub use datasource::{DataSource, Session};
pub use entity::{Entity, VersionTag};
pub use error::{Result, ServiceFault};
pub use handler::RdbmsHandler;
pub use types::{CanonicalType, RawType, SqlValue};
