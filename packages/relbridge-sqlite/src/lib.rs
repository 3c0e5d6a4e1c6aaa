//! SQLite datasource for relbridge.
//!
//! Every acquired session owns its own connection to the database file.
//! Autocommit is modelled by opening a deferred transaction whenever it is
//! disabled; commit and rollback immediately open the next one.
//!
//! Declared type names map to raw categories as written. A column declared
//! `INTEGER`, including an `INTEGER PRIMARY KEY` rowid alias, is therefore
//! an Int32 column even though SQLite stores 64-bit integers: a stored value
//! outside the 32-bit range fails decoding for the whole read. Declare
//! `BIGINT` for columns that need the full range.

mod metadata;
mod values;

use std::path::{Path, PathBuf};
use std::time::Duration;

use relbridge_core::datasource::{
    ColumnDescriptor, DataSource, DataSourceError, ExportedKey, IsolationLevel, PreparedStatement,
    ResultSet, Session,
};
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};

pub use values::{from_sqlite, to_sqlite};

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file
    pub path: PathBuf,
    /// How long a session waits on a locked database (default: 5000)
    pub busy_timeout_ms: u64,
    /// Enforce foreign-key constraints (default: true)
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("relbridge.db"),
            busy_timeout_ms: 5000,
            foreign_keys: true,
        }
    }
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

/// Opens one connection per acquired session.
#[derive(Debug, Clone)]
pub struct SqliteDataSource {
    config: SqliteConfig,
}

impl SqliteDataSource {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    /// Datasource for the database file at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(SqliteConfig::new(path))
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl DataSource for SqliteDataSource {
    type Session = SqliteSession;

    fn acquire(&self) -> Result<SqliteSession, DataSourceError> {
        let conn = Connection::open(&self.config.path).map_err(|e| {
            DataSourceError::with_source(
                format!("failed to open {}", self.config.path.display()),
                e,
            )
        })?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(|e| DataSourceError::with_source("failed to set busy timeout", e))?;
        conn.pragma_update(None, "foreign_keys", self.config.foreign_keys)
            .map_err(|e| DataSourceError::with_source("failed to configure foreign keys", e))?;
        tracing::debug!("Opened SQLite session on {}", self.config.path.display());
        Ok(SqliteSession {
            conn,
            autocommit: true,
        })
    }
}

/// One SQLite connection.
pub struct SqliteSession {
    conn: Connection,
    autocommit: bool,
}

impl SqliteSession {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn batch(&self, sql: &str) -> Result<(), DataSourceError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DataSourceError::with_source(format!("{} failed", sql), e))
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn restart_transaction(&self) -> Result<(), DataSourceError> {
        if !self.autocommit && !self.in_transaction() {
            self.batch("BEGIN")?;
        }
        Ok(())
    }
}

fn bound_values(
    statement: &PreparedStatement,
) -> Result<Vec<rusqlite::types::Value>, DataSourceError> {
    statement
        .ensure_bound()
        .map_err(|e| DataSourceError::with_source("statement has unbound parameters", e))?;
    Ok(statement
        .parameters()
        .iter()
        .map(|param| {
            param
                .as_ref()
                .map(|p| to_sqlite(&p.value))
                .unwrap_or(rusqlite::types::Value::Null)
        })
        .collect())
}

fn statement_error(source: rusqlite::Error) -> DataSourceError {
    DataSourceError::with_source(source.to_string(), source)
}

impl Session for SqliteSession {
    fn catalog_name(&mut self) -> Result<Option<String>, DataSourceError> {
        Ok(Some("main".to_string()))
    }

    fn tables(&mut self, _catalog: Option<&str>) -> Result<Vec<String>, DataSourceError> {
        metadata::tables(&self.conn)
    }

    fn columns(
        &mut self,
        _catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, DataSourceError> {
        metadata::columns(&self.conn, table)
    }

    fn primary_keys(
        &mut self,
        _catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<String>, DataSourceError> {
        metadata::primary_keys(&self.conn, table)
    }

    fn exported_keys(
        &mut self,
        _catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<ExportedKey>, DataSourceError> {
        metadata::exported_keys(&self.conn, table)
    }

    fn query(&mut self, statement: &PreparedStatement) -> Result<ResultSet, DataSourceError> {
        let values = bound_values(statement)?;
        let mut stmt = self.conn.prepare(statement.sql()).map_err(statement_error)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = stmt
            .query(params_from_iter(values.iter()))
            .map_err(statement_error)?;
        let mut cells = Vec::new();
        while let Some(row) = rows.next().map_err(statement_error)? {
            let mut record = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get_ref(index).map_err(statement_error)?;
                record.push(from_sqlite(value)?);
            }
            cells.push(record);
        }
        Ok(ResultSet::new(columns, cells))
    }

    fn execute(&mut self, statement: &PreparedStatement) -> Result<u64, DataSourceError> {
        let values = bound_values(statement)?;
        let mut stmt = self.conn.prepare(statement.sql()).map_err(statement_error)?;
        let changed = stmt
            .execute(params_from_iter(values.iter()))
            .map_err(statement_error)?;
        Ok(changed as u64)
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DataSourceError> {
        if enabled == self.autocommit {
            return Ok(());
        }
        self.autocommit = enabled;
        if enabled {
            if self.in_transaction() {
                self.batch("COMMIT")?;
            }
            Ok(())
        } else {
            self.batch("BEGIN")
        }
    }

    /// Only `ReadUncommitted` changes behaviour. SQLite serializes writers,
    /// so every stricter level is met or exceeded by the default.
    fn set_isolation(&mut self, level: IsolationLevel) -> Result<(), DataSourceError> {
        let read_uncommitted = level == IsolationLevel::ReadUncommitted;
        self.conn
            .pragma_update(None, "read_uncommitted", read_uncommitted)
            .map_err(|e| DataSourceError::with_source("failed to set isolation level", e))
    }

    fn commit(&mut self) -> Result<(), DataSourceError> {
        if self.in_transaction() {
            self.batch("COMMIT")?;
        }
        self.restart_transaction()
    }

    fn rollback(&mut self) -> Result<(), DataSourceError> {
        if self.in_transaction() {
            self.batch("ROLLBACK")?;
        }
        self.restart_transaction()
    }
}
