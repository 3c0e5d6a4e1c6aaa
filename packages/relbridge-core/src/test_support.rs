//! Scripted in-memory datasource for unit tests.
//!
//! Records every statement with its bound parameters and every lifecycle
//! event, and can inject failures at each step.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::datasource::{
    ColumnDescriptor, DataSource, DataSourceError, ExportedKey, IsolationLevel, Parameter,
    PreparedStatement, ResultSet, Session,
};
use crate::types::{RawType, SqlValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub session: usize,
    pub sql: String,
    pub params: Vec<Option<Parameter>>,
}

impl Executed {
    pub fn values(&self) -> Vec<SqlValue> {
        self.params
            .iter()
            .map(|param| param.as_ref().map(|p| p.value.clone()).unwrap_or(SqlValue::Null))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub catalog_name: Option<String>,
    pub tables: Vec<String>,
    pub columns: HashMap<String, Vec<ColumnDescriptor>>,
    pub primary_keys: HashMap<String, Vec<String>>,
    pub exported_keys: HashMap<String, Vec<ExportedKey>>,
    pub query_results: VecDeque<ResultSet>,
    pub queries: Vec<Executed>,
    pub executed: Vec<Executed>,
    pub events: Vec<String>,
    pub affected_rows: u64,
    pub fail_acquire: bool,
    pub fail_execute: bool,
    pub fail_commit: bool,
    pub fail_columns_of: Option<String>,
    pub fail_autocommit_restore: bool,
    sessions: usize,
}

#[derive(Clone, Default)]
pub struct MockDataSource {
    state: Arc<Mutex<MockState>>,
}

pub fn column(name: &str, raw_type: RawType) -> ColumnDescriptor {
    ColumnDescriptor {
        name: name.to_string(),
        raw_type,
        size: 0,
        nullable: true,
        default_value: None,
        precision: 0,
        scale: 0,
    }
}

impl MockDataSource {
    pub fn new() -> Self {
        let source = Self::default();
        source.state.lock().affected_rows = 1;
        source
    }

    /// USERS(ID INTEGER PK, NAME VARCHAR, ACTIVE BOOLEAN)
    pub fn users() -> Self {
        Self::new().with_table(
            "USERS",
            vec![
                column("ID", RawType::Integer),
                column("NAME", RawType::Varchar),
                column("ACTIVE", RawType::Boolean),
            ],
            &["ID"],
        )
    }

    pub fn with_table(self, name: &str, columns: Vec<ColumnDescriptor>, keys: &[&str]) -> Self {
        {
            let mut state = self.state.lock();
            state.tables.push(name.to_string());
            state.columns.insert(name.to_string(), columns);
            state.primary_keys.insert(
                name.to_string(),
                keys.iter().map(|key| key.to_string()).collect(),
            );
        }
        self
    }

    pub fn with_exported_key(
        self,
        parent: &str,
        pk_column: &str,
        child: &str,
        fk_column: &str,
        key_seq: u32,
    ) -> Self {
        self.state
            .lock()
            .exported_keys
            .entry(parent.to_string())
            .or_default()
            .push(ExportedKey {
                pk_column: pk_column.to_string(),
                fk_table: child.to_string(),
                fk_column: fk_column.to_string(),
                key_seq,
            });
        self
    }

    pub fn push_result(&self, columns: &[&str], rows: Vec<Vec<SqlValue>>) {
        self.state.lock().query_results.push_back(ResultSet::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ));
    }

    pub fn state(&self) -> parking_lot::MutexGuard<'_, MockState> {
        self.state.lock()
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().events.clone()
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.state.lock().executed.clone()
    }

    pub fn queries(&self) -> Vec<Executed> {
        self.state.lock().queries.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.state.lock();
        state.events.clear();
        state.executed.clear();
        state.queries.clear();
    }
}

impl DataSource for MockDataSource {
    type Session = MockSession;

    fn acquire(&self) -> Result<MockSession, DataSourceError> {
        let mut state = self.state.lock();
        if state.fail_acquire {
            return Err(DataSourceError::new("pool exhausted"));
        }
        state.sessions += 1;
        let id = state.sessions;
        state.events.push(format!("acquire#{}", id));
        Ok(MockSession {
            id,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockSession {
    id: usize,
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    fn event(&self, name: impl AsRef<str>) {
        self.state
            .lock()
            .events
            .push(format!("{}#{}", name.as_ref(), self.id));
    }

    fn record(&self, statement: &PreparedStatement) -> Executed {
        Executed {
            session: self.id,
            sql: statement.sql().to_string(),
            params: statement.parameters().to_vec(),
        }
    }
}

impl Session for MockSession {
    fn catalog_name(&mut self) -> Result<Option<String>, DataSourceError> {
        Ok(self.state.lock().catalog_name.clone())
    }

    fn tables(&mut self, _catalog: Option<&str>) -> Result<Vec<String>, DataSourceError> {
        Ok(self.state.lock().tables.clone())
    }

    fn columns(
        &mut self,
        _catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, DataSourceError> {
        let state = self.state.lock();
        if state.fail_columns_of.as_deref() == Some(table) {
            return Err(DataSourceError::new("metadata unavailable"));
        }
        Ok(state.columns.get(table).cloned().unwrap_or_default())
    }

    fn primary_keys(
        &mut self,
        _catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<String>, DataSourceError> {
        Ok(self
            .state
            .lock()
            .primary_keys
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    fn exported_keys(
        &mut self,
        _catalog: Option<&str>,
        table: &str,
    ) -> Result<Vec<ExportedKey>, DataSourceError> {
        Ok(self
            .state
            .lock()
            .exported_keys
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    fn query(&mut self, statement: &PreparedStatement) -> Result<ResultSet, DataSourceError> {
        let executed = self.record(statement);
        let mut state = self.state.lock();
        state.queries.push(executed);
        Ok(state.query_results.pop_front().unwrap_or_default())
    }

    fn execute(&mut self, statement: &PreparedStatement) -> Result<u64, DataSourceError> {
        let executed = self.record(statement);
        let mut state = self.state.lock();
        state.executed.push(executed);
        if state.fail_execute {
            return Err(DataSourceError::new("constraint violation"));
        }
        Ok(state.affected_rows)
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DataSourceError> {
        self.event(format!("autocommit({})", enabled));
        if enabled && self.state.lock().fail_autocommit_restore {
            return Err(DataSourceError::new("connection reset"));
        }
        Ok(())
    }

    fn set_isolation(&mut self, level: IsolationLevel) -> Result<(), DataSourceError> {
        self.event(format!("isolation({})", level));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DataSourceError> {
        self.event("commit");
        if self.state.lock().fail_commit {
            return Err(DataSourceError::new("serialization failure"));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DataSourceError> {
        self.event("rollback");
        Ok(())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.event("release");
    }
}
