//! Entity-level CRUD facade over a relational datasource.
//!
//! Non-transactional calls acquire and release their own session. Calls
//! made with `transactional = true` run on the session bound by
//! [`RdbmsHandler::open_transaction`]; those calls are serialized by the
//! handler's transaction lock. Transactions do not nest.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::catalog::{self, Catalog, NavigationLink, TableSchema};
use crate::config::BridgeConfig;
use crate::datasource::{DataSource, DataSourceError, PreparedStatement, ResultSet, Session};
use crate::entity::{Entity, VersionTag};
use crate::error::{Result, ServiceFault};
use crate::sql::{SqlSynthesizer, Statement};
use crate::transaction::TransactionContext;
use crate::types;
use crate::version::EntityVersioner;

const READING: &str = "reading";
const INSERTING: &str = "inserting into";
const UPDATING: &str = "updating";
const DELETING: &str = "deleting from";

/// Adapter between a relational datasource and generic entities.
pub struct RdbmsHandler<D: DataSource> {
    datasource: D,
    catalog: Catalog,
    synthesizer: SqlSynthesizer,
    versioner: EntityVersioner,
    config: BridgeConfig,
    transaction: Mutex<Option<TransactionContext<D::Session>>>,
}

impl<D: DataSource> RdbmsHandler<D> {
    /// Introspects the datasource and builds the handler.
    ///
    /// Fails closed: any metadata error aborts construction.
    pub fn new(datasource: D, config: BridgeConfig) -> Result<Self> {
        let catalog = {
            let mut session = datasource
                .acquire()
                .map_err(|source| ServiceFault::Connection { source })?;
            catalog::introspect(&mut session)?
        };

        Ok(Self {
            synthesizer: SqlSynthesizer::new(config.dialect),
            versioner: EntityVersioner::new(config.scope_id.clone()),
            datasource,
            catalog,
            config,
            transaction: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn versioner(&self) -> &EntityVersioner {
        &self.versioner
    }

    /// Table names in discovery order.
    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.table_names()
    }

    /// Primary-key columns per table.
    pub fn primary_keys(&self) -> HashMap<String, Vec<String>> {
        self.catalog.primary_keys()
    }

    /// Schemas of every table.
    pub fn table_metadata(&self) -> &[TableSchema] {
        self.catalog.tables()
    }

    /// Navigation links per parent table.
    pub fn navigation_links(&self) -> HashMap<String, Vec<NavigationLink>> {
        self.catalog.navigation_links()
    }

    /// Every row of `table`, each stamped with its version tag.
    pub fn read_all(&self, table: &str) -> Result<Vec<Entity>> {
        let schema = self.catalog.table(table)?;
        let statement = self.synthesizer.select_all(schema);
        let mut session = self.acquire()?;
        self.query(&mut session, schema, &statement, &Entity::new())
    }

    /// Rows matching every non-null catalog column in `keys`.
    ///
    /// An entry with no such column matches nothing and the datasource is
    /// not consulted.
    pub fn read_by_keys(&self, table: &str, keys: &Entity, transactional: bool) -> Result<Vec<Entity>> {
        let schema = self.catalog.table(table)?;
        let Some(statement) = self.synthesizer.select_by_keys(schema, keys) else {
            tracing::debug!("No filter columns for {}; returning no rows", table);
            return Ok(Vec::new());
        };

        if transactional {
            let mut slot = self.transaction.lock();
            let context = bound_context(&mut *slot, READING, table)?;
            self.query(context.session()?, schema, &statement, keys)
        } else {
            let mut session = self.acquire()?;
            self.query(&mut session, schema, &statement, keys)
        }
    }

    /// Inserts `entry`; catalog columns it does not name are written as
    /// null. Returns the version tag of the stored row.
    pub fn insert(&self, table: &str, entry: &Entity) -> Result<VersionTag> {
        let schema = self.catalog.table(table)?;
        let statement = self.synthesizer.insert(schema);
        let row = schema.normalize(entry);
        self.write(INSERTING, table, &statement, &row, false)?;
        Ok(self.versioner.compute(table, &stored_form(schema, &row)?))
    }

    /// Updates the non-key columns named in `entry` on the row identified
    /// by its primary-key values. Returns the affected row count.
    pub fn update(&self, table: &str, entry: &Entity, transactional: bool) -> Result<u64> {
        let schema = self.catalog.table(table)?;
        let statement = self.synthesizer.update(schema, entry)?;
        self.write(UPDATING, table, &statement, entry, transactional)
    }

    /// Deletes the row identified by the primary-key values in `entry`.
    pub fn delete_row(&self, table: &str, entry: &Entity, transactional: bool) -> Result<u64> {
        let schema = self.catalog.table(table)?;
        let statement = self.synthesizer.delete(schema)?;
        self.write(DELETING, table, &statement, entry, transactional)
    }

    /// Point update of the properties named in `entry`, keyed by the
    /// primary-key values it also carries.
    pub fn update_property(&self, table: &str, entry: &Entity, transactional: bool) -> Result<u64> {
        let schema = self.catalog.table(table)?;
        let statement = self.synthesizer.update_property(schema, entry)?;
        self.write(UPDATING, table, &statement, entry, transactional)
    }

    /// Binds one exclusive session to this handler.
    pub fn open_transaction(&self) -> Result<()> {
        let mut slot = self.transaction.lock();
        if slot.is_some() {
            return Err(ServiceFault::TransactionAlreadyOpen);
        }
        let session = self.acquire()?;
        let context =
            TransactionContext::open(session, self.config.isolation, self.config.commit_mode)?;
        *slot = Some(context);
        Ok(())
    }

    /// Restores autocommit and releases the bound session. The handler is
    /// free to open a new transaction afterwards even if closing failed.
    pub fn close_transaction(&self) -> Result<()> {
        let context = self
            .transaction
            .lock()
            .take()
            .ok_or_else(|| ServiceFault::TransactionLost {
                context: "closing the transaction".to_string(),
            })?;
        context.close()
    }

    pub fn is_transaction_open(&self) -> bool {
        self.transaction.lock().is_some()
    }

    fn acquire(&self) -> Result<D::Session> {
        self.datasource
            .acquire()
            .map_err(|source| ServiceFault::Connection { source })
    }

    fn write(
        &self,
        operation: &'static str,
        table: &str,
        statement: &Statement,
        entry: &Entity,
        transactional: bool,
    ) -> Result<u64> {
        if transactional {
            let mut slot = self.transaction.lock();
            let context = bound_context(&mut *slot, operation, table)?;
            let prepared = statement.prepare(table, entry)?;
            let rows = execute(context.session()?, operation, table, &prepared)?;
            context.after_write()?;
            Ok(rows)
        } else {
            let mut session = self.acquire()?;
            let prepared = statement.prepare(table, entry)?;
            execute(&mut session, operation, table, &prepared)
        }
    }

    fn query(
        &self,
        session: &mut D::Session,
        schema: &TableSchema,
        statement: &Statement,
        keys: &Entity,
    ) -> Result<Vec<Entity>> {
        let prepared = statement.prepare(&schema.name, keys)?;
        tracing::debug!("Executing query on {}: {}", schema.name, prepared.sql());
        let rows = session
            .query(&prepared)
            .map_err(|e| execution(READING, &schema.name, e))?;
        self.decode_rows(schema, &rows)
    }

    fn decode_rows(&self, schema: &TableSchema, rows: &ResultSet) -> Result<Vec<Entity>> {
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows.rows() {
            if row.len() != schema.columns.len() {
                return Err(execution(
                    READING,
                    &schema.name,
                    DataSourceError::new(format!(
                        "row has {} columns, expected {}",
                        row.len(),
                        schema.columns.len()
                    )),
                ));
            }

            let mut entity = Entity::new();
            for (column, cell) in schema.columns.iter().zip(row) {
                let value = types::decode_column(column.raw_type, column.scale, cell)
                    .map_err(|source| ServiceFault::Bind {
                        table: schema.name.clone(),
                        column: column.name.clone(),
                        source,
                    })?;
                entity.set(column.name.clone(), value);
            }
            let tag = self.versioner.compute(&schema.name, &entity);
            entity.set_version(tag);
            entities.push(entity);
        }
        Ok(entities)
    }
}

/// `row` with each value as its column stores it, matching what a read
/// of the same row decodes.
fn stored_form(schema: &TableSchema, row: &Entity) -> Result<Entity> {
    schema
        .columns
        .iter()
        .map(|column| {
            let value = row
                .value(&column.name)
                .map(|text| types::align_scale(column.raw_type, column.scale, text))
                .transpose()
                .map_err(|source| ServiceFault::Bind {
                    table: schema.name.clone(),
                    column: column.name.clone(),
                    source,
                })?;
            Ok((column.name.clone(), value))
        })
        .collect()
}

fn bound_context<'a, S: Session>(
    slot: &'a mut Option<TransactionContext<S>>,
    operation: &str,
    table: &str,
) -> Result<&'a mut TransactionContext<S>> {
    slot.as_mut().ok_or_else(|| ServiceFault::TransactionLost {
        context: format!("{} {}", operation, table),
    })
}

fn execute<S: Session>(
    session: &mut S,
    operation: &'static str,
    table: &str,
    prepared: &PreparedStatement,
) -> Result<u64> {
    tracing::debug!(
        "Executing statement with {} parameters: {}",
        prepared.slot_count(),
        prepared.sql()
    );
    session
        .execute(prepared)
        .map_err(|e| execution(operation, table, e))
}

fn execution(operation: &'static str, table: &str, source: DataSourceError) -> ServiceFault {
    ServiceFault::Execution {
        operation,
        table: table.to_string(),
        source,
    }
}
