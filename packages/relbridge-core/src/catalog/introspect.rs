//! Catalog construction from datasource metadata.
//!
//! Any metadata failure aborts the whole scan; a partial catalog is never
//! returned.

use crate::datasource::{DataSourceError, Session};
use crate::error::{Result, ServiceFault};

use super::navigation::group_exported_keys;
use super::{Catalog, ColumnMeta, TableSchema};

/// Scans every base table visible to `session` and builds the catalog.
pub fn introspect<S: Session + ?Sized>(session: &mut S) -> Result<Catalog> {
    let catalog_name = session
        .catalog_name()
        .map_err(|e| introspection("catalog name", e))?;
    let tables = discover_tables(session, catalog_name.as_deref())?;

    let mut schemas = Vec::with_capacity(tables.len());
    for table in &tables {
        schemas.push(build_schema(session, catalog_name.as_deref(), table)?);
    }

    let catalog = Catalog::from_schemas(schemas)?;
    tracing::info!(
        "Catalog built with {} tables (catalog: {})",
        catalog.len(),
        catalog_name.as_deref().unwrap_or("<default>")
    );
    Ok(catalog)
}

/// Base-table names in datasource order.
pub fn discover_tables<S: Session + ?Sized>(
    session: &mut S,
    catalog: Option<&str>,
) -> Result<Vec<String>> {
    session
        .tables(catalog)
        .map_err(|e| introspection("table names", e))
}

/// Reads columns, primary keys and exported foreign keys of one table.
pub fn build_schema<S: Session + ?Sized>(
    session: &mut S,
    catalog: Option<&str>,
    table: &str,
) -> Result<TableSchema> {
    let columns = session
        .columns(catalog, table)
        .map_err(|e| introspection(format!("columns of {}", table), e))?
        .into_iter()
        .enumerate()
        .map(|(index, descriptor)| ColumnMeta::from_descriptor(descriptor, index + 1))
        .collect::<Vec<_>>();

    let primary_keys = session
        .primary_keys(catalog, table)
        .map_err(|e| introspection(format!("primary keys of {}", table), e))?;

    let exported = session
        .exported_keys(catalog, table)
        .map_err(|e| introspection(format!("navigation properties of {}", table), e))?;
    let navigation = group_exported_keys(exported);

    tracing::debug!(
        "Table {}: {} columns, {} key columns, {} navigation links",
        table,
        columns.len(),
        primary_keys.len(),
        navigation.len()
    );

    Ok(TableSchema {
        name: table.to_string(),
        columns,
        primary_keys,
        navigation,
    })
}

fn introspection(context: impl Into<String>, source: DataSourceError) -> ServiceFault {
    ServiceFault::Introspection {
        context: context.into(),
        source,
    }
}
