//! Catalog queries over `sqlite_master` and the pragma table functions.

use relbridge_core::datasource::{ColumnDescriptor, DataSourceError, ExportedKey};
use relbridge_core::types::TypeDeclaration;
use rusqlite::Connection;

fn metadata_error(context: &str, source: rusqlite::Error) -> DataSourceError {
    DataSourceError::with_source(format!("failed to read {}", context), source)
}

/// User tables in creation order.
pub fn tables(conn: &Connection) -> Result<Vec<String>, DataSourceError> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY rowid",
        )
        .map_err(|e| metadata_error("table list", e))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| metadata_error("table list", e))?;
    Ok(names)
}

/// Columns in declaration order, typed by their declared type name.
///
/// `INTEGER` reports the Int32 category, so values above `i32::MAX` in
/// such a column cannot be read back.
pub fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>, DataSourceError> {
    let context = format!("columns of {}", table);
    let mut stmt = conn
        .prepare(
            "SELECT name, type, \"notnull\", dflt_value \
             FROM pragma_table_info(?1) ORDER BY cid",
        )
        .map_err(|e| metadata_error(&context, e))?;
    let columns = stmt
        .query_map([table], |row| {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            let not_null: i64 = row.get(2)?;
            let default_value: Option<String> = row.get(3)?;
            let declaration = TypeDeclaration::parse(&declared);
            Ok(ColumnDescriptor {
                name,
                raw_type: declaration.raw_type,
                size: declaration.size.unwrap_or(0),
                nullable: not_null == 0,
                default_value,
                precision: declaration.size.unwrap_or(0),
                scale: declaration.scale.unwrap_or(0),
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| metadata_error(&context, e))?;
    Ok(columns)
}

/// Primary-key columns in key order.
pub fn primary_keys(conn: &Connection, table: &str) -> Result<Vec<String>, DataSourceError> {
    let context = format!("primary keys of {}", table);
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk")
        .map_err(|e| metadata_error(&context, e))?;
    let keys = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| metadata_error(&context, e))?;
    Ok(keys)
}

/// Foreign-key pairs in every table that reference `table`.
///
/// Child tables are visited in creation order and pairs within one
/// constraint in sequence order. A reference without explicit parent
/// columns targets the parent's primary key.
pub fn exported_keys(conn: &Connection, table: &str) -> Result<Vec<ExportedKey>, DataSourceError> {
    let context = format!("foreign keys referencing {}", table);
    let parent_keys = primary_keys(conn, table)?;
    let mut stmt = conn
        .prepare(
            "SELECT seq, \"from\", \"to\" FROM pragma_foreign_key_list(?1) \
             WHERE \"table\" = ?2 COLLATE NOCASE ORDER BY id, seq",
        )
        .map_err(|e| metadata_error(&context, e))?;

    let mut exported = Vec::new();
    for child in tables(conn)? {
        let pairs = stmt
            .query_map([child.as_str(), table], |row| {
                let seq: i64 = row.get(0)?;
                let from: String = row.get(1)?;
                let to: Option<String> = row.get(2)?;
                Ok((seq, from, to))
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| metadata_error(&context, e))?;

        for (seq, fk_column, to) in pairs {
            let index = usize::try_from(seq).unwrap_or(usize::MAX);
            let pk_column = match to {
                Some(column) => column,
                None => parent_keys.get(index).cloned().ok_or_else(|| {
                    DataSourceError::new(format!(
                        "foreign key {}.{} references {} which has no matching key column",
                        child, fk_column, table
                    ))
                })?,
            };
            exported.push(ExportedKey {
                pk_column,
                fk_table: child.clone(),
                fk_column,
                key_seq: u32::try_from(seq + 1).unwrap_or(u32::MAX),
            });
        }
    }
    Ok(exported)
}
