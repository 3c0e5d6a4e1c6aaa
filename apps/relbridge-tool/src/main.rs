//! Inspection tool for relbridge.
//!
//! Opens a SQLite database, introspects it and prints catalog information
//! or rows with their version tags as JSON.

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use relbridge_core::{BridgeConfig, Entity, RdbmsHandler};
use relbridge_sqlite::SqliteDataSource;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    config.apply_env_overrides()?;

    if !cli.database.exists() {
        return Err(anyhow!("database {} does not exist", cli.database.display()));
    }
    let handler = RdbmsHandler::new(SqliteDataSource::open(&cli.database), config)
        .context("introspecting database")?;
    tracing::info!("Loaded {} tables", handler.catalog().len());

    let output = match cli.command {
        Commands::Tables => json!(handler.list_tables()),
        Commands::Schema { table } => match table {
            Some(name) => serde_json::to_value(handler.catalog().table(&name)?)?,
            None => serde_json::to_value(handler.table_metadata())?,
        },
        Commands::Links => {
            let mut links = serde_json::Map::new();
            for name in handler.list_tables() {
                let schema = handler.catalog().table(&name)?;
                links.insert(
                    name.clone(),
                    json!({
                        "links": schema.navigation,
                        "reachable": handler.catalog().related_tables(&name)?,
                    }),
                );
            }
            Value::Object(links)
        }
        Commands::Dump { table } => rows_json(&handler.read_all(&table)?),
        Commands::Get { table, filters } => {
            let keys = parse_filters(&filters)?;
            rows_json(&handler.read_by_keys(&table, &keys, false)?)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_filters(filters: &[String]) -> Result<Entity> {
    let mut entity = Entity::new();
    for filter in filters {
        let (column, value) = filter
            .split_once('=')
            .ok_or_else(|| anyhow!("filter '{}' is not COLUMN=VALUE", filter))?;
        entity.set(column.trim(), Some(value.to_string()));
    }
    Ok(entity)
}

fn rows_json(rows: &[Entity]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| {
                let mut object = serde_json::Map::new();
                for (column, value) in row.iter() {
                    object.insert(column.to_string(), json!(value));
                }
                if let Some(tag) = row.version() {
                    object.insert("@version".to_string(), json!(tag.as_str()));
                }
                Value::Object(object)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        let entity = parse_filters(&["ID=1".to_string(), "NAME=a=b".to_string()]).unwrap();
        assert_eq!(entity.value("ID"), Some("1"));
        assert_eq!(entity.value("NAME"), Some("a=b"));
        assert!(parse_filters(&["oops".to_string()]).is_err());
    }

    #[test]
    fn test_rows_json_marks_nulls() {
        let mut row = Entity::new().with("ID", "1").with_null("NAME");
        row.set_version(relbridge_core::VersionTag::new("abc"));
        let value = rows_json(&[row]);
        assert_eq!(value[0]["ID"], json!("1"));
        assert_eq!(value[0]["NAME"], Value::Null);
        assert_eq!(value[0]["@version"], json!("abc"));
    }
}
