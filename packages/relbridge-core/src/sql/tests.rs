use super::*;
use crate::catalog::{ColumnMeta, TableSchema};
use crate::datasource::ColumnDescriptor;
use crate::types::SqlValue;

fn meta(name: &str, raw_type: RawType, ordinal: usize) -> ColumnMeta {
    ColumnMeta::from_descriptor(
        ColumnDescriptor {
            name: name.to_string(),
            raw_type,
            size: 0,
            nullable: true,
            default_value: None,
            precision: 0,
            scale: 0,
        },
        ordinal,
    )
}

fn table(name: &str, columns: &[(&str, RawType)], keys: &[&str]) -> TableSchema {
    TableSchema {
        name: name.to_string(),
        columns: columns
            .iter()
            .enumerate()
            .map(|(i, (column, raw))| meta(column, *raw, i + 1))
            .collect(),
        primary_keys: keys.iter().map(|k| k.to_string()).collect(),
        navigation: vec![],
    }
}

fn users() -> TableSchema {
    table(
        "USERS",
        &[
            ("ID", RawType::Integer),
            ("NAME", RawType::Varchar),
            ("ACTIVE", RawType::Boolean),
        ],
        &["ID"],
    )
}

fn composite() -> TableSchema {
    table(
        "T",
        &[
            ("k2", RawType::Integer),
            ("a", RawType::Varchar),
            ("k1", RawType::Integer),
            ("b", RawType::Integer),
            ("c", RawType::Varchar),
        ],
        &["k1", "k2"],
    )
}

fn synthesizer() -> SqlSynthesizer {
    SqlSynthesizer::default()
}

#[test]
fn test_select_all_lists_columns() {
    let statement = synthesizer().select_all(&users());
    assert_eq!(
        statement.sql(),
        r#"SELECT "ID", "NAME", "ACTIVE" FROM "USERS""#
    );
    assert_eq!(statement.parameter_count(), 0);
}

#[test]
fn test_select_by_keys_uses_catalog_order() {
    let entry = Entity::new()
        .with("ACTIVE", "true")
        .with_null("NAME")
        .with("ID", "1")
        .with("BOGUS", "x");
    let statement = synthesizer().select_by_keys(&users(), &entry).unwrap();
    assert_eq!(
        statement.sql(),
        r#"SELECT "ID", "NAME", "ACTIVE" FROM "USERS" WHERE "ID" = ? AND "ACTIVE" = ?"#
    );
    assert_eq!(statement.bound_columns(), vec!["ID", "ACTIVE"]);
}

#[test]
fn test_select_by_keys_without_qualifying_columns() {
    let entry = Entity::new().with_null("ID").with("BOGUS", "1");
    assert!(synthesizer().select_by_keys(&users(), &entry).is_none());
}

#[test]
fn test_insert_binds_every_column_in_catalog_order() {
    let statement = synthesizer().insert(&users());
    assert_eq!(
        statement.sql(),
        r#"INSERT INTO "USERS" ("ID", "NAME", "ACTIVE") VALUES (?, ?, ?)"#
    );

    let entry = Entity::new()
        .with("ACTIVE", "true")
        .with("NAME", "Ann")
        .with("ID", "1");
    let prepared = statement.prepare("USERS", &entry).unwrap();
    let values: Vec<_> = prepared
        .parameters()
        .iter()
        .map(|p| p.as_ref().unwrap().value.clone())
        .collect();
    assert_eq!(
        values,
        vec![
            SqlValue::Int(1),
            SqlValue::Text("Ann".into()),
            SqlValue::Bool(true)
        ]
    );
}

#[test]
fn test_insert_binds_absent_columns_as_null() {
    let statement = synthesizer().insert(&users());
    let prepared = statement
        .prepare("USERS", &Entity::new().with("ID", "2"))
        .unwrap();
    let name = prepared.parameter(2).unwrap();
    assert_eq!(name.value, SqlValue::Null);
    assert_eq!(name.raw_type, RawType::Varchar);
}

#[test]
fn test_update_set_in_entry_order_where_in_key_order() {
    let entry = Entity::new()
        .with("k2", "20")
        .with("b", "7")
        .with("k1", "10")
        .with("a", "x");
    let statement = synthesizer().update(&composite(), &entry).unwrap();
    assert_eq!(
        statement.sql(),
        r#"UPDATE "T" SET "b" = ?, "a" = ? WHERE "k1" = ? AND "k2" = ?"#
    );
    assert_eq!(statement.bound_columns(), vec!["b", "a", "k1", "k2"]);

    let prepared = statement.prepare("T", &entry).unwrap();
    assert_eq!(prepared.slot_count(), 4);
    assert_eq!(prepared.parameter(1).unwrap().value, SqlValue::Int(7));
    assert_eq!(
        prepared.parameter(2).unwrap().value,
        SqlValue::Text("x".into())
    );
    assert_eq!(prepared.parameter(3).unwrap().value, SqlValue::Int(10));
    assert_eq!(prepared.parameter(4).unwrap().value, SqlValue::Int(20));
}

#[test]
fn test_update_skips_unknown_columns_and_allows_null() {
    let entry = Entity::new()
        .with("k1", "1")
        .with("k2", "2")
        .with("zzz", "ignored")
        .with_null("c");
    let statement = synthesizer().update(&composite(), &entry).unwrap();
    assert_eq!(statement.bound_columns(), vec!["c", "k1", "k2"]);
    let prepared = statement.prepare("T", &entry).unwrap();
    assert_eq!(prepared.parameter(1).unwrap().value, SqlValue::Null);
}

#[test]
fn test_update_without_primary_key_fails() {
    let keyless = table("LOG", &[("MSG", RawType::Varchar)], &[]);
    let err = synthesizer()
        .update(&keyless, &Entity::new().with("MSG", "x"))
        .unwrap_err();
    assert!(matches!(err, ServiceFault::MissingKey { .. }));
    let err = synthesizer().delete(&keyless).unwrap_err();
    assert!(matches!(err, ServiceFault::MissingKey { .. }));
}

#[test]
fn test_update_without_changes_fails() {
    let entry = Entity::new().with("k1", "1").with("k2", "2");
    let err = synthesizer().update(&composite(), &entry).unwrap_err();
    assert!(matches!(err, ServiceFault::NoUpdatableColumns { .. }));
}

#[test]
fn test_missing_key_value_fails_on_prepare() {
    let entry = Entity::new().with("k1", "1").with_null("k2").with("a", "x");
    let statement = synthesizer().update(&composite(), &entry).unwrap();
    let err = statement.prepare("T", &entry).unwrap_err();
    match err {
        ServiceFault::MissingKeyValue { column, .. } => assert_eq!(column, "k2"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_delete_filters_by_key_order() {
    let statement = synthesizer().delete(&composite()).unwrap();
    assert_eq!(statement.sql(), r#"DELETE FROM "T" WHERE "k1" = ? AND "k2" = ?"#);
    assert_eq!(statement.parameter_count(), 2);
}

#[test]
fn test_update_property_rejects_unknown_property() {
    let entry = Entity::new().with("k1", "1").with("k2", "2").with("nope", "x");
    let err = synthesizer()
        .update_property(&composite(), &entry)
        .unwrap_err();
    match err {
        ServiceFault::UnknownProperty { property, .. } => assert_eq!(property, "nope"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_update_property_is_keyed() {
    let entry = Entity::new().with("a", "x").with("k1", "1").with("k2", "2");
    let statement = synthesizer().update_property(&composite(), &entry).unwrap();
    assert_eq!(
        statement.sql(),
        r#"UPDATE "T" SET "a" = ? WHERE "k1" = ? AND "k2" = ?"#
    );
}

#[test]
fn test_malformed_value_reports_column() {
    let statement = synthesizer().insert(&users());
    let err = statement
        .prepare("USERS", &Entity::new().with("ID", "one"))
        .unwrap_err();
    match err {
        ServiceFault::Bind { table, column, .. } => {
            assert_eq!(table, "USERS");
            assert_eq!(column, "ID");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_dialects() {
    let numbered = SqlSynthesizer::new(SqlDialect::new(
        IdentifierQuote::Backtick,
        PlaceholderStyle::Numbered,
    ));
    assert_eq!(
        numbered.delete(&composite()).unwrap().sql(),
        "DELETE FROM `T` WHERE `k1` = ?1 AND `k2` = ?2"
    );

    let dollar = SqlSynthesizer::new(SqlDialect::new(
        IdentifierQuote::Bracket,
        PlaceholderStyle::Dollar,
    ));
    assert_eq!(
        dollar.insert(&users()).sql(),
        "INSERT INTO [USERS] ([ID], [NAME], [ACTIVE]) VALUES ($1, $2, $3)"
    );

    let bare = SqlSynthesizer::new(SqlDialect::new(
        IdentifierQuote::None,
        PlaceholderStyle::Question,
    ));
    assert_eq!(bare.select_all(&users()).sql(), "SELECT ID, NAME, ACTIVE FROM USERS");
}

#[test]
fn test_quote_escapes_embedded_quotes() {
    let dialect = SqlDialect::default();
    assert_eq!(dialect.quote(r#"we"ird"#), r#""we""ird""#);
    let dialect = SqlDialect::new(IdentifierQuote::Bracket, PlaceholderStyle::Question);
    assert_eq!(dialect.quote("a]b"), "[a]]b]");
}
