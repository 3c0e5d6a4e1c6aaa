//! Criterion benchmarks for value bridging and statement synthesis.

use criterion::{criterion_group, criterion_main, Criterion};
use relbridge_core::catalog::{ColumnMeta, TableSchema};
use relbridge_core::datasource::{ColumnDescriptor, PreparedStatement};
use relbridge_core::sql::SqlSynthesizer;
use relbridge_core::types::{decode, encode};
use relbridge_core::version::compute_tag;
use relbridge_core::{Entity, RawType, SqlValue};
use std::hint::black_box;

fn wide_table(columns: usize) -> TableSchema {
    let columns = (0..columns)
        .map(|i| {
            let raw_type = match i % 4 {
                0 => RawType::Integer,
                1 => RawType::Varchar,
                2 => RawType::Decimal,
                _ => RawType::Timestamp,
            };
            ColumnMeta::from_descriptor(
                ColumnDescriptor {
                    name: format!("COL_{}", i),
                    raw_type,
                    size: 0,
                    nullable: true,
                    default_value: None,
                    precision: 18,
                    scale: 4,
                },
                i + 1,
            )
        })
        .collect();
    TableSchema {
        name: "WIDE".to_string(),
        columns,
        primary_keys: vec!["COL_0".to_string()],
        navigation: vec![],
    }
}

fn wide_entry(table: &TableSchema) -> Entity {
    table
        .columns
        .iter()
        .map(|column| {
            let value = match column.raw_type {
                RawType::Integer => "42",
                RawType::Decimal => "1234.5678",
                RawType::Timestamp => "2024-03-01T10:15:30Z",
                _ => "some text",
            };
            (column.name.clone(), Some(value.to_string()))
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let cells = [
        (RawType::Integer, SqlValue::BigInt(42)),
        (RawType::Varchar, SqlValue::Text("hello".into())),
        (RawType::Blob, SqlValue::Bytes(vec![7; 64])),
        (RawType::Decimal, SqlValue::Text("1234.5678".into())),
    ];
    c.bench_function("decode_mixed_cells", |b| {
        b.iter(|| {
            for (raw, cell) in &cells {
                black_box(decode(*raw, black_box(cell)).ok());
            }
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode_timestamp", |b| {
        b.iter(|| {
            let mut statement = PreparedStatement::new("SELECT ?", 1);
            encode(
                RawType::Timestamp,
                Some(black_box("2024-03-01T10:15:30+02:00")),
                1,
                &mut statement,
            )
            .ok();
            black_box(statement);
        })
    });
}

fn bench_synthesis(c: &mut Criterion) {
    let table = wide_table(32);
    let entry = wide_entry(&table);
    let synthesizer = SqlSynthesizer::default();

    c.bench_function("synthesize_and_prepare_update_32_columns", |b| {
        b.iter(|| {
            let statement = synthesizer.update(&table, black_box(&entry)).ok();
            black_box(statement.and_then(|s| s.prepare("WIDE", &entry).ok()));
        })
    });

    c.bench_function("version_tag_32_columns", |b| {
        b.iter(|| black_box(compute_tag("bench", "WIDE", black_box(&entry))))
    });
}

criterion_group!(benches, bench_decode, bench_encode, bench_synthesis);
criterion_main!(benches);
