//! Tests for output module

use super::*;
use crate::normalize::{flatten_bss, Row};
use arrow::array::Array;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs::File;
use std::path::Path;
use tempfile::tempdir;
use test_case::test_case;

fn row(pairs: &[(&str, &str)]) -> Row {
    let mut row = Row::new();
    for (column, value) in pairs {
        row.insert(*column, *value);
    }
    row
}

fn sample_rows() -> Vec<Row> {
    vec![
        row(&[("serial", "A"), ("name", "lobby")]),
        row(&[("serial", "B"), ("radio0_wireless_mac", "bb:00")]),
    ]
}

fn read_parquet(path: &Path) -> Vec<Row> {
    let file = File::open(path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    reader
        .flat_map(|batch| arrow_to_rows(&batch.unwrap()).unwrap())
        .collect()
}

// ============================================================================
// Schema Tests
// ============================================================================

#[test]
fn test_rows_schema_first_seen_order() {
    let schema = rows_schema(&sample_rows());

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["serial", "name", "radio0_wireless_mac"]);
    for field in schema.fields() {
        assert_eq!(field.data_type(), &DataType::Utf8);
        assert!(field.is_nullable());
    }
}

#[test]
fn test_rows_to_arrow_fills_missing_with_nulls() {
    let batch = rows_to_arrow(&sample_rows()).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 3);
    assert_eq!(batch.column(1).null_count(), 1);
    assert_eq!(batch.column(2).null_count(), 1);
}

#[test]
fn test_rows_to_arrow_empty() {
    let batch = rows_to_arrow(&[]).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert!(batch.schema().fields().is_empty());
}

#[test]
fn test_arrow_to_rows_round_trip_drops_nulls() {
    let rows = sample_rows();
    let batch = rows_to_arrow(&rows).unwrap();

    assert_eq!(arrow_to_rows(&batch).unwrap(), rows);
}

// ============================================================================
// Parquet Writer Tests
// ============================================================================

#[test]
fn test_parquet_writer_config_builder() {
    assert_eq!(ParquetWriterConfig::default().row_group_size(), 1024 * 1024);

    let config = ParquetWriterConfig::new()
        .with_row_group_size(1000)
        .with_compression(parquet::basic::Compression::UNCOMPRESSED);
    assert_eq!(config.row_group_size(), 1000);
}

#[test]
fn test_parquet_writer_rows_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("writer.parquet");

    let batch = rows_to_arrow(&sample_rows()).unwrap();
    let config = ParquetWriterConfig::default();
    let mut writer = ParquetWriter::new(&path, batch.schema().as_ref(), &config).unwrap();

    assert_eq!(writer.rows_written(), 0);
    writer.write(&batch).unwrap();
    assert_eq!(writer.rows_written(), 2);
    assert_eq!(writer.close().unwrap(), 2);
}

#[test]
fn test_write_rows_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bss.parquet");

    let records = vec![
        json!({"serial": "A", "name": "lobby", "macaddr": "aa:00"}),
        json!({"serial": "B", "name": "hall", "macaddr": "aa:01"}),
    ];
    let rows = flatten_bss(&records);

    let written = write_rows(&rows, OutputFormat::Parquet, Some(path.as_path())).unwrap();

    assert_eq!(written, 2);
    assert_eq!(read_parquet(&path), rows);
}

#[test]
fn test_write_rows_parquet_needs_path() {
    let err = write_rows(&sample_rows(), OutputFormat::Parquet, None).unwrap_err();
    assert!(err.to_string().contains("file path"));
}

#[test]
fn test_write_rows_parquet_skips_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.parquet");

    assert_eq!(write_rows(&[], OutputFormat::Parquet, Some(path.as_path())).unwrap(), 0);
    assert!(!path.exists());
}

// ============================================================================
// JSON Writer Tests
// ============================================================================

#[test]
fn test_write_json_lines() {
    let mut buf = Vec::new();
    let written = write_json(&sample_rows(), false, &mut buf).unwrap();

    assert_eq!(written, 2);
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "{\"serial\":\"A\",\"name\":\"lobby\"}\n{\"serial\":\"B\",\"radio0_wireless_mac\":\"bb:00\"}\n"
    );
}

#[test]
fn test_write_json_pretty_is_an_array() {
    let mut buf = Vec::new();
    write_json(&sample_rows(), true, &mut buf).unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    assert_eq!(parsed[1]["radio0_wireless_mac"], "bb:00");
}

#[test]
fn test_write_rows_json_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rows.jsonl");

    write_rows(&sample_rows(), OutputFormat::Json, Some(path.as_path())).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_write_records_raw() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("raw.json");
    let records = vec![json!({"serial": "A", "radio_bssids": [{"index": 0}]})];

    write_records(&records, OutputFormat::Pretty, Some(path.as_path())).unwrap();
    let back: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, records);

    let err = write_records(&records, OutputFormat::Parquet, Some(path.as_path())).unwrap_err();
    assert!(err.to_string().contains("json or pretty"));
}

#[test_case(OutputFormat::Json, "jsonl")]
#[test_case(OutputFormat::Pretty, "json")]
#[test_case(OutputFormat::Parquet, "parquet")]
fn test_output_format_extension(format: OutputFormat, extension: &str) {
    assert_eq!(format.extension(), extension);
}
