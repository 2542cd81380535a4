//! Record normalization
//!
//! Turns fetched JSON records into flat rows of string columns so they can
//! be written as JSON lines or as a Parquet table.

use crate::types::{JsonObject, JsonValue, Record};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// Row
// ============================================================================

/// Flat record: string columns in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, String)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, keeping its original position when it already exists
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Value of a column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Column/value pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// BSS records
// ============================================================================

/// Flatten BSS records into one row per access point
///
/// Each row carries `serial`, `name`, `eth_mac` and, per radio,
/// `radio{index}_wireless_mac` plus `radio{index}_bss{n}_mac`. Rows are keyed
/// by serial: a later record for the same serial replaces the earlier row
/// in place. Records without a serial are skipped.
pub fn flatten_bss(records: &[Record]) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::with_capacity(records.len());
    let mut by_serial: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(serial) = record.get("serial").map(scalar_to_string) else {
            debug!("Skipping BSS record without serial");
            continue;
        };
        let row = bss_row(&serial, record);

        match by_serial.get(&serial) {
            Some(&index) => rows[index] = row,
            None => {
                by_serial.insert(serial, rows.len());
                rows.push(row);
            }
        }
    }
    rows
}

fn bss_row(serial: &str, record: &Record) -> Row {
    let mut row = Row::new();
    row.insert("serial", serial);
    if let Some(name) = record.get("name") {
        row.insert("name", scalar_to_string(name));
    }
    if let Some(mac) = record.get("macaddr") {
        row.insert("eth_mac", scalar_to_string(mac));
    }

    let radios = record
        .get("radio_bssids")
        .and_then(JsonValue::as_array)
        .map_or(&[][..], Vec::as_slice);

    for radio in radios {
        let index = radio.get("index").map_or_else(String::new, scalar_to_string);
        if let Some(mac) = radio.get("macaddr") {
            row.insert(format!("radio{index}_wireless_mac"), scalar_to_string(mac));
        }
        let Some(bssids) = radio.get("bssids").and_then(JsonValue::as_array) else {
            continue;
        };
        for (n, bssid) in bssids.iter().enumerate() {
            if let Some(mac) = bssid.get("macaddr") {
                row.insert(format!("radio{index}_bss{n}_mac"), scalar_to_string(mac));
            }
        }
    }
    row
}

// ============================================================================
// Generic records
// ============================================================================

/// Flatten arbitrary records, one row per record
pub fn flatten_records(records: &[Record]) -> Vec<Row> {
    records.iter().map(flatten_record).collect()
}

/// Flatten one record
///
/// Nested objects become `parent.child` columns, arrays of scalars are
/// joined with `,`, arrays holding objects become `parent.N.child` and
/// nulls are left out. A non-object record becomes a single `value` column.
pub fn flatten_record(record: &Record) -> Row {
    let mut row = Row::new();
    match record {
        JsonValue::Object(map) => flatten_object(map, None, &mut row),
        JsonValue::Null => {}
        other => flatten_value(other, "value", &mut row),
    }
    row
}

fn flatten_object(map: &JsonObject, prefix: Option<&str>, row: &mut Row) {
    for (key, value) in map {
        let column = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        flatten_value(value, &column, row);
    }
}

fn flatten_value(value: &JsonValue, column: &str, row: &mut Row) {
    match value {
        JsonValue::Null => {}
        JsonValue::Object(map) => flatten_object(map, Some(column), row),
        JsonValue::Array(items) if items.iter().any(is_nested) => {
            for (n, item) in items.iter().enumerate() {
                flatten_value(item, &format!("{column}.{n}"), row);
            }
        }
        JsonValue::Array(items) => {
            let joined = items
                .iter()
                .filter(|item| !item.is_null())
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            row.insert(column, joined);
        }
        scalar => row.insert(column, scalar_to_string(scalar)),
    }
}

fn is_nested(value: &JsonValue) -> bool {
    matches!(value, JsonValue::Object(_) | JsonValue::Array(_))
}

/// Render a value as a column string; strings lose their quotes
fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
