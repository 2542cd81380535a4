//! Arrow schema derivation and row to Arrow conversion
//!
//! Every column is a nullable Utf8 field. Columns appear in the order they
//! are first seen across the rows.

use crate::error::{Error, Result};
use crate::normalize::Row;
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::HashSet;
use std::sync::Arc;

/// Derive the table schema for a set of rows
pub fn rows_schema(rows: &[Row]) -> Schema {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    for row in rows {
        for column in row.columns() {
            if seen.insert(column) {
                fields.push(Field::new(column, DataType::Utf8, true));
            }
        }
    }

    Schema::new(fields)
}

/// Convert rows to an Arrow RecordBatch
///
/// A row without a column gets a null in that column.
pub fn rows_to_arrow(rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(rows_schema(rows));

    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| {
            let values: StringArray = rows.iter().map(|row| row.get(field.name())).collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    RecordBatch::try_new(schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Convert a RecordBatch of Utf8 columns back into rows
///
/// Nulls are left out of the row.
pub fn arrow_to_rows(batch: &RecordBatch) -> Result<Vec<Row>> {
    let schema = batch.schema();
    let mut rows = vec![Row::new(); batch.num_rows()];

    for (index, field) in schema.fields().iter().enumerate() {
        let column = batch
            .column(index)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::Output {
                message: format!(
                    "Column '{}' is {}, expected Utf8",
                    field.name(),
                    field.data_type()
                ),
            })?;

        for (row, value) in rows.iter_mut().zip(column.iter()) {
            if let Some(value) = value {
                row.insert(field.name().as_str(), value);
            }
        }
    }

    Ok(rows)
}
