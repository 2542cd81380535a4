//! Output module
//!
//! Writes fetched data as JSON lines, pretty JSON or Parquet.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Deriving an Arrow schema from normalized rows
//! - Converting rows to Arrow RecordBatches
//! - Writing Parquet files
//! - Writing JSON to files or stdout

mod schema;
mod writer;

pub use schema::{arrow_to_rows, rows_schema, rows_to_arrow};
pub use writer::{
    write_batch_to_parquet, write_json, write_records, write_rows, OutputFormat, ParquetWriter,
    ParquetWriterConfig,
};

#[cfg(test)]
mod tests;
