//! Output writers
//!
//! JSON lines and pretty JSON go to a file or stdout; Parquet always goes to
//! a file.

use super::schema::rows_to_arrow;
use crate::error::{Error, Result};
use crate::normalize::Row;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Pretty-printed JSON array
    Pretty,
    /// Parquet file of Utf8 columns
    Parquet,
}

impl OutputFormat {
    /// File extension used when writing into a directory
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "jsonl",
            OutputFormat::Pretty => "json",
            OutputFormat::Parquet => "parquet",
        }
    }
}

// ============================================================================
// Parquet
// ============================================================================

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet file writer
pub struct ParquetWriter {
    /// Arrow writer
    writer: ArrowWriter<File>,
    /// Number of rows written
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::Output {
            message: format!("Failed to create '{}': {e}", path.display()),
        })?;

        let props = config.build_properties();
        let writer =
            ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props)).map_err(|e| {
                Error::Output {
                    message: format!("Failed to create Parquet writer: {e}"),
                }
            })?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch: {e}"),
        })?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }
}

/// Write a single RecordBatch to a Parquet file
pub fn write_batch_to_parquet(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    config: Option<&ParquetWriterConfig>,
) -> Result<usize> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::new(path, batch.schema().as_ref(), config)?;
    writer.write(batch)?;
    writer.close()
}

// ============================================================================
// JSON
// ============================================================================

/// Write items as JSON lines or a pretty JSON array
pub fn write_json<T: Serialize>(items: &[T], pretty: bool, writer: impl Write) -> Result<usize> {
    let mut writer = BufWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, items)?;
        writeln!(writer)?;
    } else {
        for item in items {
            serde_json::to_writer(&mut writer, item)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(items.len())
}

fn write_json_to<T: Serialize>(items: &[T], pretty: bool, path: Option<&Path>) -> Result<usize> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| Error::Output {
                message: format!("Failed to create '{}': {e}", path.display()),
            })?;
            write_json(items, pretty, file)
        }
        None => write_json(items, pretty, std::io::stdout().lock()),
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Write normalized rows in `format` to `path`, or stdout when `path` is None
///
/// Returns the number of rows written. An empty Parquet table is not written.
pub fn write_rows(rows: &[Row], format: OutputFormat, path: Option<&Path>) -> Result<usize> {
    match format {
        OutputFormat::Json => write_json_to(rows, false, path),
        OutputFormat::Pretty => write_json_to(rows, true, path),
        OutputFormat::Parquet => {
            let path = path.ok_or_else(|| Error::output("Parquet output needs a file path"))?;
            if rows.is_empty() {
                warn!(path = %path.display(), "No rows to write, skipping Parquet file");
                return Ok(0);
            }
            let batch = rows_to_arrow(rows)?;
            debug!(
                path = %path.display(),
                columns = batch.num_columns(),
                rows = batch.num_rows(),
                "Writing Parquet"
            );
            write_batch_to_parquet(path, &batch, None)
        }
    }
}

/// Write records as fetched, without normalization
///
/// Only the JSON formats can carry unflattened records.
pub fn write_records<T: Serialize>(
    records: &[T],
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<usize> {
    match format {
        OutputFormat::Json => write_json_to(records, false, path),
        OutputFormat::Pretty => write_json_to(records, true, path),
        OutputFormat::Parquet => Err(Error::output(
            "Unnormalized records can only be written as json or pretty",
        )),
    }
}
