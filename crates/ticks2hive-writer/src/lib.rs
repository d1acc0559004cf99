// ticks2hive-writer - filesystem side of the converter
//
// Reads one per-symbol Parquet file, runs the core pipeline and writes one
// snappy-compressed file per (year, month) partition under a Hive-style
// directory tree. Fully synchronous, single pass, fail-fast: a mid-loop
// failure leaves earlier partitions on disk and later ones absent.
//
// Two concurrent runs against the same output root race on the same
// `01.parquet` destinations; last writer wins. Intended usage is
// single-operator batch conversion.

use std::fs::{self, File};
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

use arrow::compute::concat_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};

use ticks2hive_core::{
    encoding::write_parquet_into, partition_by_month, resolve_time_column, Result, TransformError,
    PARTITION_FILE_NAME,
};

/// Derive the partition label from the input file's base name: the text
/// before the first `.` separator (`ETHUSDT.2024.parquet` -> `ETHUSDT`).
///
/// The label is not validated; it is assumed to be a clean identifier such
/// as an instrument ticker.
pub fn symbol_label(input: &Path) -> Result<String> {
    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            TransformError::file_access(
                input,
                IoError::new(ErrorKind::InvalidInput, "input path has no file name"),
            )
        })?;

    Ok(name.split('.').next().unwrap_or(name).to_string())
}

/// Convert one per-symbol Parquet file into a Hive-partitioned tree rooted
/// at `output_root`.
///
/// For every distinct (year, month) pair among the input timestamps, writes
/// `<output_root>/symbol=<label>/year=<Y>/month=<M>/01.parquet` containing
/// that month's rows sorted by `timestamp`, with the key columns dropped.
/// Existing partition files are overwritten, not merged. One `Saved:` line
/// per file goes to stdout.
pub fn transform(input: &Path, output_root: &Path) -> Result<()> {
    let label = symbol_label(input)?;

    let file = File::open(input).map_err(|e| TransformError::file_access(input, e))?;

    // Schema is known before any rows are materialized, so a missing `time`
    // column fails here, ahead of directory creation.
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let kind = resolve_time_column(builder.schema())?;
    debug!(symbol = %label, ?kind, "resolved time column");

    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    debug!(rows = batch.num_rows(), "materialized input");

    for part in partition_by_month(&batch, kind)? {
        let dir = part.dir(output_root, &label);
        fs::create_dir_all(&dir).map_err(|e| TransformError::file_access(&dir, e))?;

        let path = dir.join(PARTITION_FILE_NAME);
        let mut out = File::create(&path).map_err(|e| TransformError::file_access(&path, e))?;
        write_parquet_into(&part.rows, &mut out)?;

        info!(path = %path.display(), rows = part.rows.num_rows(), "partition written");
        println!("Saved: {}", path.display());
    }

    Ok(())
}
