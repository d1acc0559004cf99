//! Sorting and (year, month) partition splitting
//!
//! Rows are sorted ascending by `timestamp` with a stable sort, so rows
//! sharing an identical timestamp keep their input order. Because the key
//! columns are calendar parts of the sort key, each (year, month) group is a
//! contiguous slice of the sorted batch and can be split with the range
//! partition kernel instead of hashing.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{RecordBatch, StringArray, UInt32Array};
use arrow::compute::kernels::partition::partition;
use arrow::compute::take;

use crate::error::{Result, TransformError};
use crate::normalize::{normalize_timestamp, timestamp_micros, with_partition_keys};
use crate::schema::{TimeColumnKind, MONTH_COLUMN, YEAR_COLUMN};

/// File name written inside every partition directory
pub const PARTITION_FILE_NAME: &str = "01.parquet";

/// One (year, month) group of the input, ready to be written
#[derive(Debug)]
pub struct MonthPartition {
    /// 4-digit year string
    pub year: String,
    /// Zero-padded 2-digit month string
    pub month: String,
    /// Group rows, sorted by `timestamp`, key columns already dropped
    pub rows: RecordBatch,
}

impl MonthPartition {
    /// Destination directory for this partition under `root`
    pub fn dir(&self, root: &Path, symbol: &str) -> PathBuf {
        partition_dir(root, symbol, &self.year, &self.month)
    }
}

/// Build the Hive-style partition directory path
/// `<root>/symbol=<symbol>/year=<year>/month=<month>`
pub fn partition_dir(root: &Path, symbol: &str, year: &str, month: &str) -> PathBuf {
    root.join(format!("symbol={symbol}"))
        .join(format!("year={year}"))
        .join(format!("month={month}"))
}

/// Run the full in-memory pipeline: normalize `time`, derive key columns,
/// sort by `timestamp`, split into one group per distinct (year, month).
pub fn partition_by_month(batch: &RecordBatch, kind: TimeColumnKind) -> Result<Vec<MonthPartition>> {
    let normalized = normalize_timestamp(batch, kind)?;
    let keyed = with_partition_keys(&normalized)?;
    let sorted = sort_by_timestamp(&keyed)?;
    split_by_keys(&sorted)
}

/// Sort all rows ascending by `timestamp`.
///
/// Uses a stable index sort: rows sharing a timestamp keep input order.
pub fn sort_by_timestamp(batch: &RecordBatch) -> Result<RecordBatch> {
    let micros = timestamp_micros(batch)?;
    let values = micros.values();

    let mut indices: Vec<u32> = (0..batch.num_rows() as u32).collect();
    indices.sort_by_key(|&i| values[i as usize]);
    let indices = UInt32Array::from(indices);

    let columns = batch
        .columns()
        .iter()
        .map(|col| take(col.as_ref(), &indices, None))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    RecordBatch::try_new(batch.schema(), columns).map_err(Into::into)
}

fn split_by_keys(sorted: &RecordBatch) -> Result<Vec<MonthPartition>> {
    if sorted.num_rows() == 0 {
        return Ok(Vec::new());
    }

    let schema = sorted.schema();
    let year_idx = schema
        .index_of(YEAR_COLUMN)
        .map_err(|e| TransformError::schema(e.to_string()))?;
    let month_idx = schema
        .index_of(MONTH_COLUMN)
        .map_err(|e| TransformError::schema(e.to_string()))?;

    // Everything except the key columns survives into the output files; the
    // directory path already encodes year and month.
    let keep: Vec<usize> = (0..schema.fields().len())
        .filter(|&i| i != year_idx && i != month_idx)
        .collect();

    let ranges = partition(&[
        Arc::clone(sorted.column(year_idx)),
        Arc::clone(sorted.column(month_idx)),
    ])?
    .ranges();

    ranges
        .into_iter()
        .map(|range| slice_partition(sorted, year_idx, month_idx, &keep, range))
        .collect()
}

fn slice_partition(
    sorted: &RecordBatch,
    year_idx: usize,
    month_idx: usize,
    keep: &[usize],
    range: Range<usize>,
) -> Result<MonthPartition> {
    let key_at = |idx: usize| -> Result<String> {
        let col = sorted
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| TransformError::schema("partition key column is not a string"))?;
        Ok(col.value(range.start).to_string())
    };

    let rows = sorted
        .slice(range.start, range.end - range.start)
        .project(keep)?;

    Ok(MonthPartition {
        year: key_at(year_idx)?,
        month: key_at(month_idx)?,
        rows,
    })
}
