//! Input schema inspection
//!
//! The `time` column arrives in one of two shapes: a raw Int64 epoch value or
//! an already-decoded timestamp. The shape is resolved once, from the schema
//! alone, before any rows are materialized.

use arrow::datatypes::{DataType, Schema, TimeUnit};

use crate::error::{Result, TransformError};

/// Name of the required input column
pub const TIME_COLUMN: &str = "time";

/// Name of the normalized output column
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Partition key column names, appended during the pipeline and dropped
/// before write
pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";

/// Storage shape of the input `time` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeColumnKind {
    /// Int64 microseconds since the Unix epoch
    Epoch64,
    /// Already a timestamp; carried through unchanged, no re-validation
    AlreadyTimestamp(TimeUnit),
}

/// Resolve the shape of the `time` column from the input schema.
///
/// Fails with a schema error when `time` is absent or of a type the
/// transform cannot turn into a timestamp.
pub fn resolve_time_column(schema: &Schema) -> Result<TimeColumnKind> {
    let field = schema
        .field_with_name(TIME_COLUMN)
        .map_err(|_| TransformError::schema(format!("required column '{TIME_COLUMN}' not found")))?;

    match field.data_type() {
        DataType::Int64 => Ok(TimeColumnKind::Epoch64),
        DataType::Timestamp(unit, _) => Ok(TimeColumnKind::AlreadyTimestamp(*unit)),
        other => Err(TransformError::schema(format!(
            "column '{TIME_COLUMN}' has type {other}, expected Int64 or Timestamp"
        ))),
    }
}
