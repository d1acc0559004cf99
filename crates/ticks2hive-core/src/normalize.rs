//! Timestamp normalization and partition key derivation
//!
//! The `time` column is renamed to `timestamp`, decoding Int64 epoch values
//! (microseconds) into a proper timestamp type along the way. Already-decoded
//! timestamps pass through untouched. `year`/`month` key columns are then
//! appended from calendar parts of `timestamp`.

use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, StringArray, TimestampMicrosecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{DateTime, Datelike};

use crate::error::{Result, TransformError};
use crate::schema::{TimeColumnKind, MONTH_COLUMN, TIMESTAMP_COLUMN, TIME_COLUMN, YEAR_COLUMN};

/// Rename `time` to `timestamp`, decoding Int64 epoch microseconds when the
/// column is integer-typed.
///
/// The already-decoded branch performs no coercion or validation: values are
/// trusted as-is.
pub fn normalize_timestamp(batch: &RecordBatch, kind: TimeColumnKind) -> Result<RecordBatch> {
    let time_idx = batch
        .schema()
        .index_of(TIME_COLUMN)
        .map_err(|_| TransformError::schema(format!("required column '{TIME_COLUMN}' not found")))?;

    let time_col = batch.column(time_idx);
    let timestamp_col: ArrayRef = match kind {
        TimeColumnKind::Epoch64 => cast(
            time_col,
            &DataType::Timestamp(TimeUnit::Microsecond, None),
        )?,
        TimeColumnKind::AlreadyTimestamp(_) => Arc::clone(time_col),
    };

    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields[time_idx] = Field::new(
        TIMESTAMP_COLUMN,
        timestamp_col.data_type().clone(),
        fields[time_idx].is_nullable(),
    );

    let mut columns = batch.columns().to_vec();
    columns[time_idx] = timestamp_col;

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}

/// View the `timestamp` column as epoch microseconds, regardless of the
/// stored unit.
pub(crate) fn timestamp_micros(batch: &RecordBatch) -> Result<TimestampMicrosecondArray> {
    let timestamp_col = batch
        .column_by_name(TIMESTAMP_COLUMN)
        .ok_or_else(|| TransformError::schema(format!("column '{TIMESTAMP_COLUMN}' not found")))?;

    if timestamp_col.null_count() > 0 {
        return Err(TransformError::schema(format!(
            "column '{TIME_COLUMN}' contains null values"
        )));
    }

    let micros = cast(
        timestamp_col,
        &DataType::Timestamp(TimeUnit::Microsecond, None),
    )?;
    micros
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .cloned()
        .ok_or_else(|| {
            TransformError::schema(format!("column '{TIMESTAMP_COLUMN}' is not a timestamp"))
        })
}

/// Append `year` (4-digit) and `month` (zero-padded 2-digit) string columns
/// derived from calendar parts of `timestamp`.
pub fn with_partition_keys(batch: &RecordBatch) -> Result<RecordBatch> {
    let micros = timestamp_micros(batch)?;

    let mut years = Vec::with_capacity(micros.len());
    let mut months = Vec::with_capacity(micros.len());
    for value in micros.values() {
        let dt = DateTime::from_timestamp_micros(*value).ok_or_else(|| {
            TransformError::schema(format!("timestamp {value} is out of calendar range"))
        })?;
        years.push(format!("{:04}", dt.year()));
        months.push(format!("{:02}", dt.month()));
    }

    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(Field::new(YEAR_COLUMN, DataType::Utf8, false));
    fields.push(Field::new(MONTH_COLUMN, DataType::Utf8, false));

    let mut columns = batch.columns().to_vec();
    columns.push(Arc::new(StringArray::from(years)) as ArrayRef);
    columns.push(Arc::new(StringArray::from(months)) as ArrayRef);

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, TimestampMillisecondArray};

    // 2024-01-15 14:30:00 UTC
    const JAN_MICROS: i64 = 1_705_327_800_000_000;
    // 2024-02-01 00:00:00 UTC
    const FEB_MICROS: i64 = 1_706_745_600_000_000;

    fn epoch_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Int64, false),
            Field::new("price", DataType::Utf8, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![JAN_MICROS, FEB_MICROS])),
                Arc::new(StringArray::from(vec!["100.5", "101.2"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_epoch64_is_decoded_to_microsecond_timestamp() {
        let batch = normalize_timestamp(&epoch_batch(), TimeColumnKind::Epoch64).unwrap();

        let field = batch.schema().field(0).clone();
        assert_eq!(field.name(), "timestamp");
        assert_eq!(
            field.data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, None)
        );
        // Other columns untouched
        assert_eq!(batch.schema().field(1).name(), "price");
    }

    #[test]
    fn test_already_timestamp_passes_through_unchanged() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "time",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(TimestampMillisecondArray::from(vec![
                JAN_MICROS / 1000,
            ]))],
        )
        .unwrap();

        let normalized = normalize_timestamp(
            &batch,
            TimeColumnKind::AlreadyTimestamp(TimeUnit::Millisecond),
        )
        .unwrap();
        assert_eq!(normalized.schema().field(0).name(), "timestamp");
        // Unit preserved, no recoding
        assert_eq!(
            normalized.schema().field(0).data_type(),
            &DataType::Timestamp(TimeUnit::Millisecond, None)
        );
    }

    #[test]
    fn test_partition_keys_are_zero_padded_strings() {
        let batch = normalize_timestamp(&epoch_batch(), TimeColumnKind::Epoch64).unwrap();
        let keyed = with_partition_keys(&batch).unwrap();

        let years = keyed
            .column_by_name("year")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();
        let months = keyed
            .column_by_name("month")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();

        assert_eq!(years.value(0), "2024");
        assert_eq!(months.value(0), "01");
        assert_eq!(months.value(1), "02");
    }

    #[test]
    fn test_millisecond_timestamps_derive_the_same_keys() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "time",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(TimestampMillisecondArray::from(vec![
                JAN_MICROS / 1000,
            ]))],
        )
        .unwrap();

        let normalized = normalize_timestamp(
            &batch,
            TimeColumnKind::AlreadyTimestamp(TimeUnit::Millisecond),
        )
        .unwrap();
        let keyed = with_partition_keys(&normalized).unwrap();
        let years = keyed
            .column_by_name("year")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();
        assert_eq!(years.value(0), "2024");
    }

    #[test]
    fn test_null_timestamp_is_schema_error() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "time",
            DataType::Int64,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int64Array::from(vec![Some(JAN_MICROS), None]))],
        )
        .unwrap();

        let normalized = normalize_timestamp(&batch, TimeColumnKind::Epoch64).unwrap();
        let err = with_partition_keys(&normalized).unwrap_err();
        assert!(matches!(err, TransformError::Schema(_)));
    }
}
