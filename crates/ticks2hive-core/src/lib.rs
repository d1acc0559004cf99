// ticks2hive-core - pure partition transform logic
//
// This crate contains the in-memory half of the converter: schema
// inspection, timestamp normalization, partition key derivation, sorting,
// group splitting and Parquet encoding. No filesystem I/O, no async, no
// runtime dependencies; everything here is deterministic for the same input.

pub mod encoding;
pub mod error;
pub mod normalize;
pub mod partition;
pub mod schema;

pub use error::{Result, TransformError};
pub use partition::{partition_by_month, partition_dir, MonthPartition, PARTITION_FILE_NAME};
pub use schema::{resolve_time_column, TimeColumnKind, TIME_COLUMN};
