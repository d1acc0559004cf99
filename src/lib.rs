// ticks2hive - library surface
//
// Re-exports the converter API for embedding; the binary in main.rs is a
// thin CLI wrapper around `transform`.

pub use ticks2hive_core::{
    partition_by_month, partition_dir, MonthPartition, Result, TimeColumnKind, TransformError,
    PARTITION_FILE_NAME,
};
pub use ticks2hive_writer::{symbol_label, transform};
