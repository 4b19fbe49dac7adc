//! Output writers for PowerWatch builds.

pub mod build_log;
pub mod plants_csv;
pub mod summary;

pub use build_log::{CTIME_FORMAT, append_build_log, format_build_log};
pub use plants_csv::{
    CANONICAL_COLUMNS, CsvLayout, DUMP_COLUMNS, write_canonical_csv, write_dump_csv, write_plants,
};
pub use summary::{BuildSummary, IssueCounts, timestamp_now, write_summary_json};
