//! Loading of the inputs a PowerWatch build consumes.
//!
//! Every loader reads a CSV file fully into memory. Failures to open or parse
//! a file are fatal ([`IngestError`]); rows that cannot be read as plants are
//! kept on the [`PlantSource`](pw_model::PlantSource) as malformed records so
//! the fusion engine can log and skip them.

pub mod concordance;
pub mod countries;
mod csv_utils;
pub mod error;
pub mod loader;
pub mod plants;

pub use concordance::read_concordance;
pub use countries::read_country_table;
pub use error::{IngestError, Result};
pub use loader::{CsvSourceLoader, ISO_PLACEHOLDER, SourceLayout, SourceLoader, load_sources};
pub use plants::{PLANT_COLUMNS, read_plant_csv};
