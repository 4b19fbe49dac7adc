//! Concordance loading.

use std::path::Path;

use pw_model::{ConcordanceEntry, ConcordanceIndex};
use tracing::debug;

use crate::csv_utils::{HeaderIndex, field, is_blank, open_reader};
use crate::error::{IngestError, Result};

/// Read the `wri_id,geo_id,carma_id` concordance.
///
/// Rows without a WRI id are skipped. A later row for the same WRI id replaces
/// the earlier one.
pub fn read_concordance(path: &Path) -> Result<ConcordanceIndex> {
    let mut reader = open_reader(path)?;
    let index = HeaderIndex::read(&mut reader, path)?;
    let wri_col = index.required("wri_id", path)?;
    let geo_col = index.optional("geo_id");
    let carma_col = index.optional("carma_id");

    let mut concordance = ConcordanceIndex::new();
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::csv(path, error))?;
        if is_blank(&record) {
            continue;
        }
        let wri_id = field(&record, Some(wri_col));
        if wri_id.is_empty() {
            continue;
        }
        let entry = ConcordanceEntry::new(
            Some(field(&record, geo_col)),
            Some(field(&record, carma_col)),
        );
        concordance.insert(wri_id, entry);
    }

    debug!(path = %path.display(), entries = concordance.len(), "concordance read");
    Ok(concordance)
}
