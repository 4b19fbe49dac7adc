//! Country policy table loading.

use std::path::Path;

use pw_model::{CountryPolicy, CountryPolicyTable, CountryRoute, parse_flag};
use tracing::{debug, warn};

use crate::csv_utils::{HeaderIndex, field, is_blank, open_reader};
use crate::error::{IngestError, Result};

/// Read the `country,iso_code,has_api,use_geo` table.
///
/// A row with both flags set routes through the national API and is reported
/// with a warning. National-API countries must carry an ISO code since it
/// selects their source file.
pub fn read_country_table(path: &Path) -> Result<CountryPolicyTable> {
    let mut reader = open_reader(path)?;
    let index = HeaderIndex::read(&mut reader, path)?;
    let country_col = index.required("country", path)?;
    let iso_col = index.required("iso_code", path)?;
    let api_col = index.required("has_api", path)?;
    let geo_col = index.required("use_geo", path)?;

    let mut table = CountryPolicyTable::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|error| IngestError::csv(path, error))?;
        if is_blank(&record) {
            continue;
        }
        let row = idx as u64 + 1;
        let name = field(&record, Some(country_col));
        if name.is_empty() {
            debug!(row, "country row without a name skipped");
            continue;
        }
        let iso_code = field(&record, Some(iso_col));

        let flag = |column: &str, col: usize| -> Result<bool> {
            let raw = field(&record, Some(col));
            parse_flag(column, raw).map_err(|_| IngestError::InvalidValue {
                field: column.to_string(),
                value: raw.to_string(),
                path: path.to_path_buf(),
                row,
            })
        };
        let has_api = flag("has_api", api_col)?;
        let use_geo = flag("use_geo", geo_col)?;
        if has_api && use_geo {
            warn!(
                country = name,
                "both has_api and use_geo set; routing through the national API"
            );
        }

        let route = CountryRoute::from_flags(has_api, use_geo);
        if route == CountryRoute::NationalApi && iso_code.is_empty() {
            return Err(IngestError::InvalidValue {
                field: "iso_code".to_string(),
                value: String::new(),
                path: path.to_path_buf(),
                row,
            });
        }

        table
            .try_insert(CountryPolicy::new(name, iso_code, route))
            .map_err(|_| IngestError::DuplicateCountry {
                name: name.to_string(),
                path: path.to_path_buf(),
            })?;
    }

    debug!(path = %path.display(), countries = table.len(), "country table read");
    Ok(table)
}
