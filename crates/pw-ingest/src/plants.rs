//! Plant inventory loading.

use std::path::Path;

use csv::StringRecord;
use pw_model::{Generation, Location, MalformedRecord, PlantRecord, PlantSource, SourceId};
use tracing::debug;

use crate::csv_utils::{HeaderIndex, field, is_blank, open_reader, optional_text};
use crate::error::{IngestError, Result};

/// Header of a plant inventory file. Extra columns are ignored.
pub const PLANT_COLUMNS: [&str; 10] = [
    "id",
    "name",
    "country",
    "owner",
    "fuel",
    "capacity_mw",
    "latitude",
    "longitude",
    "generation_gwh",
    "source",
];

struct PlantColumns {
    id: usize,
    name: Option<usize>,
    country: usize,
    owner: Option<usize>,
    fuel: Option<usize>,
    capacity: usize,
    latitude: usize,
    longitude: usize,
    generation: Option<usize>,
    source: Option<usize>,
}

impl PlantColumns {
    fn resolve(index: &HeaderIndex, path: &Path) -> Result<Self> {
        Ok(Self {
            id: index.required("id", path)?,
            name: index.optional("name"),
            country: index.required("country", path)?,
            owner: index.optional("owner"),
            fuel: index.optional("fuel"),
            capacity: index.required("capacity_mw", path)?,
            latitude: index.required("latitude", path)?,
            longitude: index.required("longitude", path)?,
            generation: index.optional("generation_gwh"),
            source: index.optional("source"),
        })
    }

    fn parse(&self, record: &StringRecord) -> std::result::Result<PlantRecord, String> {
        let id = field(record, Some(self.id));
        if id.is_empty() {
            return Err("missing plant id".to_string());
        }

        let latitude = parse_number("latitude", field(record, Some(self.latitude)))?;
        let longitude = parse_number("longitude", field(record, Some(self.longitude)))?;
        let generation = parse_number("generation_gwh", field(record, self.generation))?;
        let capacity_mw = parse_number("capacity_mw", field(record, Some(self.capacity)))
            .unwrap_or_else(|reason| {
                debug!(plant_id = id, %reason, "capacity unreadable, treated as missing");
                None
            });

        let mut plant = PlantRecord::new(id, field(record, Some(self.country)));
        plant.name = optional_text(record, self.name);
        plant.owner = optional_text(record, self.owner);
        plant.fuel = optional_text(record, self.fuel);
        plant.source = optional_text(record, self.source);
        plant.capacity_mw = capacity_mw;
        plant.location = Location {
            latitude,
            longitude,
        };
        plant.generation = generation.map(Generation::reported);
        Ok(plant)
    }
}

/// Empty and non-finite values read as missing; anything else must parse.
fn parse_number(column: &str, raw: &str) -> std::result::Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) => Ok(None),
        Err(_) => Err(format!("invalid {column} '{raw}'")),
    }
}

/// Read one plant inventory.
///
/// Unreadable files and broken CSV structure are errors. Rows with an empty id
/// or unparseable coordinates/generation are returned as malformed records.
/// A repeated id replaces the earlier row.
pub fn read_plant_csv(path: &Path, source_id: SourceId) -> Result<PlantSource> {
    let mut reader = open_reader(path)?;
    let index = HeaderIndex::read(&mut reader, path)?;
    let columns = PlantColumns::resolve(&index, path)?;

    let mut source = PlantSource::new(source_id);
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|error| IngestError::csv(path, error))?;
        if is_blank(&record) {
            continue;
        }
        let row = idx as u64 + 1;
        match columns.parse(&record) {
            Ok(plant) => {
                if let Some(previous) = source.insert(plant) {
                    debug!(
                        source = %source.id,
                        plant_id = %previous.id,
                        row,
                        "duplicate id replaces earlier row"
                    );
                }
            }
            Err(reason) => {
                let id = optional_text(&record, Some(columns.id));
                source.malformed.push(MalformedRecord { row, id, reason });
            }
        }
    }

    debug!(
        source = %source.id,
        path = %path.display(),
        plants = source.len(),
        malformed = source.malformed.len(),
        "plant file read"
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_handles_blank_and_garbage() {
        assert_eq!(parse_number("latitude", ""), Ok(None));
        assert_eq!(parse_number("latitude", "12.5"), Ok(Some(12.5)));
        assert_eq!(parse_number("latitude", "NaN"), Ok(None));
        assert!(parse_number("latitude", "north").is_err());
    }
}
