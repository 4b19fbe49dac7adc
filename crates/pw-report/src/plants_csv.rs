//! Canonical and audit-dump CSV output.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use pw_model::{PlantMap, PlantRecord};
use tracing::info;

pub const CANONICAL_COLUMNS: [&str; 12] = [
    "id",
    "name",
    "country",
    "owner",
    "fuel",
    "capacity_mw",
    "latitude",
    "longitude",
    "coord_source",
    "generation_gwh",
    "generation_estimated",
    "source",
];

/// Canonical columns followed by `idnr` and `in_canonical`.
pub const DUMP_COLUMNS: [&str; 14] = [
    "id",
    "name",
    "country",
    "owner",
    "fuel",
    "capacity_mw",
    "latitude",
    "longitude",
    "coord_source",
    "generation_gwh",
    "generation_estimated",
    "source",
    "idnr",
    "in_canonical",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    Canonical,
    Dump,
}

impl CsvLayout {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Canonical => &CANONICAL_COLUMNS,
            Self::Dump => &DUMP_COLUMNS,
        }
    }
}

/// Write plants in id order. The header is written even when `plants` is
/// empty.
pub fn write_plants<W: Write>(writer: W, plants: &PlantMap, layout: CsvLayout) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(layout.columns())
        .context("write header")?;
    for plant in plants.values() {
        let mut record = plant_fields(plant);
        if layout == CsvLayout::Dump {
            let label = plant.idnr.as_ref();
            record.push(label.map(ToString::to_string).unwrap_or_default());
            record.push(label.is_some_and(|label| label.admitted).to_string());
        }
        csv_writer
            .write_record(&record)
            .with_context(|| format!("write plant {}", plant.id))?;
    }
    csv_writer.flush().context("flush csv")?;
    Ok(())
}

pub fn write_canonical_csv(path: &Path, canonical: &PlantMap) -> Result<()> {
    write_file(path, canonical, CsvLayout::Canonical)?;
    info!(path = %path.display(), plants = canonical.len(), "canonical dataset written");
    Ok(())
}

pub fn write_dump_csv(path: &Path, dump: &PlantMap) -> Result<()> {
    write_file(path, dump, CsvLayout::Dump)?;
    info!(path = %path.display(), plants = dump.len(), "audit dump written");
    Ok(())
}

fn write_file(path: &Path, plants: &PlantMap, layout: CsvLayout) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_plants(file, plants, layout).with_context(|| format!("write {}", path.display()))
}

fn plant_fields(plant: &PlantRecord) -> Vec<String> {
    vec![
        plant.id.clone(),
        text(plant.name.as_deref()),
        plant.country.clone(),
        text(plant.owner.as_deref()),
        text(plant.fuel.as_deref()),
        number(plant.capacity_mw),
        number(plant.location.latitude),
        number(plant.location.longitude),
        plant
            .coord_source
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        number(plant.generation.map(|generation| generation.gwh)),
        plant
            .generation
            .map(|generation| generation.estimated.to_string())
            .unwrap_or_default(),
        text(plant.source.as_deref()),
    ]
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn number(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
