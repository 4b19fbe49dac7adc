//! Source discovery and bulk loading.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use pw_model::{CountryPolicyTable, PlantSource, SourceId, SourceSet};
use tracing::{info, info_span};

use crate::error::Result;
use crate::plants::read_plant_csv;

/// Placeholder in [`SourceLayout::national_pattern`] replaced by the ISO code.
pub const ISO_PLACEHOLDER: &str = "{iso}";

/// Where each plant inventory lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub data_dir: PathBuf,
    /// File name of a national feed, e.g. `{iso}-Database.csv`.
    pub national_pattern: String,
    pub wri: String,
    pub geo: String,
    pub carma: String,
    pub sourcewatch: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            national_pattern: format!("{ISO_PLACEHOLDER}-Database.csv"),
            wri: "WRI-Database.csv".to_string(),
            geo: "GEODB-Database.csv".to_string(),
            carma: "CARMA-Database.csv".to_string(),
            sourcewatch: "SRCWT-Database.csv".to_string(),
        }
    }
}

impl SourceLayout {
    pub fn path_for(&self, source: &SourceId) -> PathBuf {
        let file_name = match source {
            SourceId::National { iso_code, .. } => {
                self.national_pattern.replace(ISO_PLACEHOLDER, iso_code)
            }
            SourceId::Wri => self.wri.clone(),
            SourceId::Geo => self.geo.clone(),
            SourceId::Carma => self.carma.clone(),
            SourceId::SourceWatch => self.sourcewatch.clone(),
        };
        self.data_dir.join(file_name)
    }
}

/// Produces the plant inventory for one source.
pub trait SourceLoader {
    /// Any error is fatal for the build.
    fn load(&self, source: &SourceId) -> Result<PlantSource>;
}

/// Loads sources from CSV files arranged per [`SourceLayout`].
#[derive(Debug, Clone, Default)]
pub struct CsvSourceLoader {
    layout: SourceLayout,
}

impl CsvSourceLoader {
    pub fn new(layout: SourceLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }
}

impl SourceLoader for CsvSourceLoader {
    fn load(&self, source: &SourceId) -> Result<PlantSource> {
        read_plant_csv(&self.layout.path_for(source), source.clone())
    }
}

/// Load every source a build needs: one national feed per national-API
/// country, then WRI, GEO, CARMA and SourceWatch.
pub fn load_sources<L>(loader: &L, countries: &CountryPolicyTable) -> Result<SourceSet>
where
    L: SourceLoader + ?Sized,
{
    let span = info_span!("load_sources");
    let _guard = span.enter();
    let start = Instant::now();

    let mut national = BTreeMap::new();
    for policy in countries.national_api() {
        let source = load_one(loader, SourceId::national(&policy.name, &policy.iso_code))?;
        national.insert(policy.name.clone(), source);
    }

    let sources = SourceSet {
        national,
        wri: load_one(loader, SourceId::Wri)?,
        geo: load_one(loader, SourceId::Geo)?,
        carma: load_one(loader, SourceId::Carma)?,
        sourcewatch: load_one(loader, SourceId::SourceWatch)?,
    };

    info!(
        national_sources = sources.national.len(),
        total_plants = sources.total_plants(),
        duration_ms = start.elapsed().as_millis(),
        "sources loaded"
    );
    Ok(sources)
}

fn load_one<L>(loader: &L, id: SourceId) -> Result<PlantSource>
where
    L: SourceLoader + ?Sized,
{
    let source = loader.load(&id)?;
    info!(
        source = %id,
        plants = source.len(),
        malformed = source.malformed.len(),
        "loaded plants"
    );
    Ok(source)
}
