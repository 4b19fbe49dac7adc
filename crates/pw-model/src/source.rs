use std::collections::BTreeMap;
use std::fmt;

use crate::plant::{PlantMap, PlantRecord};

/// One of the inventories a build draws from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    National { country: String, iso_code: String },
    Wri,
    Geo,
    Carma,
    SourceWatch,
}

impl SourceId {
    pub fn national(country: impl Into<String>, iso_code: impl Into<String>) -> Self {
        Self::National {
            country: country.into(),
            iso_code: iso_code.into(),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::National { country, .. } => write!(f, "{country} national"),
            Self::Wri => f.write_str("WRI"),
            Self::Geo => f.write_str("GEO"),
            Self::Carma => f.write_str("CARMA"),
            Self::SourceWatch => f.write_str("SourceWatch"),
        }
    }
}

/// A row that could not be read as a plant record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// Data row number (1-based, excluding the header).
    pub row: u64,
    pub id: Option<String>,
    pub reason: String,
}

impl MalformedRecord {
    /// Identifier when present, otherwise the row position.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("row {}", self.row),
        }
    }
}

/// The fully loaded contents of one inventory.
#[derive(Debug, Clone)]
pub struct PlantSource {
    pub id: SourceId,
    pub plants: PlantMap,
    pub malformed: Vec<MalformedRecord>,
}

impl PlantSource {
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            plants: PlantMap::new(),
            malformed: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_plants<I>(mut self, plants: I) -> Self
    where
        I: IntoIterator<Item = PlantRecord>,
    {
        for plant in plants {
            self.insert(plant);
        }
        self
    }

    /// Returns the record previously stored under the same id, if any.
    pub fn insert(&mut self, plant: PlantRecord) -> Option<PlantRecord> {
        self.plants.insert(plant.id.clone(), plant)
    }

    pub fn get(&self, id: &str) -> Option<&PlantRecord> {
        self.plants.get(id)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

/// Every inventory needed for one build, loaded up front.
#[derive(Debug, Clone)]
pub struct SourceSet {
    /// National feeds keyed by country name.
    pub national: BTreeMap<String, PlantSource>,
    pub wri: PlantSource,
    pub geo: PlantSource,
    pub carma: PlantSource,
    pub sourcewatch: PlantSource,
}

impl SourceSet {
    /// A set with no national feeds and empty multi-country sources.
    pub fn empty() -> Self {
        Self {
            national: BTreeMap::new(),
            wri: PlantSource::new(SourceId::Wri),
            geo: PlantSource::new(SourceId::Geo),
            carma: PlantSource::new(SourceId::Carma),
            sourcewatch: PlantSource::new(SourceId::SourceWatch),
        }
    }

    pub fn total_plants(&self) -> usize {
        self.national.values().map(PlantSource::len).sum::<usize>()
            + self.wri.len()
            + self.geo.len()
            + self.carma.len()
            + self.sourcewatch.len()
    }
}
