use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Plants keyed by identifier, iterated in identifier order.
pub type PlantMap = BTreeMap<String, PlantRecord>;

/// Geographic position of a plant.
///
/// The upstream inventories use `0.0` as the "unset" sentinel, so a
/// coordinate of exactly zero never counts as a real position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Both coordinates present and non-zero.
    pub fn is_valid(&self) -> bool {
        matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0
        )
    }
}

/// Which inventory supplied the coordinates kept for a plant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoordSource {
    /// A country's own national data feed, carrying the country name.
    National(String),
    Wri,
    Geo,
    Carma,
    SourceWatch,
}

impl fmt::Display for CoordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::National(country) => write!(f, "{country} national data"),
            Self::Wri => write!(f, "WRI data"),
            Self::Geo => write!(f, "GEO data"),
            Self::Carma => write!(f, "CARMA data"),
            Self::SourceWatch => write!(f, "SourceWatch data"),
        }
    }
}

impl Serialize for CoordSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Annual generation in GWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Generation {
    pub gwh: f64,
    /// False when the figure came from the source data.
    pub estimated: bool,
}

impl Generation {
    pub fn reported(gwh: f64) -> Self {
        Self {
            gwh,
            estimated: false,
        }
    }

    pub fn estimated(gwh: f64) -> Self {
        Self {
            gwh,
            estimated: true,
        }
    }
}

/// Audit-dump label recording whether an identifier made it into the
/// canonical dataset. Renders as `<id>,Yes` / `<id>,No`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLabel {
    pub id: String,
    pub admitted: bool,
}

impl AuditLabel {
    pub fn admitted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            admitted: true,
        }
    }

    pub fn excluded(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            admitted: false,
        }
    }

    pub fn verdict(&self) -> &'static str {
        if self.admitted { "Yes" } else { "No" }
    }
}

impl fmt::Display for AuditLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.id, self.verdict())
    }
}

/// One physical facility as seen by one source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantRecord {
    /// Source-scoped identifier.
    pub id: String,
    pub name: Option<String>,
    pub country: String,
    pub owner: Option<String>,
    /// Primary fuel, e.g. "Coal" or "Hydro".
    pub fuel: Option<String>,
    pub capacity_mw: Option<f64>,
    pub location: Location,
    /// Set by the fusion engine once a location source has been chosen.
    pub coord_source: Option<CoordSource>,
    /// Free-text attribution carried from the input row.
    pub source: Option<String>,
    pub generation: Option<Generation>,
    /// Only written when the audit dump is tagged.
    pub idnr: Option<AuditLabel>,
}

impl PlantRecord {
    pub fn new(id: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            country: country.into(),
            owner: None,
            fuel: None,
            capacity_mw: None,
            location: Location::default(),
            coord_source: None,
            source: None,
            generation: None,
            idnr: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_fuel(mut self, fuel: impl Into<String>) -> Self {
        self.fuel = Some(fuel.into());
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity_mw: f64) -> Self {
        self.capacity_mw = Some(capacity_mw);
        self
    }

    #[must_use]
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Location::new(latitude, longitude);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = Some(generation);
        self
    }

    /// A missing capacity never meets a threshold.
    pub fn meets_capacity(&self, min_capacity_mw: f64) -> bool {
        self.capacity_mw
            .is_some_and(|capacity| capacity >= min_capacity_mw)
    }

    pub fn has_valid_location(&self) -> bool {
        self.location.is_valid()
    }
}
