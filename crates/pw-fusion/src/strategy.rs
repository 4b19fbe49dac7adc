//! Location fallbacks for WRI plants.
//!
//! A WRI plant that clears the capacity gate is located by the first strategy
//! that resolves it. Strategies only read; the engine applies the outcome.

use std::collections::BTreeSet;

use pw_model::{
    ConcordanceIndex, CoordSource, IssueKind, Location, PlantRecord, PlantSource, RunIssue,
};

use crate::tally::TallyKey;

/// CARMA ids already used to locate a WRI plant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedSet {
    ids: BTreeSet<String>,
}

impl ClaimedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already claimed.
    pub fn claim(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Read-only view of everything a strategy may consult.
#[derive(Debug, Clone, Copy)]
pub struct FallbackContext<'a> {
    pub concordance: &'a ConcordanceIndex,
    pub geo: &'a PlantSource,
    pub carma: &'a PlantSource,
    pub claimed: &'a ClaimedSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location: Location,
    pub coord_source: CoordSource,
    pub tally: TallyKey,
    /// CARMA id to mark as used once the plant is admitted.
    pub claim: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedLocation),
    /// Nothing to go on; try the next strategy.
    Unresolved,
    /// A candidate exists but may not be used; try the next strategy.
    Declined(RunIssue),
    /// The concordance points at a missing record; stop the chain.
    Abandon(RunIssue),
}

pub trait LocationStrategy {
    fn name(&self) -> &'static str;

    fn resolve(&self, plant: &PlantRecord, context: &FallbackContext<'_>) -> Resolution;
}

/// The plant's own coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnCoordinates;

impl LocationStrategy for OwnCoordinates {
    fn name(&self) -> &'static str {
        "own_coordinates"
    }

    fn resolve(&self, plant: &PlantRecord, _context: &FallbackContext<'_>) -> Resolution {
        if plant.has_valid_location() {
            Resolution::Resolved(ResolvedLocation {
                location: plant.location,
                coord_source: CoordSource::Wri,
                tally: TallyKey::Wri,
                claim: None,
            })
        } else {
            Resolution::Unresolved
        }
    }
}

/// Coordinates of the GEO plant the concordance matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoConcordance;

impl LocationStrategy for GeoConcordance {
    fn name(&self) -> &'static str {
        "geo_concordance"
    }

    fn resolve(&self, plant: &PlantRecord, context: &FallbackContext<'_>) -> Resolution {
        let Some(geo_id) = context
            .concordance
            .lookup(&plant.id)
            .and_then(|entry| entry.geo_id.as_deref())
        else {
            return Resolution::Unresolved;
        };
        let Some(geo_plant) = context.geo.get(geo_id) else {
            return Resolution::Abandon(RunIssue::error(
                IssueKind::UnresolvedMatch,
                format!(
                    "Matching error: no GEO location for WRI plant {}, GEO plant {geo_id}",
                    plant.id
                ),
            ));
        };
        if !geo_plant.has_valid_location() {
            return Resolution::Unresolved;
        }
        Resolution::Resolved(ResolvedLocation {
            location: geo_plant.location,
            coord_source: CoordSource::Geo,
            tally: TallyKey::WriViaGeo,
            claim: None,
        })
    }
}

/// Coordinates of the CARMA plant the concordance matches, at most once per
/// CARMA plant.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarmaConcordance;

impl LocationStrategy for CarmaConcordance {
    fn name(&self) -> &'static str {
        "carma_concordance"
    }

    fn resolve(&self, plant: &PlantRecord, context: &FallbackContext<'_>) -> Resolution {
        let Some(carma_id) = context
            .concordance
            .lookup(&plant.id)
            .and_then(|entry| entry.carma_id.as_deref())
        else {
            return Resolution::Unresolved;
        };
        let Some(carma_plant) = context.carma.get(carma_id) else {
            return Resolution::Abandon(RunIssue::error(
                IssueKind::UnresolvedMatch,
                format!(
                    "Matching error: no CARMA location for WRI plant {}, CARMA plant {carma_id}",
                    plant.id
                ),
            ));
        };
        if context.claimed.contains(carma_id) {
            return Resolution::Declined(RunIssue::warning(
                IssueKind::CarmaReuse,
                format!(
                    "CARMA plant {carma_id} already locates another WRI plant; not reused for {}",
                    plant.id
                ),
            ));
        }
        if !carma_plant.has_valid_location() {
            return Resolution::Unresolved;
        }
        Resolution::Resolved(ResolvedLocation {
            location: carma_plant.location,
            coord_source: CoordSource::Carma,
            tally: TallyKey::WriViaCarma,
            claim: Some(carma_id.to_string()),
        })
    }
}

/// Own coordinates, then GEO, then CARMA.
pub fn default_strategies() -> Vec<Box<dyn LocationStrategy>> {
    vec![
        Box::new(OwnCoordinates),
        Box::new(GeoConcordance),
        Box::new(CarmaConcordance),
    ]
}

#[cfg(test)]
mod tests {
    use pw_model::{ConcordanceEntry, SourceId};

    use super::*;

    fn wri_plant() -> PlantRecord {
        PlantRecord::new("WRI001", "Kenya").with_capacity(50.0)
    }

    fn concordance(geo: Option<&str>, carma: Option<&str>) -> ConcordanceIndex {
        [("WRI001".to_string(), ConcordanceEntry::new(geo, carma))]
            .into_iter()
            .collect()
    }

    #[test]
    fn own_coordinates_require_valid_location() {
        let concordance = ConcordanceIndex::new();
        let empty = PlantSource::new(SourceId::Geo);
        let claimed = ClaimedSet::new();
        let context = FallbackContext {
            concordance: &concordance,
            geo: &empty,
            carma: &empty,
            claimed: &claimed,
        };
        assert_eq!(OwnCoordinates.resolve(&wri_plant(), &context), Resolution::Unresolved);

        let located = wri_plant().with_location(1.0, 2.0);
        assert!(matches!(
            OwnCoordinates.resolve(&located, &context),
            Resolution::Resolved(ResolvedLocation { tally: TallyKey::Wri, .. })
        ));
    }

    #[test]
    fn geo_without_valid_location_falls_through() {
        let concordance = concordance(Some("GEO42"), None);
        let geo = PlantSource::new(SourceId::Geo)
            .with_plants([PlantRecord::new("GEO42", "Kenya").with_location(0.0, 20.0)]);
        let carma = PlantSource::new(SourceId::Carma);
        let claimed = ClaimedSet::new();
        let context = FallbackContext {
            concordance: &concordance,
            geo: &geo,
            carma: &carma,
            claimed: &claimed,
        };
        assert_eq!(GeoConcordance.resolve(&wri_plant(), &context), Resolution::Unresolved);
    }

    #[test]
    fn claimed_carma_is_declined() {
        let concordance = concordance(None, Some("CARMA7"));
        let geo = PlantSource::new(SourceId::Geo);
        let carma = PlantSource::new(SourceId::Carma)
            .with_plants([PlantRecord::new("CARMA7", "Kenya").with_location(5.0, 6.0)]);
        let mut claimed = ClaimedSet::new();
        {
            let context = FallbackContext {
                concordance: &concordance,
                geo: &geo,
                carma: &carma,
                claimed: &claimed,
            };
            let first = CarmaConcordance.resolve(&wri_plant(), &context);
            assert!(matches!(
                first,
                Resolution::Resolved(ResolvedLocation { claim: Some(ref id), .. }) if id == "CARMA7"
            ));
        }

        assert!(claimed.claim("CARMA7"));
        let context = FallbackContext {
            concordance: &concordance,
            geo: &geo,
            carma: &carma,
            claimed: &claimed,
        };
        match CarmaConcordance.resolve(&wri_plant(), &context) {
            Resolution::Declined(issue) => assert_eq!(issue.kind, IssueKind::CarmaReuse),
            other => panic!("expected decline, got {other:?}"),
        }
    }
}
