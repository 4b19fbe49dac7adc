//! Audit-dump labelling.

use pw_model::{AuditLabel, CoordSource, PlantMap, PlantSource};
use serde::Serialize;
use tracing::info;

use crate::strategy::ClaimedSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DumpStats {
    pub admitted: usize,
    pub excluded: usize,
    /// Unclaimed CARMA plants appended to the dump.
    pub carma_added: usize,
    /// CARMA plants left out because a WRI plant already represents them.
    pub carma_claimed: usize,
}

/// Label every dump entry with whether its id was admitted, then append the
/// CARMA plants no WRI plant claimed.
///
/// Admitted entries take the canonical record so the dump shows the
/// coordinates and generation that were actually kept.
pub fn tag_dump(
    dump: &mut PlantMap,
    canonical: &PlantMap,
    carma: &PlantSource,
    claimed: &ClaimedSet,
) -> DumpStats {
    let mut stats = DumpStats::default();
    for (id, record) in dump.iter_mut() {
        if let Some(admitted) = canonical.get(id) {
            *record = admitted.clone();
            record.idnr = Some(AuditLabel::admitted(id.clone()));
            stats.admitted += 1;
        } else {
            record.idnr = Some(AuditLabel::excluded(id.clone()));
            stats.excluded += 1;
        }
    }

    for plant in carma.plants.values() {
        if claimed.contains(&plant.id) {
            stats.carma_claimed += 1;
            continue;
        }
        let mut plant = plant.clone();
        plant.coord_source = Some(CoordSource::Carma);
        plant.idnr = Some(AuditLabel::excluded(plant.id.clone()));
        dump.insert(plant.id.clone(), plant);
        stats.carma_added += 1;
    }

    info!(
        dumped = dump.len(),
        admitted = stats.admitted,
        excluded = stats.excluded,
        carma_added = stats.carma_added,
        carma_claimed = stats.carma_claimed,
        "dump tagged"
    );
    stats
}
