//! Tiered admission into the canonical dataset.

use std::collections::BTreeMap;
use std::time::Instant;

use pw_model::{
    AuditLabel, ConcordanceIndex, CoordSource, CountryPolicyTable, CountryRoute, IssueKind,
    IssueSeverity, PlantMap, PlantRecord, PlantSource, RunIssue, RunLog, SourceSet,
};
use tracing::{debug, error, info, info_span, trace, warn};

use crate::strategy::{
    ClaimedSet, FallbackContext, LocationStrategy, Resolution, ResolvedLocation,
    default_strategies,
};
use crate::tally::{TallyKey, TallyReport};

pub const DEFAULT_MIN_CAPACITY_MW: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionConfig {
    /// Capacity gate for national and WRI plants. GEO and SourceWatch are exempt.
    pub min_capacity_mw: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            min_capacity_mw: DEFAULT_MIN_CAPACITY_MW,
        }
    }
}

/// Everything a fusion run produces.
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub canonical: PlantMap,
    /// Every record the tiers looked at, admitted or not.
    pub dump: PlantMap,
    pub claimed: ClaimedSet,
    pub tallies: TallyReport,
    pub log: RunLog,
}

/// Owns all mutable state of one fusion run.
pub struct FusionEngine<'a> {
    config: FusionConfig,
    countries: &'a CountryPolicyTable,
    concordance: &'a ConcordanceIndex,
    strategies: Vec<Box<dyn LocationStrategy>>,
    canonical: PlantMap,
    dump: PlantMap,
    claimed: ClaimedSet,
    tallies: TallyReport,
    log: RunLog,
}

impl<'a> FusionEngine<'a> {
    pub fn new(
        config: FusionConfig,
        countries: &'a CountryPolicyTable,
        concordance: &'a ConcordanceIndex,
    ) -> Self {
        let tallies = TallyReport::new(countries.national_api().map(|policy| policy.name.clone()));
        Self {
            config,
            countries,
            concordance,
            strategies: default_strategies(),
            canonical: PlantMap::new(),
            dump: PlantMap::new(),
            claimed: ClaimedSet::new(),
            tallies,
            log: RunLog::default(),
        }
    }

    /// Replace the WRI location fallbacks. They are tried in order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn LocationStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Run all four tiers in priority order.
    pub fn run(mut self, sources: &SourceSet) -> FusionOutcome {
        let start = Instant::now();
        self.admit_national(&sources.national);
        self.admit_wri(&sources.wri, &sources.geo, &sources.carma);
        self.admit_geo(&sources.geo);
        self.overlay_sourcewatch(&sources.sourcewatch);
        info!(
            canonical = self.canonical.len(),
            dump = self.dump.len(),
            claimed_carma = self.claimed.len(),
            errors = self.log.error_count(),
            warnings = self.log.warning_count(),
            duration_ms = start.elapsed().as_millis(),
            "fusion complete"
        );
        self.finish()
    }

    pub fn finish(self) -> FusionOutcome {
        FusionOutcome {
            canonical: self.canonical,
            dump: self.dump,
            claimed: self.claimed,
            tallies: self.tallies,
            log: self.log,
        }
    }

    /// Tier 1: national feeds keyed by country name.
    pub fn admit_national(&mut self, national: &BTreeMap<String, PlantSource>) {
        for (country, source) in national {
            let span = info_span!("tier", tier = "national", country = %country);
            let _guard = span.enter();
            let start = Instant::now();
            self.report_malformed(source);

            let coord_source = CoordSource::National(country.clone());
            let mut admitted = 0usize;
            for plant in source.plants.values() {
                let mut plant = plant.clone();
                plant.coord_source = Some(coord_source.clone());
                let keep =
                    plant.meets_capacity(self.config.min_capacity_mw) && plant.has_valid_location();
                if !keep {
                    plant.idnr = Some(AuditLabel::excluded(plant.id.clone()));
                }
                self.dump.insert(plant.id.clone(), plant.clone());
                if keep && self.admit(plant, TallyKey::National(country.clone())) {
                    admitted += 1;
                }
            }

            info!(
                country = %country,
                plants = source.len(),
                admitted,
                duration_ms = start.elapsed().as_millis(),
                "national tier complete"
            );
        }
    }

    /// Tier 2: WRI plants in default-routed countries, located through the
    /// fallback chain.
    pub fn admit_wri(&mut self, wri: &PlantSource, geo: &PlantSource, carma: &PlantSource) {
        let span = info_span!("tier", tier = "wri");
        let _guard = span.enter();
        let start = Instant::now();
        self.report_malformed(wri);

        let countries = self.countries;
        let mut admitted = 0usize;
        for plant in wri.plants.values() {
            let Some(policy) = countries.lookup(&plant.country) else {
                self.report(RunIssue::error(
                    IssueKind::UnrecognizedCountry,
                    format!(
                        "country {} not recognized (WRI plant {})",
                        plant.country, plant.id
                    ),
                ));
                continue;
            };
            if policy.route != CountryRoute::Default {
                continue;
            }

            self.dump.insert(plant.id.clone(), plant.clone());
            if !plant.meets_capacity(self.config.min_capacity_mw) {
                continue;
            }

            let Some(resolved) = self.resolve_location(plant, geo, carma) else {
                continue;
            };
            let ResolvedLocation {
                location,
                coord_source,
                tally,
                claim,
            } = resolved;
            let mut located = plant.clone();
            located.location = location;
            located.coord_source = Some(coord_source);
            if self.admit(located, tally) {
                if let Some(carma_id) = claim {
                    self.claimed.claim(carma_id);
                }
                admitted += 1;
            }
        }

        info!(
            plants = wri.len(),
            admitted,
            via_geo = self.tallies.get(&TallyKey::WriViaGeo).count,
            via_carma = self.tallies.get(&TallyKey::WriViaCarma).count,
            duration_ms = start.elapsed().as_millis(),
            "WRI tier complete"
        );
    }

    /// Tier 3: GEO plants in GEO-routed countries. No capacity gate.
    pub fn admit_geo(&mut self, geo: &PlantSource) {
        let span = info_span!("tier", tier = "geo");
        let _guard = span.enter();
        let start = Instant::now();
        self.report_malformed(geo);

        let countries = self.countries;
        let mut admitted = 0usize;
        for plant in geo.plants.values() {
            self.dump.insert(plant.id.clone(), plant.clone());
            let Some(policy) = countries.lookup(&plant.country) else {
                self.report(RunIssue::error(
                    IssueKind::UnrecognizedCountry,
                    format!(
                        "GEO plant {} has country {} - not found",
                        plant.id, plant.country
                    ),
                ));
                continue;
            };
            if policy.route != CountryRoute::GeoRouted || !plant.has_valid_location() {
                continue;
            }

            let mut located = plant.clone();
            located.coord_source = Some(CoordSource::Geo);
            let missing_capacity = located.capacity_mw.is_none();
            if self.admit(located, TallyKey::Geo) {
                admitted += 1;
                if missing_capacity {
                    self.report(RunIssue::warning(
                        IssueKind::InvalidCapacity,
                        format!(
                            "GEO plant {} does not have valid capacity information",
                            plant.id
                        ),
                    ));
                }
            }
        }

        info!(
            plants = geo.len(),
            admitted,
            duration_ms = start.elapsed().as_millis(),
            "GEO tier complete"
        );
    }

    /// Tier 4: SourceWatch plants with a valid location replace whatever was
    /// admitted under the same id.
    pub fn overlay_sourcewatch(&mut self, sourcewatch: &PlantSource) {
        let span = info_span!("tier", tier = "sourcewatch");
        let _guard = span.enter();
        let start = Instant::now();
        self.report_malformed(sourcewatch);

        let mut admitted = 0usize;
        let mut overridden = 0usize;
        for plant in sourcewatch.plants.values() {
            self.dump.insert(plant.id.clone(), plant.clone());
            if !plant.has_valid_location() {
                continue;
            }
            let mut located = plant.clone();
            located.coord_source = Some(CoordSource::SourceWatch);
            let capacity = located.capacity_mw;
            if let Some(previous) = self.canonical.insert(located.id.clone(), located) {
                debug!(
                    plant_id = %previous.id,
                    previous_source = %coord_label(&previous),
                    "SourceWatch record replaces earlier admission"
                );
                overridden += 1;
            }
            self.tallies.record(TallyKey::SourceWatch, capacity);
            admitted += 1;
        }

        info!(
            plants = sourcewatch.len(),
            admitted,
            overridden,
            duration_ms = start.elapsed().as_millis(),
            "SourceWatch tier complete"
        );
    }

    /// Walk the fallback chain. `None` means the plant stays out of the
    /// canonical dataset.
    fn resolve_location(
        &mut self,
        plant: &PlantRecord,
        geo: &PlantSource,
        carma: &PlantSource,
    ) -> Option<ResolvedLocation> {
        let context = FallbackContext {
            concordance: self.concordance,
            geo,
            carma,
            claimed: &self.claimed,
        };
        let mut issues = Vec::new();
        let mut resolved = None;
        for strategy in &self.strategies {
            match strategy.resolve(plant, &context) {
                Resolution::Resolved(location) => {
                    trace!(plant_id = %plant.id, strategy = strategy.name(), "location resolved");
                    resolved = Some(location);
                    break;
                }
                Resolution::Unresolved => {}
                Resolution::Declined(issue) => issues.push(issue),
                Resolution::Abandon(issue) => {
                    issues.push(issue);
                    break;
                }
            }
        }
        for issue in issues {
            self.report(issue);
        }
        resolved
    }

    /// First tier to claim an id keeps it.
    fn admit(&mut self, plant: PlantRecord, tally: TallyKey) -> bool {
        if let Some(existing) = self.canonical.get(&plant.id) {
            let message = format!(
                "plant id {} from {tally} already admitted from {}; keeping the earlier record",
                plant.id,
                coord_label(existing)
            );
            self.report(RunIssue::warning(IssueKind::IdCollision, message));
            return false;
        }
        self.tallies.record(tally, plant.capacity_mw);
        self.canonical.insert(plant.id.clone(), plant);
        true
    }

    fn report_malformed(&mut self, source: &PlantSource) {
        for record in &source.malformed {
            self.report(RunIssue::error(
                IssueKind::MalformedRecord,
                format!(
                    "plant {} in {} is malformed: {}",
                    record.label(),
                    source.id,
                    record.reason
                ),
            ));
        }
    }

    fn report(&mut self, issue: RunIssue) {
        match issue.severity {
            IssueSeverity::Error => error!(kind = ?issue.kind, "{}", issue.message),
            IssueSeverity::Warning => warn!(kind = ?issue.kind, "{}", issue.message),
        }
        self.log.push(issue);
    }
}

fn coord_label(plant: &PlantRecord) -> String {
    plant
        .coord_source
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}
