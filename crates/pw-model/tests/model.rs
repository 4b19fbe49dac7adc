//! Tests for pw-model types.

use pw_model::{
    AuditLabel, ConcordanceEntry, ConcordanceIndex, CoordSource, CountryPolicy,
    CountryPolicyTable, CountryRoute, IssueKind, Location, ModelError, PlantRecord, PlantSource,
    RunIssue, RunLog, SourceId, parse_flag,
};

#[test]
fn location_requires_both_coordinates_non_zero() {
    assert!(Location::new(10.0, 20.0).is_valid());
    assert!(Location::new(-33.9, 151.2).is_valid());
    assert!(!Location::new(0.0, 20.0).is_valid());
    assert!(!Location::new(10.0, 0.0).is_valid());
    assert!(!Location::default().is_valid());

    let half = Location {
        latitude: Some(10.0),
        longitude: None,
    };
    assert!(!half.is_valid());
}

#[test]
fn missing_capacity_never_meets_threshold() {
    let plant = PlantRecord::new("P1", "Kenya");
    assert!(!plant.meets_capacity(0.0));
    assert!(plant.with_capacity(1.0).meets_capacity(1.0));
    assert!(!PlantRecord::new("P2", "Kenya").with_capacity(0.5).meets_capacity(1.0));
}

#[test]
fn coord_source_labels() {
    assert_eq!(
        CoordSource::National("Brazil".to_string()).to_string(),
        "Brazil national data"
    );
    assert_eq!(CoordSource::Wri.to_string(), "WRI data");
    assert_eq!(CoordSource::Geo.to_string(), "GEO data");
    assert_eq!(CoordSource::Carma.to_string(), "CARMA data");
    assert_eq!(CoordSource::SourceWatch.to_string(), "SourceWatch data");

    let json = serde_json::to_string(&CoordSource::Geo).expect("serialize coord source");
    assert_eq!(json, "\"GEO data\"");
}

#[test]
fn audit_label_renders_verdict() {
    assert_eq!(AuditLabel::admitted("WRI001").to_string(), "WRI001,Yes");
    assert_eq!(AuditLabel::excluded("CARMA7").to_string(), "CARMA7,No");
}

#[test]
fn route_precedence_prefers_national_api() {
    assert_eq!(CountryRoute::from_flags(true, false), CountryRoute::NationalApi);
    assert_eq!(CountryRoute::from_flags(true, true), CountryRoute::NationalApi);
    assert_eq!(CountryRoute::from_flags(false, true), CountryRoute::GeoRouted);
    assert_eq!(CountryRoute::from_flags(false, false), CountryRoute::Default);
}

#[test]
fn parse_flag_accepts_common_spellings() {
    assert!(parse_flag("has_api", "1").unwrap());
    assert!(parse_flag("has_api", "TRUE").unwrap());
    assert!(parse_flag("has_api", " yes ").unwrap());
    assert!(!parse_flag("use_geo", "0").unwrap());
    assert!(!parse_flag("use_geo", "").unwrap());

    let err = parse_flag("use_geo", "maybe").unwrap_err();
    assert!(matches!(err, ModelError::InvalidFlag { .. }));
    assert!(err.to_string().contains("use_geo"));
}

#[test]
fn policy_table_lookup_and_national_order() {
    let mut table = CountryPolicyTable::new();
    table
        .try_insert(CountryPolicy::new(
            "United States of America",
            "USA",
            CountryRoute::NationalApi,
        ))
        .unwrap();
    table
        .try_insert(CountryPolicy::new("Brazil", "BRA", CountryRoute::NationalApi))
        .unwrap();
    table
        .try_insert(CountryPolicy::new("Fiji", "FJI", CountryRoute::GeoRouted))
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.lookup("Fiji").map(|p| p.route), Some(CountryRoute::GeoRouted));
    assert!(table.lookup("Atlantis").is_none());

    let national: Vec<&str> = table.national_api().map(|p| p.iso_code.as_str()).collect();
    assert_eq!(national, vec!["BRA", "USA"]);

    let duplicate = table.try_insert(CountryPolicy::new("Fiji", "FJI", CountryRoute::Default));
    assert!(matches!(duplicate, Err(ModelError::DuplicateCountry { .. })));
}

#[test]
fn concordance_blank_ids_are_absent() {
    let entry = ConcordanceEntry::new(Some(" "), Some("CARMA9"));
    assert_eq!(entry.geo_id, None);
    assert_eq!(entry.carma_id.as_deref(), Some("CARMA9"));
    assert!(ConcordanceEntry::new(None, Some("")).is_empty());

    let index: ConcordanceIndex = [("WRI001".to_string(), entry)].into_iter().collect();
    assert!(index.lookup("WRI001").is_some());
    assert!(index.lookup("WRI002").is_none());
}

#[test]
fn plant_source_keeps_last_duplicate() {
    let mut source = PlantSource::new(SourceId::Wri);
    assert!(source.insert(PlantRecord::new("A", "Kenya").with_capacity(1.0)).is_none());
    let replaced = source.insert(PlantRecord::new("A", "Kenya").with_capacity(2.0));
    assert_eq!(replaced.and_then(|p| p.capacity_mw), Some(1.0));
    assert_eq!(source.len(), 1);
    assert_eq!(source.get("A").and_then(|p| p.capacity_mw), Some(2.0));
}

#[test]
fn run_log_counts() {
    let mut log = RunLog::default();
    log.push(RunIssue::error(IssueKind::UnrecognizedCountry, "country X not recognized"));
    log.push(RunIssue::warning(IssueKind::InvalidCapacity, "no capacity"));
    log.push(RunIssue::error(IssueKind::UnresolvedMatch, "no GEO location"));

    assert_eq!(log.len(), 3);
    assert_eq!(log.error_count(), 2);
    assert_eq!(log.warning_count(), 1);
    assert_eq!(log.count(IssueKind::UnresolvedMatch), 1);
    assert_eq!(log.issues[1].to_string(), "Warning: no capacity");
}

#[test]
fn source_labels() {
    assert_eq!(SourceId::national("Brazil", "BRA").to_string(), "Brazil national");
    assert_eq!(SourceId::SourceWatch.to_string(), "SourceWatch");
}
