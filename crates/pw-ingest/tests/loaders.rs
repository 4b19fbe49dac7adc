use std::fs;
use std::path::{Path, PathBuf};

use pw_ingest::{
    CsvSourceLoader, IngestError, SourceLayout, SourceLoader, load_sources, read_concordance,
    read_country_table, read_plant_csv,
};
use pw_model::{CountryRoute, SourceId};
use tempfile::TempDir;

const PLANT_HEADER: &str =
    "id,name,country,owner,fuel,capacity_mw,latitude,longitude,generation_gwh,source\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_plants_and_keeps_malformed_rows() {
    let dir = TempDir::new().expect("temp dir");
    let contents = format!(
        "{PLANT_HEADER}\
         WRI001,Alpha,Kenya,Acme,Hydro,25,1.5,36.8,100.5,WRI\n\
         WRI002,Beta,Kenya,,Coal,n/a,,,,\n\
         ,Nameless,Kenya,,,5,1,1,,\n\
         WRI003,Gamma,Kenya,,,5,north,36.8,,\n"
    );
    let path = write(dir.path(), "wri.csv", &contents);

    let source = read_plant_csv(&path, SourceId::Wri).expect("read plants");
    assert_eq!(source.len(), 2);

    let alpha = source.get("WRI001").expect("WRI001");
    assert_eq!(alpha.name.as_deref(), Some("Alpha"));
    assert_eq!(alpha.capacity_mw, Some(25.0));
    assert!(alpha.has_valid_location());
    assert_eq!(alpha.generation.map(|g| g.gwh), Some(100.5));
    assert_eq!(alpha.generation.map(|g| g.estimated), Some(false));
    assert_eq!(alpha.source.as_deref(), Some("WRI"));

    let beta = source.get("WRI002").expect("WRI002");
    assert_eq!(beta.capacity_mw, None);
    assert_eq!(beta.owner, None);
    assert!(!beta.has_valid_location());

    assert_eq!(source.malformed.len(), 2);
    assert_eq!(source.malformed[0].row, 3);
    assert_eq!(source.malformed[0].label(), "row 3");
    assert_eq!(source.malformed[1].label(), "WRI003");
    assert!(source.malformed[1].reason.contains("latitude"));
}

#[test]
fn plant_headers_are_case_and_order_insensitive() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "geo.csv",
        "Latitude, Longitude ,ID,Country,Capacity_MW,extra\n-1.2,36.8,GEO42,Kenya,12,x\n",
    );
    let source = read_plant_csv(&path, SourceId::Geo).expect("read plants");
    let plant = source.get("GEO42").expect("GEO42");
    assert_eq!(plant.location.latitude, Some(-1.2));
    assert_eq!(plant.capacity_mw, Some(12.0));
    assert_eq!(plant.fuel, None);
}

#[test]
fn duplicate_plant_ids_keep_last_row() {
    let dir = TempDir::new().expect("temp dir");
    let contents = format!("{PLANT_HEADER}A,First,Kenya,,,1,1,1,,\nA,Second,Kenya,,,2,1,1,,\n");
    let path = write(dir.path(), "dup.csv", &contents);
    let source = read_plant_csv(&path, SourceId::Carma).expect("read plants");
    assert_eq!(source.len(), 1);
    assert_eq!(source.get("A").and_then(|p| p.name.as_deref()), Some("Second"));
}

#[test]
fn missing_required_column_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "bad.csv", "id,country,capacity_mw,latitude\nA,Kenya,1,1\n");
    let err = read_plant_csv(&path, SourceId::Wri).unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "longitude"));
}

#[test]
fn missing_file_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_plant_csv(&dir.path().join("absent.csv"), SourceId::Wri).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn reads_country_table_with_routing() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "countries.csv",
        "country,iso_code,has_api,use_geo\n\
         United States of America,USA,1,0\n\
         Fiji,FJI,0,1\n\
         Kenya,KEN,0,0\n\
         Brazil,BRA,yes,yes\n",
    );
    let table = read_country_table(&path).expect("read countries");
    assert_eq!(table.len(), 4);
    assert_eq!(
        table.lookup("United States of America").map(|p| p.route),
        Some(CountryRoute::NationalApi)
    );
    assert_eq!(table.lookup("Fiji").map(|p| p.route), Some(CountryRoute::GeoRouted));
    assert_eq!(table.lookup("Kenya").map(|p| p.route), Some(CountryRoute::Default));
    assert_eq!(table.lookup("Brazil").map(|p| p.route), Some(CountryRoute::NationalApi));
}

#[test]
fn country_table_rejects_bad_flags_and_duplicates() {
    let dir = TempDir::new().expect("temp dir");
    let bad_flag = write(
        dir.path(),
        "flags.csv",
        "country,iso_code,has_api,use_geo\nKenya,KEN,sometimes,0\n",
    );
    let err = read_country_table(&bad_flag).unwrap_err();
    assert!(matches!(err, IngestError::InvalidValue { row: 1, .. }));

    let duplicate = write(
        dir.path(),
        "dups.csv",
        "country,iso_code,has_api,use_geo\nKenya,KEN,0,0\nKenya,KEN,0,1\n",
    );
    let err = read_country_table(&duplicate).unwrap_err();
    assert!(matches!(err, IngestError::DuplicateCountry { ref name, .. } if name == "Kenya"));

    let no_iso = write(
        dir.path(),
        "iso.csv",
        "country,iso_code,has_api,use_geo\nBrazil,,1,0\n",
    );
    let err = read_country_table(&no_iso).unwrap_err();
    assert!(matches!(err, IngestError::InvalidValue { ref field, .. } if field == "iso_code"));
}

#[test]
fn reads_concordance_with_blank_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "concordance.csv",
        "wri_id,geo_id,carma_id\nWRI001,GEO42,\nWRI002,,CARMA7\n,GEO1,CARMA1\n",
    );
    let index = read_concordance(&path).expect("read concordance");
    assert_eq!(index.len(), 2);

    let first = index.lookup("WRI001").expect("WRI001");
    assert_eq!(first.geo_id.as_deref(), Some("GEO42"));
    assert_eq!(first.carma_id, None);

    let second = index.lookup("WRI002").expect("WRI002");
    assert_eq!(second.geo_id, None);
    assert_eq!(second.carma_id.as_deref(), Some("CARMA7"));
}

#[test]
fn layout_resolves_national_pattern() {
    let layout = SourceLayout {
        data_dir: PathBuf::from("/data"),
        ..SourceLayout::default()
    };
    assert_eq!(
        layout.path_for(&SourceId::national("Brazil", "BRA")),
        PathBuf::from("/data/BRA-Database.csv")
    );
    assert_eq!(
        layout.path_for(&SourceId::SourceWatch),
        PathBuf::from("/data/SRCWT-Database.csv")
    );
}

#[test]
fn loads_full_source_set() {
    let dir = TempDir::new().expect("temp dir");
    let countries = write(
        dir.path(),
        "countries.csv",
        "country,iso_code,has_api,use_geo\nBrazil,BRA,1,0\nKenya,KEN,0,0\n",
    );
    write(dir.path(), "BRA-Database.csv", &format!("{PLANT_HEADER}B1,,Brazil,,,10,-10,-50,,\n"));
    write(dir.path(), "WRI-Database.csv", &format!("{PLANT_HEADER}W1,,Kenya,,,10,1,36,,\n"));
    write(dir.path(), "GEODB-Database.csv", PLANT_HEADER);
    write(dir.path(), "CARMA-Database.csv", PLANT_HEADER);
    write(dir.path(), "SRCWT-Database.csv", PLANT_HEADER);

    let table = read_country_table(&countries).expect("read countries");
    let loader = CsvSourceLoader::new(SourceLayout {
        data_dir: dir.path().to_path_buf(),
        ..SourceLayout::default()
    });
    let sources = load_sources(&loader, &table).expect("load sources");

    assert_eq!(sources.national.len(), 1);
    assert!(sources.national["Brazil"].get("B1").is_some());
    assert_eq!(sources.wri.len(), 1);
    assert!(sources.geo.is_empty());
    assert_eq!(sources.total_plants(), 2);
}

#[test]
fn missing_national_feed_stops_loading() {
    let dir = TempDir::new().expect("temp dir");
    let countries = write(
        dir.path(),
        "countries.csv",
        "country,iso_code,has_api,use_geo\nBrazil,BRA,1,0\n",
    );
    let table = read_country_table(&countries).expect("read countries");
    let loader = CsvSourceLoader::new(SourceLayout {
        data_dir: dir.path().to_path_buf(),
        ..SourceLayout::default()
    });
    let err = load_sources(&loader, &table).unwrap_err();
    let expected = loader
        .layout()
        .path_for(&SourceId::national("Brazil", "BRA"));
    assert!(expected.ends_with("BRA-Database.csv"));
    assert!(matches!(err, IngestError::FileNotFound { ref path } if *path == expected));
    assert!(loader.load(&SourceId::Wri).is_err());
}
