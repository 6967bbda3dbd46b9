//! End-to-end stitching runs on GeoJSON datasets written to a temp directory

use border_stitch::core::postprocess::MERGED_LAYER;
use border_stitch::{
    great_circle_feet, run, Coord, FeatureStore, GeoJsonStore, Geometry, Position,
    StitchConfig, StitchOptions, CONNECTORS_LAYER,
};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

fn write_layer(dataset: &Path, layer: &str, features: Vec<Value>) {
    let collection = json!({"type": "FeatureCollection", "features": features});
    std::fs::write(
        dataset.join(format!("{layer}.geojson")),
        serde_json::to_string_pretty(&collection).unwrap(),
    )
    .unwrap();
}

fn dangle(lon: f64, lat: f64, func_class: i64) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lon, lat]},
        "properties": {"func_class": func_class, "nhs": 1, "fac_type": 1, "thru_lanes": 2}
    })
}

fn road(coords: Value, props: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "LineString", "coordinates": coords},
        "properties": props
    })
}

/// AR/TN 583.7 ft apart (inside the 610 ft AR-TN tolerance), one KS/MO pair
/// 620.2 ft apart (outside 615 ft) and one 612.9 ft apart (inside).
fn border_dataset() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("arnold_states_2016");
    std::fs::create_dir_all(&dataset).unwrap();

    write_layer(&dataset, "AR_state_border_dangles", vec![dangle(-90.0, 35.0, 3)]);
    write_layer(&dataset, "TN_state_border_dangles", vec![dangle(-90.0, 35.0016, 3)]);
    write_layer(
        &dataset,
        "KS_state_border_dangles",
        vec![dangle(-94.6, 38.5, 4), dangle(-94.6, 38.6, 4)],
    );
    write_layer(
        &dataset,
        "MO_state_border_dangles",
        vec![dangle(-94.6, 38.5017, 4), dangle(-94.6, 38.60168, 4)],
    );

    write_layer(
        &dataset,
        "AR_s7_clip_final",
        vec![road(
            json!([[-90.1, 35.0], [-90.0, 35.0]]),
            json!({"func_class": 3, "len_miles": 0.0, "FID_AR_s7_merged": 12}),
        )],
    );
    write_layer(
        &dataset,
        "TN_s7_clip_final",
        vec![road(
            json!([[-90.0, 35.0016], [-89.9, 35.0016]]),
            json!({"func_class": 3, "len_miles": 0.0, "FID_TN_s7_clip": 4}),
        )],
    );
    dir
}

fn config_for(dir: &TempDir) -> StitchConfig {
    StitchConfig {
        output_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    }
}

fn connector_pairs(store: &GeoJsonStore) -> Vec<(String, String)> {
    store
        .read_layer(CONNECTORS_LAYER)
        .unwrap()
        .features
        .iter()
        .map(|f| {
            (
                f.properties["from_state"].as_str().unwrap().to_string(),
                f.properties["to_state"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn test_fixture_distances() {
    let ar_tn = great_circle_feet(Coord::new(-90.0, 35.0), Coord::new(-90.0, 35.0016));
    let ks_mo_far = great_circle_feet(Coord::new(-94.6, 38.5), Coord::new(-94.6, 38.5017));
    let ks_mo_near = great_circle_feet(Coord::new(-94.6, 38.6), Coord::new(-94.6, 38.60168));
    assert!(ar_tn > 305.0 && ar_tn < 610.0, "AR-TN {ar_tn}");
    assert!(ks_mo_far > 615.0, "KS-MO far {ks_mo_far}");
    assert!(ks_mo_near > 610.0 && ks_mo_near < 615.0, "KS-MO near {ks_mo_near}");
}

#[test]
fn test_full_run_writes_one_connector_per_pair() {
    let dir = border_dataset();
    let report = run(&config_for(&dir), &StitchOptions::default()).unwrap();

    assert_eq!(report.connectors_written, 2);
    let states: Vec<String> = report.states.iter().map(|s| s.state.to_string()).collect();
    assert_eq!(states, vec!["AR", "KS", "MO", "TN"]);

    let store = GeoJsonStore::open(dir.path().join("arnold_states_2016")).unwrap();
    assert_eq!(
        connector_pairs(&store),
        vec![
            ("AR".to_string(), "TN".to_string()),
            ("KS".to_string(), "MO".to_string())
        ]
    );

    // MO and TN matched back but were already connected
    let mo = &report.states[2];
    assert_eq!(mo.matched, 1);
    assert_eq!(mo.written, 0);
    assert_eq!(mo.suppressed, 1);
}

#[test]
fn test_connector_geometry_joins_the_matched_dangles() {
    let dir = border_dataset();
    run(&config_for(&dir), &StitchOptions::default()).unwrap();

    let store = GeoJsonStore::open(dir.path().join("arnold_states_2016")).unwrap();
    let connectors = store.read_layer(CONNECTORS_LAYER).unwrap();
    match &connectors.features[1].geometry {
        Geometry::LineString { coordinates } => {
            let ends: Vec<Coord> = coordinates.iter().map(|p| p.coord()).collect();
            assert_eq!(ends, vec![Coord::new(-94.6, 38.6), Coord::new(-94.6, 38.60168)]);
        }
        other => panic!("expected a line, got {other:?}"),
    }
}

#[test]
fn test_merged_network_is_tagged_and_cleaned() {
    let dir = border_dataset();
    let report = run(&config_for(&dir), &StitchOptions::default()).unwrap();
    assert_eq!(report.merged_features, Some(4));

    let merged = GeoJsonStore::open(dir.path().join("arnold_merged_2016")).unwrap();
    let layer = merged.read_layer(MERGED_LAYER).unwrap();
    assert_eq!(layer.len(), 4);

    for feature in &layer.features {
        assert!(feature.properties.keys().all(|k| !k.starts_with("FID_")));
        assert!(feature.properties["len_miles"].as_f64().unwrap() > 0.0);
    }

    // Roads first, connectors last
    let connectors: Vec<_> = layer
        .features
        .iter()
        .filter(|f| f.properties["func_class"] == json!(990))
        .collect();
    assert_eq!(connectors.len(), 2);
    let ar_tn_miles = connectors[0].properties["len_miles"].as_f64().unwrap();
    assert!((ar_tn_miles - 583.74 / 5280.0).abs() < 0.001, "got {ar_tn_miles}");
}

#[test]
fn test_rerun_replaces_previous_connectors() {
    let dir = border_dataset();
    let config = config_for(&dir);
    run(&config, &StitchOptions::default()).unwrap();
    let report = run(&config, &StitchOptions::default()).unwrap();
    assert_eq!(report.connectors_written, 2);

    let store = GeoJsonStore::open(dir.path().join("arnold_states_2016")).unwrap();
    assert_eq!(store.read_layer(CONNECTORS_LAYER).unwrap().len(), 2);
}

#[test]
fn test_skip_merge_leaves_no_merged_dataset() {
    let dir = border_dataset();
    let config = StitchConfig {
        skip_merge: true,
        ..config_for(&dir)
    };
    let report = run(&config, &StitchOptions::default()).unwrap();
    assert_eq!(report.connectors_written, 2);
    assert_eq!(report.merged_features, None);
    assert!(!dir.path().join("arnold_merged_2016").exists());

    // Connectors stay untagged without post-processing
    let store = GeoJsonStore::open(dir.path().join("arnold_states_2016")).unwrap();
    let connectors = store.read_layer(CONNECTORS_LAYER).unwrap();
    assert!(connectors.features.iter().all(|f| !f.properties.contains_key("func_class")));
}

#[test]
fn test_wider_override_from_config_connects_far_pair() {
    let dir = border_dataset();
    let config = StitchConfig::from_toml(&format!(
        r#"
output_dir = "{}"
skip_merge = true

[[overrides]]
states = ["MO", "KS"]
feet = 700.0
"#,
        dir.path().display()
    ))
    .unwrap();

    let report = run(&config, &StitchOptions::default()).unwrap();
    // AR-TN falls back to the 305 ft base, both KS-MO pairs connect
    assert_eq!(report.connectors_written, 2);
    let store = GeoJsonStore::open(dir.path().join("arnold_states_2016")).unwrap();
    assert_eq!(
        connector_pairs(&store),
        vec![
            ("KS".to_string(), "MO".to_string()),
            ("KS".to_string(), "MO".to_string())
        ]
    );
}

#[test]
fn test_failed_run_keeps_previous_merged_network() {
    let dir = border_dataset();
    let config = config_for(&dir);
    run(&config, &StitchOptions::default()).unwrap();
    let merged_file = dir
        .path()
        .join("arnold_merged_2016")
        .join("arnold_merged.geojson");
    let before = std::fs::read_to_string(&merged_file).unwrap();

    std::fs::write(
        dir.path()
            .join("arnold_states_2016")
            .join("TN_state_border_dangles.geojson"),
        "{not json",
    )
    .unwrap();

    let err = run(&config, &StitchOptions::default()).unwrap_err();
    assert!(err.to_string().contains("TN_state_border_dangles"), "{err}");
    assert_eq!(std::fs::read_to_string(&merged_file).unwrap(), before);
}

#[test]
fn test_z_values_and_multipart_roads() {
    let dir = border_dataset();
    let dataset = dir.path().join("arnold_states_2016");
    write_layer(
        &dataset,
        "AR_state_border_dangles",
        vec![json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-90.0, 35.0, 0.0]},
            "properties": {"func_class": 3, "nhs": 1, "fac_type": 1, "thru_lanes": 2}
        })],
    );
    write_layer(
        &dataset,
        "AR_s7_clip_final",
        vec![json!({
            "type": "Feature",
            "id": 7,
            "geometry": {
                "type": "MultiLineString",
                "coordinates": [[[-90.2, 35.0], [-90.1, 35.0]], [[-90.1, 35.0], [-90.0, 35.0]]]
            },
            "properties": {"func_class": 3, "len_miles": 0.0, "FID_AR_s7_merged": 12}
        })],
    );

    let report = run(&config_for(&dir), &StitchOptions::default()).unwrap();
    assert_eq!(report.connectors_written, 2);

    let merged = GeoJsonStore::open(dir.path().join("arnold_merged_2016")).unwrap();
    let layer = merged.read_layer(MERGED_LAYER).unwrap();
    let road = &layer.features[0];
    assert_eq!(road.extra["id"], json!(7));
    assert!(matches!(road.geometry, Geometry::MultiLineString { .. }));

    // two 0.1 degree parts of longitude at 35N
    let expected = 2.0 * border_stitch::core::postprocess::length_miles(&[
        Position::from(Coord::new(-90.1, 35.0)),
        Position::from(Coord::new(-90.0, 35.0)),
    ]);
    let miles = road.properties["len_miles"].as_f64().unwrap();
    assert!((miles - expected).abs() < 1e-6, "got {miles}, expected {expected}");
}

#[test]
fn test_missing_dataset_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&config_for(&dir), &StitchOptions::default()).unwrap_err();
    assert!(err.to_string().contains("couldn't find dataset"));
}
