//! Integration test: load the ocean land-ice-fluxes test case manifest from
//! `fixtures/` and check its shape, its rendering, and its merge into a core
//! template.

use std::path::PathBuf;

use compass_streams::{
    Interval, MalformedManifest, ResolvedEntry, StreamEntry, StreamLoader, StreamManifest,
    StreamType,
};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn fixture() -> PathBuf {
    repo_root().join("fixtures/ocean/land_ice_fluxes/streams.land_ice_fluxes")
}

fn load_fixture() -> StreamManifest {
    compass_streams::load(&fixture()).expect("fixture manifest loads")
}

#[test]
fn test_fixture_declares_two_streams() {
    let manifest = load_fixture();
    assert_eq!(
        manifest.names().collect::<Vec<_>>(),
        vec!["data_land_ice_fluxes", "land_ice_fluxes"]
    );
    assert_eq!(
        manifest.get("data_land_ice_fluxes").unwrap().stream_type,
        StreamType::Input
    );
    assert_eq!(
        manifest.get("land_ice_fluxes").unwrap().stream_type,
        StreamType::Output
    );
}

#[test]
fn test_output_stream_contents() {
    let manifest = load_fixture();
    let stream = manifest.get("land_ice_fluxes").unwrap();

    assert_eq!(stream.embedded_streams().collect::<Vec<_>>(), vec!["mesh"]);
    assert_eq!(stream.variables().count(), 20);
    let arrays: Vec<&str> = stream
        .variables()
        .filter(|e| matches!(e, StreamEntry::VarArray(_)))
        .map(|e| e.name())
        .collect();
    assert_eq!(
        arrays,
        vec![
            "landIceBoundaryLayerTracers",
            "landIceTracerTransferVelocities",
            "landIceInterfaceTracers",
        ]
    );
    assert_eq!(stream.contents.first(), Some(&StreamEntry::Stream("mesh".to_string())));
}

#[test]
fn test_output_stream_attributes() {
    let manifest = load_fixture();
    let stream = manifest.get("land_ice_fluxes").unwrap();
    let hourly = stream.cadence().and_then(Interval::period).unwrap();
    assert_eq!(hourly.fixed_seconds(), Some(3600));
    assert_eq!(stream.attribute("precision"), Some("double"));
    assert_eq!(stream.attribute("filename_interval"), Some("0000-01-00_00:00:00"));
    assert!(stream.filename_template.is_time_varying());
    assert_eq!(
        stream
            .filename_template
            .expand(&"0001-02-03_00:00:00".parse().unwrap()),
        "land_ice_fluxes.0001-02-03.nc"
    );

    let input = manifest.get("data_land_ice_fluxes").unwrap();
    assert_eq!(input.cadence(), Some(&Interval::InitialOnly));
}

#[test]
fn test_mesh_reference_stays_external() {
    let manifest = load_fixture();
    let flat = manifest.flattened_contents("land_ice_fluxes").unwrap();
    assert_eq!(flat.len(), 21);
    assert_eq!(flat[0], ResolvedEntry::External("mesh"));
}

#[test]
fn test_fixture_requires_predeclared_mesh() {
    let err = StreamLoader::without_known_streams()
        .load(&fixture())
        .unwrap_err();
    assert!(matches!(
        err.as_malformed(),
        Some(MalformedManifest::UnknownStreamReference { reference, .. }) if reference == "mesh"
    ));
}

#[test]
fn test_written_manifest_reloads_equal() {
    let manifest = load_fixture();
    let xml = manifest.to_xml();
    let reloaded: StreamManifest = xml.parse().unwrap();
    assert_eq!(reloaded, manifest);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streams.ocean");
    std::fs::write(&path, &xml).unwrap();
    assert_eq!(compass_streams::load(&path).unwrap(), manifest);
}

#[test]
fn test_overrides_merge_into_core_template() {
    let template: StreamManifest = r#"<streams>
<stream name="output"
        type="output"
        filename_template="output.nc"
        output_interval="0001-00-00_00:00:00">
    <stream name="mesh"/>
    <var name="xtime"/>
</stream>
<stream name="land_ice_fluxes"
        type="output"
        filename_template="lif.nc"
        clobber_mode="overwrite"
        output_interval="none">
    <var name="xtime"/>
</stream>
</streams>"#
        .parse()
        .unwrap();

    let mut merged = template.clone();
    merged.apply_overrides(&load_fixture());

    assert_eq!(
        merged.names().collect::<Vec<_>>(),
        vec!["output", "land_ice_fluxes", "data_land_ice_fluxes"]
    );
    let lif = merged.get("land_ice_fluxes").unwrap();
    assert_eq!(lif.filename_template.as_str(), "land_ice_fluxes.$Y-$M-$D.nc");
    assert_eq!(lif.output_interval.as_ref().and_then(Interval::period).map(|d| d.hours), Some(1));
    // xtime from the template, plus everything new from the override
    assert_eq!(lif.contents[0], StreamEntry::Var("xtime".to_string()));
    assert_eq!(lif.contents.len(), 21);
    assert_eq!(merged.get("output"), template.get("output"));
}

#[test]
fn test_registry_check_against_fixture() {
    let manifest = load_fixture();
    let known: std::collections::BTreeSet<String> = manifest
        .get("land_ice_fluxes")
        .unwrap()
        .variables()
        .map(|e| e.name().to_string())
        .collect();
    assert!(manifest.unresolved_fields(&known).is_empty());

    let partial: std::collections::BTreeSet<String> =
        ["xtime".to_string(), "ssh".to_string()].into_iter().collect();
    let missing = manifest.unresolved_fields(&partial);
    assert_eq!(missing.len(), 20);
    assert!(missing.iter().all(|m| m.entry.name() != "xtime"));
}
