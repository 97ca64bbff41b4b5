//! Cross-crate flows: setting up a test case from the fixtures the way a work
//! directory is prepared, through the library crates and the CLI handlers.

use std::path::PathBuf;

use compass_cli::config::{run_config, ConfigArgs, ConfigCommand};
use compass_cli::mesh::{run_mesh, MeshArgs, MeshCommand};
use compass_cli::streams::{run_streams, StreamsArgs, StreamsCommand};
use compass_cli::{EXIT_FAILURE, EXIT_OK};
use compass_core::ConfigDocument;
use compass_mesh::{Culling, MeshConfig};
use compass_streams::{StreamLoader, StreamManifest, StreamType};

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn mesh_fixture() -> PathBuf {
    repo_root().join("fixtures/landice/antarctica/mesh.cfg")
}

fn streams_fixture() -> PathBuf {
    repo_root().join("fixtures/ocean/land_ice_fluxes/streams.land_ice_fluxes")
}

// =========================================================================
// Mesh: core defaults + test case + user overrides
// =========================================================================

#[test]
fn mesh_section_survives_config_merge() {
    let dir = tempfile::tempdir().unwrap();
    let user = dir.path().join("user.cfg");
    std::fs::write(
        &user,
        "[DEFAULT]\nscale = 2\n\n[mesh]\n# coarser run\nmax_spac = 60.e3\nnote = ${scale}x coarse\n",
    )
    .unwrap();
    let combined = dir.path().join("antarctica.cfg");

    let args = ConfigArgs {
        command: ConfigCommand::Merge {
            files: vec![mesh_fixture(), user],
            output: Some(combined.clone()),
        },
    };
    assert_eq!(run_config(&args).unwrap(), EXIT_OK);

    let mesh = compass_mesh::load(&combined).unwrap();
    assert_eq!(mesh.max_spac, 60_000.0);
    assert_eq!(mesh.levels, 5);
    assert_eq!(mesh.extra.get("note").map(String::as_str), Some("${scale}x coarse"));

    let doc = ConfigDocument::read(&combined).unwrap();
    assert_eq!(doc.get("mesh", "note").unwrap(), "2x coarse");
}

#[test]
fn mesh_check_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let inverted = dir.path().join("inverted.cfg");
    std::fs::write(&inverted, "[mesh]\nlow_dist = 2.e5\n").unwrap();

    let ok = MeshArgs {
        command: MeshCommand::Check {
            files: vec![mesh_fixture()],
        },
    };
    assert_eq!(run_mesh(&ok).unwrap(), EXIT_OK);

    let bad = MeshArgs {
        command: MeshCommand::Check {
            files: vec![mesh_fixture(), inverted],
        },
    };
    assert_eq!(run_mesh(&bad).unwrap(), EXIT_FAILURE);
}

#[test]
fn mesh_document_round_trip_preserves_culling() {
    let mut mesh = compass_mesh::load(&mesh_fixture()).unwrap();
    mesh.cull_distance = -1.0;
    let text = mesh.to_document().to_string();
    let back: MeshConfig = text.parse().unwrap();
    assert_eq!(back.culling(), Culling::Disabled);
    assert_eq!(back, mesh);
}

// =========================================================================
// Streams: core template + test case manifest
// =========================================================================

/// The ocean core's own streams file, reduced to the parts the land-ice case
/// touches.
const CORE_TEMPLATE: &str = r#"<?xml version="1.0"?>
<streams>

<stream name="output"
        type="output"
        filename_template="output/output.$Y-$M-$D_$h.$m.$s.nc"
        filename_interval="01-00_00:00:00"
        reference_time="0001-01-01_00:00:00"
        clobber_mode="truncate"
        output_interval="1_00:00:00">

    <stream name="mesh"/>
    <var name="xtime"/>
    <var name="ssh"/>
</stream>

<stream name="land_ice_fluxes"
        type="output"
        filename_template="land_ice_fluxes.nc"
        output_interval="none">

    <var name="xtime"/>
</stream>

</streams>
"#;

#[test]
fn test_case_manifest_merges_into_core_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("streams.ocean");
    std::fs::write(&template, CORE_TEMPLATE).unwrap();
    let merged_path = dir.path().join("streams.ocean.merged");

    let args = StreamsArgs {
        command: StreamsCommand::Merge {
            template,
            overrides: streams_fixture(),
            output: Some(merged_path.clone()),
        },
    };
    assert_eq!(run_streams(&args).unwrap(), EXIT_OK);

    let merged = compass_streams::load(&merged_path).unwrap();
    assert_eq!(
        merged.names().collect::<Vec<_>>(),
        vec!["output", "land_ice_fluxes", "data_land_ice_fluxes"]
    );

    let fluxes = merged.get("land_ice_fluxes").unwrap();
    assert_eq!(fluxes.stream_type, StreamType::Output);
    assert_eq!(fluxes.filename_template.as_str(), "land_ice_fluxes.$Y-$M-$D.nc");
    assert_eq!(fluxes.variables().count(), 20);
    assert_eq!(fluxes.embedded_streams().collect::<Vec<_>>(), vec!["mesh"]);

    let output = merged.get("output").unwrap();
    assert_eq!(output.variables().count(), 2);
}

#[test]
fn cli_check_accepts_fixture_and_rejects_strict_mode() {
    let default = StreamsArgs {
        command: StreamsCommand::Check {
            file: streams_fixture(),
            known_streams: Vec::new(),
            no_core_streams: false,
            fields: None,
        },
    };
    assert_eq!(run_streams(&default).unwrap(), EXIT_OK);

    let strict = StreamsArgs {
        command: StreamsCommand::Check {
            file: streams_fixture(),
            known_streams: Vec::new(),
            no_core_streams: true,
            fields: None,
        },
    };
    assert_eq!(run_streams(&strict).unwrap(), EXIT_FAILURE);
}

#[test]
fn loader_with_template_names_accepts_cross_references() {
    let template: StreamManifest = CORE_TEMPLATE.parse().unwrap();
    let case = r#"<streams>
<stream name="diagnostics" type="output" filename_template="diag.nc" output_interval="01:00:00">
    <stream name="output"/>
    <var name="landIceDraft"/>
</stream>
</streams>"#;

    assert!(StreamLoader::without_known_streams().parse(case).is_err());
    let loader = StreamLoader::without_known_streams().with_known_streams(template.names());
    let overrides = loader.parse(case).unwrap();

    let mut merged = template.clone();
    merged.apply_overrides(&overrides);
    let flat = merged.flattened_contents("diagnostics").unwrap();
    // mesh (external), xtime and ssh through `output`, then landIceDraft
    assert_eq!(flat.len(), 4);
}
