//! # Streams Subcommand
//!
//! `compass-cfg streams show|check|merge`: summarize, validate and merge
//! stream manifests.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use compass_streams::{ManifestError, Stream, StreamLoader, StreamManifest};

use crate::{load_or_report, write_output, EXIT_FAILURE, EXIT_OK};

/// Arguments for the `compass-cfg streams` subcommand.
#[derive(Args, Debug)]
pub struct StreamsArgs {
    #[command(subcommand)]
    pub command: StreamsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StreamsCommand {
    /// List each stream with its type, cadence and contents.
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Validate a manifest.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Additional stream name that embedded references may use.
        #[arg(long = "known-stream", value_name = "NAME")]
        known_streams: Vec<String>,

        /// Do not accept references to the core's predeclared streams.
        #[arg(long)]
        no_core_streams: bool,

        /// File listing the model's field names, one per line; every field
        /// entry must appear in it.
        #[arg(long, value_name = "FILE")]
        fields: Option<PathBuf>,
    },
    /// Apply a test case's overrides to a core template and write the result.
    Merge {
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        #[arg(value_name = "OVERRIDES")]
        overrides: PathBuf,

        /// Output file (stdout if omitted).
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
}

/// Execute the streams subcommand.
///
/// Returns exit code: 0 on success, 1 when a manifest is malformed or names
/// unknown fields.
pub fn run_streams(args: &StreamsArgs) -> Result<u8> {
    match &args.command {
        StreamsCommand::Show { file } => {
            let Some(manifest) = load(&StreamLoader::default(), file)? else {
                return Ok(EXIT_FAILURE);
            };
            print!("{}", summary(&manifest));
            Ok(EXIT_OK)
        }
        StreamsCommand::Check {
            file,
            known_streams,
            no_core_streams,
            fields,
        } => {
            let base = if *no_core_streams {
                StreamLoader::without_known_streams()
            } else {
                StreamLoader::default()
            };
            let loader = base.with_known_streams(known_streams.iter().cloned());
            tracing::debug!(
                known = ?loader.known_streams().collect::<Vec<_>>(),
                "predeclared streams"
            );
            let Some(manifest) = load(&loader, file)? else {
                return Ok(EXIT_FAILURE);
            };
            match fields {
                Some(path) => check_fields(&manifest, &read_field_list(path)?, file),
                None => {
                    println!("{}: OK ({} stream(s))", file.display(), manifest.len());
                    Ok(EXIT_OK)
                }
            }
        }
        StreamsCommand::Merge {
            template,
            overrides,
            output,
        } => {
            let Some(mut merged) = load(&StreamLoader::default(), template)? else {
                return Ok(EXIT_FAILURE);
            };
            // Overrides may embed streams the template declares.
            let loader =
                StreamLoader::default().with_known_streams(merged.names().map(String::from));
            let Some(overrides) = load(&loader, overrides)? else {
                return Ok(EXIT_FAILURE);
            };
            merged.apply_overrides(&overrides);
            write_output(output.as_deref(), &merged.to_xml())?;
            Ok(EXIT_OK)
        }
    }
}

fn load(loader: &StreamLoader, path: &Path) -> Result<Option<StreamManifest>> {
    load_or_report(loader.load(path), ManifestError::is_malformed)
}

/// One line per stream.
fn summary(manifest: &StreamManifest) -> String {
    manifest.iter().map(summary_line).collect()
}

fn summary_line(stream: &Stream) -> String {
    let cadence = stream
        .cadence()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let embedded: Vec<&str> = stream.embedded_streams().collect();
    let mut line = format!(
        "{} [{}] {} every {}: {} field entries",
        stream.name,
        stream.stream_type,
        stream.filename_template,
        cadence,
        stream.variables().count()
    );
    if !embedded.is_empty() {
        line.push_str(&format!(", embeds {}", embedded.join(", ")));
    }
    line.push('\n');
    line
}

/// Field names from a text file; blank lines and `#` comments are skipped.
fn read_field_list(path: &Path) -> Result<BTreeSet<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read field list {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn check_fields(manifest: &StreamManifest, fields: &BTreeSet<String>, file: &Path) -> Result<u8> {
    let unresolved = manifest.unresolved_fields(fields);
    for missing in &unresolved {
        println!("  FAIL: stream '{}': unknown field {}", missing.stream, missing.entry);
    }
    if unresolved.is_empty() {
        println!("{}: OK ({} stream(s))", file.display(), manifest.len());
        Ok(EXIT_OK)
    } else {
        println!("{}: {} unknown field(s)", file.display(), unresolved.len());
        Ok(EXIT_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"<streams>
<stream name="output" type="output" filename_template="output.nc" output_interval="1_00:00:00">
    <stream name="mesh"/>
    <var name="xtime"/>
</stream>
</streams>
"#;

    const OVERRIDES: &str = r#"<streams>
<stream name="output" type="output" filename_template="output.$Y.nc" output_interval="0001-00-00_00:00:00">
    <var name="ssh"/>
</stream>
<stream name="extra" type="output" filename_template="extra.nc">
    <stream name="output"/>
</stream>
</streams>
"#;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn run(command: StreamsCommand) -> Result<u8> {
        run_streams(&StreamsArgs { command })
    }

    fn check(file: PathBuf) -> StreamsCommand {
        StreamsCommand::Check {
            file,
            known_streams: Vec::new(),
            no_core_streams: false,
            fields: None,
        }
    }

    #[test]
    fn summary_lists_streams() {
        let manifest: StreamManifest = TEMPLATE.parse().unwrap();
        let text = summary(&manifest);
        assert_eq!(
            text,
            "output [output] output.nc every 0000-00-01_00:00:00: 1 field entries, embeds mesh\n"
        );
    }

    #[test]
    fn check_accepts_valid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "streams.ocean", TEMPLATE);
        assert_eq!(run(check(file)).unwrap(), EXIT_OK);
    }

    #[test]
    fn check_honors_known_stream_options() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "streams.ocean", TEMPLATE);
        let strict = StreamsCommand::Check {
            file: file.clone(),
            known_streams: Vec::new(),
            no_core_streams: true,
            fields: None,
        };
        assert_eq!(run(strict).unwrap(), EXIT_FAILURE);

        let named = StreamsCommand::Check {
            file,
            known_streams: vec!["mesh".to_string()],
            no_core_streams: true,
            fields: None,
        };
        assert_eq!(run(named).unwrap(), EXIT_OK);
    }

    #[test]
    fn check_reports_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "streams.ocean", TEMPLATE);
        let fields = write(&dir, "fields.txt", "# registry\nssh\n\n");
        let command = StreamsCommand::Check {
            file: file.clone(),
            known_streams: Vec::new(),
            no_core_streams: false,
            fields: Some(fields),
        };
        assert_eq!(run(command).unwrap(), EXIT_FAILURE);

        let fields = write(&dir, "all.txt", "xtime\n");
        let command = StreamsCommand::Check {
            file,
            known_streams: Vec::new(),
            no_core_streams: false,
            fields: Some(fields),
        };
        assert_eq!(run(command).unwrap(), EXIT_OK);
    }

    #[test]
    fn malformed_manifest_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "streams.bad", "<streams><stream name=\"x\"/></streams>");
        assert_eq!(run(check(file)).unwrap(), EXIT_FAILURE);
    }

    #[test]
    fn non_utf8_manifest_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("streams.latin1");
        let mut bytes = TEMPLATE.as_bytes().to_vec();
        bytes.extend_from_slice(b"<!-- caf\xe9 -->\n");
        std::fs::write(&file, bytes).unwrap();
        assert_eq!(run(check(file)).unwrap(), EXIT_FAILURE);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(check(dir.path().join("absent"))).is_err());
    }

    #[test]
    fn merge_writes_combined_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let template = write(&dir, "streams.ocean", TEMPLATE);
        let overrides = write(&dir, "streams.case", OVERRIDES);
        let output = dir.path().join("merged.xml");
        let command = StreamsCommand::Merge {
            template,
            overrides,
            output: Some(output.clone()),
        };
        assert_eq!(run(command).unwrap(), EXIT_OK);

        let merged = compass_streams::load(&output).unwrap();
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["output", "extra"]);
        let out = merged.get("output").unwrap();
        assert_eq!(out.filename_template.as_str(), "output.$Y.nc");
        assert_eq!(out.variables().count(), 2);
    }
}
