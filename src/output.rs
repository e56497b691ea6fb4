//! Artifact rendering and local persistence.
//!
//! Every artifact is rendered to bytes before anything touches the
//! filesystem, and [`LocalDirSink`] stages files before moving them into
//! place, so a failed run never leaves a partial set of outputs behind.

use anyhow::{Context, Result};
use async_trait::async_trait;
use csv::{StringRecord, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::hotspots::types::RunManifest;
use crate::records::ViolationRecord;

pub const LOCATION_SUMMARY_FILE: &str = "top_locations.csv";
pub const MAPPABLE_SUMMARY_FILE: &str = "top_locations_mappable.csv";
pub const FILTERED_TICKETS_FILE: &str = "tickets_in_top_locations.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

pub const LOCATION_SUMMARY_COLUMNS: [&str; 2] = ["location", "amount"];
pub const MAPPABLE_SUMMARY_COLUMNS: [&str; 4] = ["location", "lat", "lon", "amount"];

/// One named output file, fully rendered.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything a run produces, held in memory until it is persisted.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    pub artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

/// Destination for a rendered [`ArtifactSet`].
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn publish(&self, artifacts: &ArtifactSet) -> Result<()>;
}

/// Serializes rows as CSV under a fixed header.
///
/// The header is always written, so an empty table still yields a valid
/// one-line file.
pub fn render_rows<T: Serialize>(columns: &[&str], rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }

    Ok(writer.into_inner()?)
}

/// Writes records back out with the input header and their original fields.
pub fn render_passthrough(headers: &StringRecord, records: &[&ViolationRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        writer.write_record(&record.fields)?;
    }

    Ok(writer.into_inner()?)
}

/// Logs a run manifest as pretty-printed JSON.
pub fn print_json(manifest: &RunManifest) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(manifest)?);
    Ok(())
}

/// Writes artifacts into a local directory, all or nothing.
///
/// Files are first written to a hidden staging directory inside `dir` and
/// renamed into place only once every write has succeeded.
#[derive(Debug, Clone)]
pub struct LocalDirSink {
    dir: PathBuf,
}

impl LocalDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn staging_dir(&self) -> PathBuf {
        self.dir.join(format!(".staging-{}", std::process::id()))
    }

    fn stage(&self, staging: &Path, artifacts: &ArtifactSet) -> Result<()> {
        if staging.exists() {
            fs::remove_dir_all(staging)?;
        }
        fs::create_dir_all(staging)
            .with_context(|| format!("creating staging dir {}", staging.display()))?;

        for artifact in &artifacts.artifacts {
            let path = staging.join(artifact.name);
            fs::write(&path, &artifact.bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            debug!(file = artifact.name, bytes = artifact.bytes.len(), "Staged artifact");
        }

        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for LocalDirSink {
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()))]
    async fn publish(&self, artifacts: &ArtifactSet) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating output dir {}", self.dir.display()))?;

        let staging = self.staging_dir();
        if let Err(e) = self.stage(&staging, artifacts) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        for artifact in &artifacts.artifacts {
            fs::rename(staging.join(artifact.name), self.dir.join(artifact.name))?;
        }
        fs::remove_dir_all(&staging)?;

        info!(count = artifacts.artifacts.len(), "Artifacts written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotspots::types::{LocationSummary, MappableLocationSummary};
    use crate::records::fixtures::{HEADERS, record};
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir); // clean up any prior run
        dir
    }

    fn sample_set() -> ArtifactSet {
        ArtifactSet {
            artifacts: vec![
                Artifact {
                    name: LOCATION_SUMMARY_FILE,
                    content_type: "text/csv",
                    bytes: b"location,amount\nA,1100.0\n".to_vec(),
                },
                Artifact {
                    name: MANIFEST_FILE,
                    content_type: "application/json",
                    bytes: b"{}".to_vec(),
                },
            ],
        }
    }

    #[test]
    fn test_render_rows_empty_still_has_header() {
        let rows: Vec<LocationSummary> = vec![];
        let bytes = render_rows(&LOCATION_SUMMARY_COLUMNS, &rows).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "location,amount\n");
    }

    #[test]
    fn test_render_summary_rows() {
        let rows = vec![LocationSummary {
            location: "100 ERIE BLVD".to_string(),
            amount: 1100.0,
        }];
        let bytes = render_rows(&LOCATION_SUMMARY_COLUMNS, &rows).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "location,amount\n100 ERIE BLVD,1100.0\n"
        );
    }

    #[test]
    fn test_render_mappable_null_coordinates_are_empty() {
        let rows = vec![MappableLocationSummary {
            location: "A".to_string(),
            lat: None,
            lon: None,
            amount: 5.5,
        }];
        let bytes = render_rows(&MAPPABLE_SUMMARY_COLUMNS, &rows).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "location,lat,lon,amount\nA,,,5.5\n"
        );
    }

    #[test]
    fn test_render_passthrough_keeps_fields() {
        let headers = StringRecord::from(HEADERS.to_vec());
        let a = record("A, North", 600.0, 43.0, -76.0);
        let bytes = render_passthrough(&headers, &[&a]).unwrap();

        let content = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "location,amount,lat,lon,dayofweek,hourofday");
        assert_eq!(lines[1], "\"A, North\",600,43,-76,Monday,9");
    }

    #[tokio::test]
    async fn test_local_sink_writes_all_and_cleans_staging() {
        let dir = temp_dir("parking_hotspots_test_sink");
        let sink = LocalDirSink::new(&dir);

        sink.publish(&sample_set()).await.unwrap();

        let summary = fs::read_to_string(dir.join(LOCATION_SUMMARY_FILE)).unwrap();
        assert!(summary.starts_with("location,amount"));
        assert!(dir.join(MANIFEST_FILE).exists());

        let leftovers = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging"))
            .count();
        assert_eq!(leftovers, 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_local_sink_overwrites_previous_run() {
        let dir = temp_dir("parking_hotspots_test_overwrite");
        let sink = LocalDirSink::new(&dir);

        sink.publish(&sample_set()).await.unwrap();
        let mut second = sample_set();
        second.artifacts[0].bytes = b"location,amount\n".to_vec();
        sink.publish(&second).await.unwrap();

        let summary = fs::read_to_string(dir.join(LOCATION_SUMMARY_FILE)).unwrap();
        assert_eq!(summary, "location,amount\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_local_sink_fails_without_partial_output() {
        let dir = temp_dir("parking_hotspots_test_partial");
        let sink = LocalDirSink::new(&dir);

        // an artifact name that cannot be written as a plain file
        let mut set = sample_set();
        set.artifacts.push(Artifact {
            name: "missing-subdir/broken.csv",
            content_type: "text/csv",
            bytes: vec![],
        });

        assert!(sink.publish(&set).await.is_err());
        assert!(!dir.join(LOCATION_SUMMARY_FILE).exists());
        assert!(!sink.staging_dir().exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
