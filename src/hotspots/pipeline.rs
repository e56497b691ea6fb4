use crate::config::{PipelineConfig, Threshold};
use crate::error::Result;
use crate::fetch::load_source;
use crate::hotspots::aggregate::summarize;
use crate::hotspots::enrich::enrich;
use crate::hotspots::filter::filter_by_locations;
use crate::hotspots::types::{LocationSummary, MappableLocationSummary, RunManifest};
use crate::output::{
    Artifact, ArtifactSet, ArtifactSink, FILTERED_TICKETS_FILE, LOCATION_SUMMARY_COLUMNS,
    LOCATION_SUMMARY_FILE, MANIFEST_FILE, MAPPABLE_SUMMARY_COLUMNS, MAPPABLE_SUMMARY_FILE,
    render_passthrough, render_rows,
};
use crate::parser::parse_violations;
use crate::records::{ViolationRecord, ViolationTable};
use chrono::Utc;
use csv::StringRecord;
use tracing::info;

/// The three derived datasets of one pipeline run.
///
/// Filtered tickets borrow from the input table, so a run lives no longer
/// than the records it was computed from.
#[derive(Debug)]
pub struct HotspotRun<'a> {
    pub threshold: Threshold,
    pub input_rows: usize,
    pub summaries: Vec<LocationSummary>,
    pub mappable: Vec<MappableLocationSummary>,
    pub tickets: Vec<&'a ViolationRecord>,
    headers: &'a StringRecord,
}

impl<'a> HotspotRun<'a> {
    /// Runs summarize, enrich, and filter over `table`.
    pub fn compute(table: &'a ViolationTable, config: &PipelineConfig) -> Result<Self> {
        let summaries = summarize(&table.records, config.threshold);
        let mappable = enrich(&summaries, &table.records, config.coordinates)?;
        let tickets = filter_by_locations(&table.records, &summaries);

        info!(
            input_rows = table.len(),
            hotspots = summaries.len(),
            tickets = tickets.len(),
            threshold = config.threshold.value(),
            "Hotspots computed"
        );

        Ok(HotspotRun {
            threshold: config.threshold,
            input_rows: table.len(),
            summaries,
            mappable,
            tickets,
            headers: &table.headers,
        })
    }

    pub fn manifest(&self) -> RunManifest {
        RunManifest {
            schema_version: 1,
            generated_at: Utc::now(),
            threshold: self.threshold.value(),
            input_rows: self.input_rows,
            location_summary_rows: self.summaries.len(),
            mappable_rows: self.mappable.len(),
            filtered_ticket_rows: self.tickets.len(),
            artifacts: vec![
                LOCATION_SUMMARY_FILE.to_string(),
                MAPPABLE_SUMMARY_FILE.to_string(),
                FILTERED_TICKETS_FILE.to_string(),
            ],
        }
    }

    /// Serializes every artifact in memory. Nothing is written here.
    pub fn render(&self) -> anyhow::Result<ArtifactSet> {
        let artifacts = vec![
            Artifact {
                name: LOCATION_SUMMARY_FILE,
                content_type: "text/csv",
                bytes: render_rows(&LOCATION_SUMMARY_COLUMNS, &self.summaries)?,
            },
            Artifact {
                name: MAPPABLE_SUMMARY_FILE,
                content_type: "text/csv",
                bytes: render_rows(&MAPPABLE_SUMMARY_COLUMNS, &self.mappable)?,
            },
            Artifact {
                name: FILTERED_TICKETS_FILE,
                content_type: "text/csv",
                bytes: render_passthrough(self.headers, &self.tickets)?,
            },
            Artifact {
                name: MANIFEST_FILE,
                content_type: "application/json",
                bytes: serde_json::to_vec_pretty(&self.manifest())?,
            },
        ];

        Ok(ArtifactSet { artifacts })
    }
}

/// Reads `source` once, computes all hotspot artifacts, and publishes them to `sink`.
///
/// Any read, parse, or compute failure aborts before the sink is touched.
#[tracing::instrument(skip(config, sink), fields(threshold = %config.threshold))]
pub async fn run_pipeline(
    source: &str,
    config: &PipelineConfig,
    sink: &dyn ArtifactSink,
) -> anyhow::Result<RunManifest> {
    let bytes = load_source(source).await?;
    let table = parse_violations(&bytes)?;
    info!(rows = table.len(), "Violation records loaded");

    let run = HotspotRun::compute(&table, config)?;
    let artifacts = run.render()?;

    sink.publish(&artifacts).await?;

    Ok(run.manifest())
}
