//! Data types produced by the hotspot pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Total fines for one qualifying location. Serialized as `location,amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location: String,
    pub amount: f64,
}

/// A [`LocationSummary`] with the location's first-seen coordinates.
///
/// Serialized as `location,lat,lon,amount`. Coordinates are `None` only when
/// the location never appeared in the records, which the left join tolerates
/// instead of dropping the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappableLocationSummary {
    pub location: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub amount: f64,
}

/// Row counts and settings of one run, written next to the artifacts as JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub threshold: f64,
    pub input_rows: usize,
    pub location_summary_rows: usize,
    pub mappable_rows: usize,
    pub filtered_ticket_rows: usize,
    pub artifacts: Vec<String>,
}
