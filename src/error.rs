//! Error types shared by the parsing, pipeline, and report layers.

use thiserror::Error;

/// Errors produced while reading violations or computing hotspot artifacts.
#[derive(Debug, Error)]
pub enum HotspotError {
    /// A required column is absent from the input header.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// A cell could not be interpreted for its column.
    #[error("row {row}: malformed value '{value}' in column '{column}'")]
    MalformedValue {
        /// 1-based data row index (the header is not counted).
        row: usize,
        column: String,
        value: String,
    },

    /// Threshold is negative, NaN, infinite, or not a number at all.
    #[error("invalid threshold '{0}': must be a finite, non-negative number")]
    InvalidThreshold(String),

    /// Two records for the same location disagree on coordinates.
    #[error(
        "location '{location}' has conflicting coordinates: first ({first_lat}, {first_lon}), later ({lat}, {lon})"
    )]
    ConflictingCoordinates {
        location: String,
        first_lat: f64,
        first_lon: f64,
        lat: f64,
        lon: f64,
    },

    /// The requested location is not part of the location summary.
    #[error("location '{0}' is not a hotspot in the loaded summary")]
    UnknownLocation(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HotspotError>;
