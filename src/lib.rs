pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod hotspots;
pub mod output;
pub mod parser;
pub mod records;
pub mod report;

pub use config::{CoordinatePolicy, PipelineConfig, Threshold};
pub use error::HotspotError;
