//! Hotspot aggregation pipeline.
//!
//! Groups violation records by location, keeps locations whose total fines
//! meet the threshold, attaches a representative coordinate to each, and
//! selects the tickets issued at those locations.

pub mod aggregate;
pub mod enrich;
pub mod filter;
pub mod pipeline;
pub mod types;
pub mod writetos3;
