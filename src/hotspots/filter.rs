use crate::hotspots::types::LocationSummary;
use crate::records::ViolationRecord;
use std::collections::HashSet;

/// Returns the records whose location appears in `summaries`, in input order.
///
/// Records are borrowed, never copied or altered, so the result is a strict
/// row-identity subset of `records`.
pub fn filter_by_locations<'a>(
    records: &'a [ViolationRecord],
    summaries: &[LocationSummary],
) -> Vec<&'a ViolationRecord> {
    let hotspots: HashSet<&str> = summaries.iter().map(|s| s.location.as_str()).collect();

    records
        .iter()
        .filter(|record| hotspots.contains(record.location.as_str()))
        .collect()
}
