use crate::config::Threshold;
use crate::hotspots::types::LocationSummary;
use crate::records::ViolationRecord;
use std::collections::HashMap;

/// Groups records by location, sums their fines, and keeps the groups whose
/// total is at least `threshold`.
///
/// Rows come back sorted by amount descending. Equal amounts are ordered by
/// location ascending so the output is fully deterministic.
pub fn summarize(records: &[ViolationRecord], threshold: Threshold) -> Vec<LocationSummary> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for record in records {
        *totals.entry(record.location.as_str()).or_default() += record.amount;
    }

    let mut summaries: Vec<LocationSummary> = totals
        .into_iter()
        .filter(|(_, amount)| *amount >= threshold.value())
        .map(|(location, amount)| LocationSummary {
            location: location.to_string(),
            amount,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.location.cmp(&b.location))
    });

    summaries
}
