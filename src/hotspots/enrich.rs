use crate::config::CoordinatePolicy;
use crate::error::{HotspotError, Result};
use crate::hotspots::types::{LocationSummary, MappableLocationSummary};
use crate::records::ViolationRecord;
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;
use tracing::warn;

/// Left-joins each summary with the coordinates of the first record seen for
/// its location.
///
/// The output has exactly one row per input summary, in the same order. A
/// location with no records gets `None` coordinates rather than being dropped.
/// Coordinates are never averaged; see [`CoordinatePolicy`] for how later
/// disagreeing records are handled.
pub fn enrich(
    summaries: &[LocationSummary],
    records: &[ViolationRecord],
    policy: CoordinatePolicy,
) -> Result<Vec<MappableLocationSummary>> {
    let coords = first_coordinates(records, policy)?;

    Ok(summaries
        .iter()
        .map(|summary| {
            let (lat, lon) = match coords.get(summary.location.as_str()) {
                Some(&(lat, lon)) => (Some(lat), Some(lon)),
                None => (None, None),
            };
            MappableLocationSummary {
                location: summary.location.clone(),
                lat,
                lon,
                amount: summary.amount,
            }
        })
        .collect())
}

fn first_coordinates(
    records: &[ViolationRecord],
    policy: CoordinatePolicy,
) -> Result<HashMap<&str, (f64, f64)>> {
    let mut coords: HashMap<&str, (f64, f64)> = HashMap::new();
    let mut conflicting: HashSet<&str> = HashSet::new();

    for record in records {
        match coords.entry(record.location.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert((record.lat, record.lon));
            }
            Entry::Occupied(slot) => {
                let (first_lat, first_lon) = *slot.get();
                if first_lat == record.lat && first_lon == record.lon {
                    continue;
                }
                if policy == CoordinatePolicy::Strict {
                    return Err(HotspotError::ConflictingCoordinates {
                        location: record.location.clone(),
                        first_lat,
                        first_lon,
                        lat: record.lat,
                        lon: record.lon,
                    });
                }
                conflicting.insert(record.location.as_str());
            }
        }
    }

    if !conflicting.is_empty() {
        warn!(
            locations = conflicting.len(),
            "Locations with conflicting coordinates; keeping first occurrence"
        );
    }

    Ok(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::record;

    fn summary(location: &str, amount: f64) -> LocationSummary {
        LocationSummary {
            location: location.to_string(),
            amount,
        }
    }

    #[test]
    fn test_enrich_uses_first_occurrence() {
        let records = vec![
            record("B", 10.0, 1.0, 1.0),
            record("A", 600.0, 43.05, -76.15),
            record("A", 500.0, 43.99, -76.99),
        ];
        let summaries = vec![summary("A", 1100.0)];

        let mappable = enrich(&summaries, &records, CoordinatePolicy::FirstOccurrence).unwrap();

        assert_eq!(
            mappable,
            vec![MappableLocationSummary {
                location: "A".to_string(),
                lat: Some(43.05),
                lon: Some(-76.15),
                amount: 1100.0,
            }]
        );
    }

    #[test]
    fn test_enrich_preserves_rows_and_order() {
        let records = vec![
            record("A", 1.0, 1.0, 1.0),
            record("B", 1.0, 2.0, 2.0),
            record("C", 1.0, 3.0, 3.0),
        ];
        let summaries = vec![summary("C", 30.0), summary("A", 20.0), summary("B", 10.0)];

        let mappable = enrich(&summaries, &records, CoordinatePolicy::default()).unwrap();

        assert_eq!(mappable.len(), summaries.len());
        let order: Vec<_> = mappable.iter().map(|m| m.location.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(mappable[0].lat, Some(3.0));
    }

    #[test]
    fn test_enrich_missing_location_yields_null_coordinates() {
        let records = vec![record("A", 1.0, 1.0, 1.0)];
        let summaries = vec![summary("A", 5.0), summary("GHOST", 4.0)];

        let mappable = enrich(&summaries, &records, CoordinatePolicy::default()).unwrap();

        assert_eq!(mappable.len(), 2);
        assert_eq!(mappable[1].location, "GHOST");
        assert_eq!(mappable[1].lat, None);
        assert_eq!(mappable[1].lon, None);
        assert_eq!(mappable[1].amount, 4.0);
    }

    #[test]
    fn test_enrich_empty() {
        let mappable = enrich(&[], &[], CoordinatePolicy::Strict).unwrap();
        assert!(mappable.is_empty());
    }

    #[test]
    fn test_strict_policy_rejects_conflicts() {
        let records = vec![record("A", 1.0, 1.0, 1.0), record("A", 1.0, 1.5, 1.0)];
        let summaries = vec![summary("A", 2.0)];

        let err = enrich(&summaries, &records, CoordinatePolicy::Strict).unwrap_err();
        match err {
            HotspotError::ConflictingCoordinates {
                location,
                first_lat,
                lat,
                ..
            } => {
                assert_eq!(location, "A");
                assert_eq!(first_lat, 1.0);
                assert_eq!(lat, 1.5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_policy_accepts_consistent_coordinates() {
        let records = vec![record("A", 1.0, 1.0, 2.0), record("A", 1.0, 1.0, 2.0)];
        let summaries = vec![summary("A", 2.0)];

        let mappable = enrich(&summaries, &records, CoordinatePolicy::Strict).unwrap();
        assert_eq!(mappable[0].lon, Some(2.0));
    }
}
