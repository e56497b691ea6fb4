//! Read-side views over a run's artifacts.
//!
//! Computes the figures the dashboards show: per-location ticket counts and
//! day/hour histograms, the sorted location list, and the map midpoint.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::ArtifactCache;
use crate::error::{HotspotError, Result};
use crate::hotspots::types::{LocationSummary, MappableLocationSummary};
use crate::output::{FILTERED_TICKETS_FILE, LOCATION_SUMMARY_FILE, MAPPABLE_SUMMARY_FILE};

/// The columns of the filtered-ticket artifact that reports read. Other
/// columns in the file are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TicketRow {
    pub location: String,
    pub amount: f64,
    pub lat: f64,
    pub lon: f64,
    pub dayofweek: String,
    pub hourofday: String,
}

/// Breakdown of tickets issued at one hotspot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationReport {
    pub location: String,
    pub ticket_count: usize,
    pub total_fines: f64,
    pub by_day: Vec<(String, usize)>,
    pub by_hour: Vec<(String, usize)>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl LocationReport {
    /// Builds the report for `location`.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::UnknownLocation`] if `location` is not in `summaries`.
    pub fn build(
        location: &str,
        summaries: &[LocationSummary],
        tickets: &[TicketRow],
    ) -> Result<Self> {
        let summary = summaries
            .iter()
            .find(|s| s.location == location)
            .ok_or_else(|| HotspotError::UnknownLocation(location.to_string()))?;

        let at_location: Vec<&TicketRow> =
            tickets.iter().filter(|t| t.location == location).collect();

        let first = at_location.first();

        Ok(LocationReport {
            location: location.to_string(),
            ticket_count: at_location.len(),
            total_fines: summary.amount,
            by_day: histogram(at_location.iter().map(|t| t.dayofweek.as_str())),
            by_hour: histogram(at_location.iter().map(|t| t.hourofday.as_str())),
            lat: first.map(|t| t.lat),
            lon: first.map(|t| t.lon),
        })
    }
}

/// Counts occurrences of each label, sorted ascending.
///
/// Numeric labels sort numerically and ahead of any text labels, so hours
/// come out as 0, 1, ..., 23 rather than 0, 1, 10, 11.
pub fn histogram<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| compare_labels(&a.0, &b.0));
    sorted
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Mean latitude and longitude over rows that have coordinates.
pub fn map_midpoint(mappable: &[MappableLocationSummary]) -> Option<(f64, f64)> {
    let points: Vec<(f64, f64)> = mappable
        .iter()
        .filter_map(|m| Some((m.lat?, m.lon?)))
        .collect();

    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.0).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.1).sum::<f64>() / n;
    Some((lat, lon))
}

/// Hotspot names in ascending order.
pub fn sorted_locations(summaries: &[LocationSummary]) -> Vec<&str> {
    let mut names: Vec<&str> = summaries.iter().map(|s| s.location.as_str()).collect();
    names.sort_unstable();
    names
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn load_location_summaries(path: &Path) -> Result<Vec<LocationSummary>> {
    read_rows(path)
}

pub fn load_mappable(path: &Path) -> Result<Vec<MappableLocationSummary>> {
    read_rows(path)
}

pub fn load_tickets(path: &Path) -> Result<Vec<TicketRow>> {
    read_rows(path)
}

/// Loads a run's artifacts from an output directory through [`ArtifactCache`]s.
pub struct ArtifactReader {
    dir: PathBuf,
    summaries: ArtifactCache<Vec<LocationSummary>>,
    mappable: ArtifactCache<Vec<MappableLocationSummary>>,
    tickets: ArtifactCache<Vec<TicketRow>>,
}

impl ArtifactReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            summaries: ArtifactCache::new(),
            mappable: ArtifactCache::new(),
            tickets: ArtifactCache::new(),
        }
    }

    pub fn summaries(&mut self) -> Result<Arc<Vec<LocationSummary>>> {
        let path = self.dir.join(LOCATION_SUMMARY_FILE);
        self.summaries.get_or_load(&path, load_location_summaries)
    }

    pub fn mappable(&mut self) -> Result<Arc<Vec<MappableLocationSummary>>> {
        let path = self.dir.join(MAPPABLE_SUMMARY_FILE);
        self.mappable.get_or_load(&path, load_mappable)
    }

    pub fn tickets(&mut self) -> Result<Arc<Vec<TicketRow>>> {
        let path = self.dir.join(FILTERED_TICKETS_FILE);
        self.tickets.get_or_load(&path, load_tickets)
    }

    pub fn location_report(&mut self, location: &str) -> Result<LocationReport> {
        let summaries = self.summaries()?;
        let tickets = self.tickets()?;
        LocationReport::build(location, &summaries, &tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(location: &str, day: &str, hour: &str, lat: f64) -> TicketRow {
        TicketRow {
            location: location.to_string(),
            amount: 20.0,
            lat,
            lon: -76.0,
            dayofweek: day.to_string(),
            hourofday: hour.to_string(),
        }
    }

    fn summary(location: &str, amount: f64) -> LocationSummary {
        LocationSummary {
            location: location.to_string(),
            amount,
        }
    }

    #[test]
    fn test_location_report_counts() {
        let summaries = vec![summary("A", 1100.0), summary("B", 1050.0)];
        let tickets = vec![
            ticket("A", "Monday", "9", 43.1),
            ticket("B", "Monday", "9", 43.2),
            ticket("A", "Friday", "17", 43.9),
            ticket("A", "Monday", "10", 43.9),
        ];

        let report = LocationReport::build("A", &summaries, &tickets).unwrap();

        assert_eq!(report.ticket_count, 3);
        assert_eq!(report.total_fines, 1100.0);
        assert_eq!(
            report.by_day,
            vec![("Friday".to_string(), 1), ("Monday".to_string(), 2)]
        );
        assert_eq!(
            report.by_hour,
            vec![
                ("9".to_string(), 1),
                ("10".to_string(), 1),
                ("17".to_string(), 1)
            ]
        );
        assert_eq!(report.lat, Some(43.1));
    }

    #[test]
    fn test_location_report_unknown_location() {
        let err = LocationReport::build("Z", &[summary("A", 1.0)], &[]).unwrap_err();
        assert!(matches!(err, HotspotError::UnknownLocation(ref l) if l == "Z"));
    }

    #[test]
    fn test_histogram_numeric_before_text() {
        let counts = histogram(["x", "2", "10", "2"].into_iter());
        assert_eq!(
            counts,
            vec![
                ("2".to_string(), 2),
                ("10".to_string(), 1),
                ("x".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_map_midpoint_skips_missing_coordinates() {
        let rows = vec![
            MappableLocationSummary {
                location: "A".to_string(),
                lat: Some(40.0),
                lon: Some(-70.0),
                amount: 1.0,
            },
            MappableLocationSummary {
                location: "B".to_string(),
                lat: Some(42.0),
                lon: Some(-72.0),
                amount: 1.0,
            },
            MappableLocationSummary {
                location: "C".to_string(),
                lat: None,
                lon: None,
                amount: 1.0,
            },
        ];

        assert_eq!(map_midpoint(&rows), Some((41.0, -71.0)));
        assert_eq!(map_midpoint(&rows[2..]), None);
        assert_eq!(map_midpoint(&[]), None);
    }

    #[test]
    fn test_sorted_locations() {
        let summaries = vec![summary("B", 3.0), summary("A", 2.0), summary("C", 1.0)];
        assert_eq!(sorted_locations(&summaries), vec!["A", "B", "C"]);
    }
}
