//! Run configuration: the hotspot threshold and the coordinate policy.

use std::fmt;
use std::str::FromStr;

use crate::error::HotspotError;

/// Minimum cumulative fine for a location to count as a hotspot.
///
/// Always finite and non-negative. Construct via [`Threshold::new`] or parse
/// from a string; invalid values are rejected rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(1000.0);

    pub fn new(value: f64) -> Result<Self, HotspotError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Threshold(value))
        } else {
            Err(HotspotError::InvalidThreshold(value.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Threshold {
    type Err = HotspotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| HotspotError::InvalidThreshold(s.to_string()))?;
        Threshold::new(value)
    }
}

/// What the enricher does when records for one location carry different coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinatePolicy {
    /// Keep the first pair seen in input order and log how many locations disagreed.
    #[default]
    FirstOccurrence,
    /// Fail the run on the first disagreement.
    Strict,
}

/// Settings consumed by [`crate::hotspots::pipeline::HotspotRun::compute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub threshold: Threshold,
    pub coordinates: CoordinatePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_is_one_thousand() {
        assert_eq!(Threshold::default().value(), 1000.0);
    }

    #[test]
    fn test_parse_valid_thresholds() {
        assert_eq!("0".parse::<Threshold>().unwrap().value(), 0.0);
        assert_eq!(" 250.5 ".parse::<Threshold>().unwrap().value(), 250.5);
    }

    #[test]
    fn test_rejects_negative_threshold() {
        assert!(matches!(
            "-1".parse::<Threshold>(),
            Err(HotspotError::InvalidThreshold(_))
        ));
        assert!(Threshold::new(-0.01).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_and_non_finite() {
        assert!("lots".parse::<Threshold>().is_err());
        assert!("NaN".parse::<Threshold>().is_err());
        assert!("inf".parse::<Threshold>().is_err());
        assert!(Threshold::new(f64::NAN).is_err());
    }
}
