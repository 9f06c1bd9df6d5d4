//! Tsunami candidate classification.
//!
//! An earthquake is a candidate only if it passes three inclusive gates,
//! checked in order: magnitude, depth, then trench proximity. Proximity is
//! the only expensive check, so it runs last.

use crate::geometry::{distance_to_polyline_km, UNREACHABLE_DISTANCE_KM};
use crate::model::{RawQuakeEvent, TsunamiThresholds};
use crate::trenches::{Trench, TRENCH_REGISTRY};

/// The classification gate that rejected an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Magnitude,
    Depth,
    Proximity,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::Magnitude => write!(f, "magnitude"),
            Gate::Depth => write!(f, "depth"),
            Gate::Proximity => write!(f, "proximity"),
        }
    }
}

/// Outcome of classifying one event. Computed and consumed in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult<'a> {
    pub event: &'a RawQuakeEvent,
    pub is_candidate: bool,
    pub nearest_trench: Option<&'static Trench>,
    pub distance_km: f64,
    /// First gate that failed, `None` for candidates.
    pub rejected_by: Option<Gate>,
}

#[derive(Debug, Clone)]
pub struct QuakeClassifier {
    thresholds: TsunamiThresholds,
    trenches: &'static [Trench],
}

impl QuakeClassifier {
    /// Classifier over the built-in trench registry.
    pub fn new(thresholds: TsunamiThresholds) -> Self {
        Self::with_trenches(thresholds, TRENCH_REGISTRY)
    }

    pub fn with_trenches(thresholds: TsunamiThresholds, trenches: &'static [Trench]) -> Self {
        Self { thresholds, trenches }
    }

    pub fn thresholds(&self) -> &TsunamiThresholds {
        &self.thresholds
    }

    /// True iff some trench lies within `threshold_km` (inclusive).
    /// Stops at the first match.
    pub fn is_near_any_trench(&self, lat: f64, lon: f64, threshold_km: f64) -> bool {
        self.trenches
            .iter()
            .any(|t| distance_to_polyline_km(lat, lon, t.vertices) <= threshold_km)
    }

    /// Closest trench and its distance in km, or `None` with an empty registry.
    pub fn nearest_trench(&self, lat: f64, lon: f64) -> Option<(&'static Trench, f64)> {
        let trenches: &'static [Trench] = self.trenches;
        trenches
            .iter()
            .map(|t| (t, distance_to_polyline_km(lat, lon, t.vertices)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Returns the first gate `event` fails, or `None` if it is a candidate.
    pub fn first_failed_gate(&self, event: &RawQuakeEvent) -> Option<Gate> {
        // Written as negated comparisons so NaN fails every gate.
        if !(event.magnitude >= self.thresholds.magnitude) {
            return Some(Gate::Magnitude);
        }
        if !(event.effective_depth_km() <= self.thresholds.depth_km) {
            return Some(Gate::Depth);
        }
        if !self.is_near_any_trench(event.latitude, event.longitude, self.thresholds.distance_km) {
            return Some(Gate::Proximity);
        }
        None
    }

    /// Candidate decision: all three gates must pass.
    pub fn evaluate(&self, event: &RawQuakeEvent) -> bool {
        self.first_failed_gate(event).is_none()
    }

    /// Full classification, including the nearest trench for reporting.
    pub fn classify<'a>(&self, event: &'a RawQuakeEvent) -> ClassificationResult<'a> {
        let rejected_by = self.first_failed_gate(event);
        let (nearest_trench, distance_km) = match self.nearest_trench(event.latitude, event.longitude) {
            Some((trench, d)) => (Some(trench), d),
            None => (None, UNREACHABLE_DISTANCE_KM),
        };
        ClassificationResult {
            event,
            is_candidate: rejected_by.is_none(),
            nearest_trench,
            distance_km,
            rejected_by,
        }
    }
}

impl Default for QuakeClassifier {
    fn default() -> Self {
        Self::new(TsunamiThresholds::default())
    }
}
