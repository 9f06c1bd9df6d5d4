//! Core data types for the tsunami early indicator service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no I/O; the only logic here is small constructors and the
//! per-marker state transitions fired by the timer queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Detection thresholds
// ---------------------------------------------------------------------------

/// Minimum magnitude for a tsunami candidate (inclusive).
pub const MAG_THRESHOLD: f64 = 7.0;

/// Maximum hypocentre depth for a tsunami candidate, in km (inclusive).
pub const DEPTH_THRESHOLD_KM: f64 = 50.0;

/// Maximum distance from a trench axis for a tsunami candidate, in km (inclusive).
pub const DISTANCE_THRESHOLD_KM: f64 = 120.0;

/// Classification thresholds. All comparisons are inclusive.
///
/// Defaults match the module constants above; the `[thresholds]` table in
/// `tsumon.toml` may override any of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TsunamiThresholds {
    pub magnitude: f64,
    pub depth_km: f64,
    pub distance_km: f64,
}

impl Default for TsunamiThresholds {
    fn default() -> Self {
        Self {
            magnitude: MAG_THRESHOLD,
            depth_km: DEPTH_THRESHOLD_KM,
            distance_km: DISTANCE_THRESHOLD_KM,
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A single earthquake as delivered by the feed, flattened out of its
/// GeoJSON envelope by `ingest::usgs_quakes`.
///
/// `depth_km` is `None` when the feed did not report a depth. The
/// classifier treats an unknown depth as infinitely deep.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuakeEvent {
    pub id: String,
    pub magnitude: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: Option<f64>,
    pub time_ms: Option<i64>,
    pub place: Option<String>,
}

impl RawQuakeEvent {
    /// Depth used for gating: unknown depth never passes a depth threshold.
    pub fn effective_depth_km(&self) -> f64 {
        self.depth_km.unwrap_or(f64::INFINITY)
    }
}

// ---------------------------------------------------------------------------
// Alert marker types
// ---------------------------------------------------------------------------

/// Which half of the display buffer currently owns a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayState {
    Pending,
    Active,
}

/// Icon geometry handed to the map collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    pub class_name: &'static str,
    pub size: [u32; 2],
    pub anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

pub const TSUNAMI_ICON: MarkerIcon = MarkerIcon {
    class_name: "tsunami-divicon",
    size: [48, 48],
    anchor: [24, 24],
    popup_anchor: [0, -28],
};

/// Detail popup for an alert marker. Only bound once the marker's
/// popup delay has elapsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub title: String,
    pub magnitude: f64,
    pub depth_km: Option<f64>,
    pub location: String,
    pub advisory: String,
    pub links: Vec<(String, String)>,
}

/// A visual alert for one tsunami candidate.
///
/// Owned by `display::DisplayBuffer` from creation onward.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMarker {
    pub id: String,
    pub magnitude: f64,
    pub depth_km: Option<f64>,
    pub lat: f64,
    pub lon: f64,
    pub created_at: DateTime<Utc>,
    pub display_state: DisplayState,
    pub popup: Option<PopupContent>,
    pub pulsing: bool,
}

impl AlertMarker {
    /// Binds the detail popup. Firing twice leaves the same popup bound.
    pub fn enable_popup(&mut self) {
        if self.popup.is_none() {
            self.popup = Some(PopupContent {
                title: "Potential Tsunami Indicator".to_string(),
                magnitude: self.magnitude,
                depth_km: self.depth_km,
                location: format!("{:.3}, {:.3}", self.lat, self.lon),
                advisory: "This is an automated indicator derived from earthquake data. \
                           Verify with PHIVOLCS or PTWC."
                    .to_string(),
                links: vec![
                    ("PHIVOLCS".to_string(), "https://www.phivolcs.dost.gov.ph".to_string()),
                    ("PTWC".to_string(), "https://ptwc.weather.gov".to_string()),
                ],
            });
        }
    }

    /// Stops the pulsing ring animation. The marker stays visible.
    pub fn stop_pulse(&mut self) {
        self.pulsing = false;
    }

    pub fn is_informative(&self) -> bool {
        self.popup.is_some()
    }

    /// Projection handed to the map collaborator.
    pub fn render(&self) -> RenderedMarker {
        RenderedMarker {
            id: self.id.clone(),
            position: [self.lat, self.lon],
            icon: TSUNAMI_ICON,
            pulsing: self.pulsing,
            popup: self.popup.clone(),
        }
    }
}

/// Serializable snapshot of an active marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    pub id: String,
    pub position: [f64; 2],
    pub icon: MarkerIcon,
    pub pulsing: bool,
    pub popup: Option<PopupContent>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding the earthquake feed.
#[derive(Debug, PartialEq)]
pub enum FeedError {
    /// Non-2xx HTTP response from the feed endpoint.
    HttpError(u16),
    /// The request never produced a response (DNS, TLS, timeout).
    Network(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// A replay file could not be read.
    Io(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FeedError::Network(msg) => write!(f, "Network error: {}", msg),
            FeedError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FeedError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}
