//! USGS Earthquake Hazards Program feed client
//!
//! Retrieves and decodes the GeoJSON summary feeds published by the USGS
//! Earthquake Hazards Program and flattens each feature into a
//! `RawQuakeEvent` for classification.
//!
//! Feed documentation: https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::logging::{self, DataSource};
use crate::model::{FeedError, RawQuakeEvent};

/// Every earthquake in the past day, refreshed by USGS every minute.
pub const ALL_DAY_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";

// ============================================================================
// GeoJSON Structures
// ============================================================================

/// Only the envelope is typed; each entry in `features` is decoded on its
/// own by `parse_feed`.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Value>,
}

/// One feed record. Missing fields decode as `None`; a field of the wrong
/// type fails only this record (see `parse_feed`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct QuakeFeature {
    pub id: Option<String>,
    pub geometry: Option<QuakeGeometry>,
    pub properties: Option<QuakeProperties>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct QuakeGeometry {
    /// `[longitude, latitude, depth_km]`; depth may be null or absent.
    #[serde(default)]
    pub coordinates: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct QuakeProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    /// Origin time, milliseconds since the Unix epoch.
    pub time: Option<i64>,
    pub code: Option<String>,
    /// Not part of the USGS schema; some mirrors carry depth here.
    pub depth: Option<f64>,
}

/// Why a feature could not be turned into a `RawQuakeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureProblem {
    /// No `id`, `properties.code` or `properties.time`.
    MissingId,
    /// Has an id but no usable longitude/latitude.
    MissingGeometry { id: String },
}

impl std::fmt::Display for FeatureProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureProblem::MissingId => write!(f, "feature has no identifier"),
            FeatureProblem::MissingGeometry { id } => {
                write!(f, "feature {} has no usable coordinates", id)
            }
        }
    }
}

impl QuakeFeature {
    /// Deduplication key: feature id, else event code, else origin time.
    pub fn event_id(&self) -> Option<String> {
        if let Some(id) = self.id.as_deref().filter(|s| !s.is_empty()) {
            return Some(id.to_string());
        }
        let props = self.properties.as_ref()?;
        if let Some(code) = props.code.as_deref().filter(|s| !s.is_empty()) {
            return Some(code.to_string());
        }
        props.time.filter(|t| *t != 0).map(|t| t.to_string())
    }

    /// `(lon, lat)` if both are present.
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        let coords = &self.geometry.as_ref()?.coordinates;
        match (coords.first().copied().flatten(), coords.get(1).copied().flatten()) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        }
    }

    /// Flattens the feature. Missing magnitude reads as 0; missing depth
    /// stays unknown.
    pub fn to_event(&self) -> Result<RawQuakeEvent, FeatureProblem> {
        let id = self.event_id().ok_or(FeatureProblem::MissingId)?;
        let (longitude, latitude) = self
            .lon_lat()
            .ok_or_else(|| FeatureProblem::MissingGeometry { id: id.clone() })?;

        let props = self.properties.clone().unwrap_or_default();
        let depth_km = self
            .geometry
            .as_ref()
            .and_then(|g| g.coordinates.get(2).copied().flatten())
            .or(props.depth);

        Ok(RawQuakeEvent {
            id,
            magnitude: props.mag.unwrap_or(0.0),
            longitude,
            latitude,
            depth_km,
            time_ms: props.time,
            place: props.place,
        })
    }
}

// ============================================================================
// Region Filter
// ============================================================================

/// Inclusive lat/lon bounding box.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Region {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for Region {
    /// The wider Philippine area shown on the hazard map.
    fn default() -> Self {
        Self {
            min_lat: -15.0,
            max_lat: 35.0,
            min_lon: 90.0,
            max_lon: 150.0,
        }
    }
}

impl Region {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Features without coordinates are kept so the monitor can record them
/// as seen.
pub fn within_region(feature: &QuakeFeature, region: &Region) -> bool {
    match feature.lon_lat() {
        Some((lon, lat)) => region.contains(lat, lon),
        None => true,
    }
}

// ============================================================================
// Decoding and Fetching
// ============================================================================

/// Decodes a GeoJSON `FeatureCollection` body.
///
/// Only a broken envelope is an error. A record that does not decode is
/// logged and replaced by a bare feature carrying whatever identifier could
/// still be read, so the monitor records it as seen and reports it as
/// malformed. Records with no readable identifier are dropped.
pub fn parse_feed(json: &str) -> Result<Vec<QuakeFeature>, FeedError> {
    let collection: FeatureCollection =
        serde_json::from_str(json).map_err(|e| FeedError::ParseError(e.to_string()))?;

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, value) in collection.features.into_iter().enumerate() {
        match serde_json::from_value::<QuakeFeature>(value.clone()) {
            Ok(feature) => features.push(feature),
            Err(e) => {
                let bare = identifier_only(&value);
                let id = bare.event_id();
                logging::warn(
                    DataSource::Feed,
                    id.as_deref(),
                    &format!("feature #{} failed to decode: {}", index, e),
                );
                if id.is_some() {
                    features.push(bare);
                }
            }
        }
    }
    Ok(features)
}

/// Keeps only the fields `QuakeFeature::event_id` reads, where they have
/// the expected type.
fn identifier_only(value: &Value) -> QuakeFeature {
    let props = value.get("properties");
    let prop = |key: &str| props.and_then(|p| p.get(key));
    QuakeFeature {
        id: value.get("id").and_then(Value::as_str).map(str::to_string),
        geometry: None,
        properties: Some(QuakeProperties {
            code: prop("code").and_then(Value::as_str).map(str::to_string),
            time: prop("time").and_then(Value::as_i64),
            ..Default::default()
        }),
    }
}

/// Fetches and decodes one feed snapshot.
pub fn fetch_feed(
    client: &reqwest::blocking::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<QuakeFeature>, FeedError> {
    let response = client
        .get(url)
        .header("Accept", "application/geo+json")
        .timeout(timeout)
        .send()
        .map_err(|e| FeedError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(FeedError::HttpError(response.status().as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| FeedError::Network(e.to_string()))?;
    parse_feed(&body)
}

// ============================================================================
// Tests
// ============================================================================
