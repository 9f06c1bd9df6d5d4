//! Data ingestion for the tsunami early indicator.
//!
//! Submodules:
//! - `usgs_quakes`: USGS earthquake GeoJSON summary feed.

pub mod usgs_quakes;
