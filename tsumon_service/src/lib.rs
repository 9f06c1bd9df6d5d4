//! Tsunami early indicator for the Philippine hazard map.
//!
//! Watches the USGS earthquake feed for strong, shallow events near the
//! Philippine subduction trenches and maintains the alert markers shown on
//! the map's tsunami layer. This is a heuristic indicator, not a warning
//! system; official guidance comes from PHIVOLCS and PTWC.

pub mod alert;
pub mod config;
pub mod dev_mode;
pub mod display;
pub mod geometry;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod trenches;

pub use monitor::{BatchSummary, Evaluation, TsunamiMonitor};
