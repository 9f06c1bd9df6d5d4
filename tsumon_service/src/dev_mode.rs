//! Development mode utilities for working with recorded feed data
//!
//! When the live USGS feed is unavailable, or quiet (a M7 near a trench
//! is rare), use this module to replay a saved GeoJSON snapshot as if it
//! were the live feed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::usgs_quakes::{parse_feed, QuakeFeature};
use crate::model::FeedError;

/// Configuration for development mode data replay
pub struct DevMode {
    /// Saved `FeatureCollection` to serve on every poll
    pub replay_path: PathBuf,
    /// Poll interval in seconds (default: 10, faster than the live feed)
    pub update_interval_secs: u64,
}

impl DevMode {
    /// Create a new dev mode configuration
    ///
    /// # Arguments
    /// * `replay_path` - GeoJSON file saved from a USGS summary feed
    pub fn new<P: AsRef<Path>>(replay_path: P) -> Self {
        Self {
            replay_path: replay_path.as_ref().to_path_buf(),
            update_interval_secs: 10,
        }
    }

    /// Read the snapshot as if it had just been fetched
    ///
    /// The file is re-read on every call so it can be edited while the
    /// daemon runs.
    pub fn fetch_simulated_feed(&self) -> Result<Vec<QuakeFeature>, FeedError> {
        let body = fs::read_to_string(&self.replay_path)
            .map_err(|e| FeedError::Io(format!("{}: {}", self.replay_path.display(), e)))?;
        parse_feed(&body)
    }
}
