//! Tsunami candidate detection and alert marker lifecycle.
//!
//! - `classifier`: magnitude / depth / trench-proximity gates.
//! - `dedup`: at-most-once processing across poll cycles.
//! - `markers`: builds alert markers for candidates.
//! - `timeline`: the per-marker popup and pulse-stop timers.

pub mod classifier;
pub mod dedup;
pub mod markers;
pub mod timeline;
