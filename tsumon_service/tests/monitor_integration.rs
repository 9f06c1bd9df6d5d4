//! Integration tests for the tsunami indicator pipeline
//!
//! Tests verify:
//! 1. Feed JSON → decode → classify → marker, end to end
//! 2. Repeated polls of the same feed never duplicate markers
//! 3. Markers buffered while hidden appear in order when shown
//! 4. Marker timers run on wall-clock time regardless of visibility
//! 5. The toggle control can appear after the monitor starts
//! 6. One undecodable record never hides the rest of its feed
//!
//! No network access required.
//!
//! Run with: cargo test --test monitor_integration

use chrono::{DateTime, Duration, TimeZone, Utc};

use tsumon_service::alert::classifier::Gate;
use tsumon_service::ingest::usgs_quakes::parse_feed;
use tsumon_service::model::DisplayState;
use tsumon_service::{Evaluation, TsunamiMonitor};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 2, 14, 37, 0).unwrap()
}

fn feature_json(id: &str, mag: f64, lon: f64, lat: f64, depth: &str) -> String {
    format!(
        r#"{{"type":"Feature","id":"{}","properties":{{"mag":{},"time":1701527837000,"place":"test"}},
            "geometry":{{"type":"Point","coordinates":[{},{},{}]}}}}"#,
        id, mag, lon, lat, depth
    )
}

fn feed(features: &[String]) -> String {
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
}

fn active_ids(monitor: &TsunamiMonitor) -> Vec<String> {
    monitor.display().active().iter().map(|m| m.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_philippine_trench_scenario() {
    let body = feed(&[
        feature_json("eq1", 7.5, 125.5, 9.5, "10.0"),
        feature_json("eq2", 5.0, 125.5, 9.5, "10.0"),
    ]);
    let features = parse_feed(&body).expect("feed should parse");
    let mut monitor = TsunamiMonitor::default();

    assert_eq!(
        monitor.evaluate_quake_for_tsunami_at(&features[0], t0()),
        Evaluation::Alerted("eq1".to_string())
    );
    assert_eq!(
        monitor.evaluate_quake_for_tsunami_at(&features[1], t0()),
        Evaluation::Rejected(Gate::Magnitude)
    );
    assert_eq!(monitor.display().len(), 1);
    assert!(monitor.display().find("eq2").is_none());
}

#[test]
fn test_unknown_depth_scenario() {
    let body = feed(&[feature_json("deep?", 8.0, 125.5, 9.5, "null")]);
    let features = parse_feed(&body).unwrap();
    let mut monitor = TsunamiMonitor::default();
    assert_eq!(
        monitor.evaluate_quake_for_tsunami_at(&features[0], t0()),
        Evaluation::Rejected(Gate::Depth)
    );
    assert!(monitor.display().is_empty());
}

#[test]
fn test_repeated_polls_create_one_marker_per_event() {
    let body = feed(&[
        feature_json("eq1", 7.5, 125.5, 9.5, "10.0"),
        feature_json("sulu1", 7.1, 117.6, 7.5, "33.0"),
        feature_json("inland", 7.2, 120.98, 14.6, "12.0"),
    ]);
    let features = parse_feed(&body).unwrap();
    let mut monitor = TsunamiMonitor::default();

    let first = monitor.evaluate_batch_at(&features, t0());
    assert_eq!(first.alerted, vec!["eq1".to_string(), "sulu1".to_string()]);
    assert_eq!(first.rejected, 1);

    for cycle in 1..=5 {
        let later = monitor.evaluate_batch_at(&features, t0() + Duration::minutes(2 * cycle));
        assert!(later.alerted.is_empty(), "poll {} re-alerted {:?}", cycle, later.alerted);
        assert_eq!(later.already_seen, 3);
    }
    assert_eq!(monitor.display().len(), 2);
    assert_eq!(monitor.ledger().len(), 3);
}

#[test]
fn test_bad_record_does_not_hide_candidate_in_same_feed() {
    let bad = r#"{"type":"Feature","id":"bad","properties":{"mag":"7.1"},
        "geometry":{"type":"Point","coordinates":[125.5,9.5,10.0]}}"#;
    let body = feed(&[bad.to_string(), feature_json("eq1", 7.5, 125.5, 9.5, "10.0")]);
    let features = parse_feed(&body).expect("a wrongly typed record must not fail the feed");
    let mut monitor = TsunamiMonitor::default();

    let summary = monitor.evaluate_batch_at(&features, t0());
    assert_eq!(summary.alerted, vec!["eq1".to_string()]);
    assert_eq!(summary.malformed, 1);
    assert!(monitor.ledger().has_seen("bad"), "undecodable record should be recorded as seen");
    assert!(monitor.display().find("bad").is_none());

    let again = monitor.evaluate_batch_at(&features, t0() + Duration::minutes(2));
    assert_eq!(again.already_seen, 2);
}

#[test]
fn test_null_entry_does_not_hide_candidate_in_same_feed() {
    let body = feed(&["null".to_string(), feature_json("eq1", 7.5, 125.5, 9.5, "10.0")]);
    let features = parse_feed(&body).expect("a null entry must not fail the feed");
    let mut monitor = TsunamiMonitor::default();

    let summary = monitor.evaluate_batch_at(&features, t0());
    assert_eq!(summary.received, 1);
    assert_eq!(summary.alerted, vec!["eq1".to_string()]);
}

// ---------------------------------------------------------------------------
// Display lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_buffered_markers_drain_in_arrival_order() {
    let ids = ["a", "b", "c", "d"];
    let body = feed(
        &ids.iter()
            .map(|id| feature_json(id, 7.4, 126.0, 10.0, "20.0"))
            .collect::<Vec<_>>(),
    );
    let features = parse_feed(&body).unwrap();
    let mut monitor = TsunamiMonitor::default();
    monitor.evaluate_batch_at(&features, t0());

    assert_eq!(monitor.display().active_len(), 0);
    assert_eq!(monitor.display().pending_len(), 4);

    assert_eq!(monitor.set_visible(true), 4);
    assert_eq!(active_ids(&monitor), ids.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    assert_eq!(monitor.display().pending_len(), 0);
}

#[test]
fn test_hide_and_show_preserves_active_markers() {
    let body = feed(&[
        feature_json("a", 7.4, 126.0, 10.0, "20.0"),
        feature_json("b", 7.4, 126.0, 10.0, "20.0"),
    ]);
    let features = parse_feed(&body).unwrap();
    let mut monitor = TsunamiMonitor::default();
    monitor.set_visible(true);
    monitor.evaluate_batch_at(&features, t0());

    monitor.set_visible(false);
    assert!(monitor.display().rendered().is_empty());
    monitor.set_visible(true);
    monitor.set_visible(true);

    assert_eq!(active_ids(&monitor), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(monitor.display().rendered().len(), 2);
}

#[test]
fn test_timers_fire_for_pending_markers_before_they_are_shown() {
    let body = feed(&[feature_json("eq1", 7.5, 125.5, 9.5, "10.0")]);
    let features = parse_feed(&body).unwrap();
    let mut monitor = TsunamiMonitor::default();
    monitor.evaluate_batch_at(&features, t0());

    // Both timers elapse while the layer is hidden.
    monitor.run_due_tasks(t0() + Duration::seconds(45));
    monitor.set_visible(true);

    let marker = monitor.display().find("eq1").expect("marker should exist");
    assert_eq!(marker.display_state, DisplayState::Active);
    assert!(marker.is_informative(), "popup should already be bound");
    assert!(!marker.pulsing, "pulse should already have stopped");

    let rendered = monitor.display().rendered();
    let popup = rendered[0].popup.as_ref().expect("rendered popup");
    assert_eq!(popup.location, "9.500, 125.500");
}

#[test]
fn test_late_toggle_control_binds_and_drains() {
    let body = feed(&[feature_json("eq1", 7.5, 125.5, 9.5, "10.0")]);
    let features = parse_feed(&body).unwrap();
    let mut monitor = TsunamiMonitor::default();

    assert!(monitor.attach_toggle(|_| false).is_none());
    monitor.evaluate_batch_at(&features, t0());

    // UI builds an unrelated panel first, then the hazards drawer.
    assert!(monitor.control_created("chkVolcano").is_none());
    let setup = monitor.control_created("chkTsunamiRisk").expect("should bind");
    assert_eq!(setup.label, "Tsunami Early Indicators");
    assert!(monitor.control_created("chkTsunami").is_none());

    assert!(monitor.toggle_changed(true));
    assert_eq!(active_ids(&monitor), vec!["eq1".to_string()]);

    let snapshot = serde_json::to_value(monitor.display().rendered()).expect("snapshot serializes");
    assert_eq!(snapshot[0]["id"], "eq1");
    assert_eq!(snapshot[0]["icon"]["class_name"], "tsunami-divicon");
}
