//! Alert marker construction.
//!
//! A marker starts out pulsing and without a popup, so a new detection
//! announces itself before it invites interaction. Both changes are
//! scheduled here on the timer queue and run independently of whether the
//! marker is pending or displayed.

use chrono::{DateTime, Duration, Utc};

use crate::alert::timeline::{MarkerTask, MarkerTimeline, TimerQueue};
use crate::model::{AlertMarker, DisplayState, RawQuakeEvent};

#[derive(Debug, Clone, Default)]
pub struct AlertMarkerFactory {
    timeline: MarkerTimeline,
}

impl AlertMarkerFactory {
    pub fn new(timeline: MarkerTimeline) -> Self {
        Self { timeline }
    }

    pub fn timeline(&self) -> &MarkerTimeline {
        &self.timeline
    }

    /// Builds the marker for a candidate event and schedules its popup and
    /// pulse-stop tasks relative to `now`.
    ///
    /// The marker starts `Pending`; the display buffer moves it to `Active`
    /// when it takes ownership of a visible layer.
    pub fn create(
        &self,
        event: &RawQuakeEvent,
        now: DateTime<Utc>,
        timers: &mut TimerQueue,
    ) -> AlertMarker {
        let defaults = MarkerTimeline::default();
        let popup_due = deadline(now, self.timeline.popup_delay, defaults.popup_delay);
        let stop_due = deadline(now, self.timeline.pulse_duration, defaults.pulse_duration);
        timers.schedule(&event.id, MarkerTask::EnablePopup, popup_due);
        timers.schedule(&event.id, MarkerTask::StopPulse, stop_due);

        AlertMarker {
            id: event.id.clone(),
            magnitude: event.magnitude,
            depth_km: event.depth_km,
            lat: event.latitude,
            lon: event.longitude,
            created_at: now,
            display_state: DisplayState::Pending,
            popup: None,
            pulsing: true,
        }
    }
}

/// `now + delay`, or `now + fallback` when that would leave the calendar range.
fn deadline(now: DateTime<Utc>, delay: Duration, fallback: Duration) -> DateTime<Utc> {
    now.checked_add_signed(delay)
        .or_else(|| now.checked_add_signed(fallback))
        .unwrap_or(now)
}
