//! One-shot marker timers.
//!
//! Every alert marker schedules two deferred tasks when it is created: bind
//! the detail popup, and later stop the pulse animation. Tasks are keyed by
//! marker id rather than holding the marker, so a task that fires after its
//! marker is gone simply finds nothing to act on.
//!
//! # Clock injection
//! Nothing here reads the wall clock. The owner passes `now` into
//! `drain_due`, which keeps firing order deterministic in tests.

use chrono::{DateTime, Duration, Utc};

/// Default delay before a new marker's popup becomes available.
pub const POPUP_DELAY_MS: i64 = 5_000;

/// Default time a new marker keeps pulsing.
pub const PULSE_DURATION_MS: i64 = 40_000;

/// Longest configurable popup delay or pulse duration (one day).
pub const MAX_MARKER_DELAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTask {
    EnablePopup,
    StopPulse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub due: DateTime<Utc>,
    pub marker_id: String,
    pub task: MarkerTask,
    seq: u64,
}

/// Delays applied to every new marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerTimeline {
    pub popup_delay: Duration,
    pub pulse_duration: Duration,
}

impl Default for MarkerTimeline {
    fn default() -> Self {
        Self {
            popup_delay: Duration::milliseconds(POPUP_DELAY_MS),
            pulse_duration: Duration::milliseconds(PULSE_DURATION_MS),
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    tasks: Vec<ScheduledTask>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, marker_id: &str, task: MarkerTask, due: DateTime<Utc>) {
        self.tasks.push(ScheduledTask {
            due,
            marker_id: marker_id.to_string(),
            task,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Removes and returns every task due at or before `now`, earliest
    /// first. Tasks due at the same instant come out in scheduling order.
    pub fn drain_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledTask> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.due <= now);
        self.tasks = pending;
        due.sort_by(|a, b| (a.due, a.seq).cmp(&(b.due, b.seq)));
        due
    }

    /// Drops all outstanding tasks for a marker. Returns how many were dropped.
    pub fn cancel_marker(&mut self, marker_id: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.marker_id != marker_id);
        before - self.tasks.len()
    }

    /// Earliest outstanding deadline, if any.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.tasks.iter().map(|t| t.due).min()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
