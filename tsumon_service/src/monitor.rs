//! The tsunami early indicator context.
//!
//! `TsunamiMonitor` owns every piece of mutable state (dedup ledger,
//! display buffer, marker timers, toggle binding) and exposes the single
//! ingestion entrypoint, `evaluate_quake_for_tsunami`. It is driven from one
//! thread: the poll loop feeds it records and ticks its timers, and the UI
//! layer calls the visibility methods between ticks.
//!
//! Nothing here returns an error. A bad record is logged and reported as
//! an `Evaluation`, and processing moves on to the next one.

use chrono::{DateTime, Utc};

use crate::alert::classifier::{Gate, QuakeClassifier};
use crate::alert::dedup::DedupLedger;
use crate::alert::markers::AlertMarkerFactory;
use crate::alert::timeline::{MarkerTask, TimerQueue};
use crate::config::Config;
use crate::display::{ControlSetup, DisplayBuffer, ToggleBinding};
use crate::ingest::usgs_quakes::QuakeFeature;
use crate::logging::{self, DataSource};
use crate::model::RawQuakeEvent;

/// What happened to one feed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// No id could be extracted; dropped without being recorded.
    Unidentifiable,
    /// Already evaluated in an earlier call.
    AlreadySeen,
    /// Had an id but no usable coordinates, or could not be decoded at all;
    /// recorded as seen and dropped.
    Malformed,
    Rejected(Gate),
    /// A marker was created for this id.
    Alerted(String),
}

/// Outcome counts for one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub received: usize,
    pub already_seen: usize,
    pub malformed: usize,
    pub rejected: usize,
    pub alerted: Vec<String>,
}

impl BatchSummary {
    /// Records evaluated for the first time in this cycle.
    pub fn new_events(&self) -> usize {
        self.received - self.already_seen
    }

    fn record(&mut self, outcome: Evaluation) {
        self.received += 1;
        match outcome {
            Evaluation::AlreadySeen => self.already_seen += 1,
            Evaluation::Unidentifiable | Evaluation::Malformed => self.malformed += 1,
            Evaluation::Rejected(_) => self.rejected += 1,
            Evaluation::Alerted(id) => self.alerted.push(id),
        }
    }
}

#[derive(Debug, Default)]
pub struct TsunamiMonitor {
    classifier: QuakeClassifier,
    factory: AlertMarkerFactory,
    ledger: DedupLedger,
    display: DisplayBuffer,
    timers: TimerQueue,
    toggle: ToggleBinding,
}

impl TsunamiMonitor {
    pub fn new(classifier: QuakeClassifier, factory: AlertMarkerFactory) -> Self {
        Self {
            classifier,
            factory,
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            QuakeClassifier::new(config.thresholds()),
            AlertMarkerFactory::new(config.marker_timeline()),
        )
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    /// Evaluates one feed record against the current wall clock.
    pub fn evaluate_quake_for_tsunami(&mut self, feature: &QuakeFeature) -> Evaluation {
        self.evaluate_quake_for_tsunami_at(feature, Utc::now())
    }

    /// Evaluates one feed record. Safe to call with the same record on
    /// every poll; only the first call for an id does any work.
    pub fn evaluate_quake_for_tsunami_at(
        &mut self,
        feature: &QuakeFeature,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let Some(id) = feature.event_id() else {
            logging::debug(DataSource::Feed, None, "dropping feature with no identifier");
            return Evaluation::Unidentifiable;
        };
        if self.ledger.has_seen(&id) {
            return Evaluation::AlreadySeen;
        }

        match feature.to_event() {
            Ok(event) => self.evaluate_event_at(event, now),
            Err(problem) => {
                self.ledger.mark_seen(&id);
                logging::warn(DataSource::Feed, Some(id.as_str()), &problem.to_string());
                Evaluation::Malformed
            }
        }
    }

    /// Evaluates an already-flattened event. Same dedup rules as
    /// `evaluate_quake_for_tsunami_at`.
    pub fn evaluate_event_at(&mut self, event: RawQuakeEvent, now: DateTime<Utc>) -> Evaluation {
        if !self.ledger.mark_seen(&event.id) {
            return Evaluation::AlreadySeen;
        }

        let result = self.classifier.classify(&event);
        if let Some(gate) = result.rejected_by {
            logging::debug(
                DataSource::Classifier,
                Some(event.id.as_str()),
                &format!("M{:.1} rejected by {} gate", event.magnitude, gate),
            );
            return Evaluation::Rejected(gate);
        }

        logging::warn(
            DataSource::Classifier,
            Some(event.id.as_str()),
            &format!(
                "Potential tsunami indicator: M{:.1}, depth {} km, {:.3}, {:.3} ({:.0} km from {}){}",
                event.magnitude,
                event.depth_km.map(|d| format!("{:.1}", d)).unwrap_or_else(|| "?".to_string()),
                event.latitude,
                event.longitude,
                result.distance_km,
                result.nearest_trench.map(|t| t.name).unwrap_or("trench"),
                event.place.as_deref().map(|p| format!(" - {}", p)).unwrap_or_default(),
            ),
        );

        let marker = self.factory.create(&event, now, &mut self.timers);
        self.display.submit(marker);
        Evaluation::Alerted(event.id)
    }

    /// Evaluates one poll cycle's records in arrival order.
    pub fn evaluate_batch_at(&mut self, features: &[QuakeFeature], now: DateTime<Utc>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for feature in features {
            let outcome = self.evaluate_quake_for_tsunami_at(feature, now);
            summary.record(outcome);
        }
        summary
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Fires every marker task due at `now`. Returns how many fired.
    /// A task whose marker is no longer held does nothing.
    pub fn run_due_tasks(&mut self, now: DateTime<Utc>) -> usize {
        let due = self.timers.drain_due(now);
        let fired = due.len();
        for task in due {
            let Some(marker) = self.display.find_mut(&task.marker_id) else {
                logging::debug(DataSource::Display, Some(task.marker_id.as_str()), "timer fired for removed marker");
                continue;
            };
            match task.task {
                MarkerTask::EnablePopup => marker.enable_popup(),
                MarkerTask::StopPulse => marker.stop_pulse(),
            }
        }
        fired
    }

    // -----------------------------------------------------------------------
    // Display and UI binding
    // -----------------------------------------------------------------------

    /// Shows or hides the layer directly. Returns the number of pending
    /// markers promoted.
    pub fn set_visible(&mut self, visible: bool) -> usize {
        let promoted = self.display.set_visible(visible);
        if promoted > 0 {
            logging::info(
                DataSource::Display,
                None,
                &format!("showing {} buffered tsunami indicator(s)", promoted),
            );
        }
        promoted
    }

    /// Immediate control lookup; see `ToggleBinding::attach`.
    pub fn attach_toggle<F>(&mut self, control_exists: F) -> Option<ControlSetup>
    where
        F: Fn(&str) -> bool,
    {
        let setup = self.toggle.attach(control_exists);
        if setup.is_none() {
            logging::debug(DataSource::Display, None, "tsunami toggle not present yet, waiting");
        }
        setup
    }

    /// Registration call from the UI layer when it builds a control.
    pub fn control_created(&mut self, control_id: &str) -> Option<ControlSetup> {
        let setup = self.toggle.control_created(control_id);
        if let Some(ref s) = setup {
            logging::debug(DataSource::Display, None, &format!("bound tsunami toggle '{}'", s.control_id));
        }
        setup
    }

    /// User changed the bound control. Ignored until a control is bound.
    pub fn toggle_changed(&mut self, checked: bool) -> bool {
        self.toggle.on_change(checked, &mut self.display)
    }

    /// Clears every marker and cancels its outstanding timers. The dedup
    /// ledger is kept, so cleared events are not re-alerted.
    pub fn reset_layer(&mut self) -> usize {
        let removed = self.display.reset();
        for id in &removed {
            self.timers.cancel_marker(id);
        }
        removed.len()
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn toggle(&self) -> &ToggleBinding {
        &self.toggle
    }

    pub fn classifier(&self) -> &QuakeClassifier {
        &self.classifier
    }
}
