//! Binding the tsunami visibility control.
//!
//! The control belongs to a panel built by unrelated UI code, so it may not
//! exist when the monitor starts. The binding first asks whether any
//! accepted control already exists; if not it waits for the UI layer to
//! report controls as it creates them, binds to the first accepted one, and
//! ignores every later report.

use crate::display::buffer::DisplayBuffer;

/// Control identifiers the binding will attach to, in lookup order.
pub const TOGGLE_CONTROL_IDS: &[&str] = &["chkTsunami", "chkTsunamiRisk", "data-tsunami-toggle"];

/// Label applied to the control once bound.
pub const TOGGLE_LABEL: &str = "Tsunami Early Indicators";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingState {
    /// `attach` has not been called yet.
    Detached,
    /// No accepted control exists yet.
    Waiting,
    Bound { control_id: String },
}

/// Instructions for the UI layer when the binding attaches to a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSetup {
    pub control_id: String,
    pub label: &'static str,
    /// The layer starts hidden, so the control starts unchecked.
    pub checked: bool,
}

#[derive(Debug)]
pub struct ToggleBinding {
    state: BindingState,
}

impl Default for ToggleBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl ToggleBinding {
    pub fn new() -> Self {
        Self {
            state: BindingState::Detached,
        }
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound { .. })
    }

    /// Immediate lookup. `control_exists` answers whether the UI currently
    /// has a control with the given id. Binds to the first accepted id
    /// found, otherwise starts waiting for `control_created`.
    pub fn attach<F>(&mut self, control_exists: F) -> Option<ControlSetup>
    where
        F: Fn(&str) -> bool,
    {
        if self.is_bound() {
            return None;
        }
        match TOGGLE_CONTROL_IDS.iter().find(|id| control_exists(id)) {
            Some(id) => Some(self.bind(id)),
            None => {
                self.state = BindingState::Waiting;
                None
            }
        }
    }

    /// Registration call from the UI layer when it creates a control.
    /// Binds only while waiting and only to an accepted id.
    pub fn control_created(&mut self, control_id: &str) -> Option<ControlSetup> {
        if self.state != BindingState::Waiting || !TOGGLE_CONTROL_IDS.contains(&control_id) {
            return None;
        }
        Some(self.bind(control_id))
    }

    /// Forwards a user change of the bound control to the display layer.
    /// Returns `false` (and does nothing) while unbound.
    pub fn on_change(&self, checked: bool, display: &mut DisplayBuffer) -> bool {
        if !self.is_bound() {
            return false;
        }
        display.set_visible(checked);
        true
    }

    fn bind(&mut self, control_id: &str) -> ControlSetup {
        self.state = BindingState::Bound {
            control_id: control_id.to_string(),
        };
        ControlSetup {
            control_id: control_id.to_string(),
            label: TOGGLE_LABEL,
            checked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_binds_immediately_when_control_exists() {
        let mut binding = ToggleBinding::new();
        let setup = binding
            .attach(|id| id == "chkTsunamiRisk")
            .expect("existing control should bind");
        assert_eq!(setup.control_id, "chkTsunamiRisk");
        assert_eq!(setup.label, TOGGLE_LABEL);
        assert!(!setup.checked);
        assert!(binding.is_bound());
    }

    #[test]
    fn test_attach_prefers_first_accepted_id() {
        let mut binding = ToggleBinding::new();
        let setup = binding.attach(|_| true).expect("should bind");
        assert_eq!(setup.control_id, "chkTsunami");
    }

    #[test]
    fn test_attach_waits_when_control_is_missing() {
        let mut binding = ToggleBinding::new();
        assert!(binding.attach(|_| false).is_none());
        assert_eq!(binding.state(), &BindingState::Waiting);
    }

    #[test]
    fn test_late_control_binds_exactly_once() {
        let mut binding = ToggleBinding::new();
        binding.attach(|_| false);

        assert!(binding.control_created("chkVolcano").is_none(), "unrelated control must be ignored");
        assert!(binding.control_created("chkTsunami").is_some());
        assert!(binding.control_created("chkTsunamiRisk").is_none(), "second bind must be ignored");
        assert_eq!(
            binding.state(),
            &BindingState::Bound { control_id: "chkTsunami".to_string() }
        );
    }

    #[test]
    fn test_control_created_before_attach_is_ignored() {
        let mut binding = ToggleBinding::new();
        assert!(binding.control_created("chkTsunami").is_none());
        assert_eq!(binding.state(), &BindingState::Detached);
    }

    #[test]
    fn test_on_change_forwards_only_once_bound() {
        let mut display = DisplayBuffer::new();
        let mut binding = ToggleBinding::new();
        binding.attach(|_| false);

        assert!(!binding.on_change(true, &mut display));
        assert!(!display.is_visible());

        binding.control_created("data-tsunami-toggle");
        assert!(binding.on_change(true, &mut display));
        assert!(display.is_visible());
        assert!(binding.on_change(false, &mut display));
        assert!(!display.is_visible());
    }
}
