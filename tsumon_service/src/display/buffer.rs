//! Pending / active ownership of alert markers.
//!
//! Markers created while the layer is hidden wait in a FIFO queue and move
//! to the active layer, in submission order, the next time the layer is
//! shown. Moves are one-way: hiding the layer takes the whole layer off the
//! map but leaves every active marker active.
//!
//! Invariant: every marker ever submitted is in exactly one of `pending`
//! or `active` until `reset`.

use std::collections::VecDeque;

use crate::model::{AlertMarker, DisplayState, RenderedMarker};

#[derive(Debug, Default)]
pub struct DisplayBuffer {
    pending: VecDeque<AlertMarker>,
    active: Vec<AlertMarker>,
    visible: bool,
}

impl DisplayBuffer {
    /// An empty, hidden layer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Takes ownership of a new marker: straight onto the layer if it is
    /// visible, otherwise onto the back of the pending queue.
    pub fn submit(&mut self, mut marker: AlertMarker) {
        if self.visible {
            marker.display_state = DisplayState::Active;
            self.active.push(marker);
        } else {
            marker.display_state = DisplayState::Pending;
            self.pending.push_back(marker);
        }
    }

    /// Shows or hides the layer. Returns the number of pending markers
    /// promoted by this call.
    ///
    /// Only a hidden → visible transition drains the queue. Repeating the
    /// current state does nothing.
    pub fn set_visible(&mut self, visible: bool) -> usize {
        if visible == self.visible {
            return 0;
        }
        let mut promoted = 0;
        if visible {
            while let Some(mut marker) = self.pending.pop_front() {
                marker.display_state = DisplayState::Active;
                self.active.push(marker);
                promoted += 1;
            }
        }
        self.visible = visible;
        promoted
    }

    pub fn pending(&self) -> impl Iterator<Item = &AlertMarker> {
        self.pending.iter()
    }

    pub fn active(&self) -> &[AlertMarker] {
        &self.active
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Total markers owned, pending and active.
    pub fn len(&self) -> usize {
        self.pending.len() + self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: &str) -> Option<&AlertMarker> {
        self.active
            .iter()
            .chain(self.pending.iter())
            .find(|m| m.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut AlertMarker> {
        self.active
            .iter_mut()
            .chain(self.pending.iter_mut())
            .find(|m| m.id == id)
    }

    /// What the map should draw right now: the active markers while the
    /// layer is visible, nothing while it is hidden.
    pub fn rendered(&self) -> Vec<RenderedMarker> {
        if !self.visible {
            return Vec::new();
        }
        self.active.iter().map(AlertMarker::render).collect()
    }

    /// Clears the layer and the queue. Visibility is unchanged.
    /// Returns the ids of every marker removed.
    pub fn reset(&mut self) -> Vec<String> {
        self.active
            .drain(..)
            .chain(self.pending.drain(..))
            .map(|m| m.id)
            .collect()
    }
}
