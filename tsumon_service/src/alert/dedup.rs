//! At-most-once processing of feed events.
//!
//! The feed repeats the same events on every poll, so every id the monitor
//! has looked at is remembered for the lifetime of the process. The set is
//! never pruned; feed volume is low enough that this stays small.

use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    seen: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Records `id`. Returns `true` if it was not already present.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_has_seen_nothing() {
        let ledger = DedupLedger::new();
        assert!(ledger.is_empty());
        assert!(!ledger.has_seen("us7000abcd"));
    }

    #[test]
    fn test_mark_seen_is_permanent_and_idempotent() {
        let mut ledger = DedupLedger::new();
        assert!(ledger.mark_seen("us7000abcd"), "first mark should report a new id");
        assert!(!ledger.mark_seen("us7000abcd"), "second mark should report a repeat");
        assert!(ledger.has_seen("us7000abcd"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_ids_are_compared_exactly() {
        let mut ledger = DedupLedger::new();
        ledger.mark_seen("abcd");
        assert!(!ledger.has_seen("ABCD"));
        assert!(!ledger.has_seen("abcd "));
    }
}
