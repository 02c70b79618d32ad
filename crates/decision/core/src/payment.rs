use std::collections::BTreeSet;

use crate::ids::ObjectId;

/// Objects whose automatic payment already failed during the current turn.
///
/// Keeps the default resolver from retrying the same cast forever. The set
/// forgets everything as soon as a snapshot with a different turn is observed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FailedPaymentSet {
    turn: Option<u32>,
    objects: BTreeSet<ObjectId>,
}

impl FailedPaymentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the turn of the latest snapshot; clears the set on change.
    ///
    /// Returns `true` when entries were dropped.
    pub fn observe_turn(&mut self, turn: u32) -> bool {
        let changed = self.turn.is_some_and(|t| t != turn);
        self.turn = Some(turn);
        if changed && !self.objects.is_empty() {
            self.objects.clear();
            return true;
        }
        false
    }

    pub fn record(&mut self, object: ObjectId) -> bool {
        self.objects.insert(object)
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.objects.contains(&object)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
