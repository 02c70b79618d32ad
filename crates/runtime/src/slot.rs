//! Single-slot mailbox for the outstanding engine decision.
//!
//! The slot itself holds no lock; it lives inside the per-context mutex so
//! every operation is serialized with the waiters that watch it.
use decision_core::{ContextId, Decision, DecisionId, PendingAction};

/// At most one pending decision, handed out exactly once.
#[derive(Debug, Default)]
pub struct PendingSlot {
    current: Option<PendingAction>,
    last_id: DecisionId,
}

/// Returned by [`PendingSlot::set`] when the slot is already occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOccupied {
    pub occupant: DecisionId,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new decision and assigns it the next id.
    pub fn set(
        &mut self,
        context: ContextId,
        decision: Decision,
        prompt: impl Into<String>,
    ) -> Result<DecisionId, SlotOccupied> {
        if let Some(occupant) = &self.current {
            return Err(SlotOccupied {
                occupant: occupant.id,
            });
        }
        self.last_id = self.last_id.next();
        self.current = Some(PendingAction {
            id: self.last_id,
            context,
            decision,
            prompt: prompt.into(),
        });
        Ok(self.last_id)
    }

    pub fn peek(&self) -> Option<&PendingAction> {
        self.current.as_ref()
    }

    /// Empties the slot. The only way a decision leaves it.
    pub fn take(&mut self) -> Option<PendingAction> {
        self.current.take()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
