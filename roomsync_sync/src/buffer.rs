use roomsync_core::state::EntityState;

/// Holds the latest local state of an owned entity until the next broadcast tick.
///
/// There is at most one pending state: staging a new one replaces the previous one
/// instead of queueing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastBuffer {
    pending: Option<EntityState>,
}

impl BroadcastBuffer {
    /// Stage a state for the next broadcast. Returns true if an unsent state was replaced
    pub fn stage(&mut self, state: EntityState) -> bool {
        self.pending.replace(state).is_some()
    }

    /// Remove the pending state, if any
    pub fn take(&mut self) -> Option<EntityState> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<&EntityState> {
        self.pending.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}
