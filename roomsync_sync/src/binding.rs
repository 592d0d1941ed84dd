use crate::buffer::BroadcastBuffer;
use crate::config::{BindingConfig, Role, SyncConfig};
use crate::cursor::{InterpolationCursor, InterpolationPhase};
use roomsync_core::id::EntityId;
use roomsync_core::state::EntityState;
use roomsync_core::time::Instant;
use roomsync_core::timer::RepeatingTimer;
use roomsync_transport::event::{EntityUpdate, Envelope, EventKind, NetworkEvent};
use roomsync_transport::transport::{Subscription, Transport};
use tracing::{debug, trace, warn};

#[derive(Debug)]
enum RoleState {
    Owner {
        buffer: BroadcastBuffer,
        timer: RepeatingTimer,
    },
    Observer {
        subscription: Subscription,
        /// None if interpolation is disabled
        cursor: Option<InterpolationCursor>,
        phase: InterpolationPhase,
    },
}

/// Synchronization state of one entity on one participant.
///
/// The public surface is the pair [`SyncBinding::state`] / [`SyncBinding::set_network_state`];
/// the periodic work ([`receive`](SyncBinding::receive), [`render`](SyncBinding::render),
/// [`broadcast`](SyncBinding::broadcast)) is driven by the
/// [`SyncEngine`](crate::engine::SyncEngine).
#[derive(Debug)]
pub struct SyncBinding {
    entity_id: EntityId,
    config: SyncConfig,
    /// The locally visible state
    state: EntityState,
    role: RoleState,
}

impl SyncBinding {
    pub(crate) fn new(config: BindingConfig, transport: &dyn Transport, now: Instant) -> Self {
        let BindingConfig {
            entity_id,
            initial_state,
            role,
            sync,
        } = config;
        let role = match role {
            Role::Owner => RoleState::Owner {
                buffer: BroadcastBuffer::default(),
                timer: RepeatingTimer::new(sync.broadcast_interval, now),
            },
            Role::Observer => RoleState::Observer {
                subscription: transport.subscribe(EventKind::EntityUpdate),
                cursor: sync
                    .interpolation
                    .then(|| InterpolationCursor::new(initial_state.clone(), now)),
                phase: InterpolationPhase::AtTarget,
            },
        };
        Self {
            entity_id,
            config: sync,
            state: initial_state,
            role,
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn role(&self) -> Role {
        match self.role {
            RoleState::Owner { .. } => Role::Owner,
            RoleState::Observer { .. } => Role::Observer,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The locally visible state.
    ///
    /// For an owner, the last written state. For an observer, the interpolated state (or the
    /// last received state if interpolation is disabled).
    pub fn state(&self) -> &EntityState {
        &self.state
    }

    /// State waiting for the next broadcast tick (owner only)
    pub fn pending(&self) -> Option<&EntityState> {
        match &self.role {
            RoleState::Owner { buffer, .. } => buffer.peek(),
            RoleState::Observer { .. } => None,
        }
    }

    /// Interpolation cursor (observer with interpolation only)
    pub fn cursor(&self) -> Option<&InterpolationCursor> {
        match &self.role {
            RoleState::Observer { cursor, .. } => cursor.as_ref(),
            RoleState::Owner { .. } => None,
        }
    }

    /// Phase computed by the last render tick (observer only)
    pub fn phase(&self) -> Option<InterpolationPhase> {
        match &self.role {
            RoleState::Observer { phase, .. } => Some(*phase),
            RoleState::Owner { .. } => None,
        }
    }

    /// Replace the locally visible state.
    ///
    /// On the owner, the state is also staged for the next broadcast, replacing any state
    /// that was not sent yet. On an observer, this only changes the local display.
    pub fn set_network_state(&mut self, state: EntityState) {
        if let RoleState::Owner { buffer, .. } = &mut self.role {
            if buffer.stage(state.clone()) {
                trace!(entity = %self.entity_id, "replaced unsent pending state");
            }
        }
        self.state = state;
    }

    /// Compute the new state from the current one, then
    /// [`set_network_state`](Self::set_network_state)
    pub fn update_network_state(&mut self, f: impl FnOnce(&EntityState) -> EntityState) {
        let state = f(&self.state);
        self.set_network_state(state);
    }

    /// Drain the updates received by the transport. Returns the number of updates that
    /// matched this entity.
    pub fn receive(&mut self, now: Instant) -> usize {
        let RoleState::Observer { subscription, .. } = &mut self.role else {
            return 0;
        };
        let payloads = subscription.receive(now);
        let mut applied = 0;
        for payload in payloads {
            let update = match Envelope::from_bytes(&payload) {
                Ok(Envelope {
                    event: NetworkEvent::EntityUpdate(update),
                    ..
                }) => update,
                Ok(envelope) => {
                    trace!(
                        entity = %self.entity_id,
                        event = envelope.event.kind().name(),
                        "ignoring unrelated event"
                    );
                    Self::record_filtered();
                    continue;
                }
                Err(e) => {
                    trace!(entity = %self.entity_id, ?e, "ignoring malformed payload");
                    Self::record_filtered();
                    continue;
                }
            };
            if update.entity_id != self.entity_id {
                Self::record_filtered();
                continue;
            }
            self.apply_update(update, now);
            applied += 1;
        }
        applied
    }

    fn apply_update(&mut self, update: EntityUpdate, now: Instant) {
        #[cfg(feature = "metrics")]
        metrics::counter!("sync::receive::applied").increment(1);
        match &mut self.role {
            RoleState::Observer {
                cursor: Some(cursor),
                phase,
                ..
            } => {
                trace!(entity = %self.entity_id, "new interpolation target");
                cursor.retarget(self.state.clone(), update.state, now);
                *phase = InterpolationPhase::Interpolating;
            }
            RoleState::Observer { cursor: None, .. } => {
                trace!(entity = %self.entity_id, "applying received state");
                self.state = update.state;
            }
            RoleState::Owner { .. } => {}
        }
    }

    fn record_filtered() {
        #[cfg(feature = "metrics")]
        metrics::counter!("sync::receive::filtered").increment(1);
    }

    /// Advance the interpolation towards the last received target.
    ///
    /// Runs every frame, even after the target was reached, so that the next update starts
    /// from the currently rendered state.
    pub fn render(&mut self, now: Instant) {
        let window = self.config.interpolation_window();
        if let RoleState::Observer {
            cursor: Some(cursor),
            phase,
            ..
        } = &mut self.role
        {
            let (state, t) = cursor.sample(now, window, self.config.lerp);
            self.state = state;
            *phase = if t >= 1.0 {
                InterpolationPhase::AtTarget
            } else {
                InterpolationPhase::Interpolating
            };
        }
    }

    /// Broadcast tick: if the broadcast interval elapsed and a state is pending, send it
    /// to the room. Returns true if a message was emitted.
    ///
    /// When the transport is disconnected or not in a room, the pending state is kept for a
    /// later tick.
    pub fn broadcast(&mut self, now: Instant, transport: &dyn Transport) -> bool {
        let RoleState::Owner { buffer, timer } = &mut self.role else {
            return false;
        };
        if !timer.tick(now) || buffer.is_empty() {
            return false;
        }
        let room = match transport.current_room() {
            Some(room) if transport.is_connected() => room,
            _ => {
                trace!(entity = %self.entity_id, "transport unavailable, keeping pending state");
                #[cfg(feature = "metrics")]
                metrics::counter!("sync::broadcast::skipped").increment(1);
                return false;
            }
        };
        let Some(state) = buffer.take() else {
            return false;
        };
        let event = EntityUpdate {
            entity_id: self.entity_id.clone(),
            state,
        };
        match transport.emit_to_room(&room, event.into()) {
            Ok(()) => {
                trace!(entity = %self.entity_id, %room, "broadcast state");
                #[cfg(feature = "metrics")]
                metrics::counter!("sync::broadcast::sent").increment(1);
                true
            }
            Err(e) => {
                warn!(entity = %self.entity_id, %room, ?e, "failed to broadcast state");
                false
            }
        }
    }

    /// Release everything held by the binding
    pub(crate) fn teardown(self, transport: &dyn Transport) {
        match self.role {
            RoleState::Observer { subscription, .. } => transport.unsubscribe(subscription),
            RoleState::Owner { buffer, .. } => {
                if !buffer.is_empty() {
                    debug!(entity = %self.entity_id, "dropping unsent pending state");
                }
            }
        }
        debug!(entity = %self.entity_id, "binding torn down");
    }
}
