use crate::binding::SyncBinding;
use crate::config::BindingConfig;
use crate::error::{Result, SyncError};
use hashbrown::HashMap;
use roomsync_core::id::EntityId;
use roomsync_core::state::EntityState;
use roomsync_core::time::Instant;
use roomsync_transport::transport::Transport;
use std::sync::Arc;
use tracing::debug;

/// Handle to a binding created by [`SyncEngine::bind`].
///
/// Handles are never reused: once the binding is torn down, every operation using the
/// handle returns [`SyncError::UnknownBinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingHandle(u64);

/// Owns every [`SyncBinding`] of a participant along with the shared transport handle.
///
/// The engine does not run on its own: the host calls [`SyncEngine::update`] (or the
/// individual [`receive`](SyncEngine::receive), [`render`](SyncEngine::render) and
/// [`broadcast`](SyncEngine::broadcast) steps) once per frame.
pub struct SyncEngine {
    transport: Arc<dyn Transport>,
    bindings: HashMap<BindingHandle, SyncBinding>,
    entities: HashMap<EntityId, BindingHandle>,
    next_handle: u64,
}

impl core::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("peer", &self.transport.peer_id())
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl SyncEngine {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            bindings: HashMap::default(),
            entities: HashMap::default(),
            next_handle: 0,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Start synchronizing an entity.
    ///
    /// Observers subscribe to the transport right away; owners start their broadcast timer
    /// at `now`.
    pub fn bind(&mut self, config: BindingConfig, now: Instant) -> Result<BindingHandle> {
        if self.entities.contains_key(&config.entity_id) {
            return Err(SyncError::AlreadyBound(config.entity_id));
        }
        let handle = BindingHandle(self.next_handle);
        self.next_handle += 1;
        debug!(entity = %config.entity_id, role = ?config.role, ?handle, "binding created");
        let binding = SyncBinding::new(config, self.transport.as_ref(), now);
        self.entities.insert(binding.entity_id().clone(), handle);
        self.bindings.insert(handle, binding);
        Ok(handle)
    }

    /// Tear down a binding: its timer and subscription are released before this returns
    pub fn unbind(&mut self, handle: BindingHandle) -> Result<()> {
        let binding = self
            .bindings
            .remove(&handle)
            .ok_or(SyncError::UnknownBinding(handle))?;
        self.entities.remove(binding.entity_id());
        binding.teardown(self.transport.as_ref());
        Ok(())
    }

    /// Replace a binding by a new one (for example when the role or the entity id changes).
    ///
    /// The previous binding is torn down first; the returned handle identifies the new one.
    pub fn rebind(
        &mut self,
        handle: BindingHandle,
        config: BindingConfig,
        now: Instant,
    ) -> Result<BindingHandle> {
        if !self.bindings.contains_key(&handle) {
            return Err(SyncError::UnknownBinding(handle));
        }
        if let Some(other) = self.entities.get(&config.entity_id) {
            if *other != handle {
                return Err(SyncError::AlreadyBound(config.entity_id));
            }
        }
        self.unbind(handle)?;
        self.bind(config, now)
    }

    /// Tear down every binding
    pub fn clear(&mut self) {
        let transport = self.transport.clone();
        self.entities.clear();
        self.bindings
            .drain()
            .for_each(|(_, binding)| binding.teardown(transport.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Handle of the binding for this entity, if it is bound
    pub fn find(&self, entity_id: &EntityId) -> Option<BindingHandle> {
        self.entities.get(entity_id).copied()
    }

    pub fn entity(&self, handle: BindingHandle) -> Result<&SyncBinding> {
        self.bindings
            .get(&handle)
            .ok_or(SyncError::UnknownBinding(handle))
    }

    pub fn entity_mut(&mut self, handle: BindingHandle) -> Result<&mut SyncBinding> {
        self.bindings
            .get_mut(&handle)
            .ok_or(SyncError::UnknownBinding(handle))
    }

    /// Locally visible state of the entity
    pub fn state(&self, handle: BindingHandle) -> Result<&EntityState> {
        self.entity(handle).map(SyncBinding::state)
    }

    /// See [`SyncBinding::set_network_state`]
    pub fn set_network_state(&mut self, handle: BindingHandle, state: EntityState) -> Result<()> {
        self.entity_mut(handle)?.set_network_state(state);
        Ok(())
    }

    /// See [`SyncBinding::update_network_state`]
    pub fn update_network_state(
        &mut self,
        handle: BindingHandle,
        f: impl FnOnce(&EntityState) -> EntityState,
    ) -> Result<()> {
        self.entity_mut(handle)?.update_network_state(f);
        Ok(())
    }

    /// Apply the updates received since the last call. Returns the number of updates applied
    pub fn receive(&mut self, now: Instant) -> usize {
        self.bindings
            .values_mut()
            .map(|binding| binding.receive(now))
            .sum()
    }

    /// Render tick of every observed entity
    pub fn render(&mut self, now: Instant) {
        self.bindings
            .values_mut()
            .for_each(|binding| binding.render(now));
    }

    /// Broadcast tick of every owned entity. Returns the number of messages emitted
    pub fn broadcast(&mut self, now: Instant) -> usize {
        let transport = self.transport.as_ref();
        self.bindings
            .values_mut()
            .map(|binding| binding.broadcast(now, transport))
            .filter(|sent| *sent)
            .count()
    }

    /// Run one frame: receive, then render, then broadcast
    pub fn update(&mut self, now: Instant) {
        self.receive(now);
        self.render(now);
        self.broadcast(now);
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.clear();
    }
}
