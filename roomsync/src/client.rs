/*!
Application-level networking context.

A [`NetworkClient`] is created once at application start with the transport handle and the
[`ClientSettings`], and disposed at shutdown. It owns the [`SyncEngine`] holding every
synchronized entity of the application.
*/
use crate::settings::ClientSettings;
use roomsync_core::id::EntityId;
use roomsync_core::state::EntityState;
use roomsync_core::time::Instant;
use roomsync_sync::binding::SyncBinding;
use roomsync_sync::config::{BindingConfig, Role};
use roomsync_sync::engine::{BindingHandle, SyncEngine};
use roomsync_sync::error::Result;
use roomsync_transport::transport::Transport;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct NetworkClient {
    settings: ClientSettings,
    engine: SyncEngine,
}

impl NetworkClient {
    pub fn init(transport: Arc<dyn Transport>, settings: ClientSettings) -> Self {
        let peer = transport.peer_id();
        match transport.current_room() {
            Some(room) if room == settings.room => {}
            Some(room) => {
                warn!(
                    %peer,
                    %room,
                    expected = %settings.room,
                    "transport is in an unexpected room"
                )
            }
            None => {}
        }
        info!(%peer, room = %settings.room, "network client initialized");
        Self {
            settings,
            engine: SyncEngine::new(transport),
        }
    }

    /// Tear down every binding and release the transport handle
    pub fn dispose(mut self) {
        self.engine.clear();
        info!(peer = %self.engine.transport().peer_id(), "network client disposed");
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        self.engine.transport()
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SyncEngine {
        &mut self.engine
    }

    /// Binding configuration using the client's sync settings
    pub fn binding_config(
        &self,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
        role: Role,
    ) -> BindingConfig {
        BindingConfig::new(entity_id, initial_state, role)
            .with_sync_config(self.settings.sync.build())
    }

    pub fn bind(&mut self, config: BindingConfig) -> Result<BindingHandle> {
        self.bind_at(config, Instant::now())
    }

    /// Bind an entity as if the current time was `now`
    pub fn bind_at(&mut self, config: BindingConfig, now: Instant) -> Result<BindingHandle> {
        self.engine.bind(config, now)
    }

    /// Start broadcasting the state of a locally owned entity
    pub fn bind_owner(
        &mut self,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
    ) -> Result<BindingHandle> {
        self.bind_owner_at(entity_id, initial_state, Instant::now())
    }

    /// See [`NetworkClient::bind_owner`]. The first broadcast happens one interval after `now`
    pub fn bind_owner_at(
        &mut self,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
        now: Instant,
    ) -> Result<BindingHandle> {
        let config = self.binding_config(entity_id, initial_state, Role::Owner);
        self.bind_at(config, now)
    }

    /// Start following the state of an entity owned by another participant
    pub fn bind_observer(
        &mut self,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
    ) -> Result<BindingHandle> {
        self.bind_observer_at(entity_id, initial_state, Instant::now())
    }

    pub fn bind_observer_at(
        &mut self,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
        now: Instant,
    ) -> Result<BindingHandle> {
        let config = self.binding_config(entity_id, initial_state, Role::Observer);
        self.bind_at(config, now)
    }

    pub fn unbind(&mut self, handle: BindingHandle) -> Result<()> {
        self.engine.unbind(handle)
    }

    pub fn rebind(
        &mut self,
        handle: BindingHandle,
        config: BindingConfig,
    ) -> Result<BindingHandle> {
        self.rebind_at(handle, config, Instant::now())
    }

    pub fn rebind_at(
        &mut self,
        handle: BindingHandle,
        config: BindingConfig,
        now: Instant,
    ) -> Result<BindingHandle> {
        self.engine.rebind(handle, config, now)
    }

    pub fn entity(&self, handle: BindingHandle) -> Result<&SyncBinding> {
        self.engine.entity(handle)
    }

    pub fn entity_mut(&mut self, handle: BindingHandle) -> Result<&mut SyncBinding> {
        self.engine.entity_mut(handle)
    }

    pub fn state(&self, handle: BindingHandle) -> Result<&EntityState> {
        self.engine.state(handle)
    }

    pub fn set_network_state(&mut self, handle: BindingHandle, state: EntityState) -> Result<()> {
        self.engine.set_network_state(handle, state)
    }

    /// Run one frame at the current time
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub fn update_at(&mut self, now: Instant) {
        self.engine.update(now);
    }
}
