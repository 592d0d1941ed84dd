use core::time::Duration;
use roomsync_core::id::EntityId;
use roomsync_core::interpolate::{LerpFn, interpolate};
use roomsync_core::state::EntityState;

/// Default period between two broadcasts of the same entity
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_millis(50);

/// The interpolation window is the broadcast interval multiplied by this factor
pub const INTERPOLATION_WINDOW_FACTOR: f32 = 1.5;

/// Which side of the synchronization this participant is on, for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Authoritative for the entity: the only one broadcasting its state
    Owner,
    /// Receives and renders the state broadcast by the owner
    Observer,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum time between two broadcasts of the entity (owner side)
    pub broadcast_interval: Duration,
    /// If false, observers apply received states immediately instead of interpolating
    pub interpolation: bool,
    /// Multiplier applied to the broadcast interval to get the interpolation window
    pub window_factor: f32,
    /// Function used to interpolate between two states
    pub lerp: LerpFn,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
            interpolation: true,
            window_factor: INTERPOLATION_WINDOW_FACTOR,
            lerp: interpolate,
        }
    }
}

impl SyncConfig {
    /// Time over which an observer eases towards a newly received target.
    ///
    /// A negative or non-finite factor gives an empty window (targets are applied on the
    /// next render).
    pub fn interpolation_window(&self) -> Duration {
        let window = self.broadcast_interval.as_secs_f64() * self.window_factor as f64;
        Duration::try_from_secs_f64(window).unwrap_or(Duration::ZERO)
    }
}

/// Everything needed to create a binding
#[derive(Debug, Clone)]
pub struct BindingConfig {
    pub entity_id: EntityId,
    pub initial_state: EntityState,
    pub role: Role,
    pub sync: SyncConfig,
}

impl BindingConfig {
    pub fn new(entity_id: impl Into<EntityId>, initial_state: EntityState, role: Role) -> Self {
        Self {
            entity_id: entity_id.into(),
            initial_state,
            role,
            sync: SyncConfig::default(),
        }
    }

    pub fn owner(entity_id: impl Into<EntityId>, initial_state: EntityState) -> Self {
        Self::new(entity_id, initial_state, Role::Owner)
    }

    pub fn observer(entity_id: impl Into<EntityId>, initial_state: EntityState) -> Self {
        Self::new(entity_id, initial_state, Role::Observer)
    }

    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_broadcast_interval(mut self, interval: Duration) -> Self {
        self.sync.broadcast_interval = interval;
        self
    }

    pub fn with_interpolation(mut self, enabled: bool) -> Self {
        self.sync.interpolation = enabled;
        self
    }

    pub fn with_window_factor(mut self, factor: f32) -> Self {
        self.sync.window_factor = factor;
        self
    }

    /// Use a custom interpolation function instead of [`interpolate`]
    pub fn with_lerp(mut self, lerp: LerpFn) -> Self {
        self.sync.lerp = lerp;
        self
    }
}
