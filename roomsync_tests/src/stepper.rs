use core::time::Duration;
use roomsync::core::time::Instant;
use roomsync::prelude::*;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_ROOM: &str = "lobby";
pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(100);
pub const FRAME_DURATION: Duration = Duration::from_millis(5);

/// Stepper with:
/// - n [`NetworkClient`]s, each with its own [`LocalTransport`]
/// - all connected to the same [`LocalRelay`] and members of the same room
///
/// The stepper keeps its own clock: a base [`Instant`] plus the simulated time elapsed
/// since then. Every frame advances it by `frame_duration` and then updates the clients in
/// order, passing the simulated time explicitly.
pub struct RoomStepper {
    pub relay: LocalRelay,
    pub settings: ClientSettings,
    pub transports: Vec<Arc<LocalTransport>>,
    pub clients: Vec<NetworkClient>,
    pub frame_duration: Duration,
    pub base: Instant,
    pub elapsed: Duration,
}

impl RoomStepper {
    pub fn single() -> Self {
        Self::with_clients(1)
    }

    pub fn with_clients(n: usize) -> Self {
        let mut stepper = Self::new(LocalRelay::new(), default_settings(), FRAME_DURATION);
        for _ in 0..n {
            stepper.new_client();
        }
        stepper
    }
}

/// Settings used by the stepper: 100ms broadcast interval, interpolation on
pub fn default_settings() -> ClientSettings {
    let mut settings = ClientSettings::new(DEFAULT_ROOM);
    settings.sync.broadcast_interval_ms = BROADCAST_INTERVAL.as_millis() as u64;
    settings
}

impl RoomStepper {
    pub fn new(relay: LocalRelay, settings: ClientSettings, frame_duration: Duration) -> Self {
        Self {
            relay,
            settings,
            transports: vec![],
            clients: vec![],
            frame_duration,
            base: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Connect a new client to the relay and join the room. Returns its index
    pub fn new_client(&mut self) -> usize {
        let index = self.clients.len();
        let mut transport = self
            .relay
            .connect(format!("client-{index}"))
            .expect("peer ids are unique");
        if let Some(conditioner) = &self.settings.conditioner {
            transport = transport.with_conditioner(conditioner.build());
        }
        transport
            .join_room(self.settings.room.clone())
            .expect("a new peer is connected");
        let transport = Arc::new(transport);
        let client = NetworkClient::init(transport.clone(), self.settings.clone());
        self.transports.push(transport);
        self.clients.push(client);
        index
    }

    pub fn client(&self, i: usize) -> &NetworkClient {
        &self.clients[i]
    }

    pub fn client_mut(&mut self, i: usize) -> &mut NetworkClient {
        &mut self.clients[i]
    }

    pub fn transport(&self, i: usize) -> &LocalTransport {
        &self.transports[i]
    }

    /// Bind an owned entity on client `i` at the current simulated time
    pub fn bind_owner(
        &mut self,
        i: usize,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
    ) -> BindingHandle {
        let now = self.now();
        self.clients[i]
            .bind_owner_at(entity_id, initial_state, now)
            .expect("entity is not bound yet")
    }

    /// Bind an observed entity on client `i` at the current simulated time
    pub fn bind_observer(
        &mut self,
        i: usize,
        entity_id: impl Into<EntityId>,
        initial_state: EntityState,
    ) -> BindingHandle {
        let now = self.now();
        self.clients[i]
            .bind_observer_at(entity_id, initial_state, now)
            .expect("entity is not bound yet")
    }

    pub fn rebind(
        &mut self,
        i: usize,
        handle: BindingHandle,
        config: BindingConfig,
    ) -> Result<BindingHandle, SyncError> {
        let now = self.now();
        self.clients[i].rebind_at(handle, config, now)
    }

    /// Remove a client from the stepper, disposing its context
    pub fn remove_client(&mut self, i: usize) {
        self.clients.remove(i).dispose();
        self.transports.remove(i);
    }

    /// Connect a passive peer that records every entity update sent to the room
    pub fn spy(&self) -> Spy {
        let transport = self.relay.connect("spy").expect("only one spy per stepper");
        transport
            .join_room(self.settings.room.clone())
            .expect("a new peer is connected");
        let subscription = transport.subscribe(EventKind::EntityUpdate);
        Spy {
            transport,
            subscription,
        }
    }

    pub fn now(&self) -> Instant {
        self.base + self.elapsed
    }

    pub fn advance_time(&mut self, duration: Duration) {
        self.elapsed += duration;
    }

    /// Update every client once, without advancing time
    pub fn update(&mut self) {
        let now = self.now();
        self.clients
            .iter_mut()
            .for_each(|client| client.update_at(now));
    }

    /// Advance the clock by one frame duration and update every client, n times
    pub fn frame_step(&mut self, n: usize) {
        for _ in 0..n {
            self.advance_time(self.frame_duration);
            info!(now = ?self.now(), "Frame step");
            self.update();
        }
    }

    /// Step as many frames as needed for `duration` to elapse
    pub fn step_for(&mut self, duration: Duration) {
        let frames = duration.as_nanos() / self.frame_duration.as_nanos();
        self.frame_step(frames as usize);
    }
}

/// Passive room member, used to observe the traffic of the room
pub struct Spy {
    transport: LocalTransport,
    subscription: Subscription,
}

impl Spy {
    /// Every update received up to `now`
    pub fn updates(&mut self, now: Instant) -> Vec<EntityUpdate> {
        self.subscription
            .receive(now)
            .iter()
            .filter_map(|payload| Envelope::from_bytes(payload).ok())
            .filter_map(|envelope| match envelope.event {
                NetworkEvent::EntityUpdate(update) => Some(update),
                _ => None,
            })
            .collect()
    }
}
