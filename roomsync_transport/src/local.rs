/*!
In-process room relay.

[`LocalRelay`] plays the role of the relay server: peers connect to it, join a room, and
every event emitted to a room is fanned out to the other members of that room through
crossbeam channels. Each connected peer is represented by a [`LocalTransport`].
*/
use crate::conditioner::LinkConditionerConfig;
use crate::error::{Result, TransportError};
use crate::event::{Envelope, EventKind, NetworkEvent};
use crate::transport::{Subscription, SubscriptionId, Transport};
use bytes::Bytes;
use crossbeam_channel::Sender;
use hashbrown::HashMap;
use parking_lot::Mutex;
use roomsync_core::id::{PeerId, RoomId};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug)]
struct SubscriptionSlot {
    id: SubscriptionId,
    kind: EventKind,
    sender: Sender<Bytes>,
}

#[derive(Debug, Default)]
struct PeerEntry {
    connected: bool,
    room: Option<RoomId>,
    subscriptions: Vec<SubscriptionSlot>,
}

#[derive(Debug, Default)]
struct RelayState {
    peers: HashMap<PeerId, PeerEntry>,
    next_subscription: u64,
    /// If true, events are also delivered back to the peer that emitted them
    echo: bool,
}

impl RelayState {
    /// Send the payload to every subscription of kind `kind` of the connected members of
    /// `room`. Returns the number of subscriptions that received it.
    fn deliver(
        &mut self,
        from: Option<&PeerId>,
        room: &RoomId,
        kind: EventKind,
        payload: &Bytes,
    ) -> usize {
        let echo = self.echo;
        let mut delivered = 0;
        for (peer_id, peer) in self.peers.iter_mut() {
            if !peer.connected || peer.room.as_ref() != Some(room) {
                continue;
            }
            if !echo && from == Some(peer_id) {
                continue;
            }
            // the receiving end of dropped subscriptions is gone: prune them
            peer.subscriptions.retain(|slot| {
                if slot.kind != kind {
                    return true;
                }
                match slot.sender.send(payload.clone()) {
                    Ok(()) => {
                        delivered += 1;
                        true
                    }
                    Err(_) => {
                        trace!(peer = %peer_id, id = ?slot.id, "pruning closed subscription");
                        false
                    }
                }
            });
        }
        delivered
    }
}

/// In-process relay shared by every [`LocalTransport`] connected to it
#[derive(Debug, Clone, Default)]
pub struct LocalRelay {
    state: Arc<Mutex<RelayState>>,
}

impl LocalRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also deliver events back to the peer that emitted them
    pub fn with_echo(self, echo: bool) -> Self {
        self.state.lock().echo = echo;
        self
    }

    /// Connect a new peer to the relay
    pub fn connect(&self, peer: impl Into<PeerId>) -> Result<LocalTransport> {
        let peer = peer.into();
        let mut state = self.state.lock();
        if state.peers.contains_key(&peer) {
            return Err(TransportError::DuplicatePeer(peer));
        }
        debug!(%peer, "peer connected to relay");
        state.peers.insert(
            peer.clone(),
            PeerEntry {
                connected: true,
                ..Default::default()
            },
        );
        Ok(LocalTransport {
            relay: self.clone(),
            peer,
            conditioner: None,
        })
    }

    /// Connected members of the room
    pub fn room_members(&self, room: &RoomId) -> Vec<PeerId> {
        let state = self.state.lock();
        let mut members: Vec<PeerId> = state
            .peers
            .iter()
            .filter(|(_, peer)| peer.connected && peer.room.as_ref() == Some(room))
            .map(|(id, _)| id.clone())
            .collect();
        members.sort();
        members
    }

    /// Push raw bytes to every member of the room subscribed to `kind`, bypassing the
    /// envelope encoding. Returns the number of subscriptions that received the payload.
    pub fn broadcast_raw(&self, room: &RoomId, kind: EventKind, payload: Bytes) -> usize {
        self.state.lock().deliver(None, room, kind, &payload)
    }
}

/// Connection of one peer to a [`LocalRelay`]
#[derive(Debug)]
pub struct LocalTransport {
    relay: LocalRelay,
    peer: PeerId,
    conditioner: Option<LinkConditionerConfig>,
}

impl LocalTransport {
    /// Apply simulated network conditions to every subscription created afterwards
    pub fn with_conditioner(mut self, config: LinkConditionerConfig) -> Self {
        self.conditioner = Some(config);
        self
    }

    /// Join a room, leaving the current one if any
    pub fn join_room(&self, room: impl Into<RoomId>) -> Result<()> {
        let room = room.into();
        let mut state = self.relay.state.lock();
        let peer = state
            .peers
            .get_mut(&self.peer)
            .filter(|peer| peer.connected)
            .ok_or(TransportError::NotConnected)?;
        debug!(peer = %self.peer, %room, "joined room");
        peer.room = Some(room);
        Ok(())
    }

    pub fn leave_room(&self) {
        if let Some(peer) = self.relay.state.lock().peers.get_mut(&self.peer) {
            if let Some(room) = peer.room.take() {
                debug!(peer = %self.peer, %room, "left room");
            }
        }
    }

    /// Disconnect from the relay. The peer also leaves its room; subscriptions are kept and
    /// start receiving again after [`LocalTransport::reconnect`] and a new room join.
    pub fn disconnect(&self) {
        if let Some(peer) = self.relay.state.lock().peers.get_mut(&self.peer) {
            debug!(peer = %self.peer, "disconnected");
            peer.connected = false;
            peer.room = None;
        }
    }

    pub fn reconnect(&self) {
        if let Some(peer) = self.relay.state.lock().peers.get_mut(&self.peer) {
            debug!(peer = %self.peer, "reconnected");
            peer.connected = true;
        }
    }
}

impl Transport for LocalTransport {
    fn peer_id(&self) -> PeerId {
        self.peer.clone()
    }

    fn is_connected(&self) -> bool {
        self.relay
            .state
            .lock()
            .peers
            .get(&self.peer)
            .is_some_and(|peer| peer.connected)
    }

    fn current_room(&self) -> Option<RoomId> {
        self.relay
            .state
            .lock()
            .peers
            .get(&self.peer)
            .filter(|peer| peer.connected)
            .and_then(|peer| peer.room.clone())
    }

    fn subscribe(&self, kind: EventKind) -> Subscription {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut state = self.relay.state.lock();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        if let Some(peer) = state.peers.get_mut(&self.peer) {
            peer.subscriptions.push(SubscriptionSlot { id, kind, sender });
        }
        trace!(peer = %self.peer, ?id, event = kind.name(), "subscribed");
        let subscription = Subscription::new(id, kind, receiver);
        match &self.conditioner {
            Some(config) => subscription.with_conditioner(config.clone()),
            None => subscription,
        }
    }

    fn unsubscribe(&self, subscription: Subscription) {
        let id = subscription.id();
        if let Some(peer) = self.relay.state.lock().peers.get_mut(&self.peer) {
            peer.subscriptions.retain(|slot| slot.id != id);
        }
        trace!(peer = %self.peer, ?id, "unsubscribed");
    }

    fn emit_to_room(&self, room: &RoomId, event: NetworkEvent) -> Result<()> {
        let mut state = self.relay.state.lock();
        let peer = state
            .peers
            .get(&self.peer)
            .filter(|peer| peer.connected)
            .ok_or(TransportError::NotConnected)?;
        if peer.room.as_ref() != Some(room) {
            return Err(TransportError::NotInRoom(room.clone()));
        }
        let kind = event.kind();
        let payload = Envelope::new(room.clone(), self.peer.clone(), event).to_bytes()?;
        let delivered = state.deliver(Some(&self.peer), room, kind, &payload);
        trace!(peer = %self.peer, %room, event = kind.name(), ?delivered, "emitted event");
        Ok(())
    }
}

impl Drop for LocalTransport {
    fn drop(&mut self) {
        // dropping the entry closes the senders of all of this peer's subscriptions
        self.relay.state.lock().peers.remove(&self.peer);
        debug!(peer = %self.peer, "peer removed from relay");
    }
}
