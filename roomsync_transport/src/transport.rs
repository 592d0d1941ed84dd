use crate::conditioner::{LinkConditioner, LinkConditionerConfig};
use crate::error::Result;
use crate::event::{EventKind, NetworkEvent};
use bytes::Bytes;
use crossbeam_channel::{Receiver, TryRecvError};
use roomsync_core::id::{PeerId, RoomId};
use roomsync_core::time::Instant;
use tracing::trace;

/// Identifies a [`Subscription`] inside the transport that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Duplex channel to a room-based relay.
///
/// The transport is shared between every synchronized entity of the application, so all
/// methods take `&self`.
pub trait Transport: Send + Sync {
    /// Identifier of this participant on the relay
    fn peer_id(&self) -> PeerId;

    fn is_connected(&self) -> bool;

    /// Room that this participant currently belongs to
    fn current_room(&self) -> Option<RoomId>;

    /// Start receiving events of the given kind.
    ///
    /// The registration lasts as long as the returned [`Subscription`]: once it is dropped,
    /// nothing is delivered to it anymore.
    fn subscribe(&self, kind: EventKind) -> Subscription;

    /// Eagerly remove the subscription from the transport
    fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Send an event to every other member of the room. Best-effort: nothing is retried.
    fn emit_to_room(&self, room: &RoomId, event: NetworkEvent) -> Result<()>;
}

/// Receiving end of a subscription to one [`EventKind`].
///
/// Payloads are kept as raw bytes: decoding (and ignoring malformed payloads) is up to the
/// consumer.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    receiver: Receiver<Bytes>,
    conditioner: Option<LinkConditioner>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, kind: EventKind, receiver: Receiver<Bytes>) -> Self {
        Self {
            id,
            kind,
            receiver,
            conditioner: None,
        }
    }

    /// Delay or drop incoming payloads according to the [`LinkConditionerConfig`]
    pub fn with_conditioner(mut self, config: LinkConditionerConfig) -> Self {
        self.conditioner = Some(LinkConditioner::new(config));
        self
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Drain every payload that is deliverable at `now`, in arrival order
    pub fn receive(&mut self, now: Instant) -> Vec<Bytes> {
        let mut received = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => match &mut self.conditioner {
                    Some(conditioner) => conditioner.condition_packet(payload, now),
                    None => received.push(payload),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    trace!(id = ?self.id, "subscription was closed by the transport");
                    break;
                }
            }
        }
        if let Some(conditioner) = &mut self.conditioner {
            while let Some(payload) = conditioner.pop_packet(now) {
                received.push(payload);
            }
        }
        received
    }
}
