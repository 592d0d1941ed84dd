/*!
Events carried by the transport.

Every event is a variant of [`NetworkEvent`], keyed on the wire by its event name. On the
wire an event is wrapped in an [`Envelope`]:

```json
{"roomId": "lobby", "from": "alice", "event": "network-state", "payload": {"entityId": "alice", "state": {"x": 1.0}}, "ts": 1700000000000}
```
*/
use crate::error::{Result, TransportError};
use bytes::Bytes;
use roomsync_core::id::{EntityId, PeerId, RoomId};
use roomsync_core::state::EntityState;
use serde::{Deserialize, Serialize};

/// Event name used for entity state updates
pub const NETWORK_STATE_EVENT: &str = "network-state";
/// Event name used for application messages
pub const MESSAGE_EVENT: &str = "message";

/// Latest state of an entity, sent by its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdate {
    pub entity_id: EntityId,
    pub state: EntityState,
}

/// Arbitrary named application message (chat, presence pings, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMessage {
    pub name: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum NetworkEvent {
    #[serde(rename = "network-state")]
    EntityUpdate(EntityUpdate),
    #[serde(rename = "message")]
    Message(AppMessage),
}

impl NetworkEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            NetworkEvent::EntityUpdate(_) => EventKind::EntityUpdate,
            NetworkEvent::Message(_) => EventKind::Message,
        }
    }
}

impl From<EntityUpdate> for NetworkEvent {
    fn from(value: EntityUpdate) -> Self {
        NetworkEvent::EntityUpdate(value)
    }
}

impl From<AppMessage> for NetworkEvent {
    fn from(value: AppMessage) -> Self {
        NetworkEvent::Message(value)
    }
}

/// Discriminant of a [`NetworkEvent`], used to route subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EntityUpdate,
    Message,
}

impl EventKind {
    /// Name of the event on the wire
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::EntityUpdate => NETWORK_STATE_EVENT,
            EventKind::Message => MESSAGE_EVENT,
        }
    }
}

/// Wrapper added by the relay around every event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub room_id: RoomId,
    pub from: PeerId,
    #[serde(flatten)]
    pub event: NetworkEvent,
    /// Milliseconds since the UNIX epoch at which the event was emitted
    pub ts: i64,
}

impl Envelope {
    pub fn new(room_id: RoomId, from: PeerId, event: NetworkEvent) -> Self {
        Self {
            room_id,
            from,
            event,
            ts: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(TransportError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(TransportError::Decode)
    }
}
