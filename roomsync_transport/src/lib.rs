/*! # Roomsync Transport

The duplex channel the synchronization engine talks through.

[`Transport`] is the only contract the engine depends on: named-event subscriptions,
room-scoped emission and a couple of connection predicates. [`local::LocalRelay`] is an
in-process implementation of a room relay, used by tests, demos and single-process setups.
*/

pub mod conditioner;
pub mod error;
pub mod event;
pub mod local;
pub mod transport;

pub mod prelude {
    pub use crate::conditioner::LinkConditionerConfig;
    pub use crate::error::TransportError;
    pub use crate::event::{AppMessage, EntityUpdate, Envelope, EventKind, NetworkEvent};
    pub use crate::local::{LocalRelay, LocalTransport};
    pub use crate::transport::{Subscription, SubscriptionId, Transport};
}
