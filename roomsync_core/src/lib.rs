//! Contains a set of shared types

pub mod id;
pub mod interpolate;
pub mod state;
pub mod time;
pub mod timer;

pub mod prelude {
    pub use crate::id::{EntityId, PeerId, RoomId};
    pub use crate::interpolate::{LerpFn, interpolate};
    pub use crate::state::{EntityState, FieldValue};
    pub use crate::time::Instant;
    pub use crate::timer::RepeatingTimer;
}
