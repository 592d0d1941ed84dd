/*! # Roomsync Sync

Synchronizes the state of entities between the participants of a room.

Each synchronized entity has a [`SyncBinding`](binding::SyncBinding) on every participant:
- on the [`Role::Owner`](config::Role::Owner), local writes are buffered and broadcast at
  most once per broadcast interval;
- on every [`Role::Observer`](config::Role::Observer), received updates become the target
  of an interpolation that runs every frame.

Bindings are created and torn down through the [`SyncEngine`](engine::SyncEngine), which
owns them together with the shared transport handle.
*/

pub mod binding;
pub mod buffer;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;

pub mod prelude {
    pub use crate::binding::SyncBinding;
    pub use crate::buffer::BroadcastBuffer;
    pub use crate::config::{BindingConfig, Role, SyncConfig};
    pub use crate::cursor::{InterpolationCursor, InterpolationPhase};
    pub use crate::engine::{BindingHandle, SyncEngine};
    pub use crate::error::SyncError;
}
