use crate::engine::BindingHandle;
use roomsync_core::id::EntityId;

pub type Result<T> = core::result::Result<T, SyncError>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SyncError {
    #[error("binding {0:?} does not exist or was torn down")]
    UnknownBinding(BindingHandle),
    #[error("entity {0} is already bound on this participant")]
    AlreadyBound(EntityId),
}
