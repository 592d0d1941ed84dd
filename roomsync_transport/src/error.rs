use roomsync_core::id::{PeerId, RoomId};

pub type Result<T> = core::result::Result<T, TransportError>;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("the transport is not connected")]
    NotConnected,
    #[error("not a member of room {0}")]
    NotInRoom(RoomId),
    #[error("peer {0} is already connected to the relay")]
    DuplicatePeer(PeerId),
    #[error("could not encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("could not decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
}
