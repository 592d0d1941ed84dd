/*! # Roomsync

Roomsync synchronizes the state of application entities between the participants of a
room, on top of a room-based relay.

One participant owns each entity: its local writes are broadcast at a bounded rate. Every
other participant observes the entity and smoothly interpolates towards the last state it
received.

```rust,ignore
use roomsync::prelude::*;

let transport = relay.connect("alice")?;
transport.join_room("lobby")?;
let mut client = NetworkClient::init(Arc::new(transport), ClientSettings::new("lobby"));
let me = client.bind_owner("alice", EntityState::new().with("x", 0.0))?;
let other = client.bind_observer("bob", EntityState::new().with("x", 0.0))?;

// every frame
client.set_network_state(me, EntityState::new().with("x", 1.0))?;
client.update();
let bob_x = client.state(other)?.number("x");
```
*/

pub mod client;
pub mod log;
pub mod settings;

pub mod core {
    pub use roomsync_core::*;
}

pub mod transport {
    pub use roomsync_transport::*;
}

pub mod sync {
    pub use roomsync_sync::*;
}

/// Prelude containing commonly used types
pub mod prelude {
    pub use roomsync_core::prelude::*;
    pub use roomsync_sync::prelude::*;
    pub use roomsync_transport::prelude::*;

    pub use crate::client::NetworkClient;
    pub use crate::log::{LogConfig, LogError};
    pub use crate::settings::{
        ClientSettings, Conditioner, SettingsError, SyncSettings, load_settings, read_settings,
    };
}
