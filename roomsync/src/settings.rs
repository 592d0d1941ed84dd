//! Parse a `settings.ron` file into a [`ClientSettings`]
use core::time::Duration;
use roomsync_core::id::RoomId;
use roomsync_sync::config::{DEFAULT_BROADCAST_INTERVAL, INTERPOLATION_WINDOW_FACTOR, SyncConfig};
use roomsync_transport::conditioner::LinkConditionerConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("could not read the settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not deserialize the settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Deserialize settings from a RON string
pub fn read_settings<T: DeserializeOwned>(settings_str: &str) -> Result<T, SettingsError> {
    Ok(ron::de::from_str::<T>(settings_str)?)
}

/// Read and deserialize a RON settings file
pub fn load_settings<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SettingsError> {
    let settings_str = std::fs::read_to_string(path)?;
    read_settings(&settings_str)
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Conditioner {
    /// One way latency in milliseconds
    pub latency_ms: u16,
    /// One way jitter in milliseconds
    pub jitter_ms: u16,
    /// Probability of dropping a packet, between 0 and 1
    pub packet_loss: f32,
}

impl Conditioner {
    pub fn build(&self) -> LinkConditionerConfig {
        LinkConditionerConfig {
            incoming_latency: Duration::from_millis(self.latency_ms as u64),
            incoming_jitter: Duration::from_millis(self.jitter_ms as u64),
            incoming_loss: self.packet_loss,
        }
    }
}

/// Defaults applied to every binding created through the client
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    pub broadcast_interval_ms: u64,
    /// If false, observers snap to every received state
    pub interpolation: bool,
    pub interpolation_window_factor: f32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            broadcast_interval_ms: DEFAULT_BROADCAST_INTERVAL.as_millis() as u64,
            interpolation: true,
            interpolation_window_factor: INTERPOLATION_WINDOW_FACTOR,
        }
    }
}

impl SyncSettings {
    pub fn build(&self) -> SyncConfig {
        SyncConfig {
            broadcast_interval: Duration::from_millis(self.broadcast_interval_ms),
            interpolation: self.interpolation,
            window_factor: self.interpolation_window_factor,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ClientSettings {
    /// Room joined by the participants
    pub room: RoomId,

    #[serde(default)]
    pub sync: SyncSettings,

    /// Possibly add a conditioner to simulate network conditions
    #[serde(default)]
    pub conditioner: Option<Conditioner>,
}

impl ClientSettings {
    pub fn new(room: impl Into<RoomId>) -> Self {
        Self {
            room: room.into(),
            sync: SyncSettings::default(),
            conditioner: None,
        }
    }
}
