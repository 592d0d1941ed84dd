//! Simulates one owner moving an entity in a circle and several observers following it,
//! all connected to the same in-process relay.
use clap::Parser;
use core::time::Duration;
use roomsync::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};

/// Settings used when no `--settings` file is given
const DEFAULT_SETTINGS: &str = include_str!("../assets/settings.ron");

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Number of observing clients
    #[arg(short, long, default_value_t = 2)]
    observers: usize,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 120)]
    frames: usize,

    /// Frame duration in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Path to a RON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn connect(
    relay: &LocalRelay,
    peer: &str,
    settings: &ClientSettings,
) -> Result<NetworkClient, TransportError> {
    let mut transport = relay.connect(peer)?;
    if let Some(conditioner) = &settings.conditioner {
        transport = transport.with_conditioner(conditioner.build());
    }
    transport.join_room(settings.room.clone())?;
    Ok(NetworkClient::init(Arc::new(transport), settings.clone()))
}

fn position(frame: usize) -> EntityState {
    let angle = frame as f64 * 0.05;
    EntityState::new()
        .with("x", 100.0 * angle.cos())
        .with("y", 100.0 * angle.sin())
        .with("lap", (angle / core::f64::consts::TAU) as i64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    LogConfig::new(cli.log_level)
        .with_filter("roomsync_transport=info")
        .init()?;

    let settings: ClientSettings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => read_settings(DEFAULT_SETTINGS)?,
    };
    info!(?settings, observers = cli.observers, "starting headless demo");

    let relay = LocalRelay::new();
    let mut owner = connect(&relay, "owner", &settings)?;
    let owned = owner.bind_owner("player", position(0))?;

    let mut observers = Vec::with_capacity(cli.observers);
    for i in 0..cli.observers {
        let mut observer = connect(&relay, &format!("observer-{i}"), &settings)?;
        let handle = observer.bind_observer("player", position(0))?;
        observers.push((observer, handle));
    }

    let frame_duration = Duration::from_millis(cli.frame_ms);
    for frame in 1..=cli.frames {
        owner.set_network_state(owned, position(frame))?;
        owner.update();
        for (observer, _) in observers.iter_mut() {
            observer.update();
        }

        if frame % 10 == 0 {
            let target = owner.state(owned)?;
            for (i, (observer, handle)) in observers.iter().enumerate() {
                let binding = observer.entity(*handle)?;
                info!(
                    frame,
                    observer = i,
                    x = binding.state().number("x"),
                    target_x = target.number("x"),
                    phase = ?binding.phase(),
                    "observed state"
                );
            }
        }
        std::thread::sleep(frame_duration);
    }

    for (observer, _) in observers {
        observer.dispose();
    }
    owner.dispose();
    Ok(())
}
