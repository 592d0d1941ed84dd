use super::at;
use crate::stepper::{BROADCAST_INTERVAL, FRAME_DURATION, RoomStepper, default_settings};
use core::time::Duration;
use roomsync::prelude::*;
use test_log::test;

fn conditioned(conditioner: Conditioner) -> RoomStepper {
    let mut settings = default_settings();
    settings.conditioner = Some(conditioner);
    let mut stepper = RoomStepper::new(LocalRelay::new(), settings, FRAME_DURATION);
    stepper.new_client();
    stepper.new_client();
    stepper
}

#[test]
fn test_latency_delays_the_target() {
    let mut stepper = conditioned(Conditioner {
        latency_ms: 50,
        jitter_ms: 0,
        packet_loss: 0.0,
    });
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));
    stepper.client_mut(0).set_network_state(owned, at(10.0)).unwrap();

    // sent after one interval, released 50ms later
    stepper.step_for(BROADCAST_INTERVAL + Duration::from_millis(45));
    let binding = stepper.client(1).entity(observed).unwrap();
    assert_eq!(binding.cursor().unwrap().target(), &at(0.0));

    stepper.step_for(Duration::from_millis(5));
    let binding = stepper.client(1).entity(observed).unwrap();
    assert_eq!(binding.cursor().unwrap().target(), &at(10.0));
    assert_eq!(binding.phase(), Some(InterpolationPhase::Interpolating));

    stepper.step_for(BROADCAST_INTERVAL * 3 / 2);
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(10.0));
}

#[test]
fn test_lost_updates_are_not_retried() {
    let mut stepper = conditioned(Conditioner {
        latency_ms: 0,
        jitter_ms: 0,
        packet_loss: 1.0,
    });
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));
    stepper.client_mut(0).set_network_state(owned, at(10.0)).unwrap();

    stepper.step_for(BROADCAST_INTERVAL * 10);
    assert!(stepper.client(0).entity(owned).unwrap().pending().is_none());
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(0.0));
}

#[test]
fn test_disconnected_owner_keeps_value_staged() {
    let mut stepper = RoomStepper::with_clients(2);
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));

    stepper.transport(0).disconnect();
    stepper.client_mut(0).set_network_state(owned, at(10.0)).unwrap();
    stepper.step_for(BROADCAST_INTERVAL * 3);
    assert_eq!(
        stepper.client(0).entity(owned).unwrap().pending(),
        Some(&at(10.0))
    );
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(0.0));

    stepper.transport(0).reconnect();
    let room = stepper.settings.room.clone();
    stepper.transport(0).join_room(room).unwrap();
    stepper.step_for(BROADCAST_INTERVAL);
    assert!(stepper.client(0).entity(owned).unwrap().pending().is_none());

    stepper.step_for(BROADCAST_INTERVAL * 3 / 2);
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(10.0));
}
