use super::at;
use crate::stepper::{BROADCAST_INTERVAL, RoomStepper};
use core::time::Duration;
use roomsync::prelude::*;
use test_log::test;

#[test]
fn test_owner_coalesces_writes_within_interval() {
    let mut stepper = RoomStepper::single();
    let mut spy = stepper.spy();
    let handle = stepper.bind_owner(0, "e", at(0.0));

    for x in 1..=5 {
        stepper
            .client_mut(0)
            .set_network_state(handle, at(x as f64))
            .unwrap();
        stepper.frame_step(2);
    }
    assert!(spy.updates(stepper.now()).is_empty());

    stepper.step_for(Duration::from_millis(50));
    assert_eq!(
        spy.updates(stepper.now()),
        vec![EntityUpdate {
            entity_id: EntityId::new("e"),
            state: at(5.0),
        }]
    );
    assert!(stepper.client(0).entity(handle).unwrap().pending().is_none());
}

#[test]
fn test_owner_is_silent_without_writes() {
    let mut stepper = RoomStepper::single();
    let mut spy = stepper.spy();
    let handle = stepper.bind_owner(0, "e", at(0.0));

    stepper.step_for(Duration::from_secs(1));
    assert!(spy.updates(stepper.now()).is_empty());

    stepper
        .client_mut(0)
        .set_network_state(handle, at(1.0))
        .unwrap();
    stepper.step_for(BROADCAST_INTERVAL);
    assert_eq!(spy.updates(stepper.now()).len(), 1);

    // the value was sent: nothing more until the next write
    stepper.step_for(Duration::from_secs(1));
    assert!(spy.updates(stepper.now()).is_empty());
}

#[test]
fn test_broadcast_rate_is_bounded() {
    let mut stepper = RoomStepper::single();
    let mut spy = stepper.spy();
    let handle = stepper.bind_owner(0, "e", at(0.0));

    // write every frame for one second
    for frame in 1..=200 {
        stepper
            .client_mut(0)
            .set_network_state(handle, at(frame as f64))
            .unwrap();
        stepper.frame_step(1);
    }
    let updates = spy.updates(stepper.now());
    assert_eq!(updates.len(), 10);
    let sent: Vec<f64> = updates
        .iter()
        .map(|update| update.state.number("x").unwrap())
        .collect();
    let expected: Vec<f64> = (1..=10).map(|i| (i * 20) as f64).collect();
    assert_eq!(sent, expected);
}

#[test]
fn test_observer_converges_to_latest_write() {
    let mut stepper = RoomStepper::with_clients(2);
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));

    for x in 1..=5 {
        stepper
            .client_mut(0)
            .set_network_state(owned, at(x as f64))
            .unwrap();
    }
    stepper.step_for(BROADCAST_INTERVAL + BROADCAST_INTERVAL * 3 / 2);
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(5.0));
    assert_eq!(stepper.client(0).state(owned).unwrap(), &at(5.0));
}
