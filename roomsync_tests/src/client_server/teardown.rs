use super::at;
use crate::stepper::{BROADCAST_INTERVAL, RoomStepper};
use bytes::Bytes;
use roomsync::prelude::*;
use test_log::test;

#[test]
fn test_unbound_owner_stops_emitting() {
    let mut stepper = RoomStepper::single();
    let mut spy = stepper.spy();
    let owned = stepper.bind_owner(0, "e", at(0.0));

    stepper.client_mut(0).set_network_state(owned, at(1.0)).unwrap();
    stepper.step_for(BROADCAST_INTERVAL / 2);
    stepper.client_mut(0).unbind(owned).unwrap();
    stepper.step_for(BROADCAST_INTERVAL * 10);
    assert!(spy.updates(stepper.now()).is_empty());

    assert_eq!(
        stepper.client_mut(0).set_network_state(owned, at(2.0)),
        Err(SyncError::UnknownBinding(owned))
    );
    assert_eq!(
        stepper.client_mut(0).unbind(owned),
        Err(SyncError::UnknownBinding(owned))
    );
}

#[test]
fn test_unbound_observer_is_unsubscribed() {
    let mut stepper = RoomStepper::with_clients(2);
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));
    let room = stepper.settings.room.clone();
    assert_eq!(
        stepper
            .relay
            .broadcast_raw(&room, EventKind::EntityUpdate, Bytes::new()),
        1
    );

    stepper.client_mut(1).unbind(observed).unwrap();
    assert_eq!(
        stepper
            .relay
            .broadcast_raw(&room, EventKind::EntityUpdate, Bytes::new()),
        0
    );

    stepper.client_mut(0).set_network_state(owned, at(5.0)).unwrap();
    stepper.step_for(BROADCAST_INTERVAL * 3);
    assert_eq!(
        stepper.client(1).state(observed),
        Err(SyncError::UnknownBinding(observed))
    );
    assert!(stepper.client(1).engine().is_empty());
}

#[test]
fn test_unbind_during_interpolation() {
    let mut stepper = RoomStepper::with_clients(2);
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));
    stepper.client_mut(0).set_network_state(owned, at(5.0)).unwrap();
    stepper.step_for(BROADCAST_INTERVAL + BROADCAST_INTERVAL / 2);
    assert_eq!(
        stepper.client(1).entity(observed).unwrap().phase(),
        Some(InterpolationPhase::Interpolating)
    );

    stepper.client_mut(1).unbind(observed).unwrap();
    stepper.step_for(BROADCAST_INTERVAL * 3);

    // binding the entity again starts from the given initial state
    let observed = stepper.bind_observer(1, "e", at(-1.0));
    stepper.frame_step(1);
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(-1.0));
}

#[test]
fn test_dispose_removes_client() {
    let mut stepper = RoomStepper::with_clients(2);
    let mut spy = stepper.spy();
    let owned = stepper.bind_owner(0, "e", at(0.0));
    stepper.bind_observer(1, "e", at(0.0));
    stepper.client_mut(0).set_network_state(owned, at(5.0)).unwrap();

    stepper.remove_client(0);
    let room = stepper.settings.room.clone();
    assert_eq!(
        stepper.relay.room_members(&room),
        vec![PeerId::new("client-1"), PeerId::new("spy")]
    );
    stepper.step_for(BROADCAST_INTERVAL * 3);
    assert!(spy.updates(stepper.now()).is_empty());
}
