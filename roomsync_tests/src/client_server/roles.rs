use super::at;
use crate::stepper::{BROADCAST_INTERVAL, FRAME_DURATION, RoomStepper, default_settings};
use roomsync::prelude::*;
use test_log::test;

#[test]
fn test_owner_ignores_its_own_echo() {
    let mut stepper = RoomStepper::new(
        LocalRelay::new().with_echo(true),
        default_settings(),
        FRAME_DURATION,
    );
    stepper.new_client();
    stepper.new_client();
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));

    stepper.client_mut(0).set_network_state(owned, at(10.0)).unwrap();
    stepper.step_for(BROADCAST_INTERVAL);
    // local write right after the broadcast: the echoed 10 must not override it
    stepper.client_mut(0).set_network_state(owned, at(3.0)).unwrap();
    stepper.frame_step(1);
    assert_eq!(stepper.client(0).state(owned).unwrap(), &at(3.0));

    stepper.step_for(BROADCAST_INTERVAL * 3);
    assert_eq!(stepper.client(0).state(owned).unwrap(), &at(3.0));
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(3.0));
}

#[test]
fn test_observer_writes_stay_local() {
    let mut stepper = RoomStepper::with_clients(2);
    let mut spy = stepper.spy();
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));

    stepper
        .client_mut(1)
        .set_network_state(observed, at(42.0))
        .unwrap();
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(42.0));
    assert!(
        stepper
            .client(1)
            .entity(observed)
            .unwrap()
            .pending()
            .is_none()
    );

    stepper.step_for(BROADCAST_INTERVAL * 5);
    assert!(spy.updates(stepper.now()).is_empty());
    assert_eq!(stepper.client(0).state(owned).unwrap(), &at(0.0));
}

#[test]
fn test_rebind_swaps_roles() {
    let mut stepper = RoomStepper::with_clients(2);
    let first = stepper.bind_owner(0, "e", at(0.0));
    let second = stepper.bind_observer(1, "e", at(0.0));

    let config = stepper
        .client(0)
        .binding_config("e", at(0.0), Role::Observer);
    let first = stepper.rebind(0, first, config).unwrap();
    let config = stepper.client(1).binding_config("e", at(0.0), Role::Owner);
    let second = stepper.rebind(1, second, config).unwrap();

    stepper
        .client_mut(1)
        .set_network_state(second, at(6.0))
        .unwrap();
    stepper.step_for(BROADCAST_INTERVAL * 3);
    assert_eq!(stepper.client(0).state(first).unwrap(), &at(6.0));
    assert_eq!(stepper.client(0).entity(first).unwrap().role(), Role::Observer);
}
