use super::at;
use crate::stepper::{BROADCAST_INTERVAL, FRAME_DURATION, RoomStepper, default_settings};
use approx::assert_relative_eq;
use roomsync::prelude::*;
use test_log::test;

/// Owner on client 0 and observer on client 1 for entity "e", both starting at x = 0.
/// The owner writes `x = 10` and the stepper runs until the observer received it.
fn setup(stepper: &mut RoomStepper) -> BindingHandle {
    let owned = stepper.bind_owner(0, "e", at(0.0));
    let observed = stepper.bind_observer(1, "e", at(0.0));
    stepper
        .client_mut(0)
        .set_network_state(owned, at(10.0))
        .unwrap();
    stepper.step_for(BROADCAST_INTERVAL);
    observed
}

#[test]
fn test_target_is_not_applied_on_arrival() {
    let mut stepper = RoomStepper::with_clients(2);
    let observed = setup(&mut stepper);

    let binding = stepper.client(1).entity(observed).unwrap();
    assert_eq!(binding.cursor().unwrap().target(), &at(10.0));
    assert_eq!(binding.state(), &at(0.0));
    assert_eq!(binding.phase(), Some(InterpolationPhase::Interpolating));
}

#[test]
fn test_mid_flight_value() {
    let mut stepper = RoomStepper::with_clients(2);
    let observed = setup(&mut stepper);

    // half of the window of 1.5 * interval
    stepper.step_for(BROADCAST_INTERVAL * 3 / 4);
    let binding = stepper.client(1).entity(observed).unwrap();
    assert_relative_eq!(binding.state().number("x").unwrap(), 5.0, epsilon = 1e-4);
    assert_eq!(binding.phase(), Some(InterpolationPhase::Interpolating));
}

#[test]
fn test_converges_exactly_after_window() {
    let mut stepper = RoomStepper::with_clients(2);
    let observed = setup(&mut stepper);

    stepper.step_for(BROADCAST_INTERVAL * 3 / 2);
    let binding = stepper.client(1).entity(observed).unwrap();
    assert_eq!(binding.state(), &at(10.0));
    assert_eq!(binding.phase(), Some(InterpolationPhase::AtTarget));

    // the render loop keeps running at the target
    stepper.step_for(BROADCAST_INTERVAL * 5);
    let binding = stepper.client(1).entity(observed).unwrap();
    assert_eq!(binding.state(), &at(10.0));
    assert_eq!(binding.phase(), Some(InterpolationPhase::AtTarget));
}

#[test]
fn test_new_target_starts_from_rendered_state() {
    let mut stepper = RoomStepper::with_clients(2);
    let observed = setup(&mut stepper);
    let owned = stepper.client(0).engine().find(&EntityId::new("e")).unwrap();

    stepper.step_for(BROADCAST_INTERVAL / 2);
    stepper
        .client_mut(0)
        .set_network_state(owned, at(20.0))
        .unwrap();
    stepper.step_for(BROADCAST_INTERVAL / 2);

    let binding = stepper.client(1).entity(observed).unwrap();
    let cursor = binding.cursor().unwrap();
    assert_eq!(cursor.target(), &at(20.0));
    // the second update arrived mid-flight: no jump back to the previous target
    let start = cursor.last_visual().number("x").unwrap();
    assert!(start > 0.0 && start < 10.0);
    assert_eq!(binding.state(), cursor.last_visual());

    stepper.step_for(BROADCAST_INTERVAL * 3 / 2);
    assert_eq!(stepper.client(1).state(observed).unwrap(), &at(20.0));
}

#[test]
fn test_non_numeric_fields_snap() {
    let mut stepper = RoomStepper::with_clients(2);
    let initial = at(0.0).with("name", "before").with("alive", true);
    let owned = stepper.bind_owner(0, "e", initial.clone());
    let observed = stepper.bind_observer(1, "e", initial);
    stepper
        .client_mut(0)
        .set_network_state(owned, at(10.0).with("name", "after").with("alive", false))
        .unwrap();
    stepper.step_for(BROADCAST_INTERVAL);

    stepper.frame_step(1);
    let state = stepper.client(1).state(observed).unwrap();
    assert!(state.number("x").unwrap() < 10.0);
    assert_eq!(state.get("name"), Some(&FieldValue::from("after")));
    assert_eq!(state.get("alive"), Some(&FieldValue::Bool(false)));
}

#[test]
fn test_interpolation_disabled_applies_on_arrival() {
    let mut settings = default_settings();
    settings.sync.interpolation = false;
    let mut stepper = RoomStepper::new(LocalRelay::new(), settings, FRAME_DURATION);
    stepper.new_client();
    stepper.new_client();
    let observed = setup(&mut stepper);

    let binding = stepper.client(1).entity(observed).unwrap();
    assert_eq!(binding.state(), &at(10.0));
    assert!(binding.cursor().is_none());
    assert_eq!(binding.phase(), Some(InterpolationPhase::AtTarget));
}
