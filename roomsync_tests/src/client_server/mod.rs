use roomsync::prelude::EntityState;

mod broadcast;
mod conditioner;
mod interpolation;
mod roles;
mod teardown;

pub(crate) fn at(x: f64) -> EntityState {
    EntityState::new().with("x", x)
}
