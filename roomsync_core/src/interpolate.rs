//! Interpolation between two [`EntityState`] snapshots
use crate::state::{EntityState, FieldValue};

/// Function used to compute an intermediate state between `start` and `end`, given the
/// progress fraction `t` in `[0, 1]`
pub type LerpFn = fn(start: &EntityState, end: &EntityState, t: f64) -> EntityState;

/// Linear interpolation from `current` towards `target`.
///
/// The result only contains the fields of `target`:
/// - if the field is numeric in both states, it becomes `current * (1 - t) + target * t`
/// - otherwise the field snaps to the value from `target`
pub fn interpolate(current: &EntityState, target: &EntityState, t: f64) -> EntityState {
    target
        .fields()
        .map(|(field, end)| {
            let value = match (current.get(field), end) {
                (Some(FieldValue::Number(start)), FieldValue::Number(end)) => {
                    FieldValue::Number(start * (1.0 - t) + end * t)
                }
                _ => end.clone(),
            };
            (field.clone(), value)
        })
        .collect()
}
