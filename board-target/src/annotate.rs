//! Overlays board specific metadata onto a generated [`PinSet`].
//!
//! With [`AnnotationPolicy::Overwrite`] all operations are overwrites, so
//! running them twice on the same pins yields the same function tables as
//! running them once. [`AnnotationPolicy::Strict`] additionally refuses
//! annotations that contradict what a pin already carries.

use crate::function::MARKER;
use crate::{Error, Pin, PinFunction, PinId, PinSet};
use serde::{Deserialize, Serialize};

/// How to treat an annotation that contradicts the existing function table
/// of a pin.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AnnotationPolicy {
    /// Replace existing selectors and stack peripheral functions.
    #[default]
    Overwrite,
    /// Fail with [`Error::SelectorConflict`] when a function is already
    /// present with another selector, and with [`Error::FunctionConflict`]
    /// when a peripheral function lands on a pin that already carries one.
    Strict,
}

/// Whether the pins of a chip tolerate 5V on their inputs.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltageTolerance {
    /// 3.3V only. Every pin gets the `3.3` marker.
    #[default]
    #[serde(rename = "3.3")]
    ThreeVolt,
    /// 5V tolerant. The `3.3` marker is removed from every pin.
    #[serde(rename = "5")]
    FiveVolt,
}

/// Sets `function` on the pin `id`, using [`AnnotationPolicy::Overwrite`].
pub fn annotate(pins: &mut PinSet, id: PinId, function: PinFunction) -> Result<(), Error> {
    annotate_with(pins, id, function, AnnotationPolicy::Overwrite)
}

/// Sets `function` on the pin `id` according to `policy`.
///
/// Fails with [`Error::PinNotFound`] if the pin does not exist. A failed
/// strict annotation leaves the pin untouched.
pub fn annotate_with(
    pins: &mut PinSet,
    id: PinId,
    function: PinFunction,
    policy: AnnotationPolicy,
) -> Result<(), Error> {
    let pin = pins.find_existing_pin_mut(id)?;

    if policy == AnnotationPolicy::Strict {
        check_strict(pin, function)?;
    }

    match pin.functions.insert(function, MARKER) {
        Some(existing) if existing != MARKER => {
            tracing::trace!("Overwrote selector {existing} of {function} on {id}")
        }
        _ => tracing::debug!("Annotated {id} with {function}"),
    }

    Ok(())
}

/// Checks that writing `function` with the marker selector does not
/// contradict the function table of `pin`.
fn check_strict(pin: &Pin, function: PinFunction) -> Result<(), Error> {
    let id = pin.id();

    match pin.functions.get(&function) {
        Some(&existing) if existing != MARKER => {
            return Err(Error::SelectorConflict {
                id,
                function,
                existing,
                requested: MARKER,
            });
        }
        Some(_) => return Ok(()),
        None => {}
    }

    if function.is_peripheral() {
        if let Some(&existing) = pin.functions.keys().find(|f| f.is_peripheral()) {
            return Err(Error::FunctionConflict {
                id,
                function,
                existing,
            });
        }
    }

    Ok(())
}

/// Applies the same voltage tolerance to every pin of the collection.
pub fn mark_voltage_tolerance(pins: &mut PinSet, tolerance: VoltageTolerance) {
    for pin in pins.iter_mut() {
        match tolerance {
            VoltageTolerance::ThreeVolt => {
                pin.functions.insert(PinFunction::ThreeVoltOnly, MARKER);
            }
            VoltageTolerance::FiveVolt => {
                pin.functions.remove(&PinFunction::ThreeVoltOnly);
            }
        }
    }
}

/// Applies the voltage tolerance according to `policy`.
///
/// In strict mode every pin is checked before any is modified, so a
/// conflict leaves the whole collection untouched.
pub fn mark_voltage_tolerance_with(
    pins: &mut PinSet,
    tolerance: VoltageTolerance,
    policy: AnnotationPolicy,
) -> Result<(), Error> {
    if policy == AnnotationPolicy::Strict && tolerance == VoltageTolerance::ThreeVolt {
        for pin in pins.iter() {
            check_strict(pin, PinFunction::ThreeVoltOnly)?;
        }
    }

    mark_voltage_tolerance(pins, tolerance);

    Ok(())
}

/// Marks every pin in `ids` as active-low.
pub fn mark_polarity(pins: &mut PinSet, ids: &[PinId]) -> Result<(), Error> {
    for &id in ids {
        annotate(pins, id, PinFunction::Negated)?;
    }

    Ok(())
}

/// A single `pin: function` request in a board description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionAssignment {
    /// The pin to annotate.
    pub pin: PinId,
    /// The function to put on it.
    pub function: PinFunction,
}

/// The annotation section of a board description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinAnnotations {
    /// Alternate functions wired up on this board.
    #[serde(default)]
    pub functions: Vec<FunctionAssignment>,
    /// Pins whose asserted state is electrically low.
    #[serde(default)]
    pub negated: Vec<PinId>,
    /// Tolerance applied to all pins of the chip.
    #[serde(default)]
    pub voltage_tolerance: VoltageTolerance,
}

impl PinAnnotations {
    /// Runs all annotations on `pins`, aborting on the first pin that
    /// does not exist or, with [`AnnotationPolicy::Strict`], on the first
    /// conflicting annotation.
    pub fn apply(&self, pins: &mut PinSet, policy: AnnotationPolicy) -> Result<(), Error> {
        for assignment in &self.functions {
            annotate_with(pins, assignment.pin, assignment.function, policy).map_err(|error| {
                with_context(error, format!("function {}", assignment.function))
            })?;
        }

        for &id in &self.negated {
            annotate_with(pins, id, PinFunction::Negated, policy)
                .map_err(|error| with_context(error, "negated pin list".to_string()))?;
        }

        mark_voltage_tolerance_with(pins, self.voltage_tolerance, policy)
    }
}

fn with_context(error: Error, context: String) -> Error {
    match error {
        Error::PinNotFound { id, .. } => Error::PinNotFound { id, context },
        other => other,
    }
}
