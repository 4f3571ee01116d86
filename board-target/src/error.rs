use crate::{PinFunction, PinId};

/// Errors raised while building or annotating a board description.
///
/// All of these point at a mistake in the authored board file (or in the
/// code driving the annotator), so none of them are meant to be recovered
/// from. Callers are expected to abort the generation step.
#[derive(thiserror::Error, Debug, docsplay::Display, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pin {id} referenced by {context} does not exist on this chip.
    PinNotFound {
        /// The identifier that failed to resolve.
        id: PinId,
        /// Where the reference came from, e.g. `device LED1`.
        context: String,
    },

    /// '{0}' is not a valid pin identifier.
    InvalidPinId(String),

    /// '{0}' is not a known pin function.
    UnknownFunction(String),

    /// Pin {id} carries {function} with selector {existing}, not overwriting it with {requested}.
    SelectorConflict {
        /// The pin being annotated.
        id: PinId,
        /// The function that is already assigned.
        function: PinFunction,
        /// The selector currently stored.
        existing: u8,
        /// The selector that would have been written.
        requested: u8,
    },

    /// Pin {id} is already used as {existing}, it cannot also be {function}.
    FunctionConflict {
        /// The pin being annotated.
        id: PinId,
        /// The peripheral function that was requested.
        function: PinFunction,
        /// The peripheral function the pin already carries.
        existing: PinFunction,
    },

    /// Pin {0} appears more than once.
    DuplicatePin(PinId),

    /// The GPIO range {first}..={last} of port {port} is empty.
    EmptyGpioRange {
        /// GPIO port letter.
        port: char,
        /// First pin number.
        first: u8,
        /// Last pin number.
        last: u8,
    },

    /// Flash reservation of {reserved_kb} KB does not fit into {flash_kb} KB of flash.
    FlashOverflow {
        /// Total reserved flash in KB.
        reserved_kb: u64,
        /// Flash size of the chip in KB.
        flash_kb: u32,
    },

    /// Flash page size {0} is not a non-zero multiple of 1024 bytes.
    InvalidPageSize(u32),

    /// A device needs either `pin` or both `pin_a` and `pin_b`, found {0}.
    InvalidDevicePins(String),
}
