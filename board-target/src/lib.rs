//! Board description schema
//!
//! Building the firmware and its documentation for a specific board requires
//! a description of that board: descriptive metadata, the microcontroller and
//! its flash layout, the on-board devices, how the pins are laid out on the
//! physical connectors, and which alternate functions each pin carries.
//!
//! This crate contains the schema structs for the YAML board description
//! files, the generator for the chip's plain GPIOs, and the annotator that
//! overlays the board specific pin functions onto them.
//!
#![warn(missing_docs)]

pub mod annotate;
mod board;
mod chip;
mod device;
mod error;
mod function;
mod info;
mod layout;
mod pin;
pub mod registry;
pub(crate) mod serialize;

pub use annotate::{
    annotate, annotate_with, mark_polarity, mark_voltage_tolerance, mark_voltage_tolerance_with,
    AnnotationPolicy, FunctionAssignment, PinAnnotations, VoltageTolerance,
};
pub use board::{Board, BoardDescription, GpioRange};
pub use chip::{Chip, ChipDescription, FlashReservation, SavedCode};
pub use device::{Device, DevicePins, PinState};
pub use error::Error;
pub use function::{I2cSignal, PinFunction, SpiSignal, UsartSignal, MARKER};
pub use info::{BoardInfo, BuildConfig};
pub use layout::{ConnectorLayout, ConnectorPosition, Edge};
pub use pin::{Pin, PinId, PinSet, DEFAULT_PORT};
pub use registry::{Registry, RegistryError};
