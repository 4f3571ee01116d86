use crate::annotate::{AnnotationPolicy, PinAnnotations};
use crate::{BoardInfo, Chip, ChipDescription, ConnectorLayout, Device, Error, PinId, PinSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The GPIO range of the chip.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpioRange {
    /// Port letter of the generated pins.
    #[serde(default = "default_port")]
    pub port: char,
    /// First pin number.
    pub first: u8,
    /// Last pin number, inclusive.
    pub last: u8,
}

fn default_port() -> char {
    crate::DEFAULT_PORT
}

/// A complete board, as authored in a board description file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardDescription {
    /// Descriptive metadata.
    pub info: BoardInfo,
    /// The microcontroller.
    pub chip: ChipDescription,
    /// The GPIOs the chip exposes.
    pub gpio: GpioRange,
    /// On-board devices by name.
    #[serde(default)]
    pub devices: IndexMap<String, Device>,
    /// Connector layouts used for the documentation.
    #[serde(default)]
    pub boards: Vec<ConnectorLayout>,
    /// Board specific pin annotations.
    #[serde(default)]
    pub pins: PinAnnotations,
}

impl BoardDescription {
    /// Parses a board description from YAML.
    pub fn from_yaml_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }

    /// Parses a board description from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// The plain GPIOs of the chip, before any annotation.
    pub fn base_pins(&self) -> Result<PinSet, Error> {
        let GpioRange { port, first, last } = self.gpio;
        if first > last {
            return Err(Error::EmptyGpioRange { port, first, last });
        }

        Ok(PinSet::generate_pins(first..=last, port))
    }

    /// The pins of the board with all annotations applied.
    pub fn get_pins(&self) -> Result<PinSet, Error> {
        self.get_pins_with(AnnotationPolicy::Overwrite)
    }

    /// Like [`BoardDescription::get_pins`], with an explicit conflict policy.
    pub fn get_pins_with(&self, policy: AnnotationPolicy) -> Result<PinSet, Error> {
        let mut pins = self.base_pins()?;
        self.pins.apply(&mut pins, policy)?;
        Ok(pins)
    }

    /// Validates the description such that the generators can rely on every
    /// pin reference being resolvable.
    ///
    /// This method should be called right after the description is loaded.
    pub fn validate(&self) -> Result<(), Error> {
        let pins = self.base_pins()?;
        self.chip.flash_reservation.saved_code(self.chip.flash)?;

        let check = |id: PinId, context: String| {
            if pins.contains(id) {
                Ok(())
            } else {
                Err(Error::PinNotFound { id, context })
            }
        };

        check(self.info.default_console_tx, "default_console_tx".to_string())?;
        check(self.info.default_console_rx, "default_console_rx".to_string())?;

        for (name, device) in &self.devices {
            for id in device.pins() {
                check(id, format!("device {name}"))?;
            }
        }

        for (index, layout) in self.boards.iter().enumerate() {
            for id in layout.pins() {
                check(id, format!("connector layout {index}"))?;
            }
            for id in layout.notes.keys() {
                check(*id, format!("notes of connector layout {index}"))?;
            }
        }

        for assignment in &self.pins.functions {
            check(assignment.pin, format!("function {}", assignment.function))?;
        }
        for &id in &self.pins.negated {
            check(id, "negated pin list".to_string())?;
        }

        Ok(())
    }

    /// Validates the description and produces the record handed to the
    /// documentation and header generators.
    pub fn resolve(&self, policy: AnnotationPolicy) -> Result<Board, Error> {
        self.validate()?;

        let board = Board {
            info: self.info.clone(),
            chip: self.chip.chip()?,
            devices: self.devices.clone(),
            boards: self.boards.clone(),
            pins: self.get_pins_with(policy)?,
        };

        tracing::info!(
            "Resolved board {} with {} pins and {} devices",
            board.info.name,
            board.pins.len(),
            board.devices.len()
        );

        Ok(board)
    }
}

/// A resolved board: metadata, chip, devices, layouts and annotated pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Board {
    /// Descriptive metadata.
    pub info: BoardInfo,
    /// The microcontroller, with the computed saved code area.
    pub chip: Chip,
    /// On-board devices by name.
    pub devices: IndexMap<String, Device>,
    /// Connector layouts used for the documentation.
    pub boards: Vec<ConnectorLayout>,
    /// The annotated pins.
    pub pins: PinSet,
}
