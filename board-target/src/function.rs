use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Selector value written by the annotator.
///
/// Downstream tooling treats it as an opaque priority, only the presence
/// of a function matters to it.
pub const MARKER: u8 = 0;

/// Signal of a UART peripheral.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsartSignal {
    /// Transmit.
    Tx,
    /// Receive.
    Rx,
}

/// Signal of an SPI peripheral.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpiSignal {
    /// Clock.
    Sck,
    /// Controller in, peripheral out.
    Miso,
    /// Controller out, peripheral in.
    Mosi,
}

/// Signal of an I2C peripheral.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum I2cSignal {
    /// Clock.
    Scl,
    /// Data.
    Sda,
}

/// A role a pin can take besides plain digital I/O, or a marker describing
/// its electrical behaviour.
///
/// The textual names (`ADC1_IN0`, `USART1_TX`, `NEGATED`, `3.3`, ...) are
/// what ends up in the generated pin tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinFunction {
    /// First crystal oscillator pin.
    Xl1,
    /// Second crystal oscillator pin.
    Xl2,
    /// First NFC antenna pin.
    Nfc1,
    /// Second NFC antenna pin.
    Nfc2,
    /// Analog input `channel` of ADC `unit`.
    Adc {
        /// ADC peripheral number, starting at 1.
        unit: u8,
        /// Input channel.
        channel: u8,
    },
    /// UART signal of USART `unit`.
    Usart {
        /// USART peripheral number, starting at 1.
        unit: u8,
        /// The signal.
        signal: UsartSignal,
    },
    /// SPI signal of SPI `unit`.
    Spi {
        /// SPI peripheral number, starting at 1.
        unit: u8,
        /// The signal.
        signal: SpiSignal,
    },
    /// I2C signal of I2C `unit`.
    I2c {
        /// I2C peripheral number, starting at 1.
        unit: u8,
        /// The signal.
        signal: I2cSignal,
    },
    /// The pin is active-low.
    Negated,
    /// The pin is not 5V tolerant.
    ThreeVoltOnly,
}

impl PinFunction {
    /// Returns `true` for functions that claim the pin for a peripheral,
    /// `false` for the electrical markers (`NEGATED` and `3.3`).
    pub fn is_peripheral(&self) -> bool {
        !matches!(self, PinFunction::Negated | PinFunction::ThreeVoltOnly)
    }
}

impl fmt::Display for PinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinFunction::Xl1 => f.write_str("XL1"),
            PinFunction::Xl2 => f.write_str("XL2"),
            PinFunction::Nfc1 => f.write_str("NFC1"),
            PinFunction::Nfc2 => f.write_str("NFC2"),
            PinFunction::Adc { unit, channel } => write!(f, "ADC{unit}_IN{channel}"),
            PinFunction::Usart { unit, signal } => {
                let signal = match signal {
                    UsartSignal::Tx => "TX",
                    UsartSignal::Rx => "RX",
                };
                write!(f, "USART{unit}_{signal}")
            }
            PinFunction::Spi { unit, signal } => {
                let signal = match signal {
                    SpiSignal::Sck => "SCK",
                    SpiSignal::Miso => "MISO",
                    SpiSignal::Mosi => "MOSI",
                };
                write!(f, "SPI{unit}_{signal}")
            }
            PinFunction::I2c { unit, signal } => {
                let signal = match signal {
                    I2cSignal::Scl => "SCL",
                    I2cSignal::Sda => "SDA",
                };
                write!(f, "I2C{unit}_{signal}")
            }
            PinFunction::Negated => f.write_str("NEGATED"),
            PinFunction::ThreeVoltOnly => f.write_str("3.3"),
        }
    }
}

/// Splits `ADC1_IN3` style names into the peripheral unit and the suffix
/// after the underscore.
fn split_unit<'a>(name: &'a str, prefix: &str) -> Option<(u8, &'a str)> {
    let rest = name.strip_prefix(prefix)?;
    let (unit, suffix) = rest.split_once('_')?;
    if unit.is_empty() || !unit.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((unit.parse().ok()?, suffix))
}

impl FromStr for PinFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let function = match s {
            "XL1" => Some(PinFunction::Xl1),
            "XL2" => Some(PinFunction::Xl2),
            "NFC1" => Some(PinFunction::Nfc1),
            "NFC2" => Some(PinFunction::Nfc2),
            "NEGATED" => Some(PinFunction::Negated),
            "3.3" => Some(PinFunction::ThreeVoltOnly),
            _ => None,
        };
        if let Some(function) = function {
            return Ok(function);
        }

        let function = if let Some((unit, suffix)) = split_unit(s, "ADC") {
            suffix
                .strip_prefix("IN")
                .filter(|channel| {
                    !channel.is_empty() && channel.bytes().all(|b| b.is_ascii_digit())
                })
                .and_then(|channel| channel.parse().ok())
                .map(|channel| PinFunction::Adc { unit, channel })
        } else if let Some((unit, suffix)) = split_unit(s, "USART") {
            let signal = match suffix {
                "TX" => Some(UsartSignal::Tx),
                "RX" => Some(UsartSignal::Rx),
                _ => None,
            };
            signal.map(|signal| PinFunction::Usart { unit, signal })
        } else if let Some((unit, suffix)) = split_unit(s, "SPI") {
            let signal = match suffix {
                "SCK" => Some(SpiSignal::Sck),
                "MISO" => Some(SpiSignal::Miso),
                "MOSI" => Some(SpiSignal::Mosi),
                _ => None,
            };
            signal.map(|signal| PinFunction::Spi { unit, signal })
        } else if let Some((unit, suffix)) = split_unit(s, "I2C") {
            let signal = match suffix {
                "SCL" => Some(I2cSignal::Scl),
                "SDA" => Some(I2cSignal::Sda),
                _ => None,
            };
            signal.map(|signal| PinFunction::I2c { unit, signal })
        } else {
            None
        };

        function.ok_or_else(|| Error::UnknownFunction(s.to_string()))
    }
}

impl Serialize for PinFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PinFunction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
