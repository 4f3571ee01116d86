use crate::{Error, PinId};
use serde::{Deserialize, Serialize};

/// Initial electrical state of a device pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PinState {
    /// Input without pull resistor.
    In,
    /// Input with pull-up.
    InPullup,
    /// Input with pull-down.
    InPulldown,
    /// Push-pull output.
    Out,
    /// Open drain output.
    OutOpenDrain,
    /// Output driven by a peripheral.
    AfOutput,
}

/// The pins a device is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DevicePins {
    /// A device on a single pin, e.g. an LED.
    Single {
        /// The pin.
        pin: PinId,
    },
    /// A device spanning two pins, e.g. an NFC antenna.
    Pair {
        /// First pin.
        pin_a: PinId,
        /// Second pin.
        pin_b: PinId,
    },
}

/// A logical on-board device such as `LED1`, `BTN1` or `NFC`.
///
/// A device is written either as `{ pin: D17 }` or as
/// `{ pin_a: D9, pin_b: D10 }`, mixing both forms is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DeviceRecord")]
pub struct Device {
    /// Where the device is connected.
    #[serde(flatten)]
    pub pins: DevicePins,
    /// State the pin is put into at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinstate: Option<PinState>,
    /// Not available in the bootloader, e.g. when the board may be a bare
    /// module without that peripheral.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_bootloader: bool,
}

impl Device {
    /// A device on a single pin.
    pub fn single(pin: PinId) -> Self {
        Device {
            pins: DevicePins::Single { pin },
            pinstate: None,
            no_bootloader: false,
        }
    }

    /// A device on two pins.
    pub fn pair(pin_a: PinId, pin_b: PinId) -> Self {
        Device {
            pins: DevicePins::Pair { pin_a, pin_b },
            pinstate: None,
            no_bootloader: false,
        }
    }

    /// The pins referenced by this device.
    pub fn pins(&self) -> impl Iterator<Item = PinId> {
        let pins = match self.pins {
            DevicePins::Single { pin } => [Some(pin), None],
            DevicePins::Pair { pin_a, pin_b } => [Some(pin_a), Some(pin_b)],
        };
        pins.into_iter().flatten()
    }
}

/// A device as written in a board description, before the pin form is
/// checked.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceRecord {
    pin: Option<PinId>,
    pin_a: Option<PinId>,
    pin_b: Option<PinId>,
    pinstate: Option<PinState>,
    #[serde(default)]
    no_bootloader: bool,
}

impl TryFrom<DeviceRecord> for Device {
    type Error = Error;

    fn try_from(record: DeviceRecord) -> Result<Self, Self::Error> {
        let pins = match (record.pin, record.pin_a, record.pin_b) {
            (Some(pin), None, None) => DevicePins::Single { pin },
            (None, Some(pin_a), Some(pin_b)) => DevicePins::Pair { pin_a, pin_b },
            (pin, pin_a, pin_b) => {
                let found = [("pin", pin), ("pin_a", pin_a), ("pin_b", pin_b)]
                    .into_iter()
                    .filter(|(_, id)| id.is_some())
                    .map(|(key, _)| key)
                    .collect::<Vec<_>>();
                let found = if found.is_empty() {
                    "no pin".to_string()
                } else {
                    found.join(" and ")
                };
                return Err(Error::InvalidDevicePins(found));
            }
        };

        Ok(Device {
            pins,
            pinstate: record.pinstate,
            no_bootloader: record.no_bootloader,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pin_with_state() {
        let device: Device = serde_yaml::from_str("{ pin: D14, pinstate: IN_PULLDOWN }").unwrap();
        assert_eq!(device.pins, DevicePins::Single { pin: PinId::d(14) });
        assert_eq!(device.pinstate, Some(PinState::InPulldown));
        assert!(!device.no_bootloader);
        assert_eq!(device.pins().collect::<Vec<_>>(), vec![PinId::d(14)]);
    }

    #[test]
    fn pin_pair() {
        let device: Device = serde_yaml::from_str("{ pin_a: D9, pin_b: D10 }").unwrap();
        assert_eq!(device, Device::pair(PinId::d(9), PinId::d(10)));
        assert_eq!(
            device.pins().collect::<Vec<_>>(),
            vec![PinId::d(9), PinId::d(10)]
        );
    }

    #[test]
    fn optional_fields_are_omitted() {
        let value = serde_json::to_value(Device::single(PinId::d(17))).unwrap();
        assert_eq!(value, serde_json::json!({ "pin": "D17" }));

        let mut device = Device::single(PinId::d(18));
        device.no_bootloader = true;
        let value = serde_json::to_value(device).unwrap();
        assert_eq!(value, serde_json::json!({ "pin": "D18", "no_bootloader": true }));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let error = serde_yaml::from_str::<Device>("{ pin: D18, no_bootlaoder: true }")
            .unwrap_err()
            .to_string();
        assert!(error.contains("unknown field `no_bootlaoder`"), "{error}");
    }

    #[test]
    fn mixed_pin_forms_are_rejected() {
        let cases = [
            ("{ pin: D9, pin_b: D10 }", "pin and pin_b"),
            ("{ pin: D9, pin_a: D9, pin_b: D10 }", "pin and pin_a and pin_b"),
            ("{ pin_a: D9 }", "pin_a"),
            ("{ pinstate: IN }", "no pin"),
        ];

        for (yaml, found) in cases {
            let error = serde_yaml::from_str::<Device>(yaml).unwrap_err().to_string();
            assert!(
                error.contains(&Error::InvalidDevicePins(found.to_string()).to_string()),
                "{yaml}: {error}"
            );
        }
    }
}
