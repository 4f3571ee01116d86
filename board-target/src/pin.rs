use crate::{Error, PinFunction};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// The GPIO port used by chips with a single flat pin namespace.
pub const DEFAULT_PORT: char = 'D';

/// Identifies a physical pin of the microcontroller.
///
/// Two textual forms exist. The short form `D17` is what board authors use
/// for devices and connector layouts, the full form `PD17` is the name under
/// which the pin is stored in a [`PinSet`]. Both parse to the same value,
/// `Display` writes the short form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId {
    port: char,
    number: u8,
}

impl PinId {
    /// Creates an identifier for pin `number` of `port`.
    pub const fn new(port: char, number: u8) -> Self {
        PinId { port, number }
    }

    /// Pin `number` on the default `D` port.
    pub const fn d(number: u8) -> Self {
        PinId::new(DEFAULT_PORT, number)
    }

    /// The port letter.
    pub fn port(&self) -> char {
        self.port
    }

    /// The pin number within the port.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// The full name used to index the pin collection, e.g. `PD17`.
    pub fn name(&self) -> String {
        format!("P{}{}", self.port, self.number)
    }

    /// The name used to order pins in generated documentation, e.g. `D05`.
    pub fn sorting_name(&self) -> String {
        format!("{}{:02}", self.port, self.number)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.port, self.number)
    }
}

impl FromStr for PinId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPinId(s.to_string());

        // `PD17` carries an explicit `P` prefix in front of the port letter.
        let short = match s.as_bytes() {
            [b'P', port, ..] if port.is_ascii_uppercase() => &s[1..],
            _ => s,
        };

        let mut chars = short.chars();
        let port = chars
            .next()
            .filter(char::is_ascii_uppercase)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number = digits.parse().map_err(|_| invalid())?;

        Ok(PinId { port, number })
    }
}

impl Serialize for PinId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PinId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single pin and the alternate functions it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PinRecord", try_from = "PinRecord")]
pub struct Pin {
    id: PinId,
    /// Function name to selector value.
    pub functions: BTreeMap<PinFunction, u8>,
    /// Extra free-form columns shown in the pin documentation.
    pub csv: IndexMap<String, String>,
}

impl Pin {
    /// A plain GPIO without any alternate functions.
    pub fn new(id: PinId) -> Self {
        Pin {
            id,
            functions: BTreeMap::new(),
            csv: IndexMap::new(),
        }
    }

    /// The identifier of this pin.
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Returns whether `function` is assigned to this pin.
    pub fn has_function(&self, function: &PinFunction) -> bool {
        self.functions.contains_key(function)
    }

    /// Returns whether the pin is marked as active-low.
    pub fn is_negated(&self) -> bool {
        self.has_function(&PinFunction::Negated)
    }
}

/// Serialized shape of a [`Pin`], as consumed by the documentation and
/// header generators.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PinRecord {
    name: String,
    sortingname: String,
    port: String,
    num: String,
    #[serde(default)]
    functions: BTreeMap<PinFunction, u8>,
    #[serde(default)]
    csv: IndexMap<String, String>,
}

impl From<Pin> for PinRecord {
    fn from(pin: Pin) -> Self {
        PinRecord {
            name: pin.id.name(),
            sortingname: pin.id.sorting_name(),
            port: pin.id.port.to_string(),
            num: pin.id.number.to_string(),
            functions: pin.functions,
            csv: pin.csv,
        }
    }
}

impl TryFrom<PinRecord> for Pin {
    type Error = Error;

    fn try_from(record: PinRecord) -> Result<Self, Self::Error> {
        Ok(Pin {
            id: record.name.parse()?,
            functions: record.functions,
            csv: record.csv,
        })
    }
}

/// The pins of a chip, indexed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    pins: IndexMap<PinId, Pin>,
}

impl PinSet {
    /// Generates plain GPIOs for every pin number in `range` on `port`.
    ///
    /// `generate_pins(0..=31, 'D')` produces the 32 GPIOs `PD0` to `PD31`.
    pub fn generate_pins(range: RangeInclusive<u8>, port: char) -> Self {
        let pins = range
            .map(|number| {
                let id = PinId::new(port, number);
                (id, Pin::new(id))
            })
            .collect::<IndexMap<_, _>>();

        tracing::debug!("Generated {} pins for port {}", pins.len(), port);

        PinSet { pins }
    }

    /// Looks up a pin, returning `None` if it is not part of the set.
    pub fn find_pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    /// Mutable variant of [`PinSet::find_pin`].
    pub fn find_pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pins.get_mut(&id)
    }

    /// Looks up a pin that must exist.
    ///
    /// A missing pin means the board description does not match the chip,
    /// which is reported as [`Error::PinNotFound`].
    pub fn find_existing_pin_mut(&mut self, id: PinId) -> Result<&mut Pin, Error> {
        self.pins.get_mut(&id).ok_or_else(|| Error::PinNotFound {
            id,
            context: "pin lookup".to_string(),
        })
    }

    /// Returns whether a pin with the given identifier exists.
    pub fn contains(&self, id: PinId) -> bool {
        self.pins.contains_key(&id)
    }

    /// Iterates over the pins in generation order.
    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// Iterates mutably over the pins in generation order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pin> {
        self.pins.values_mut()
    }

    /// Number of pins in the set.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl Serialize for PinSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.pins.values())
    }
}

impl<'de> Deserialize<'de> for PinSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut pins = IndexMap::new();
        for pin in Vec::<Pin>::deserialize(deserializer)? {
            let id = pin.id;
            if pins.insert(id, pin).is_some() {
                return Err(serde::de::Error::custom(Error::DuplicatePin(id)));
            }
        }

        Ok(PinSet { pins })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_form() {
        assert_eq!("D17".parse::<PinId>().unwrap(), PinId::d(17));
    }

    #[test]
    fn parse_full_form() {
        assert_eq!("PD0".parse::<PinId>().unwrap(), PinId::d(0));
        assert_eq!("PA12".parse::<PinId>().unwrap(), PinId::new('A', 12));
    }

    #[test]
    fn parse_rejects_labels() {
        for label in ["", "GND", "DEC4", "3.3", "Vin", "D", "d5", "D1x", "D256"] {
            assert_eq!(
                label.parse::<PinId>(),
                Err(Error::InvalidPinId(label.to_string())),
                "{label}"
            );
        }
    }

    #[test]
    fn names() {
        let id = PinId::d(5);
        assert_eq!(id.to_string(), "D5");
        assert_eq!(id.name(), "PD5");
        assert_eq!(id.sorting_name(), "D05");
    }

    #[test]
    fn generate_range() {
        let pins = PinSet::generate_pins(0..=31, DEFAULT_PORT);
        assert_eq!(pins.len(), 32);
        assert!(pins.contains(PinId::d(0)));
        assert!(pins.contains(PinId::d(31)));
        assert!(!pins.contains(PinId::d(32)));
        assert!(pins.iter().all(|pin| pin.functions.is_empty()));
    }

    #[test]
    fn must_exist_lookup_fails_for_missing_pin() {
        let mut pins = PinSet::generate_pins(0..=31, DEFAULT_PORT);
        let error = pins.find_existing_pin_mut(PinId::d(99)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Pin D99 referenced by pin lookup does not exist on this chip."
        );
    }

    #[test]
    fn pin_record_shape() {
        let mut pin = Pin::new(PinId::d(6));
        pin.functions.insert(PinFunction::Negated, 0);
        let value = serde_json::to_value(&pin).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "PD6",
                "sortingname": "D06",
                "port": "D",
                "num": "6",
                "functions": { "NEGATED": 0 },
                "csv": {},
            })
        );

        let back: Pin = serde_json::from_value(value).unwrap();
        assert_eq!(back, pin);
    }

    #[test]
    fn duplicate_pins_are_rejected() {
        let pins = PinSet::generate_pins(3..=3, DEFAULT_PORT);
        let record = serde_json::to_value(&pins).unwrap();
        let twice = serde_json::json!([record[0], record[0]]);

        let error = serde_json::from_value::<PinSet>(twice)
            .unwrap_err()
            .to_string();
        assert_eq!(error, "Pin D3 appears more than once.");

        let once: PinSet = serde_json::from_value(record).unwrap();
        assert_eq!(once, pins);
    }
}
