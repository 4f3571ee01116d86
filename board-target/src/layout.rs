use crate::PinId;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A physical edge of a board picture, pins are listed left to right or
/// top to bottom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Left edge.
    Left,
    /// Second column on the left.
    Left2,
    /// Right edge.
    Right,
    /// Second column on the right.
    Right2,
    /// Top edge.
    Top,
    /// Second row on the top.
    Top2,
    /// Bottom edge.
    Bottom,
    /// Second row on the bottom.
    Bottom2,
}

/// One position on a connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorPosition {
    /// A physical position without anything connected.
    Blank,
    /// A GPIO of the chip.
    Pin(PinId),
    /// Anything else, e.g. `GND`, `VDD`, `3.3` or `SWDIO`.
    Label(String),
}

impl ConnectorPosition {
    /// The pin at this position, if any.
    pub fn pin(&self) -> Option<PinId> {
        match self {
            ConnectorPosition::Pin(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&str> for ConnectorPosition {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            ConnectorPosition::Blank
        } else if let Ok(id) = s.parse() {
            ConnectorPosition::Pin(id)
        } else {
            ConnectorPosition::Label(s.to_string())
        }
    }
}

impl fmt::Display for ConnectorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorPosition::Blank => Ok(()),
            ConnectorPosition::Pin(id) => write!(f, "{id}"),
            ConnectorPosition::Label(label) => f.write_str(label),
        }
    }
}

impl Serialize for ConnectorPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConnectorPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ConnectorPosition::from(s.as_str()))
    }
}

/// How a board's connectors are drawn in the documentation.
///
/// A board can have several layouts, e.g. the bare module and a breakout
/// board carrying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorLayout {
    /// Positions along each edge.
    #[serde(flatten)]
    pub edges: IndexMap<Edge, Vec<ConnectorPosition>>,
    /// Extra text shown next to a pin.
    #[serde(rename = "_notes", default, skip_serializing_if = "IndexMap::is_empty")]
    pub notes: IndexMap<PinId, String>,
    /// Only list pins that are present on a connector.
    #[serde(
        rename = "_hide_not_on_connectors",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hide_not_on_connectors: Option<bool>,
    /// CSS class of the board picture.
    #[serde(rename = "_class", default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Style sheet positioning the connectors over the board picture.
    #[serde(rename = "_css", default)]
    pub css: String,
}

impl ConnectorLayout {
    /// All pins on the connectors, in edge order.
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.edges
            .values()
            .flatten()
            .filter_map(ConnectorPosition::pin)
    }

    /// Returns whether `id` is present on any connector.
    pub fn is_on_connector(&self, id: PinId) -> bool {
        self.pins().any(|pin| pin == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"
left: [GND, '', D25, DEC4]
right2: [D24, '', D23]
_notes:
  D21: Also NRST if configured
_hide_not_on_connectors: true
_class: board_breakout
_css: |
  #board { width: 359px; }
"#;

    #[test]
    fn positions_keep_their_kind() {
        let layout: ConnectorLayout = serde_yaml::from_str(LAYOUT).unwrap();
        assert_eq!(
            layout.edges[&Edge::Left],
            vec![
                ConnectorPosition::Label("GND".to_string()),
                ConnectorPosition::Blank,
                ConnectorPosition::Pin(PinId::d(25)),
                ConnectorPosition::Label("DEC4".to_string()),
            ]
        );
        assert_eq!(
            layout.pins().collect::<Vec<_>>(),
            vec![PinId::d(25), PinId::d(24), PinId::d(23)]
        );
        assert!(layout.is_on_connector(PinId::d(23)));
        assert!(!layout.is_on_connector(PinId::d(21)));
        assert_eq!(layout.notes[&PinId::d(21)], "Also NRST if configured");
    }

    #[test]
    fn written_back_with_blank_placeholders() {
        let layout: ConnectorLayout = serde_yaml::from_str(LAYOUT).unwrap();
        let value = serde_json::to_value(&layout).unwrap();

        assert_eq!(value["left"], serde_json::json!(["GND", "", "D25", "DEC4"]));
        assert_eq!(value["right2"], serde_json::json!(["D24", "", "D23"]));
        assert_eq!(value["_notes"]["D21"], "Also NRST if configured");
        assert_eq!(value["_hide_not_on_connectors"], true);
        assert_eq!(value["_class"], "board_breakout");
        assert_eq!(value["_css"], "#board { width: 359px; }\n");
    }
}
