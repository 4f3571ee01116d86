use crate::PinId;
use serde::{Deserialize, Serialize};

/// Descriptive metadata of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardInfo {
    /// Human readable board name, e.g. `E73-TRM-01`.
    pub name: String,
    /// Links to the vendor's product pages.
    #[serde(default)]
    pub link: Vec<String>,
    /// Link to the board's page in the firmware documentation.
    #[serde(default)]
    pub espruino_page_link: String,
    /// Event source of the default console, e.g. `EV_SERIAL1`.
    pub default_console: String,
    /// Console transmit pin.
    pub default_console_tx: PinId,
    /// Console receive pin.
    pub default_console_rx: PinId,
    /// Console baud rate.
    #[serde(with = "crate::serialize::decimal_string")]
    pub default_console_baudrate: u32,
    /// How many variables the interpreter allocates.
    pub variables: u32,
    /// Whether the image is built with a bootloader.
    #[serde(default, with = "crate::serialize::flag")]
    pub bootloader: bool,
    /// File name of the firmware image, `%v` stands for the version.
    pub binary_name: String,
    /// Build settings.
    pub build: BuildConfig,
}

impl BoardInfo {
    /// The file name of the firmware image built for `version`.
    pub fn binary_name_for(&self, version: &str) -> String {
        self.binary_name.replace("%v", version)
    }
}

/// Compiler flags, libraries and makefile additions for a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Optimization flags passed to the compiler.
    pub optimizeflags: String,
    /// Firmware libraries to include, e.g. `BLUETOOTH` or `NFC`.
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Raw lines appended to the makefile.
    #[serde(default)]
    pub makefile: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"
name: Test board
default_console: EV_SERIAL1
default_console_tx: D6
default_console_rx: D8
default_console_baudrate: "9600"
variables: 2500
bootloader: 1
binary_name: espruino_%v_test.hex
build:
  optimizeflags: -Os
  libraries: [BLUETOOTH, NFC]
"#;

    #[test]
    fn parse_and_write_back() {
        let info: BoardInfo = serde_yaml::from_str(INFO).unwrap();
        assert_eq!(info.default_console_tx, PinId::d(6));
        assert_eq!(info.default_console_baudrate, 9600);
        assert!(info.bootloader);
        assert_eq!(info.build.libraries, vec!["BLUETOOTH", "NFC"]);

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["default_console_baudrate"], "9600");
        assert_eq!(value["bootloader"], 1);
        assert_eq!(value["default_console_rx"], "D8");
        assert_eq!(value["build"]["libraries"][1], "NFC");
    }

    #[test]
    fn baudrate_accepts_integers() {
        let yaml = INFO.replace("\"9600\"", "115200");
        let info: BoardInfo = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(info.default_console_baudrate, 115200);
    }

    #[test]
    fn binary_name_expands_version() {
        let info: BoardInfo = serde_yaml::from_str(INFO).unwrap();
        assert_eq!(info.binary_name_for("2v21"), "espruino_2v21_test.hex");
    }
}
