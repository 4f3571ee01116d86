//! Board descriptions known to the generators.

use crate::{BoardDescription, Error};
use std::fs::File;
use std::path::Path;

/// Board descriptions compiled into the crate, by identifier.
const BUILTIN_BOARDS: &[(&str, &str)] = &[(
    "E73TRM01",
    include_str!("../boards/E73TRM01.yaml"),
)];

/// Errors while looking up or loading board descriptions.
#[derive(thiserror::Error, Debug, docsplay::Display)]
pub enum RegistryError {
    /// No board named '{0}' is known.
    BoardNotFound(String),

    /// Failed to read a board description.
    Io(#[from] std::io::Error),

    /// Failed to parse a board description.
    Yaml(#[from] serde_yaml::Error),

    /// Board '{0}' is invalid.
    Board(String, #[source] Error),
}

/// A named board description.
#[derive(Debug, Clone)]
pub struct RegisteredBoard {
    /// Identifier of the board, e.g. `E73TRM01`.
    pub identifier: String,
    /// The description.
    pub description: BoardDescription,
}

/// The set of board descriptions available to the generators.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    boards: Vec<RegisteredBoard>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the board descriptions built into the crate.
    pub fn from_builtin_boards() -> Result<Self, RegistryError> {
        let mut registry = Registry::new();

        for (identifier, yaml) in BUILTIN_BOARDS {
            let description = BoardDescription::from_yaml_str(yaml)?;
            registry.add_board(identifier, description)?;
        }

        Ok(registry)
    }

    /// All registered boards.
    pub fn boards(&self) -> &[RegisteredBoard] {
        &self.boards
    }

    /// Looks up a board by identifier or by its display name, ignoring case.
    pub fn get_board(&self, name: &str) -> Result<&RegisteredBoard, RegistryError> {
        self.boards
            .iter()
            .find(|board| {
                board.identifier.eq_ignore_ascii_case(name)
                    || board.description.info.name.eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| RegistryError::BoardNotFound(name.to_string()))
    }

    /// Validates and adds a board, replacing a board with the same identifier.
    pub fn add_board(
        &mut self,
        identifier: &str,
        description: BoardDescription,
    ) -> Result<(), RegistryError> {
        description
            .validate()
            .map_err(|error| RegistryError::Board(identifier.to_string(), error))?;

        if let Some(index) = self
            .boards
            .iter()
            .position(|board| board.identifier == identifier)
        {
            tracing::debug!("Replacing board {identifier}");
            self.boards.remove(index);
        }

        self.boards.push(RegisteredBoard {
            identifier: identifier.to_string(),
            description,
        });

        Ok(())
    }

    /// Loads a board description file. The file stem becomes the identifier.
    pub fn add_board_from_yaml(&mut self, path: &Path) -> Result<&RegisteredBoard, RegistryError> {
        let file = File::open(path)?;
        let description = BoardDescription::from_yaml_reader(file)?;

        let identifier = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| description.info.name.clone());

        self.add_board(&identifier, description)?;
        self.get_board(&identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::AnnotationPolicy;
    use crate::{PinFunction, PinId};

    #[test]
    fn builtin_boards_load() {
        let registry = Registry::from_builtin_boards().unwrap();
        assert_eq!(registry.boards().len(), BUILTIN_BOARDS.len());
    }

    #[test]
    fn fetch_by_identifier_and_name() {
        let registry = Registry::from_builtin_boards().unwrap();
        assert!(registry.get_board("E73TRM01").is_ok());
        assert!(registry.get_board("e73trm01").is_ok());
        assert!(registry.get_board("E73-TRM-01").is_ok());
        assert!(matches!(
            registry.get_board("MDBT42Q"),
            Err(RegistryError::BoardNotFound(_))
        ));
    }

    #[test]
    fn e73trm01_saved_code() {
        let registry = Registry::from_builtin_boards().unwrap();
        let chip = registry
            .get_board("E73TRM01")
            .unwrap()
            .description
            .chip
            .chip()
            .unwrap();

        assert_eq!(chip.saved_code.address, (118 - 10) * 4096);
        assert_eq!(chip.saved_code.page_size, 4096);
        assert_eq!(chip.saved_code.pages, 10);
        assert_eq!(chip.saved_code.flash_available, 512 - (31 + 8 + 2 + 10) * 4);
    }

    #[test]
    fn e73trm01_pins() {
        let registry = Registry::from_builtin_boards().unwrap();
        let pins = registry
            .get_board("E73TRM01")
            .unwrap()
            .description
            .get_pins()
            .unwrap();

        assert_eq!(pins.len(), 32);
        assert!(pins
            .iter()
            .all(|pin| pin.has_function(&PinFunction::ThreeVoltOnly)));

        let negated = pins
            .iter()
            .filter(|pin| pin.is_negated())
            .map(|pin| pin.id())
            .collect::<Vec<_>>();
        assert_eq!(
            negated,
            vec![PinId::d(13), PinId::d(14), PinId::d(17), PinId::d(18)]
        );

        let d28 = pins.find_pin(PinId::d(28)).unwrap();
        assert!(d28.has_function(&PinFunction::Adc { unit: 1, channel: 4 }));
        assert_eq!(d28.functions.len(), 2);
    }

    #[test]
    fn e73trm01_resolves_strictly() {
        let registry = Registry::from_builtin_boards().unwrap();
        let description = &registry.get_board("E73TRM01").unwrap().description;

        let overwrite = description.resolve(AnnotationPolicy::Overwrite).unwrap();
        let strict = description.resolve(AnnotationPolicy::Strict).unwrap();
        assert_eq!(overwrite, strict);
    }

    #[test]
    fn strict_resolve_rejects_pin_shared_with_crystal() {
        let yaml = BUILTIN_BOARDS[0].1.replace(
            "    - { pin: D0, function: XL1 }",
            "    - { pin: D0, function: XL1 }\n    - { pin: D0, function: USART1_TX }",
        );
        let description = BoardDescription::from_yaml_str(&yaml).unwrap();

        let error = description.resolve(AnnotationPolicy::Strict).unwrap_err();
        assert_eq!(
            error,
            Error::FunctionConflict {
                id: PinId::d(0),
                function: "USART1_TX".parse().unwrap(),
                existing: PinFunction::Xl1,
            }
        );

        let board = description.resolve(AnnotationPolicy::Overwrite).unwrap();
        let d0 = board.pins.find_pin(PinId::d(0)).unwrap();
        assert!(d0.has_function(&PinFunction::Xl1));
        assert!(d0.has_function(&"USART1_TX".parse().unwrap()));
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        let yaml = BUILTIN_BOARDS[0].1.replace("LED1: { pin: D17 }", "LED1: { pin: D99 }");
        std::fs::write(&path, yaml).unwrap();

        let mut registry = Registry::new();
        let error = registry.add_board_from_yaml(&path).unwrap_err();
        assert_eq!(error.to_string(), "Board 'broken' is invalid.");
        assert!(registry.boards().is_empty());
    }

    #[test]
    fn file_replaces_builtin_board() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("E73TRM01.yaml");
        let yaml = BUILTIN_BOARDS[0].1.replace("variables: 2500", "variables: 3000");
        std::fs::write(&path, yaml).unwrap();

        let mut registry = Registry::from_builtin_boards().unwrap();
        registry.add_board_from_yaml(&path).unwrap();

        assert_eq!(registry.boards().len(), 1);
        assert_eq!(
            registry
                .get_board("E73TRM01")
                .unwrap()
                .description
                .info
                .variables,
            3000
        );
    }
}
