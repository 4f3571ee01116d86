use std::path::Path;

use anyhow::{Context, Result};
use board_target::Registry;
use colored::Colorize;

/// Loads a board description and validates every pin reference in it.
pub fn cmd_check(path: &Path) -> Result<()> {
    let mut registry = Registry::new();
    let board = registry
        .add_board_from_yaml(path)
        .with_context(|| format!("Failed to check board description {}.", path.display()))?;

    let description = &board.description;
    let pins = description.get_pins()?;
    let saved_code = description.chip.chip()?.saved_code;

    println!(
        "{} {} ({}): {} pins, {} devices, {} connector layouts, {} KB flash available",
        "Valid".green().bold(),
        board.identifier,
        description.info.name,
        pins.len(),
        description.devices.len(),
        description.boards.len(),
        saved_code.flash_available,
    );

    Ok(())
}
