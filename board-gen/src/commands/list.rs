use anyhow::Result;
use board_target::Registry;
use colored::Colorize;

/// Prints the built-in boards and the chips they carry.
pub fn cmd_list() -> Result<()> {
    let registry = Registry::from_builtin_boards()?;

    println!("Available boards:");
    for board in registry.boards() {
        let description = &board.description;
        println!(
            "\t{} ({}, {})",
            board.identifier.as_str().bold(),
            description.info.name,
            description.chip.part
        );
    }

    Ok(())
}
