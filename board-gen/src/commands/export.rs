use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use board_target::{AnnotationPolicy, Board, BoardDescription};

/// Serialization format of the exported record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// YAML document.
    Yaml,
    /// Pretty printed JSON.
    Json,
}

/// Resolves a board and writes the record to `output`, or stdout.
pub fn cmd_export(
    description: &BoardDescription,
    policy: AnnotationPolicy,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let board = description
        .resolve(policy)
        .with_context(|| format!("Failed to resolve board {}.", description.info.name))?;

    let serialized = serialize(&board, format)?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create file '{}'.", path.display()))?;
            file.write_all(serialized.as_bytes())?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{serialized}"),
    }

    Ok(())
}

fn serialize(board: &Board, format: OutputFormat) -> Result<String> {
    let serialized = match format {
        OutputFormat::Yaml => serde_yaml::to_string(board)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(board)?;
            json.push('\n');
            json
        }
    };

    Ok(serialized)
}
