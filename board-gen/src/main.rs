mod commands {
    pub mod check;
    pub mod export;
    pub mod list;
    pub mod pins;
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use board_target::{AnnotationPolicy, BoardDescription, Registry};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::commands::export::OutputFormat;

#[derive(clap::Parser)]
#[clap(
    name = "board-gen",
    about = "Checks board descriptions and exports annotated pin tables."
)]
struct Cli {
    /// Print every annotation as it is applied.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Lists the built-in boards.
    List,
    /// Prints the annotated pin table of a board.
    Pins {
        #[clap(flatten)]
        board: BoardSelection,
        /// Only list the pins drawn on this connector layout, if the layout
        /// hides pins that are not on a connector.
        #[arg(long, value_name = "INDEX")]
        layout: Option<usize>,
    },
    /// Loads a board description file and checks that every pin it references exists.
    Check {
        /// The board description file.
        path: PathBuf,
    },
    /// Writes the resolved board record.
    Export {
        #[clap(flatten)]
        board: BoardSelection,
        /// Format of the written record.
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
        /// Where to write the record. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Which board to work on and how to annotate it.
#[derive(clap::Args)]
struct BoardSelection {
    /// Name of the board, e.g. `E73TRM01`. With `--file`, the name is taken from the file.
    #[arg(required_unless_present = "file")]
    board: Option<String>,
    /// Load the board from a description file instead of the built-in boards.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Fail if an annotation would overwrite a different selector value or
    /// put a second peripheral function on a pin.
    #[arg(long)]
    strict: bool,
}

impl BoardSelection {
    fn policy(&self) -> AnnotationPolicy {
        if self.strict {
            AnnotationPolicy::Strict
        } else {
            AnnotationPolicy::Overwrite
        }
    }

    fn load(&self) -> Result<BoardDescription> {
        let mut registry = Registry::from_builtin_boards()?;

        if let Some(path) = &self.file {
            return load_file(&mut registry, path);
        }

        // Guaranteed by clap, one of `board` and `--file` is present.
        let name = self.board.as_deref().unwrap_or_default();
        let board = registry
            .get_board(name)
            .with_context(|| format!("Failed to select board '{name}'."))?;

        Ok(board.description.clone())
    }
}

fn load_file(registry: &mut Registry, path: &Path) -> Result<BoardDescription> {
    let board = registry
        .add_board_from_yaml(path)
        .with_context(|| format!("Failed to load board description {}.", path.display()))?;

    Ok(board.description.clone())
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .parse_lossy("")
    } else {
        // No explicit level, use RUST_LOG or fall back to WARN.
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };

    tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("\nError:");
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::List => commands::list::cmd_list()?,
        Command::Pins { board, layout } => {
            commands::pins::cmd_pins(&board.load()?, board.policy(), layout)?
        }
        Command::Check { path } => commands::check::cmd_check(&path)?,
        Command::Export {
            board,
            format,
            output,
        } => commands::export::cmd_export(
            &board.load()?,
            board.policy(),
            format,
            output.as_deref(),
        )?,
    }

    Ok(())
}
