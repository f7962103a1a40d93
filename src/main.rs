//! Tetromino Packer
//!
//! Reads a file of 4x4 piece blocks, validates every piece, and prints the
//! smallest square (or rectangle) packing the search finds.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tetrofit::config::MAX_DIM;
use tetrofit::{BoardShape, Config, ShapeRules, ShapeWhitelist, SolverConfig};

/// Required extension of input files.
const INPUT_EXTENSION: &str = "txt";

/// `--shapes` value that accepts every tetromino family.
const ALL_FAMILIES: &str = "all";

/// Packs tetromino pieces into the smallest board it can find.
#[derive(Parser)]
#[command(name = "tetrofit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack the pieces and print the grid.
    Solve(Args),
    /// Validate the pieces without packing them.
    Check(Args),
}

#[derive(clap::Args)]
struct Args {
    /// Input file with .txt extension.
    file: PathBuf,

    /// Allow pieces to be turned in quarter steps.
    #[arg(long)]
    rotate: bool,

    /// Search rectangular boards instead of only square ones.
    #[arg(long)]
    rectangle: bool,

    /// Largest board side to try.
    #[arg(long, default_value_t = MAX_DIM)]
    max_dim: usize,

    /// Give up after this many placements.
    #[arg(long)]
    node_budget: Option<u64>,

    /// Give up after this many milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Only accept these tetromino families, e.g. "IOT", or "all".
    #[arg(long, value_parser = parse_shapes)]
    shapes: Option<ShapeWhitelist>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            shapes: ShapeRules {
                whitelist: self.shapes.clone(),
            },
            solver: SolverConfig {
                rotation: self.rotate,
                board_shape: if self.rectangle {
                    BoardShape::Rectangle
                } else {
                    BoardShape::Square
                },
                max_dim: self.max_dim,
                node_budget: self.node_budget,
                time_limit: self.time_limit_ms.map(Duration::from_millis),
            },
        }
    }
}

fn parse_shapes(letters: &str) -> Result<ShapeWhitelist, String> {
    if letters.trim().eq_ignore_ascii_case(ALL_FAMILIES) {
        return Ok(ShapeWhitelist::all_families());
    }
    ShapeWhitelist::from_families(letters).map_err(|letter| {
        format!("unknown tetromino family '{letter}', expected letters from IOTSZJL")
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only the grid.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Executes a command and returns the text to print.
fn run(command: &Command) -> anyhow::Result<String> {
    match command {
        Command::Solve(args) => {
            let input = read_input(&args.file)?;
            let solution = tetrofit::solve_input(&input, &args.config())?;
            let (width, height) = solution.dimensions();
            info!(width, height, nodes = solution.nodes, "solved");
            Ok(solution.to_string())
        }
        Command::Check(args) => {
            let input = read_input(&args.file)?;
            let pieces = tetrofit::read_pieces(&input, &args.config().shapes)?;
            Ok(describe_pieces(&pieces))
        }
    }
}

/// One line per piece: label and bounding box.
fn describe_pieces(pieces: &[tetrofit::Piece]) -> String {
    if pieces.is_empty() {
        return "no pieces".to_string();
    }
    pieces
        .iter()
        .map(|piece| format!("{}: {}x{}", piece.label, piece.width, piece.height))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Checks the extension and existence of the file, then reads it whole.
fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(INPUT_EXTENSION) {
        bail!("file must have .{INPUT_EXTENSION} extension");
    }
    if !path.is_file() {
        bail!("file '{}' does not exist", path.display());
    }
    std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}
