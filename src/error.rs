//! Error taxonomy for parsing, validation, and packing.
//!
//! Every failure carries enough context (line number, block index, or the
//! bound that was exhausted) for the caller to act on it.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A malformed line in the input text. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}: unexpected character '{found}' at column {column}, expected '#' or '.'")]
    InvalidCharacter {
        line: usize,
        column: usize,
        found: char,
    },
    #[error("line {line}: expected 4 characters, found {found}")]
    LineLength { line: usize, found: usize },
    #[error("line {line}: expected a blank separator line")]
    MissingSeparator { line: usize },
    #[error("line {line}: block {block} has {rows} rows, expected 4")]
    IncompleteBlock {
        line: usize,
        block: usize,
        rows: usize,
    },
}

impl FormatError {
    /// The 1-based input line the error refers to.
    pub fn line(&self) -> usize {
        match *self {
            Self::InvalidCharacter { line, .. }
            | Self::LineLength { line, .. }
            | Self::MissingSeparator { line }
            | Self::IncompleteBlock { line, .. } => line,
        }
    }
}

/// Why a block failed shape validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeErrorKind {
    #[error("only {found} marked cells, expected 4")]
    TooFewMarks { found: usize },
    #[error("{found} marked cells, expected 4")]
    TooManyMarks { found: usize },
    #[error("marked cells are not connected")]
    Disconnected,
    #[error("shape is not in the allowed set")]
    NotWhitelisted,
    #[error("no label left, at most {max} pieces can be labeled")]
    Unlabeled { max: usize },
}

/// A block that parsed cleanly but does not describe one legal piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("block {block} (line {line}): {kind}")]
pub struct ShapeError {
    /// Zero-based block index.
    pub block: usize,
    /// 1-based line of the block's first row.
    pub line: usize,
    pub kind: ShapeErrorKind,
}

/// Non-positive board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid board dimensions {width}x{height}")]
pub struct InvalidDimensions {
    pub width: usize,
    pub height: usize,
}

/// Outcomes of a search that did not produce a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("no pieces to pack")]
    InputEmpty,
    /// The bounded candidate set was exhausted. Larger boards were never tried.
    #[error("no packing found on boards up to {max_dim}x{max_dim} (search bound reached)")]
    NoSolutionFound { max_dim: usize },
    #[error("search budget exhausted after {nodes} placements")]
    Timeout { nodes: u64 },
    #[error(transparent)]
    Dimensions(#[from] InvalidDimensions),
}

/// Any failure of the input-to-grid pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("{count} pieces given, at most {max} can be labeled")]
    TooManyPieces { count: usize, max: usize },
    #[error(transparent)]
    Pack(#[from] PackError),
}
