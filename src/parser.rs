//! Splits raw input text into 4x4 character blocks.
//!
//! The input follows a 5-line cadence: four block rows, then one blank
//! separator line. The last block may end at end-of-input, and blank lines
//! after the last block are ignored.

use tracing::debug;

use crate::error::FormatError;

/// Side length of a block, in characters.
pub const BLOCK_SIZE: usize = 4;

/// Lines per block including the separator.
const CADENCE: usize = BLOCK_SIZE + 1;

/// One 4x4 block exactly as it appeared in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock {
    /// Zero-based position of the block in the input, used for labeling.
    pub index: usize,
    /// 1-based line number of the block's first row.
    pub first_line: usize,
    /// Rows of `#` and `.` bytes, top to bottom.
    pub rows: [[u8; BLOCK_SIZE]; BLOCK_SIZE],
}

impl RawBlock {
    /// Builds a block from four row strings. Intended for tests and
    /// programmatic callers; no character validation is done.
    pub fn from_rows(index: usize, rows: [&str; BLOCK_SIZE]) -> Self {
        let mut cells = [[b'.'; BLOCK_SIZE]; BLOCK_SIZE];
        for (dest, row) in cells.iter_mut().zip(rows) {
            for (cell, byte) in dest.iter_mut().zip(row.bytes()) {
                *cell = byte;
            }
        }
        Self {
            index,
            first_line: index * CADENCE + 1,
            rows: cells,
        }
    }

    /// Iterates over `(x, y)` of every `#` cell in row-major order.
    pub fn marks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell == b'#')
                .map(move |(x, _)| (x, y))
        })
    }
}

/// Parses the whole input into blocks, failing on the first malformed line.
pub fn parse_blocks(input: &[u8]) -> Result<Vec<RawBlock>, FormatError> {
    let lines: Vec<&[u8]> = input
        .split(|&byte| byte == b'\n')
        .map(<[u8]>::trim_ascii)
        .collect();

    // everything after the last non-blank line is trailing padding
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);

    let mut blocks = Vec::new();
    let mut rows = [[0u8; BLOCK_SIZE]; BLOCK_SIZE];
    let mut filled = 0;

    for (line_index, &line) in lines[..end].iter().enumerate() {
        let line_number = line_index + 1;

        if line_index % CADENCE == BLOCK_SIZE {
            if !line.is_empty() {
                check_characters(line, line_number)?;
                return Err(FormatError::MissingSeparator { line: line_number });
            }
            continue;
        }

        if line.is_empty() {
            return Err(FormatError::IncompleteBlock {
                line: line_number,
                block: blocks.len(),
                rows: filled,
            });
        }
        check_characters(line, line_number)?;
        if line.len() != BLOCK_SIZE {
            return Err(FormatError::LineLength {
                line: line_number,
                found: line.len(),
            });
        }

        rows[filled].copy_from_slice(line);
        filled += 1;

        if filled == BLOCK_SIZE {
            blocks.push(RawBlock {
                index: blocks.len(),
                first_line: line_number + 1 - BLOCK_SIZE,
                rows,
            });
            filled = 0;
        }
    }

    if filled > 0 {
        return Err(FormatError::IncompleteBlock {
            line: end,
            block: blocks.len(),
            rows: filled,
        });
    }

    debug!(blocks = blocks.len(), lines = end, "parsed input");
    Ok(blocks)
}

/// Rejects any byte other than `#` or `.`.
fn check_characters(line: &[u8], line_number: usize) -> Result<(), FormatError> {
    match line.iter().position(|&byte| byte != b'#' && byte != b'.') {
        None => Ok(()),
        Some(column) => {
            // decode the offending character so multi-byte input reports sensibly
            let found = std::str::from_utf8(&line[column..])
                .ok()
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            Err(FormatError::InvalidCharacter {
                line: line_number,
                column: column + 1,
                found,
            })
        }
    }
}
