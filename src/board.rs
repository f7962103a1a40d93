//! Occupancy grid that pieces are packed into.
//!
//! The grid is a flat row-major vector where each cell is either empty or
//! holds the label of the piece covering it.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::InvalidDimensions;
use crate::pieces::Piece;

/// Character used for empty cells when rendering.
pub const EMPTY: char = '.';

/// A mutable packing board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<char>>,
    placed: usize,
}

impl Board {
    /// Allocates an empty board. Both dimensions must be positive.
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidDimensions> {
        if width == 0 || height == 0 {
            return Err(InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width * height],
            placed: 0,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pieces currently on the board.
    #[inline]
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Label at `(x, y)`, or `None` if the cell is empty or out of bounds.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            self.cells[self.index(x, y)]
        } else {
            None
        }
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// True if every cell of `piece` offset by `(x, y)` is in bounds and empty.
    pub fn can_place(&self, piece: &Piece, x: usize, y: usize) -> bool {
        piece.points.iter().all(|point| {
            let (cell_x, cell_y) = (x + point.x, y + point.y);
            cell_x < self.width
                && cell_y < self.height
                && self.cells[self.index(cell_x, cell_y)].is_none()
        })
    }

    /// Writes the piece's label into its cells.
    ///
    /// The caller must have checked [`Board::can_place`] for the same arguments.
    pub fn place(&mut self, piece: &Piece, x: usize, y: usize) {
        debug_assert!(self.can_place(piece, x, y));
        for point in &piece.points {
            let index = self.index(x + point.x, y + point.y);
            self.cells[index] = Some(piece.label);
        }
        self.placed += 1;
    }

    /// Clears the cells written by the matching [`Board::place`] call.
    pub fn remove(&mut self, piece: &Piece, x: usize, y: usize) {
        for point in &piece.points {
            let index = self.index(x + point.x, y + point.y);
            debug_assert_eq!(self.cells[index], Some(piece.label));
            self.cells[index] = None;
        }
        self.placed -= 1;
    }

    /// Places a piece for the lifetime of the returned guard.
    ///
    /// The piece is removed again when the guard is dropped, unless
    /// [`Placement::commit`] was called.
    pub fn place_scoped<'b, 'p>(
        &'b mut self,
        piece: &'p Piece,
        x: usize,
        y: usize,
    ) -> Placement<'b, 'p> {
        self.place(piece, x, y);
        Placement {
            board: self,
            piece,
            x,
            y,
            committed: false,
        }
    }

    /// Renders the grid row-major: `.` for empty cells, labels otherwise,
    /// rows joined by `\n` with no trailing newline.
    pub fn serialize(&self) -> String {
        let mut output = String::with_capacity(self.height * (self.width + 1));
        for (row_index, row) in self.cells.chunks(self.width).enumerate() {
            if row_index > 0 {
                output.push('\n');
            }
            output.extend(row.iter().map(|cell| cell.unwrap_or(EMPTY)));
        }
        output
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// A piece held on the board for one branch of the search.
///
/// Dereferences to the board so deeper branches can keep placing pieces.
pub struct Placement<'b, 'p> {
    board: &'b mut Board,
    piece: &'p Piece,
    x: usize,
    y: usize,
    committed: bool,
}

impl Placement<'_, '_> {
    /// Keeps the piece on the board when the guard goes away.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Deref for Placement<'_, '_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Placement<'_, '_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Placement<'_, '_> {
    fn drop(&mut self) {
        if !self.committed {
            self.board.remove(self.piece, self.x, self.y);
        }
    }
}
