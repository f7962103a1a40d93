//! Piece definitions and shape validation.
//!
//! A piece is four cells forming one edge-connected shape, normalized so its
//! bounding box starts at the origin. Pieces are built from parsed blocks and
//! are immutable afterwards.

use std::cmp::Ordering;
use std::fmt;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{Error, ShapeError, ShapeErrorKind};
use crate::geometry::{all_rotations, extent, is_connected, normalize_to_origin};
use crate::parser::RawBlock;

/// Number of cells in every piece.
pub const CELLS: usize = 4;

/// Labels run from 'A' to 'Z', so at most 26 pieces can be packed.
pub const MAX_PIECES: usize = 26;

/// A cell offset within a piece's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

// row-major: the order cells are met when scanning a block
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The four cells of a piece, sorted row-major.
pub type Shape = [Point; CELLS];

/// A validated piece with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub label: char,
    pub points: Shape,
    pub width: usize,
    pub height: usize,
}

impl Piece {
    /// Creates a piece from a shape that is already known to be valid.
    ///
    /// The shape is normalized to the origin; connectivity is not checked.
    pub fn new(label: char, shape: Shape) -> Self {
        let points = normalize_to_origin(shape);
        let (width, height) = extent(&points);
        Self {
            label,
            points,
            width,
            height,
        }
    }

    /// Validates a raw block and turns it into a labeled piece.
    pub fn from_block(block: &RawBlock, rules: &ShapeRules) -> Result<Self, ShapeError> {
        let fail = |kind| ShapeError {
            block: block.index,
            line: block.first_line,
            kind,
        };

        let label = label_for(block.index)
            .ok_or_else(|| fail(ShapeErrorKind::Unlabeled { max: MAX_PIECES }))?;

        let marks: Vec<Point> = block.marks().map(|(x, y)| Point::new(x, y)).collect();
        let shape: Shape = match marks.len().cmp(&CELLS) {
            Ordering::Less => {
                return Err(fail(ShapeErrorKind::TooFewMarks { found: marks.len() }))
            }
            Ordering::Greater => {
                return Err(fail(ShapeErrorKind::TooManyMarks { found: marks.len() }))
            }
            Ordering::Equal => [marks[0], marks[1], marks[2], marks[3]],
        };

        if !is_connected(&shape) {
            return Err(fail(ShapeErrorKind::Disconnected));
        }

        let piece = Self::new(label, shape);
        if let Some(whitelist) = &rules.whitelist {
            if !whitelist.allows(&piece.points) {
                return Err(fail(ShapeErrorKind::NotWhitelisted));
            }
        }

        Ok(piece)
    }

    /// Bounding-box area.
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Every distinct rotation of this piece, identity first. All carry the
    /// same label.
    pub fn rotations(&self) -> Vec<Piece> {
        all_rotations(&self.points)
            .into_iter()
            .map(|shape| Piece::new(self.label, shape))
            .collect()
    }
}

impl fmt::Display for Piece {
    /// Renders the piece inside its bounding box using its label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width {
                let marked = self.points.contains(&Point::new(x, y));
                write!(f, "{}", if marked { self.label } else { '.' })?;
            }
        }
        Ok(())
    }
}

/// Label for the block at `index` ('A' for 0), or `None` past 'Z'.
pub fn label_for(index: usize) -> Option<char> {
    let offset = u8::try_from(index).ok().filter(|&i| usize::from(i) < MAX_PIECES)?;
    Some(char::from(b'A' + offset))
}

/// The seven tetromino families, each in one reference orientation.
///
/// Each entry is `(letter, cells)` with cells given as `(x, y)` pairs.
pub const TETROMINO_FAMILIES: &[(char, [(usize, usize); CELLS])] = &[
    // straight line
    ('I', [(0, 0), (0, 1), (0, 2), (0, 3)]),
    // square
    ('O', [(0, 0), (1, 0), (0, 1), (1, 1)]),
    ('T', [(0, 0), (1, 0), (2, 0), (1, 1)]),
    ('S', [(1, 0), (2, 0), (0, 1), (1, 1)]),
    ('Z', [(0, 0), (1, 0), (1, 1), (2, 1)]),
    ('J', [(1, 0), (1, 1), (0, 2), (1, 2)]),
    ('L', [(0, 0), (0, 1), (0, 2), (1, 2)]),
];

/// An immutable set of allowed shapes.
///
/// Stores every rotation of the chosen families, so a block is accepted in
/// any orientation of an allowed family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeWhitelist {
    shapes: FxHashSet<Shape>,
}

impl ShapeWhitelist {
    /// Whitelist of the named families, e.g. `"IOT"`. Letters are
    /// case-insensitive; unknown letters are returned as an error.
    pub fn from_families(letters: &str) -> Result<Self, char> {
        let mut shapes = FxHashSet::default();
        for letter in letters.chars().filter(|c| !c.is_whitespace()) {
            let upper = letter.to_ascii_uppercase();
            let (_, cells) = TETROMINO_FAMILIES
                .iter()
                .find(|(family, _)| *family == upper)
                .ok_or(letter)?;
            shapes.extend(family_rotations(cells));
        }
        Ok(Self { shapes })
    }

    /// Whitelist of all seven families (every connected four-cell shape).
    pub fn all_families() -> Self {
        let shapes = TETROMINO_FAMILIES
            .iter()
            .flat_map(|(_, cells)| family_rotations(cells))
            .collect();
        Self { shapes }
    }

    /// True if the normalized shape is in the set.
    pub fn allows(&self, shape: &Shape) -> bool {
        self.shapes.contains(&normalize_to_origin(*shape))
    }

    /// Number of distinct fixed shapes in the set.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn family_rotations(cells: &[(usize, usize); CELLS]) -> Vec<Shape> {
    all_rotations(&cells.map(|(x, y)| Point::new(x, y)))
}

/// Rules applied by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeRules {
    /// Restricts accepted shapes. `None` accepts any connected shape.
    pub whitelist: Option<ShapeWhitelist>,
}

/// Validates every block in order, stopping at the first bad one.
pub fn validate_blocks(blocks: &[RawBlock], rules: &ShapeRules) -> Result<Vec<Piece>, Error> {
    if blocks.len() > MAX_PIECES {
        return Err(Error::TooManyPieces {
            count: blocks.len(),
            max: MAX_PIECES,
        });
    }

    let pieces = blocks
        .iter()
        .map(|block| Piece::from_block(block, rules))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(pieces = pieces.len(), "validated pieces");
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(index: usize, rows: [&str; 4]) -> RawBlock {
        RawBlock::from_rows(index, rows)
    }

    fn validate(rows: [&str; 4]) -> Result<Piece, ShapeError> {
        Piece::from_block(&block(0, rows), &ShapeRules::default())
    }

    #[test]
    fn test_square_is_normalized() {
        let piece = validate(["....", ".##.", ".##.", "...."]).unwrap();
        assert_eq!(piece.label, 'A');
        assert_eq!(
            piece.points,
            [
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(1, 1)
            ]
        );
        assert_eq!((piece.width, piece.height), (2, 2));
    }

    #[test]
    fn test_vertical_line_dimensions() {
        let piece = Piece::from_block(
            &block(1, ["...#", "...#", "...#", "...#"]),
            &ShapeRules::default(),
        )
        .unwrap();
        assert_eq!(piece.label, 'B');
        assert_eq!((piece.width, piece.height), (1, 4));
    }

    #[test]
    fn test_l_shape() {
        let piece = validate(["#...", "#...", "##..", "...."]).unwrap();
        assert_eq!((piece.width, piece.height), (2, 3));
        assert_eq!(piece.to_string(), "A.\nA.\nAA");
    }

    #[test]
    fn test_too_few_marks_cites_block() {
        let err = Piece::from_block(
            &block(3, ["#...", "#...", "#...", "...."]),
            &ShapeRules::default(),
        )
        .unwrap_err();
        assert_eq!(err.block, 3);
        assert_eq!(err.kind, ShapeErrorKind::TooFewMarks { found: 3 });
    }

    #[test]
    fn test_too_many_marks() {
        let err = validate(["##..", "##..", "##..", "...."]).unwrap_err();
        assert_eq!(err.kind, ShapeErrorKind::TooManyMarks { found: 6 });
    }

    #[test]
    fn test_disconnected() {
        let err = validate(["#.#.", "....", "#.#.", "...."]).unwrap_err();
        assert_eq!(err.kind, ShapeErrorKind::Disconnected);

        let err = validate(["##..", "....", "..##", "...."]).unwrap_err();
        assert_eq!(err.kind, ShapeErrorKind::Disconnected);
    }

    #[test]
    fn test_every_family_in_every_rotation_is_accepted() {
        for (family, cells) in TETROMINO_FAMILIES {
            let shape = cells.map(|(x, y)| Point::new(x, y));
            for rotation in all_rotations(&shape) {
                assert!(is_connected(&rotation), "{family} rotation rejected");
            }
        }
    }

    #[test]
    fn test_all_families_cover_nineteen_fixed_shapes() {
        assert_eq!(ShapeWhitelist::all_families().len(), 19);
    }

    #[test]
    fn test_whitelist_rejects_other_families() {
        let rules = ShapeRules {
            whitelist: Some(ShapeWhitelist::from_families("io").unwrap()),
        };

        let line = Piece::from_block(&block(0, ["####", "....", "....", "...."]), &rules);
        assert!(line.is_ok(), "rotated I should be allowed");

        let err = Piece::from_block(&block(1, [".#..", "###.", "....", "...."]), &rules)
            .unwrap_err();
        assert_eq!(err.kind, ShapeErrorKind::NotWhitelisted);
        assert_eq!(err.block, 1);
    }

    #[test]
    fn test_unknown_family_letter() {
        assert_eq!(ShapeWhitelist::from_families("IX"), Err('X'));
    }

    #[test]
    fn test_rotations_keep_label() {
        let piece = validate([".#..", "###.", "....", "...."]).unwrap();
        let rotations = piece.rotations();
        assert_eq!(rotations.len(), 4);
        assert!(rotations.iter().all(|rotated| rotated.label == 'A'));
        assert_eq!(rotations[0], piece);
    }

    #[test]
    fn test_too_many_pieces() {
        let blocks: Vec<RawBlock> = (0..27)
            .map(|i| block(i, ["##..", "##..", "....", "...."]))
            .collect();
        let err = validate_blocks(&blocks, &ShapeRules::default()).unwrap_err();
        assert_eq!(err, Error::TooManyPieces { count: 27, max: 26 });
    }

    #[test]
    fn test_validation_stops_at_first_bad_block() {
        let blocks = [
            block(0, ["##..", "##..", "....", "...."]),
            block(1, ["#...", "....", "....", "...."]),
            block(2, ["#.#.", "....", "#.#.", "...."]),
        ];
        let err = validate_blocks(&blocks, &ShapeRules::default()).unwrap_err();
        assert_eq!(
            err,
            Error::Shape(ShapeError {
                block: 1,
                line: 6,
                kind: ShapeErrorKind::TooFewMarks { found: 1 },
            })
        );
    }

    #[test]
    fn test_block_past_last_label_is_rejected() {
        let err = Piece::from_block(
            &block(26, ["##..", "##..", "....", "...."]),
            &ShapeRules::default(),
        )
        .unwrap_err();
        assert_eq!(err.block, 26);
        assert_eq!(err.kind, ShapeErrorKind::Unlabeled { max: 26 });
    }

    #[test]
    fn test_label_for_range() {
        assert_eq!(label_for(0), Some('A'));
        assert_eq!(label_for(25), Some('Z'));
        assert_eq!(label_for(26), None);
        assert_eq!(label_for(300), None);
    }

    #[test]
    fn test_labels_are_sequential() {
        let blocks: Vec<RawBlock> = (0..3)
            .map(|i| block(i, ["####", "....", "....", "...."]))
            .collect();
        let labels: Vec<char> = validate_blocks(&blocks, &ShapeRules::default())
            .unwrap()
            .iter()
            .map(|piece| piece.label)
            .collect();
        assert_eq!(labels, vec!['A', 'B', 'C']);
    }
}
