//! Backtracking packing engine.
//!
//! The search space is enumerated in a fixed order:
//! - candidate board dimensions, smallest area first
//! - for each dimension, each piece ordering strategy
//! - for each (dimension, ordering), a depth-first placement of the pieces in
//!   that order, scanning offsets row-major
//!
//! The first complete placement found is returned. This is first-fit over a
//! bounded candidate set, not a minimum-area guarantee.

use std::cmp::Ordering;
use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::{BoardShape, SolverConfig};
use crate::error::PackError;
use crate::pieces::{Piece, CELLS};

/// How often (in placements) the wall-clock limit is checked.
const TIME_CHECK_INTERVAL: u64 = 1024;

/// A total order over the piece list, used to vary search attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingStrategy {
    /// Input order.
    Identity,
    /// Largest bounding box first.
    AreaDesc,
    /// Tallest first.
    HeightDesc,
    /// Widest first.
    WidthDesc,
}

impl fmt::Display for OrderingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::AreaDesc => "area-desc",
            Self::HeightDesc => "height-desc",
            Self::WidthDesc => "width-desc",
        };
        f.write_str(name)
    }
}

/// Compares two pieces for a stable sort.
type Comparator = fn(&Piece, &Piece) -> Ordering;

/// Ordering strategies in the order they are tried for every board.
///
/// Sorting is stable, so pieces that compare equal keep their input order.
pub const ORDERINGS: [(OrderingStrategy, Comparator); 4] = [
    (OrderingStrategy::Identity, |_, _| Ordering::Equal),
    (OrderingStrategy::AreaDesc, |a, b| b.area().cmp(&a.area())),
    (OrderingStrategy::HeightDesc, |a, b| b.height.cmp(&a.height)),
    (OrderingStrategy::WidthDesc, |a, b| b.width.cmp(&a.width)),
];

/// A successful packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub board: Board,
    /// The ordering strategy of the attempt that succeeded.
    pub ordering: OrderingStrategy,
    /// Placements performed across all attempts, including failed ones.
    pub nodes: u64,
}

impl Solution {
    /// Board dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.board.width(), self.board.height())
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.board, f)
    }
}

/// Lists the boards to try for `piece_count` pieces, in search order.
pub fn candidate_dimensions(
    piece_count: usize,
    board_shape: BoardShape,
    max_dim: usize,
) -> Vec<(usize, usize)> {
    let min_area = (piece_count * CELLS).max(1);

    match board_shape {
        BoardShape::Square => {
            let mut side = 1;
            while side * side < min_area {
                side += 1;
            }
            (side..=max_dim).map(|side| (side, side)).collect()
        }
        BoardShape::Rectangle => {
            let mut dimensions: Vec<(usize, usize)> = (1..=max_dim)
                .flat_map(|width| (1..=max_dim).map(move |height| (width, height)))
                .filter(|&(width, height)| width * height >= min_area)
                .collect();
            dimensions.sort_by(|&(w1, h1), &(w2, h2)| {
                (w1 * h1)
                    .cmp(&(w2 * h2))
                    .then_with(|| compare_squareness((w1, h1), (w2, h2)))
                    .then_with(|| w1.cmp(&w2))
            });
            dimensions
        }
    }
}

/// Orders by `|w/h - 1|` ascending, compared exactly as `|w - h| / h`.
fn compare_squareness((w1, h1): (usize, usize), (w2, h2): (usize, usize)) -> Ordering {
    (w1.abs_diff(h1) * h2).cmp(&(w2.abs_diff(h2) * h1))
}

/// Applies every ordering strategy to the pieces, dropping orderings that
/// produce a sequence already produced by an earlier strategy.
pub fn ordered_sequences(pieces: &[Piece]) -> Vec<(OrderingStrategy, Vec<Piece>)> {
    let mut sequences: Vec<(OrderingStrategy, Vec<Piece>)> = Vec::with_capacity(ORDERINGS.len());

    for (strategy, compare) in ORDERINGS {
        let mut ordered = pieces.to_vec();
        ordered.sort_by(compare);
        if sequences.iter().all(|(_, seen)| *seen != ordered) {
            sequences.push((strategy, ordered));
        }
    }

    sequences
}

/// Packs all pieces onto the first board that admits them.
pub fn solve(pieces: &[Piece], config: &SolverConfig) -> Result<Solution, PackError> {
    if pieces.is_empty() {
        return Err(PackError::InputEmpty);
    }

    let attempts: Vec<(OrderingStrategy, Vec<Vec<Piece>>)> = ordered_sequences(pieces)
        .into_iter()
        .map(|(strategy, ordered)| {
            let variants = ordered
                .iter()
                .map(|piece| {
                    if config.rotation {
                        piece.rotations()
                    } else {
                        vec![piece.clone()]
                    }
                })
                .collect();
            (strategy, variants)
        })
        .collect();

    let mut search = Search::new(config);

    for (width, height) in candidate_dimensions(pieces.len(), config.board_shape, config.max_dim) {
        // every ordering holds the same pieces, so one check covers them all
        if !all_fit(&attempts[0].1, width, height) {
            debug!(width, height, "skipping board, a piece cannot fit");
            continue;
        }

        for (strategy, order) in &attempts {
            let mut board = Board::new(width, height)?;
            let nodes_before = search.nodes;

            if search.place_from(&mut board, order, 0)? {
                info!(
                    width,
                    height,
                    ordering = %strategy,
                    nodes = search.nodes,
                    "packing found"
                );
                return Ok(Solution {
                    board,
                    ordering: *strategy,
                    nodes: search.nodes,
                });
            }

            debug!(
                width,
                height,
                ordering = %strategy,
                nodes = search.nodes - nodes_before,
                "attempt failed"
            );
        }
    }

    Err(PackError::NoSolutionFound {
        max_dim: config.max_dim,
    })
}

/// True if every piece fits on an empty `width x height` board in at least
/// one of its variants.
fn all_fit(order: &[Vec<Piece>], width: usize, height: usize) -> bool {
    order.iter().all(|variants| {
        variants
            .iter()
            .any(|piece| piece.width <= width && piece.height <= height)
    })
}

/// Mutable state shared by all attempts of one solve.
struct Search<'a> {
    config: &'a SolverConfig,
    /// Placements performed so far.
    nodes: u64,
    started: Instant,
}

impl<'a> Search<'a> {
    fn new(config: &'a SolverConfig) -> Self {
        Self {
            config,
            nodes: 0,
            started: Instant::now(),
        }
    }

    /// Places `order[index..]` onto the board, depth first.
    ///
    /// Offsets are scanned row-major; at each offset every variant of the
    /// piece is tried before moving on. On success the placements stay on
    /// the board; on failure the board is left as it was.
    fn place_from(
        &mut self,
        board: &mut Board,
        order: &[Vec<Piece>],
        index: usize,
    ) -> Result<bool, PackError> {
        let Some(variants) = order.get(index) else {
            return Ok(true);
        };

        let min_width = variants.iter().map(|piece| piece.width).min().unwrap_or(1);
        let min_height = variants.iter().map(|piece| piece.height).min().unwrap_or(1);
        let (Some(max_x), Some(max_y)) = (
            board.width().checked_sub(min_width),
            board.height().checked_sub(min_height),
        ) else {
            return Ok(false);
        };

        for y in 0..=max_y {
            for x in 0..=max_x {
                for piece in variants {
                    if !board.can_place(piece, x, y) {
                        continue;
                    }
                    self.tick()?;

                    let mut placed = board.place_scoped(piece, x, y);
                    if self.place_from(&mut placed, order, index + 1)? {
                        placed.commit();
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    /// Counts one placement and enforces the configured budget.
    fn tick(&mut self) -> Result<(), PackError> {
        self.nodes += 1;

        let over_budget = self
            .config
            .node_budget
            .is_some_and(|budget| self.nodes > budget);
        let over_time = self.config.time_limit.is_some_and(|limit| {
            self.nodes % TIME_CHECK_INTERVAL == 0 && self.started.elapsed() > limit
        });

        if over_budget || over_time {
            warn!(nodes = self.nodes, "search budget exhausted");
            return Err(PackError::Timeout { nodes: self.nodes });
        }
        Ok(())
    }
}
