//! Search and validation settings.
//!
//! All settings are plain data with defaults; the command-line front end
//! maps its flags onto [`Config`].

use std::time::Duration;

use crate::pieces::ShapeRules;

/// Largest board side the engine will try.
///
/// Bounds worst-case runtime. Failing within this bound does not mean the
/// pieces cannot be packed on a bigger board.
pub const MAX_DIM: usize = 20;

/// Which board proportions are enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardShape {
    /// Only `s x s` boards, smallest side first.
    #[default]
    Square,
    /// Any `w x h` board, by area, then closeness to square, then width.
    Rectangle,
}

/// Settings for the packing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Try every quarter-turn rotation of each piece. Off by default: with
    /// rotation the same input may pack onto a smaller board.
    pub rotation: bool,
    pub board_shape: BoardShape,
    /// Upper bound on both board sides.
    pub max_dim: usize,
    /// Maximum number of placements across the whole solve.
    pub node_budget: Option<u64>,
    /// Wall-clock limit for the whole solve.
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rotation: false,
            board_shape: BoardShape::default(),
            max_dim: MAX_DIM,
            node_budget: None,
            time_limit: None,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub shapes: ShapeRules,
    pub solver: SolverConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.solver.rotation);
        assert_eq!(config.solver.board_shape, BoardShape::Square);
        assert_eq!(config.solver.max_dim, MAX_DIM);
        assert!(config.solver.node_budget.is_none());
        assert!(config.shapes.whitelist.is_none());
    }
}
