//! Tetromino Packing Library
//!
//! Parses a text description of four-cell pieces, validates each one, and
//! packs them without overlap onto the smallest board the search finds.
//!
//! The library never reads files or installs a log subscriber; callers hand
//! it the raw input bytes and receive either a rendered grid or an [`Error`].

pub mod board;
pub mod config;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod pieces;
pub mod solver;

pub use board::Board;
pub use config::{BoardShape, Config, SolverConfig};
pub use error::{Error, FormatError, PackError, Result, ShapeError, ShapeErrorKind};
pub use pieces::{Piece, Point, ShapeRules, ShapeWhitelist};
pub use solver::{OrderingStrategy, Solution};

/// Parses and validates the input, returning the labeled pieces.
pub fn read_pieces(input: &[u8], rules: &ShapeRules) -> Result<Vec<Piece>> {
    let blocks = parser::parse_blocks(input)?;
    pieces::validate_blocks(&blocks, rules)
}

/// Runs the whole pipeline: parse, validate, pack.
pub fn solve_input(input: &[u8], config: &Config) -> Result<Solution> {
    let pieces = read_pieces(input, &config.shapes)?;
    Ok(solver::solve(&pieces, &config.solver)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve_text(input: &str) -> Result<String> {
        solve_input(input.as_bytes(), &Config::default()).map(|solution| solution.to_string())
    }

    #[test]
    fn test_one_square() {
        assert_eq!(solve_text("##..\n##..\n....\n....").unwrap(), "AA\nAA");
    }

    #[test]
    fn test_two_squares() {
        let input = ".##.\n.##.\n....\n....\n\n....\n....\n##..\n##..\n";
        assert_eq!(solve_text(input).unwrap(), "AABB\nAABB\n....\n....");
    }

    #[test]
    fn test_three_marks_reports_block() {
        let input = "##..\n##..\n....\n....\n\n#...\n#...\n#...\n....\n";
        let err = solve_text(input).unwrap_err();
        assert_eq!(
            err,
            Error::Shape(ShapeError {
                block: 1,
                line: 6,
                kind: ShapeErrorKind::TooFewMarks { found: 3 },
            })
        );
    }

    #[test]
    fn test_no_blocks() {
        assert_eq!(solve_text("").unwrap_err(), Error::Pack(PackError::InputEmpty));
        assert_eq!(
            solve_text("\n\n").unwrap_err(),
            Error::Pack(PackError::InputEmpty)
        );
    }

    #[test]
    fn test_format_errors_fail_fast() {
        let input = "##..\n##.\n....\n....\n\n#...\n#...\n#...\n#...\n";
        assert_eq!(
            solve_text(input).unwrap_err(),
            Error::Format(FormatError::LineLength { line: 2, found: 3 })
        );
    }

    #[test]
    fn test_disconnected_block() {
        let input = "#...\n..#.\n#...\n..#.\n";
        let err = solve_text(input).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Shape(ShapeError {
                    kind: ShapeErrorKind::Disconnected,
                    block: 0,
                    ..
                })
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn test_mixed_pieces_from_text() {
        let input = "\
#...
#...
##..
....

.#..
.#..
##..
....

....
####
....
....

.##.
##..
....
....
";
        let pieces = read_pieces(input.as_bytes(), &ShapeRules::default()).unwrap();
        assert_eq!(pieces.len(), 4);

        let solution = solve_input(input.as_bytes(), &Config::default()).unwrap();
        let grid = solution.to_string();
        let filled = grid.chars().filter(|c| c.is_ascii_uppercase()).count();
        assert_eq!(filled, 16);
        for label in ['A', 'B', 'C', 'D'] {
            assert_eq!(grid.matches(label).count(), 4, "label {label} in\n{grid}");
        }
    }

    #[test]
    fn test_same_input_same_output() {
        let input = "#...\n#...\n##..\n....\n\n###.\n.#..\n....\n....\n\n##..\n.##.\n....\n....";
        let first = solve_text(input).unwrap();
        for _ in 0..3 {
            assert_eq!(solve_text(input).unwrap(), first);
        }
    }

    #[test]
    fn test_whitelist_flows_through_config() {
        let config = Config {
            shapes: ShapeRules {
                whitelist: Some(ShapeWhitelist::from_families("O").unwrap()),
            },
            ..Config::default()
        };
        let err = solve_input(b"#...\n#...\n#...\n#...", &config).unwrap_err();
        assert!(matches!(
            err,
            Error::Shape(ShapeError {
                kind: ShapeErrorKind::NotWhitelisted,
                ..
            })
        ));
    }
}
