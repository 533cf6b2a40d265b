//! Board coordinates and move-string parsing.

use serde::Serialize;
use std::str::FromStr;
use tracing::instrument;

/// A cell on the 3x3 grid, 0-based.
///
/// Construction goes through [`Coord::new`] or [`str::parse`], so a `Coord`
/// is always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("({row}, {col})")]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    /// All nine cells in row-major order.
    pub const ALL: [Coord; 9] = [
        Coord { row: 0, col: 0 },
        Coord { row: 0, col: 1 },
        Coord { row: 0, col: 2 },
        Coord { row: 1, col: 0 },
        Coord { row: 1, col: 1 },
        Coord { row: 1, col: 2 },
        Coord { row: 2, col: 0 },
        Coord { row: 2, col: 1 },
        Coord { row: 2, col: 2 },
    ];

    /// Creates a coordinate, or `None` if either index is outside `0..3`.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < 3 && col < 3).then_some(Self { row, col })
    }

    /// Const constructor for in-crate tables; callers guarantee bounds.
    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row index (0 = top).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index (0 = left).
    pub fn col(self) -> usize {
        self.col
    }
}

/// Error returned when a move string is not of the form `"<row> <col>"`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid move {input:?}: expected \"<row> <col>\" with values 1-3")]
pub struct ParseCoordError {
    /// The rejected input.
    pub input: String,
}

/// Parses one 1-based axis digit into a 0-based index.
fn parse_axis(c: char) -> Option<usize> {
    match c {
        '1' => Some(0),
        '2' => Some(1),
        '3' => Some(2),
        _ => None,
    }
}

impl FromStr for Coord {
    type Err = ParseCoordError;

    /// Parses `"<row> <col>"` (1-based, single space) into a 0-based coordinate.
    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError {
            input: s.to_string(),
        };

        let chars: Vec<char> = s.chars().collect();
        let [row, ' ', col] = chars.as_slice() else {
            return Err(err());
        };

        let row = parse_axis(*row).ok_or_else(err)?;
        let col = parse_axis(*col).ok_or_else(err)?;
        Coord::new(row, col).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corners() {
        assert_eq!("1 1".parse::<Coord>(), Ok(Coord { row: 0, col: 0 }));
        assert_eq!("3 3".parse::<Coord>(), Ok(Coord { row: 2, col: 2 }));
        assert_eq!("2 1".parse::<Coord>(), Ok(Coord { row: 1, col: 0 }));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!("0 1".parse::<Coord>().is_err());
        assert!("1 4".parse::<Coord>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        for input in ["", "11", "1  1", " 1 1", "1 1 ", "1,1", "a b", "1\t1", "１ 1"] {
            let err = input.parse::<Coord>().unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn test_new_bounds() {
        assert!(Coord::new(2, 2).is_some());
        assert!(Coord::new(3, 0).is_none());
        assert!(Coord::new(0, 3).is_none());
    }

    #[test]
    fn test_all_is_row_major() {
        for (i, coord) in Coord::ALL.iter().enumerate() {
            assert_eq!(coord.row() * 3 + coord.col(), i);
        }
    }
}
