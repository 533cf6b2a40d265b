//! Win detection logic for tic-tac-toe.

use crate::{Board, Cell, Coord, Mark};
use tracing::instrument;

/// Every line of three: rows, then columns, then diagonals.
const LINES: [[Coord; 3]; 8] = [
    // Rows
    [Coord::at(0, 0), Coord::at(0, 1), Coord::at(0, 2)],
    [Coord::at(1, 0), Coord::at(1, 1), Coord::at(1, 2)],
    [Coord::at(2, 0), Coord::at(2, 1), Coord::at(2, 2)],
    // Columns
    [Coord::at(0, 0), Coord::at(1, 0), Coord::at(2, 0)],
    [Coord::at(0, 1), Coord::at(1, 1), Coord::at(2, 1)],
    [Coord::at(0, 2), Coord::at(1, 2), Coord::at(2, 2)],
    // Diagonals
    [Coord::at(0, 0), Coord::at(1, 1), Coord::at(2, 2)],
    [Coord::at(0, 2), Coord::at(1, 1), Coord::at(2, 0)],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(mark)` for the first uniform, non-empty line found,
/// `None` otherwise.
#[instrument(level = "trace")]
pub fn check_winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match board.get(a) {
        Cell::Occupied(mark) if board.get(b) == board.get(a) && board.get(c) == board.get(a) => {
            Some(mark)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(mark: Mark, cells: &[(usize, usize)]) -> Board {
        let mut board = Board::new();
        for &(row, col) in cells {
            board.set(Coord::new(row, col).unwrap(), Cell::Occupied(mark));
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_with(Mark::X, &[(0, 0), (0, 1), (0, 2)]);
        assert_eq!(check_winner(&board), Some(Mark::X));
    }

    #[test]
    fn test_winner_column() {
        let board = board_with(Mark::O, &[(0, 1), (1, 1), (2, 1)]);
        assert_eq!(check_winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = board_with(Mark::O, &[(0, 2), (1, 1), (2, 0)]);
        assert_eq!(check_winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let mut board = board_with(Mark::X, &[(0, 0), (0, 1)]);
        board.set(Coord::new(0, 2).unwrap(), Cell::Occupied(Mark::O));
        assert_eq!(check_winner(&board), None);
    }
}
