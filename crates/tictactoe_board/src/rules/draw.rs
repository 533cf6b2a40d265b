//! Draw detection logic for tic-tac-toe.

use crate::{Board, Cell};
use tracing::instrument;

/// Checks if the board is full (no empty cell left).
///
/// A full board with no winner is a draw.
#[instrument(level = "trace")]
pub fn is_full(board: &Board) -> bool {
    board.rows().iter().flatten().all(|cell| *cell != Cell::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord, Mark};

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.set(Coord::new(1, 1).unwrap(), Cell::Occupied(Mark::X));
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for (i, coord) in Coord::ALL.into_iter().enumerate() {
            let mark = if i % 2 == 0 { Mark::X } else { Mark::O };
            board.set(coord, Cell::Occupied(mark));
        }
        assert!(is_full(&board));
    }
}
