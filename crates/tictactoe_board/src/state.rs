//! Per-session board state machine.

use crate::rules::{check_winner, is_full};
use crate::{Board, Cell, Coord, Mark, Outcome};
use serde::Serialize;
use tracing::{debug, instrument};

/// Grid, turn pointer and outcome of one game.
///
/// `InProgress` moves to `Draw` or `Won(_)` through [`evaluate_outcome`];
/// [`reset`] is the only way back. Cells never revert to empty except via
/// `reset`.
///
/// [`can_place`] only looks at the cell and [`place`] does no checking at
/// all; callers enforce turn order and reject moves after a terminal outcome.
///
/// [`evaluate_outcome`]: BoardState::evaluate_outcome
/// [`reset`]: BoardState::reset
/// [`can_place`]: BoardState::can_place
/// [`place`]: BoardState::place
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BoardState {
    board: Board,
    to_move: Mark,
    outcome: Outcome,
}

impl BoardState {
    /// Empty grid, X to move, game in progress.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// The grid.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark that moves next.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Index of the participant that moves next (0 or 1).
    pub fn turn_index(&self) -> usize {
        self.to_move.index()
    }

    /// Outcome as of the last [`evaluate_outcome`](Self::evaluate_outcome).
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// True iff the target cell is empty. Turn and outcome are not consulted.
    pub fn can_place(&self, coord: Coord) -> bool {
        self.board.is_empty(coord)
    }

    /// Writes the current mark at `coord` and passes the turn.
    ///
    /// No legality check; validate with [`can_place`](Self::can_place) first.
    #[instrument(skip(self), fields(mark = %self.to_move))]
    pub fn place(&mut self, coord: Coord) {
        self.board.set(coord, Cell::Occupied(self.to_move));
        self.to_move = self.to_move.opponent();
    }

    /// Recomputes the outcome from the whole grid and stores it.
    ///
    /// A full rescan every time, so calling it twice without an intervening
    /// move yields the same result.
    #[instrument(skip(self))]
    pub fn evaluate_outcome(&mut self) -> Outcome {
        self.outcome = if let Some(mark) = check_winner(&self.board) {
            Outcome::Won(mark)
        } else if is_full(&self.board) {
            Outcome::Draw
        } else {
            Outcome::InProgress
        };
        debug!(outcome = %self.outcome, "Evaluated outcome");
        self.outcome
    }

    /// Clears the grid, gives the move back to X and restarts the game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn test_new_state() {
        let state = BoardState::new();
        assert_eq!(state.turn_index(), 0);
        assert_eq!(state.to_move(), Mark::X);
        assert_eq!(state.outcome(), Outcome::InProgress);
        assert_eq!(state.board().occupied(), 0);
    }

    #[test]
    fn test_place_flips_turn() {
        let mut state = BoardState::new();
        state.place(at(1, 1));
        assert_eq!(state.board().get(at(1, 1)), Cell::Occupied(Mark::X));
        assert_eq!(state.to_move(), Mark::O);
        state.place(at(0, 0));
        assert_eq!(state.board().get(at(0, 0)), Cell::Occupied(Mark::O));
        assert_eq!(state.turn_index(), 0);
    }

    #[test]
    fn test_can_place_ignores_outcome() {
        let mut state = BoardState::new();
        for coord in [at(0, 0), at(1, 0), at(0, 1), at(1, 1), at(0, 2)] {
            state.place(coord);
        }
        assert_eq!(state.evaluate_outcome(), Outcome::Won(Mark::X));
        assert!(state.can_place(at(2, 2)));
        assert!(!state.can_place(at(0, 0)));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut state = BoardState::new();
        state.place(at(0, 0));
        let first = state.evaluate_outcome();
        assert_eq!(state.evaluate_outcome(), first);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = BoardState::new();
        for coord in [at(0, 0), at(1, 0), at(0, 1), at(1, 1), at(0, 2)] {
            state.place(coord);
        }
        state.evaluate_outcome();
        state.reset();
        assert_eq!(state, BoardState::new());
    }
}
