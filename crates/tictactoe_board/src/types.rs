//! Core domain types for tic-tac-toe.

use crate::Coord;
use serde::{Deserialize, Serialize};

/// A mark placed on the board.
///
/// `X` belongs to the first participant of a session and always opens a
/// game; `O` belongs to the second.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
pub enum Mark {
    /// First participant's mark (moves first).
    #[default]
    X,
    /// Second participant's mark.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Index of the participant owning this mark (0 for X, 1 for O).
    pub fn index(self) -> usize {
        match self {
            Mark::X => 0,
            Mark::O => 1,
        }
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No mark yet.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Cells indexed `[row][col]`.
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at `coord`.
    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.row()][coord.col()]
    }

    /// Overwrites the cell at `coord`.
    pub fn set(&mut self, coord: Coord, cell: Cell) {
        self.cells[coord.row()][coord.col()] = cell;
    }

    /// Checks whether the cell at `coord` is empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord) == Cell::Empty
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> &[[Cell; 3]; 3] {
        &self.cells
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            let symbols: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => " ".to_string(),
                    Cell::Occupied(mark) => mark.to_string(),
                })
                .collect();
            write!(f, "{}", symbols.join("|"))?;
            if r < 2 {
                write!(f, "\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}

/// Result of evaluating the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nobody has three in a row and empty cells remain.
    #[default]
    #[display("in progress")]
    InProgress,
    /// Board full without a line.
    #[display("draw")]
    Draw,
    /// The mark completed a line.
    #[display("{_0} wins")]
    Won(Mark),
}

impl Outcome {
    /// True for `Draw` and `Won`.
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}
