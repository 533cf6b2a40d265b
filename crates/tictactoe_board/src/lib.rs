//! Pure tic-tac-toe game logic for the matchmaking server.
//!
//! This crate owns a single session's board: the 3×3 grid, whose turn it is,
//! and the current [`Outcome`]. It performs no I/O and knows nothing about
//! clients or sessions; the server crate binds two participants to one
//! [`BoardState`].
//!
//! # Example
//!
//! ```
//! use tictactoe_board::{BoardState, Coord, Mark, Outcome};
//!
//! let mut state = BoardState::new();
//! let center: Coord = "2 2".parse().unwrap();
//! assert!(state.can_place(center));
//! state.place(center);
//! assert_eq!(state.evaluate_outcome(), Outcome::InProgress);
//! assert_eq!(state.to_move(), Mark::O);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coord;
pub mod rules;
mod state;
mod types;

pub use coord::{Coord, ParseCoordError};
pub use state::BoardState;
pub use types::{Board, Cell, Mark, Outcome};
