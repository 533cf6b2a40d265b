//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). They are separated from the
//! state machine so outcome evaluation can always rescan the whole grid.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;
