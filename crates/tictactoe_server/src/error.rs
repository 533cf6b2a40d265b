//! Error types for sessions, the controller and configuration.

use crate::{ClientId, SessionId};
use derive_more::{Display, Error};
use tracing::instrument;

/// Failure categories reported to callers.
///
/// The transport maps each kind to one status code. `Unavailable` means
/// "nothing wrong, poll again".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown session or client reference.
    NotFound,
    /// Valid reference, but wrong participant or wrong turn.
    Forbidden,
    /// Malformed move syntax or coordinates.
    InvalidInput,
    /// Move targets an occupied cell.
    Conflict,
    /// Client exceeded the liveness window.
    Afk,
    /// No partner available yet.
    Unavailable,
}

/// Why a session refused a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TurnError {
    /// The client is not bound to this session.
    #[display("client is not playing in this session")]
    NotParticipant,
    /// The other participant is to move.
    #[display("it is not this client's turn")]
    NotYourTurn,
    /// The game is over and waiting for its reset.
    #[display("the game is over, wait for the next one")]
    GameOver,
    /// Coordinates outside the 3x3 grid.
    #[display("cell ({row}, {col}) is outside the board")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
    /// The cell already holds a mark.
    #[display("cell ({row}, {col}) is already occupied")]
    CellOccupied {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}

impl TurnError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotParticipant | Self::NotYourTurn | Self::GameOver => ErrorKind::Forbidden,
            Self::OutOfBounds { .. } => ErrorKind::InvalidInput,
            Self::CellOccupied { .. } => ErrorKind::Conflict,
        }
    }
}

/// Errors surfaced by [`SessionController`](crate::SessionController) operations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LobbyError {
    /// No session with this id (never existed or already reaped).
    #[display("session {session_id} does not exist")]
    SessionNotFound {
        /// Requested session.
        session_id: SessionId,
    },
    /// The client is not one of the session's participants.
    #[display("client {client_id} is not playing in this session")]
    NotParticipant {
        /// Requesting client.
        client_id: ClientId,
    },
    /// The move string did not parse.
    #[display("{source}")]
    MalformedMove {
        /// Parse failure.
        source: tictactoe_board::ParseCoordError,
    },
    /// The session refused the move.
    #[display("{_0}")]
    Turn(TurnError),
    /// The client was evicted for inactivity. Its AFK mark has been cleared.
    #[display("client {client_id} has been marked as AFK")]
    Afk {
        /// Evicted client.
        client_id: ClientId,
    },
    /// No other client is waiting for a match.
    #[display("no other client available for a session")]
    NoPartner,
}

impl LobbyError {
    /// Category of this error.
    #[instrument(level = "trace", skip(self))]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionNotFound { .. } => ErrorKind::NotFound,
            Self::NotParticipant { .. } => ErrorKind::Forbidden,
            Self::MalformedMove { .. } => ErrorKind::InvalidInput,
            Self::Turn(err) => err.kind(),
            Self::Afk { .. } => ErrorKind::Afk,
            Self::NoPartner => ErrorKind::Unavailable,
        }
    }
}

impl From<TurnError> for LobbyError {
    fn from(err: TurnError) -> Self {
        Self::Turn(err)
    }
}

impl From<tictactoe_board::ParseCoordError> for LobbyError {
    fn from(source: tictactoe_board::ParseCoordError) -> Self {
        Self::MalformedMove { source }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
