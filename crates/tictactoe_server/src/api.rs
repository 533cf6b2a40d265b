//! Request and response bodies shared by the HTTP server and the REST client.

use crate::{ClientId, SessionId};
use serde::{Deserialize, Serialize};
use tictactoe_board::Outcome;

pub use crate::session::SessionView as StateResponse;

/// Body of `GET /getClientId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdResponse {
    /// Newly allocated identifier.
    pub client_id: ClientId,
}

/// Query of `POST /tryJoinSession`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JoinQuery {
    /// Client asking to be matched.
    pub client_id: ClientId,
}

/// Body of a successful `POST /tryJoinSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Session the client plays in.
    pub session_id: SessionId,
}

/// Query of `GET /session/getState`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StateQuery {
    /// Session to read.
    pub session_id: SessionId,
    /// Polling participant.
    pub client_id: ClientId,
}

/// Query of `POST /session/makeTurn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveQuery {
    /// Session to play in.
    pub session_id: SessionId,
    /// Moving participant.
    pub client_id: ClientId,
    /// `"<row> <col>"`, both 1-3.
    pub row_col: String,
}

/// Body of a successful `POST /session/makeTurn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Outcome after the move.
    pub outcome: Outcome,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Snake-case [`ErrorKind`](crate::ErrorKind).
    pub kind: String,
    /// Human-readable reason.
    pub message: String,
}
