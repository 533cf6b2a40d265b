//! Tic-tac-toe matchmaking server.
//!
//! Pairs anonymous clients into two-player sessions and referees their
//! games over a small REST API.
//!
//! # Architecture
//!
//! - **Controller**: waiting room, live sessions and the AFK set behind one lock
//! - **Session**: a pair of participants, their board and running score
//! - **Tasks**: the periodic liveness sweep and delayed board resets
//! - **HTTP**: axum router exposing the controller
//! - **Client**: typed REST client used by the terminal player
//!
//! # Example
//!
//! ```
//! use tictactoe_server::SessionController;
//!
//! let controller = SessionController::new();
//! let a = controller.generate_client_id();
//! let b = controller.generate_client_id();
//!
//! // The first caller waits, the second is paired with it.
//! assert!(controller.try_join(a).is_err());
//! let session_id = controller.try_join(b).unwrap();
//! assert_eq!(controller.find_session_of(a), Some(session_id));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
mod client;
mod config;
mod controller;
mod error;
mod http;
mod ids;
mod rest_client;
mod session;
mod tasks;

// Crate-level exports - Identity
pub use client::ClientRecord;
pub use ids::{ClientId, SessionId};

// Crate-level exports - Sessions and matchmaking
pub use controller::{SessionController, SweepReport};
pub use session::{ParticipantStats, Session, SessionView};

// Crate-level exports - Errors
pub use error::{ConfigError, ErrorKind, LobbyError, TurnError};

// Crate-level exports - Configuration
pub use config::ServerConfig;

// Crate-level exports - Background tasks
pub use tasks::{schedule_reset, spawn_sweeper};

// Crate-level exports - Transport
pub use http::{AppState, router, serve, status_for};
pub use rest_client::{JoinStatus, RestGameClient};
