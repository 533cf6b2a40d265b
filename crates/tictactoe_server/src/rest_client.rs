//! Type-safe HTTP client for the game server.

use crate::api::{ClientIdResponse, ErrorBody, JoinResponse, StateResponse};
use crate::{ClientId, SessionId};
use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, instrument};

/// Result of one matchmaking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStatus {
    /// Bound to a session.
    Joined(SessionId),
    /// Nobody to play with yet; try again.
    Waiting,
    /// Evicted for inactivity; the mark is cleared, try again.
    Afk,
}

/// REST client for one player.
#[derive(Debug, Clone)]
pub struct RestGameClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestGameClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        Url::parse_with_params(&self.url(path), params)
            .with_context(|| format!("Invalid server URL {}", self.base_url))
    }

    /// Asks the server for a fresh client id.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn request_client_id(&self) -> Result<ClientId> {
        let response: ClientIdResponse = self
            .client
            .get(self.url("/getClientId"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(client_id = %response.client_id, "Got client id");
        Ok(response.client_id)
    }

    /// One matchmaking attempt.
    #[instrument(skip(self))]
    pub async fn try_join(&self, client_id: ClientId) -> Result<JoinStatus> {
        let response = self
            .client
            .post(self.url_with("/tryJoinSession", &[("client_id", client_id.to_string())])?)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_ACCEPTABLE => Ok(JoinStatus::Waiting),
            StatusCode::REQUEST_TIMEOUT => Ok(JoinStatus::Afk),
            _ => {
                let body: JoinResponse = response.error_for_status()?.json().await?;
                debug!(session_id = %body.session_id, "Joined session");
                Ok(JoinStatus::Joined(body.session_id))
            }
        }
    }

    /// Polls the session state.
    #[instrument(skip(self))]
    pub async fn get_state(
        &self,
        session_id: SessionId,
        client_id: ClientId,
    ) -> Result<StateResponse> {
        let state = self
            .client
            .get(self.url_with(
                "/session/getState",
                &[
                    ("session_id", session_id.to_string()),
                    ("client_id", client_id.to_string()),
                ],
            )?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Malformed state response")?;
        Ok(state)
    }

    /// Submits a move.
    ///
    /// `Ok(Err(message))` when the server refused the move; `Err` for
    /// transport failures.
    #[instrument(skip(self))]
    pub async fn make_turn(
        &self,
        session_id: SessionId,
        client_id: ClientId,
        row_col: &str,
    ) -> Result<std::result::Result<(), String>> {
        let response = self
            .client
            .post(self.url_with(
                "/session/makeTurn",
                &[
                    ("session_id", session_id.to_string()),
                    ("client_id", client_id.to_string()),
                    ("row_col", row_col.to_string()),
                ],
            )?)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(Ok(()));
        }
        if status.is_client_error() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => format!("HTTP {}", status),
            };
            debug!(%status, %message, "Move refused");
            return Ok(Err(message));
        }
        anyhow::bail!("Move failed: HTTP {}", status)
    }
}
