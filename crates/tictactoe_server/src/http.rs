//! REST transport over the session controller.

use crate::api::{
    ClientIdResponse, ErrorBody, JoinQuery, JoinResponse, MoveQuery, MoveResponse, StateQuery,
    StateResponse,
};
use crate::tasks::{schedule_reset, spawn_sweeper};
use crate::{ErrorKind, LobbyError, ServerConfig, SessionController};
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use derive_new::new;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Shared state handed to every handler.
#[derive(Debug, Clone, new)]
pub struct AppState {
    controller: SessionController,
    config: ServerConfig,
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::PRECONDITION_FAILED,
        ErrorKind::Afk => StatusCode::REQUEST_TIMEOUT,
        ErrorKind::Unavailable => StatusCode::NOT_ACCEPTABLE,
    }
}

impl IntoResponse for LobbyError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        debug!(%kind, %status, error = %self, "Request rejected");
        let body = ErrorBody {
            kind: kind.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the router with the four game endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/getClientId", get(get_client_id))
        .route("/tryJoinSession", post(try_join_session))
        .route("/session/getState", get(get_state))
        .route("/session/makeTurn", post(make_turn))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

#[instrument(skip(state))]
async fn get_client_id(State(state): State<AppState>) -> Json<ClientIdResponse> {
    Json(ClientIdResponse {
        client_id: state.controller.generate_client_id(),
    })
}

#[instrument(skip(state))]
async fn try_join_session(
    State(state): State<AppState>,
    Query(query): Query<JoinQuery>,
) -> Result<Json<JoinResponse>, LobbyError> {
    let session_id = state.controller.try_join(query.client_id)?;
    Ok(Json(JoinResponse { session_id }))
}

#[instrument(skip(state))]
async fn get_state(
    State(state): State<AppState>,
    Query(query): Query<StateQuery>,
) -> Result<Json<StateResponse>, LobbyError> {
    let view = state
        .controller
        .read_state(query.session_id, query.client_id)?;
    Ok(Json(view))
}

#[instrument(skip(state))]
async fn make_turn(
    State(state): State<AppState>,
    Query(query): Query<MoveQuery>,
) -> Result<Json<MoveResponse>, LobbyError> {
    let outcome = state
        .controller
        .submit_move(query.session_id, query.client_id, &query.row_col)
        .inspect_err(|e| warn!(error = %e, "Move rejected"))?;

    if outcome.is_terminal() {
        info!(session_id = %query.session_id, %outcome, "Game over, reset scheduled");
        schedule_reset(
            state.controller.clone(),
            query.session_id,
            state.config.reset_delay(),
        );
    }
    Ok(Json(MoveResponse { outcome }))
}

/// Runs the server until Ctrl+C: binds, starts the sweeper, serves requests.
#[instrument(skip(config), fields(host = %config.host(), port = *config.port()))]
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let controller = SessionController::new();
    let sweeper = spawn_sweeper(
        controller.clone(),
        config.sweep_interval(),
        config.client_timeout(),
        *config.prune_pending(),
    );

    let app = router(AppState::new(controller, config.clone()));
    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(addr = %listener.local_addr()?, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C, running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}
