//! Terminal player: joins a session and plays moves typed on stdin.

use anyhow::{Context, Result};
use std::io::Write;
use std::time::Duration;
use tictactoe_board::Outcome;
use tictactoe_server::api::StateResponse;
use tictactoe_server::{ClientId, JoinStatus, RestGameClient, SessionId};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_secs(1);
static SPINNER: [char; 4] = ['|', '/', '-', '\\'];

type InputLines = Lines<BufReader<Stdin>>;

/// How a session ended from the player's side.
enum SessionEnd {
    /// The server dropped the session; look for a new opponent.
    Lost,
    /// Stdin closed or the player typed `quit`.
    Quit,
}

/// Runs the terminal player until stdin closes.
#[instrument]
pub async fn run_play(server_url: String) -> Result<()> {
    let client = RestGameClient::new(server_url);
    let client_id = client
        .request_client_id()
        .await
        .context("Failed to reach game server")?;
    println!("Your client id is {}", client_id);
    println!("Enter moves as \"<row> <col>\" (1-3), or \"quit\" to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let session_id = wait_for_session(&client, client_id).await?;
        println!("Joined session {}", session_id);
        match play_session(&client, client_id, session_id, &mut lines).await? {
            SessionEnd::Lost => println!("Session ended, looking for a new opponent."),
            SessionEnd::Quit => {
                info!("Player quit");
                return Ok(());
            }
        }
    }
}

#[instrument(skip(client))]
async fn wait_for_session(client: &RestGameClient, client_id: ClientId) -> Result<SessionId> {
    let mut frames = SPINNER.iter().cycle();
    let mut waited = false;
    loop {
        match client.try_join(client_id).await? {
            JoinStatus::Joined(session_id) => {
                if waited {
                    println!();
                }
                return Ok(session_id);
            }
            JoinStatus::Waiting => {
                let frame = frames.next().copied().unwrap_or('.');
                print!("\r{} Waiting for an opponent...", frame);
                std::io::stdout().flush()?;
                waited = true;
            }
            JoinStatus::Afk => println!("You were idle too long. Rejoining."),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[instrument(skip(client, lines))]
async fn play_session(
    client: &RestGameClient,
    client_id: ClientId,
    session_id: SessionId,
    lines: &mut InputLines,
) -> Result<SessionEnd> {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut last: Option<StateResponse> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match client.get_state(session_id, client_id).await {
                    Ok(view) => {
                        if last.as_ref() != Some(&view) {
                            render(&view);
                            last = Some(view);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "State poll failed");
                        return Ok(SessionEnd::Lost);
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(SessionEnd::Quit);
                };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
                    return Ok(SessionEnd::Quit);
                }
                debug!(input, "Submitting move");
                match client.make_turn(session_id, client_id, input).await? {
                    Ok(()) => ticker.reset_immediately(),
                    Err(message) => println!("Move rejected: {}", message),
                }
            }
        }
    }
}

fn render(view: &StateResponse) {
    println!();
    println!("{}", view.board);
    println!(
        "Wins: {}  Losses: {}  Draws: {}",
        view.stats.wins, view.stats.losses, view.stats.draws
    );
    match view.outcome {
        Outcome::InProgress if view.your_turn => println!("Your move (row col):"),
        Outcome::InProgress => println!("Waiting for opponent's move..."),
        outcome => println!("Game over: {}. Next game starts shortly.", outcome),
    }
}
