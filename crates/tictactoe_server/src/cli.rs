//! Command-line interface for tictactoe_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe matchmaking server and terminal player
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Pairs clients into tic-tac-toe sessions over HTTP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// TOML config file; built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play in the terminal against whoever joins next
    Play {
        /// Game server URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        server_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["tictactoe_server", "serve", "--port", "9000", "--host", "0.0.0.0"]);
        match cli.command {
            Command::Serve { config, host, port } => {
                assert!(config.is_none());
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_play_default_url() {
        let cli = Cli::parse_from(["tictactoe_server", "play"]);
        match cli.command {
            Command::Play { server_url } => assert_eq!(server_url, "http://127.0.0.1:8000"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
