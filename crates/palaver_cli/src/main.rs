//! Palaver CLI — a loopback driver for the pairing engine.
//!
//! Feeds inbound events typed as `<user-id> <text>` lines into the
//! router and prints every outbound send, so the whole engine can be
//! exercised from one terminal without a messaging platform:
//!
//! ```text
//! 1000 /join TEST123
//! 1000 /next
//! 2000 /next
//! 1000 hello stranger
//! ```

mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use palaver_core::{InviteGate, Matchmaker, OutboundSink, PalaverConfig, Router, UserId};

use crate::sink::ConsoleSink;

#[derive(Parser)]
#[command(name = "palaver-cli")]
#[command(about = "Anonymous pairing relay, driven from the terminal")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Owner user id (overrides config)
    #[arg(long)]
    owner: Option<i64>,

    /// Additional invite code accepted by `/join` (repeatable)
    #[arg(long)]
    invite_code: Vec<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize tracing
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if cli.debug {
        EnvFilter::new("palaver_core=debug,palaver_cli=debug")
    } else {
        EnvFilter::new("palaver_core=info,palaver_cli=info,warn")
    };
    fmt().with_env_filter(filter).compact().init();

    // Load configuration and apply CLI overrides
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from: {:?}", path);
            palaver_core::load_config(path).await?
        }
        None => PalaverConfig::default(),
    };
    if let Some(owner) = cli.owner {
        config.access.owner = Some(UserId::new(owner));
    }
    config.access.invite_codes.extend(cli.invite_code);

    let sink: Arc<dyn OutboundSink> = Arc::new(ConsoleSink::new());
    let gate = Arc::new(InviteGate::new(&config.access));
    let matchmaker = Arc::new(Matchmaker::new(&config, gate.clone(), sink.clone()));
    let router = Router::new(gate, matchmaker, sink, config.access.owner);

    info!(
        invite_codes = config.access.invite_codes.len(),
        owner = ?config.access.owner,
        "palaver ready; type `<user-id> <text>`, or `quit` to exit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.into_diagnostic()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        let Some((head, rest)) = line.split_once(char::is_whitespace) else {
            eprintln!("expected `<user-id> <text>`");
            continue;
        };
        let user = match head.parse::<UserId>() {
            Ok(user) => user,
            Err(_) => {
                eprintln!("expected a numeric user id, got '{head}'");
                continue;
            }
        };
        router.handle(user, rest).await;
    }

    Ok(())
}
