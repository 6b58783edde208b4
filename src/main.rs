use anyhow::{bail, Result};
use clap::Parser;
use copilot_client::{ClientSession, Config, ConsoleView, SessionConfig, UserAction};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Live interview copilot client
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/copilot-client")]
    config: String,

    /// Server origin, overrides the config file
    #[arg(short, long)]
    server: Option<String>,

    /// Reconnect delay in milliseconds, overrides the config file
    #[arg(long)]
    retry_delay_ms: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Action(UserAction),
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if !line.starts_with('/') {
        return Ok(Some(Command::Action(UserAction::SendTranscription(
            line.to_string(),
        ))));
    }

    let mut parts = line.split_whitespace();
    let command = match (parts.next(), parts.next(), parts.next()) {
        (Some("/quit"), None, _) => Command::Quit,
        (Some("/reset"), None, _) => Command::Action(UserAction::ResetChat),
        (Some("/toggle"), None, _) => Command::Action(UserAction::ToggleListening),
        (Some("/device"), Some(index), None) => {
            Command::Action(UserAction::SelectDevice(index.parse()?))
        }
        (Some("/key"), Some(provider), Some(key)) => Command::Action(UserAction::UpdateKey {
            provider: provider.parse()?,
            key: key.to_string(),
        }),
        _ => bail!("Commands: /reset, /toggle, /device <index>, /key <provider> <key>, /quit"),
    };

    Ok(Some(command))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(server) = args.server {
        cfg.server.url = server;
    }
    if let Some(delay) = args.retry_delay_ms {
        cfg.connection.retry_delay_ms = delay;
    }

    info!("Copilot client v{}", env!("CARGO_PKG_VERSION"));
    info!("Server: {}", cfg.server.url);
    info!("Reconnect delay: {} ms", cfg.connection.retry_delay_ms);

    let session = ClientSession::new(SessionConfig::from(&cfg))?;
    let handle = session.start(Box::new(ConsoleView::stdout()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Action(action))) => handle.send(action).await?,
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let stats = handle.stop().await?;
    info!(
        "Session {} ran {:.1}s: {} attempts, {} opens, {} frames ({} dropped)",
        stats.session_id,
        stats.duration_secs,
        stats.connection_attempts,
        stats.connections_opened,
        stats.frames.frames_received,
        stats.frames.frames_undecodable + stats.frames.frames_unknown,
    );

    Ok(())
}
