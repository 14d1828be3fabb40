mod bootstrap;
mod dispatch;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use voxy_core::config::{AppConfig, LoadOptions};

use crate::bootstrap::Application;
use crate::dispatch::VoiceEvent;

fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use voxy_core::config::LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        "voxy-server started; reading voice events from stdin"
    );

    serve_stdio(&app).await?;

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "voxy-server stopping"
    );
    Ok(())
}

/// Serves newline-delimited JSON voice events on stdin, one JSON reply per
/// event on stdout. The platform's transport sits in front of this process;
/// events arrive and are answered strictly in order.
async fn serve_stdio(app: &Application) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let event: VoiceEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    event_name = "voice.event_parse_failed",
                    error = %err,
                    "dropping malformed voice event"
                );
                continue;
            }
        };

        match dispatch::handle_event(app, event).await {
            Ok(Some(reply)) => {
                let rendered = serde_json::to_string(&reply)?;
                stdout.write_all(rendered.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok(None) => {}
            Err(err) => {
                error!(
                    event_name = "voice.dispatch_failed",
                    error = %err,
                    "voice event could not be dispatched"
                );
            }
        }
    }

    Ok(())
}
