//! Outage relay daemon.
//!
//! Listens for monitoring events over HTTP and relays them to Slack,
//! coalescing outage and recovery storms into debounced summaries.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use outage_notify::{server, Relay, RelayConfig, SlackChannel};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Relay service-monitoring events to Slack
#[derive(Parser, Debug)]
#[command(name = "outage-relay")]
#[command(about = "Relay service-monitoring events to Slack with outage debouncing")]
#[command(version)]
struct Cli {
    /// Address the event endpoint listens on
    #[arg(long, env = "OUTAGE_RELAY_LISTEN", default_value = "127.0.0.1:3030")]
    listen: SocketAddr,

    /// Events buffered between the HTTP endpoint and the relay session
    #[arg(long, env = "OUTAGE_RELAY_QUEUE_DEPTH", default_value = "256")]
    queue_depth: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "OUTAGE_RELAY_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = RelayConfig::from_env().context("Invalid relay configuration")?;
    info!(
        listen = %cli.listen,
        debounce = ?config.debounce,
        events = ?config.events,
        "Starting outage relay"
    );

    let channel = Arc::new(SlackChannel::new(config.webhook_url.clone()));
    let (events, session) = Relay::new(&config, channel).spawn(cli.queue_depth);

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;
    info!(addr = %cli.listen, "Listening for monitoring events");

    axum::serve(listener, server::router(events))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Event endpoint failed")?;

    // The router owned the last sender: the session flushes, waits for
    // in-flight sends and exits.
    session.await.context("Relay session panicked")?;

    Ok(())
}
