// src/main.rs

//! Dashboard host entry-point.
//!
//! 1. Load configuration & set up structured logging
//! 2. Connect the gRPC gateway to the agent (or fall back to the degraded
//!    gateway so the host stays up and every call fails fast)
//! 3. Wire fan-out, stream session, pollers and action gateway
//! 4. Serve display surfaces on the loopback bridge
//! 5. On ctrl-c: stop the stream, tear everything down, exit cleanly

// ───── project modules ──────────────────────────────────────────────────────
mod comms;
mod config;
mod sync;

// ───── std / 3rd-party imports ──────────────────────────────────────────────
use anyhow::Context;
use fern::Dispatch;
use log::{LevelFilter, error, info};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::net::TcpListener;

// ───── local imports ────────────────────────────────────────────────────────
use crate::comms::bridge::Bridge;
use crate::comms::grpc::{GrpcTransport, UnavailableTransport};
use crate::comms::transport::AgentTransport;
use crate::config::load_config;
use crate::sync::actions::ActionGateway;
use crate::sync::domains::Pollers;
use crate::sync::fanout::AlertFanout;
use crate::sync::session::StreamSession;

/// Timestamped line format shared by every module.
fn setup_logging(level: &str) -> anyhow::Result<()> {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .context("logger already installed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("default.toml"));
    let cfg = load_config(&config_path)?;
    setup_logging(&cfg.logging.level)?;
    info!("dashboard host starting (agent at {})", cfg.agent.endpoint);

    // The only construction-time transport failure; reported once, after
    // which the host runs degraded rather than terminating.
    let transport: Arc<dyn AgentTransport> = match GrpcTransport::connect(
        &cfg.agent.endpoint,
        Duration::from_secs(cfg.agent.connect_timeout_secs),
        Duration::from_secs(cfg.agent.request_timeout_secs),
    )
    .await
    {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!(
                "cannot reach agent at {}: {e}; running degraded",
                cfg.agent.endpoint
            );
            Arc::new(UnavailableTransport::new(e.to_string()))
        }
    };

    let session = Arc::new(StreamSession::new(
        Arc::clone(&transport),
        AlertFanout::new(),
    ));
    let pollers = Pollers::new(Arc::clone(&transport), &cfg.polling);
    let actions = ActionGateway::new(Arc::clone(&transport), Arc::clone(&pollers.quarantine));
    let poll_tasks = pollers.spawn_all(&cfg.polling);

    let listener = TcpListener::bind(&cfg.bridge.listen)
        .await
        .with_context(|| format!("cannot bind bridge listener on {}", cfg.bridge.listen))?;
    info!("bridge listening on {}", cfg.bridge.listen);
    let bridge = Bridge::new(pollers, Arc::clone(&session), actions);
    let serve_task = tokio::spawn(bridge.serve(listener));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    // Cancel the stream before exit; dropping the transport afterwards
    // closes the underlying channel.
    session.stop().await;
    serve_task.abort();
    for task in poll_tasks {
        task.abort();
    }
    info!("shutdown complete");
    Ok(())
}
