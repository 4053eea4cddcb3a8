//! Planner session runner for the Paprika kitchen agent.
//!
//! The runner keeps one agent alive in the starting kitchen and connects
//! it to the remote planner over WebSocket. It sends perception snapshots
//! while the agent is idle, executes the plans that come back, and
//! reconnects with exponential backoff when the connection drops.
//!
//! # Architecture
//!
//! ```text
//! Simulation --> Perception --> WebSocket --> Planner
//!     ^                                          |
//!     +------ Plan Executor <---- Plan <---------+
//! ```
//!
//! One tick loop drives everything; the socket reader only queues inbound
//! messages for the next tick.

mod backoff;
mod config;
mod connection;
mod error;
mod runner;
mod session;

use paprika_core::LoggingConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RunnerConfig;
use crate::runner::SessionRunner;

/// Application entry point.
///
/// Loads configuration, initializes logging, builds the agent and runs
/// the session loop until it ends or Ctrl-C is pressed.
///
/// # Errors
///
/// Returns an error if configuration loading, agent setup or the session
/// loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RunnerConfig::from_env()?;
    init_logging(&config.agent.logging);

    info!(
        path = %config.path.display(),
        from_file = config.from_file,
        server_url = config.agent.session.server_url,
        tick_ms = config.agent.tick.interval_ms,
        auto_reconnect = config.agent.session.auto_reconnect,
        "configuration loaded"
    );

    let mut runner = SessionRunner::new(&config.agent)?;
    info!("agent spawned, entering session loop");

    tokio::select! {
        result = runner.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }

    info!("paprika-runner stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
