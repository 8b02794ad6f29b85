mod canned;
mod cli;
mod config;
mod flashcards;
mod generation;
mod logging;
mod persona;
mod router;
mod scan;
mod server;
#[cfg(test)]
mod test_utils;
mod threat_intel;
mod upstream;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::Args;
use crate::config::load_relay_config;
use crate::generation::build_generator;
use crate::logging::init_tracing;
use crate::persona::PersonaTable;
use crate::router::ModeRouter;
use crate::scan::{PollSettings, ScanDispatcher};
use crate::server::{build_app, AppState};
use crate::threat_intel::build_threat_intel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_to_stderr, args.log_json)?;

    info!(
        listen_addr = %args.listen_addr,
        config = ?args.config,
        "relay starting"
    );
    let config = load_relay_config(args.config.as_deref())?;

    let generator = build_generator(&config.generation)
        .context("failed to set up text generation client")?;
    let threat_intel = build_threat_intel(&config.threat_intel)
        .context("failed to set up threat intel client")?;
    let personas = Arc::new(PersonaTable::from_overrides(&config.personas));
    let scanner = ScanDispatcher::new(
        threat_intel,
        Arc::clone(&generator),
        Arc::clone(&personas),
        PollSettings::from_config(&config.threat_intel),
    );
    let state = AppState {
        router: Arc::new(ModeRouter::new(Arc::clone(&generator), personas, scanner)),
        generator,
    };
    let app = build_app(state);

    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(addr = %args.listen_addr, "relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;
    info!("relay shutting down");
    Ok(())
}

async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!(error = %err, "failed to listen for ctrl-c; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
