use anyhow::{Context, Result};
use clap::Parser;
use socket_forge::{config::AppConfig, logging, setup::execution};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(&config);

    log::info!("Socket Forge starting");
    log::debug!("Loaded Config: {:?}", config);

    let shutdown = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Ctrl-C received, stopping after the current round");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    tokio::task::spawn_blocking(move || execution::run(&config, &shutdown))
        .await
        .context("Generation task panicked")??;

    log::info!("Socket Forge finished.");
    Ok(())
}
