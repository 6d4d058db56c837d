// BundleDB standalone worker
//!
//! Runs the serializing worker against the configured object store, for
//! deployments where the HTTP server is started with `worker.embedded = false`.
//! Exactly one worker (embedded or standalone) may run per queue prefix.

use anyhow::Result;
use bundledb_configs::ServerConfig;
use bundledb_core::AppContext;
use bundledb_server::logging;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bundledb-worker", version, about = "BundleDB serializing worker")]
struct Args {
    /// Path to the TOML configuration file (defaults apply when missing)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the queue until Ctrl+C (default)
    Run,
    /// Process every pending job once, print the report and exit
    Drain,
    /// Remove completed job records and orphaned job bodies, then exit
    Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load_or_default(&args.config)?;
    logging::init_logging(&config.logging, "worker.log")?;

    info!(
        "BundleDB worker v{} (storage={}, queue prefix={})",
        env!("CARGO_PKG_VERSION"),
        config.storage.backend.as_str(),
        config.queue.prefix
    );

    let app_context = AppContext::from_config(config)?;
    let worker = app_context.worker();

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let shutdown = worker.shutdown_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received Ctrl+C, stopping after the current job...");
                    shutdown.store(true, std::sync::atomic::Ordering::Release);
                }
            });
            worker.run_loop().await?;
            info!("Worker stopped: {:?}", worker.context());
        },
        Command::Drain => {
            let report = worker.drain().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        Command::Sweep => {
            let removed = worker.sweep().await?;
            println!("Removed {} stale job objects", removed);
        },
    }
    Ok(())
}
