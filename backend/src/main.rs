// BundleDB Server entrypoint
//!
//! Initialization, middleware wiring and graceful shutdown live in
//! `lifecycle` so this file remains a thin orchestrator.

use anyhow::Result;
use bundledb_configs::ServerConfig;
use bundledb_server::lifecycle::{bootstrap, run};
use bundledb_server::logging;
use clap::Parser;
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bundledb-server", version, about = "BundleDB HTTP server")]
struct Args {
    /// Path to the TOML configuration file (defaults apply when missing)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override `worker.embedded` and keep the worker out of this process
    #[arg(long)]
    no_worker: bool,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let main_start = std::time::Instant::now();
    let args = Args::parse();

    let mut config = match ServerConfig::load_or_default(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: Failed to load {}: {}", args.config.display(), e);
            std::process::exit(1);
        },
    };
    if args.no_worker {
        config.worker.embedded = false;
    }

    // Logging before any other side effects
    logging::init_logging(&config.logging, "server.log")?;

    let version = env!("CARGO_PKG_VERSION");
    info!("╔═══════════════════════════════════════════════════════════════╗");
    info!("║           BundleDB Server v{:<36} ║", version);
    info!("╚═══════════════════════════════════════════════════════════════╝");
    info!(
        "Host: {}  Port: {}  Prefix: {}",
        config.server.host, config.server.port, config.server.route_prefix
    );
    info!(
        "Storage: {} ({})",
        config.storage.backend.as_str(),
        config
            .storage
            .bucket
            .as_deref()
            .unwrap_or(config.storage.data_path.as_str())
    );

    // Build application state and start the embedded worker
    let (app_context, embedded) = bootstrap(&config).await?;

    // Run HTTP server until termination signal is received
    run(&config, app_context, embedded, main_start).await
}
