//! Server lifecycle management helpers.
//!
//! Bootstraps the shared application context, starts the embedded
//! serializing worker, wires the HTTP server and coordinates graceful
//! shutdown.

use crate::middleware;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use bundledb_api::{configure_routes, json_config};
use bundledb_configs::defaults::effective_workers;
use bundledb_configs::ServerConfig;
use bundledb_core::{AppContext, SerializingWorker};
use log::{debug, info, warn};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long shutdown waits for the worker to finish its current job.
const WORKER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serializing worker running as a task inside the server process.
pub struct EmbeddedWorker {
    worker: Arc<SerializingWorker>,
    task: JoinHandle<()>,
}

impl EmbeddedWorker {
    /// Spawn `worker.run_loop()` on the current runtime.
    pub fn spawn(worker: SerializingWorker) -> Self {
        let worker = Arc::new(worker);
        let looping = Arc::clone(&worker);
        let task = tokio::spawn(async move {
            if let Err(e) = looping.run_loop().await {
                log::error!("Embedded worker stopped with error: {}", e);
            }
        });
        Self { worker, task }
    }

    /// Signal shutdown and wait for the loop to observe it.
    pub async fn shutdown(self) {
        self.worker.shutdown();
        match tokio::time::timeout(WORKER_SHUTDOWN_TIMEOUT, self.task).await {
            Ok(Ok(())) => debug!("Embedded worker stopped"),
            Ok(Err(e)) => log::error!("Embedded worker task failed: {}", e),
            Err(_) => warn!(
                "Embedded worker did not stop within {}s",
                WORKER_SHUTDOWN_TIMEOUT.as_secs()
            ),
        }
    }
}

/// Build the object store, queue and table service, and start the embedded
/// worker when `worker.embedded` is set.
pub async fn bootstrap(config: &ServerConfig) -> Result<(Arc<AppContext>, Option<EmbeddedWorker>)> {
    let phase_start = std::time::Instant::now();
    let app_context = AppContext::from_config(config.clone())?;
    info!(
        "AppContext initialized ({:.2}ms)",
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    let embedded = if config.worker.embedded {
        info!(
            "Starting embedded serializing worker (queue prefix={})",
            config.queue.prefix
        );
        Some(EmbeddedWorker::spawn(app_context.worker()))
    } else {
        info!("Embedded worker disabled; run bundledb-worker against the same store");
        None
    };

    Ok((app_context, embedded))
}

/// Start the HTTP server and manage graceful shutdown.
pub async fn run(
    config: &ServerConfig,
    app_context: Arc<AppContext>,
    embedded: Option<EmbeddedWorker>,
    main_start: std::time::Instant,
) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let workers = effective_workers(config.server.workers);
    info!("Starting HTTP server on {}", bind_addr);
    debug!("Endpoints mounted under {}", config.server.route_prefix);
    info!(
        "Server config: workers={}, body_limit={}KB, storage={}",
        workers,
        config.server.max_body_bytes / 1024,
        config.storage.backend.as_str()
    );

    let server_config = config.clone();
    let app_context_for_handler = app_context.clone();

    let server = HttpServer::new(move || {
        let prefix = server_config.server.route_prefix.clone();
        App::new()
            .wrap(middleware::request_logger())
            .wrap(middleware::compression())
            .wrap(middleware::build_cors_from_config(&server_config))
            .app_data(web::Data::new(app_context_for_handler.clone()))
            .app_data(json_config(server_config.server.max_body_bytes))
            .configure(move |cfg| configure_routes(cfg, &prefix))
    })
    .bind(&bind_addr)?
    .workers(workers)
    .run();

    info!("Server started in {:.2}ms", main_start.elapsed().as_secs_f64() * 1000.0);

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            if let Err(e) = result {
                log::error!("Server task failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown...");

            // Stop HTTP before the worker so no new jobs arrive
            server_handle.stop(true).await;
        }
    }

    if let Some(worker) = embedded {
        info!("Stopping embedded worker...");
        worker.shutdown().await;
    }
    drop(app_context);

    info!("Server shutdown complete");
    Ok(())
}

/// A running HTTP server instance intended for integration tests.
///
/// Same middleware and routes as [`run`], bound to an ephemeral port. Never
/// starts a worker; tests drive `app_context.worker()` explicitly.
pub struct RunningTestHttpServer {
    pub base_url: String,
    pub bind_addr: SocketAddr,
    pub app_context: Arc<AppContext>,
    server_handle: actix_web::dev::ServerHandle,
    server_task: JoinHandle<std::io::Result<()>>,
}

impl RunningTestHttpServer {
    /// Base URL including the route prefix, e.g. `http://127.0.0.1:4242/ods`.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.base_url, self.app_context.config().server.route_prefix)
    }

    pub async fn shutdown(self) {
        self.server_handle.stop(false).await;
        let _ = self.server_task.await;
    }
}

/// Start the HTTP server for integration tests on a random available port.
///
/// Does not install Ctrl+C handling. Caller must invoke `shutdown()`.
pub async fn run_for_tests(
    config: &ServerConfig,
    app_context: Arc<AppContext>,
) -> Result<RunningTestHttpServer> {
    let bind_ip = if config.server.host.is_empty() {
        "127.0.0.1"
    } else {
        config.server.host.as_str()
    };

    let listener = TcpListener::bind((bind_ip, 0))?;
    let bind_addr = listener.local_addr()?;

    let server_config = config.clone();
    let app_context_for_handler = app_context.clone();

    let server = HttpServer::new(move || {
        let prefix = server_config.server.route_prefix.clone();
        App::new()
            .wrap(middleware::request_logger())
            .wrap(middleware::compression())
            .wrap(middleware::build_cors_from_config(&server_config))
            .app_data(web::Data::new(app_context_for_handler.clone()))
            .app_data(json_config(server_config.server.max_body_bytes))
            .configure(move |cfg| configure_routes(cfg, &prefix))
    })
    .listen(listener)?
    .workers(1)
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);
    let base_url = format!("http://{}", bind_addr);

    Ok(RunningTestHttpServer {
        base_url,
        bind_addr,
        app_context,
        server_handle,
        server_task,
    })
}
