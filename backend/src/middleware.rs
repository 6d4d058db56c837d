//! Server-wide middleware configuration helpers.
//!
//! Keeps the Actix application setup focused by providing reusable
//! constructors for the CORS, compression and logging layers.

use actix_cors::Cors;
use actix_web::middleware;
use bundledb_configs::ServerConfig;
use log::debug;

/// Build CORS middleware from server configuration using actix-cors.
///
/// An empty origin list (or `*`) allows any origin.
pub fn build_cors_from_config(config: &ServerConfig) -> Cors {
    let cors_config = &config.server.cors;

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header();

    if cors_config.allowed_origins.is_empty()
        || cors_config.allowed_origins.iter().any(|o| o == "*")
    {
        cors = cors.allow_any_origin();
        debug!("CORS: Allowing any origin");
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        debug!("CORS: Allowed origins: {:?}", cors_config.allowed_origins);
    }

    cors.max_age(cors_config.max_age)
}

/// Build the response compression middleware (gzip when the client accepts it).
pub fn compression() -> middleware::Compress {
    middleware::Compress::default()
}

/// Build the request logger middleware.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::default()
}
