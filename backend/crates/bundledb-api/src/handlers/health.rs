//! Health check handler

use super::helpers::AppData;
use actix_web::HttpResponse;
use serde_json::json;

/// GET /healthcheck
pub async fn healthcheck_handler(ctx: AppData) -> HttpResponse {
    let config = ctx.config();
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": ctx.version(),
        "uptime_seconds": ctx.uptime_seconds(),
        "storage_backend": config.storage.backend.as_str(),
        "route_prefix": config.server.route_prefix,
        "embedded_worker": config.worker.embedded,
    }))
}
