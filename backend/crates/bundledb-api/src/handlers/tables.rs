//! Table-level endpoints: schema lookup, schema creation and flush.

use super::helpers::{degrade, non_empty, parse_table, AppData};
use crate::models::{ApiResponse, NewTableRequest};
use actix_web::{web, HttpResponse};
use serde_json::json;

/// GET /get_register/{tablename}
pub async fn get_register_handler(ctx: AppData, path: web::Path<String>) -> HttpResponse {
    let table = match parse_table(&path.into_inner()) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    match ctx.tables().get_register(&table).await {
        Ok(Some(register)) => match serde_json::to_value(register) {
            Ok(data) => ApiResponse::ok("Success", data).into_http(),
            Err(e) => degrade("get_register", &table, e.into(), "Error: No data", json!({})),
        },
        Ok(None) => ApiResponse::no_data("Error: No data", json!({})).into_http(),
        Err(e) => degrade("get_register", &table, e, "Error: No data", json!({})),
    }
}

/// POST /new_table
///
/// Schema changes go through the queue like every other write.
pub async fn new_table_handler(ctx: AppData, body: web::Json<NewTableRequest>) -> HttpResponse {
    let body = body.into_inner();
    let (Some(name), Some(fields)) = (non_empty(body.tablename), body.fields) else {
        return ApiResponse::missing_fields(&["tablename", "fields"]).into_http();
    };
    let table = match parse_table(&name) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    match ctx.tables().new_table(&table, fields).await {
        Ok(job_id) => {
            log::debug!("[{}] new_table queued for {}", job_id, table);
            ApiResponse::created(
                format!("Success: Prototype updated for object: {}", table.display_upper()),
                json!({}),
            )
            .into_http()
        },
        Err(e) => {
            log::error!("Failed to enqueue new_table for {}: {}", table, e);
            ApiResponse::new(500, format!("Error: {}", e), json!({})).into_http()
        },
    }
}

/// GET /flush_table/{tablename}
///
/// Synchronous reset that bypasses the queue.
pub async fn flush_table_handler(ctx: AppData, path: web::Path<String>) -> HttpResponse {
    let table = match parse_table(&path.into_inner()) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    match ctx.tables().flush_table(&table).await {
        Ok(true) => ApiResponse::ok(
            format!("Success: Table [{}] was flushed", table.display_upper()),
            json!({}),
        )
        .into_http(),
        Ok(false) => ApiResponse::no_data("Error: no data", json!({})).into_http(),
        Err(e) => degrade("flush_table", &table, e, "Error: no data", json!({})),
    }
}
