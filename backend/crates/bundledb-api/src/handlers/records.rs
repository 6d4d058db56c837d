//! Row-level endpoints: insert, match, update, soft delete and direct lookup.

use super::helpers::{degrade, non_empty, parse_table, present, selector, AppData};
use crate::models::{
    ApiResponse, DeleteRecordsRequest, FetchRecordsRequest, GetRowsRequest, NewRecordRequest,
    UpdateRecordsRequest,
};
use actix_web::{web, HttpResponse};
use bundledb_core::{MatchedUpdate, Pagination};
use serde_json::{json, Value};

/// POST /new_record
///
/// Answers once the insert is queued; the row appears after the worker runs.
pub async fn new_record_handler(ctx: AppData, body: web::Json<NewRecordRequest>) -> HttpResponse {
    let body = body.into_inner();
    let (Some(name), Some(data)) = (non_empty(body.tablename), body.data) else {
        return ApiResponse::missing_fields(&["tablename", "data"]).into_http();
    };
    let table = match parse_table(&name) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    match ctx.tables().new_record(&table, data).await {
        Ok((job_id, echoed)) => {
            log::debug!("[{}] new_record queued for {}", job_id, table);
            ApiResponse::created(
                format!("Success: Record added to object: {}", table.display_upper()),
                Value::Object(echoed),
            )
            .into_http()
        },
        Err(e) => {
            log::error!("Failed to enqueue new_record for {}: {}", table, e);
            ApiResponse::new(500, format!("Error: {}", e), json!({})).into_http()
        },
    }
}

/// POST /fetch_records
pub async fn fetch_records_handler(
    ctx: AppData,
    body: web::Json<FetchRecordsRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let (Some(name), Some(constraints)) = (non_empty(body.tablename), present(body.constraints))
    else {
        return ApiResponse::missing_fields(&["tablename", "constraints"]).into_http();
    };
    let table = match parse_table(&name) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    let pagination = Pagination::from_values(body.page_size.as_ref(), body.this_page.as_ref());
    let query = match selector(constraints, body.strict.as_ref(), body.operator, pagination).to_query()
    {
        Ok(query) => query,
        Err(e) => return degrade("fetch_records", &table, e, "Error: no data", json!([])),
    };

    match ctx
        .tables()
        .fetch_records(&table, &query, body.restrict.as_deref())
        .await
    {
        Ok(Some(rows)) => ApiResponse::ok(
            format!(
                "Success: {} records matched in object: {}",
                rows.len(),
                table.display_upper()
            ),
            Value::Array(rows.into_iter().map(Value::Object).collect()),
        )
        .into_http(),
        Ok(None) => ApiResponse::no_data("Error: no data", json!([])).into_http(),
        Err(e) => degrade("fetch_records", &table, e, "Error: no data", json!([])),
    }
}

fn matched_response(
    outcome: Option<MatchedUpdate>,
    verb: &str,
    table: &bundledb_commons::TableName,
) -> HttpResponse {
    match outcome {
        Some(outcome) => {
            if let Some(job_id) = &outcome.job_id {
                log::debug!("[{}] {} rows queued for {} in {}", job_id, outcome.matched, verb, table);
            }
            ApiResponse::ok(
                format!(
                    "Success: {} records {} in object: {}",
                    outcome.matched,
                    verb,
                    table.display_upper()
                ),
                json!({}),
            )
            .into_http()
        },
        None => ApiResponse::no_data("Error: No data", json!({})).into_http(),
    }
}

/// POST /update_records
///
/// Matching happens now; the overwrite is applied by the worker.
pub async fn update_records_handler(
    ctx: AppData,
    body: web::Json<UpdateRecordsRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let (Some(name), Some(constraints), Some(use_data)) =
        (non_empty(body.tablename), present(body.constraints), body.data)
    else {
        return ApiResponse::missing_fields(&["tablename", "constraints", "data"]).into_http();
    };
    let table = match parse_table(&name) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    let selector = selector(constraints, body.strict.as_ref(), body.operator, None);
    match ctx.tables().update_records(&table, selector, use_data).await {
        Ok(outcome) => matched_response(outcome, "updated", &table),
        Err(e) => degrade("update_records", &table, e, "Error: No data", json!({})),
    }
}

/// POST /delete_records
///
/// Soft delete: matched rows get `__private__ = 1` and disappear from reads.
pub async fn delete_records_handler(
    ctx: AppData,
    body: web::Json<DeleteRecordsRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    let (Some(name), Some(constraints)) = (non_empty(body.tablename), present(body.constraints))
    else {
        return ApiResponse::missing_fields(&["tablename", "constraints"]).into_http();
    };
    let table = match parse_table(&name) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    let selector = selector(constraints, body.strict.as_ref(), body.operator, None);
    match ctx.tables().delete_records(&table, selector).await {
        Ok(outcome) => matched_response(outcome, "deleted", &table),
        Err(e) => degrade("delete_records", &table, e, "Error: No data", json!({})),
    }
}

/// POST /get_rows
pub async fn get_rows_handler(ctx: AppData, body: web::Json<GetRowsRequest>) -> HttpResponse {
    let body = body.into_inner();
    let (Some(name), Some(row_ids)) = (non_empty(body.tablename), body.row_ids) else {
        return ApiResponse::missing_fields(&["tablename", "row_ids"]).into_http();
    };
    let table = match parse_table(&name) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    match ctx
        .tables()
        .get_rows(&table, &row_ids, body.restrict.as_deref())
        .await
    {
        Ok(Some(rows)) => ApiResponse::ok(
            format!(
                "Success: {} records fetched from object: {}",
                rows.len(),
                table.display_upper()
            ),
            Value::Array(rows.into_iter().map(Value::Object).collect()),
        )
        .into_http(),
        Ok(None) => ApiResponse::no_data("Error: no data", json!({})).into_http(),
        Err(e) => degrade("get_rows", &table, e, "Error: no data", json!({})),
    }
}
