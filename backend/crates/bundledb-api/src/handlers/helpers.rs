use crate::models::ApiResponse;
use actix_web::{web, HttpResponse};
use bundledb_commons::TableName;
use bundledb_core::{AppContext, BundleDbError, Pagination, UpdateSelector};
use serde_json::Value;
use std::sync::Arc;

pub type AppData = web::Data<Arc<AppContext>>;

/// Loose truthiness for request flags and required values.
///
/// `null`, `false`, `0`, `""` count as absent; empty objects and lists do not.
pub(super) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Treat an empty string like an absent one.
pub(super) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Drop falsy values so they read as missing.
pub(super) fn present(value: Option<Value>) -> Option<Value> {
    value.filter(is_truthy)
}

/// Validate a table name, or build the 400 to return.
pub(super) fn parse_table(name: &str) -> Result<TableName, HttpResponse> {
    TableName::try_new(name)
        .map_err(|e| ApiResponse::bad_request(format!("Error: {}", e)).into_http())
}

pub(super) fn selector(
    constraints: Value,
    strict: Option<&Value>,
    operator: Option<String>,
    pagination: Option<Pagination>,
) -> UpdateSelector {
    UpdateSelector {
        constraints,
        strict: strict.is_some_and(is_truthy),
        operator,
        pagination,
    }
}

/// Turn a service error into a response.
///
/// Bad constraints are the caller's fault (400). Everything else is a storage
/// or queue failure that degrades to the route's "no data" answer.
pub(super) fn degrade(
    route: &str,
    table: &TableName,
    err: BundleDbError,
    message: &str,
    data: Value,
) -> HttpResponse {
    match err {
        BundleDbError::InvalidInput(msg) => {
            ApiResponse::bad_request(format!("Error: {}", msg)).into_http()
        },
        other => {
            log::warn!("{} on {} degraded: {}", route, table, other);
            ApiResponse::no_data(message, data).into_http()
        },
    }
}
