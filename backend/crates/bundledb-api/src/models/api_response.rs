//! Response envelope shared by every table endpoint

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `{code, message, data}` body.
///
/// `code` mirrors the HTTP status. Degraded reads still answer 200 with an
/// `Error: ...` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    pub data: Value,
}

impl ApiResponse {
    #[inline]
    pub fn new(code: u16, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self::new(200, message, data)
    }

    pub fn created(message: impl Into<String>, data: Value) -> Self {
        Self::new(201, message, data)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message, json!({}))
    }

    /// 400 for a request missing one of `fields`.
    pub fn missing_fields(fields: &[&str]) -> Self {
        let list = fields
            .iter()
            .map(|f| format!("`{}`", f))
            .collect::<Vec<_>>()
            .join(", ");
        Self::bad_request(format!(
            "Error: One or more required fields missing (check: {})",
            list
        ))
    }

    /// 200 answer for a table that does not exist or could not be read.
    pub fn no_data(message: &str, data: Value) -> Self {
        Self::ok(message, data)
    }

    pub fn into_http(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        HttpResponse::build(status).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let resp = ApiResponse::missing_fields(&["tablename", "constraints"]);
        assert_eq!(resp.code, 400);
        assert_eq!(
            resp.message,
            "Error: One or more required fields missing (check: `tablename`, `constraints`)"
        );
        assert_eq!(resp.data, json!({}));
    }

    #[test]
    fn test_into_http_uses_code_as_status() {
        assert_eq!(ApiResponse::created("x", json!({})).into_http().status(), StatusCode::CREATED);
        assert_eq!(ApiResponse::bad_request("x").into_http().status(), StatusCode::BAD_REQUEST);
    }
}
