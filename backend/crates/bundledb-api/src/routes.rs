//! API routes configuration
//!
//! Table endpoints live under a configurable prefix (default `/ods`):
//! - GET  {prefix}/get_register/{tablename}
//! - POST {prefix}/new_table
//! - POST {prefix}/new_record
//! - POST {prefix}/fetch_records
//! - POST {prefix}/update_records
//! - POST {prefix}/delete_records
//! - POST {prefix}/get_rows
//! - GET  {prefix}/flush_table/{tablename}
//!
//! plus `GET /healthcheck` at the root.

use crate::handlers;
use crate::models::ApiResponse;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest};

const MALFORMED_MESSAGE: &str = "Malformed request. Check and try again.";
const BAD_REQUEST_MESSAGE: &str = "There was a problem with your request.";

/// Register every route; `prefix` is the scope of the table endpoints.
pub fn configure_routes(cfg: &mut web::ServiceConfig, prefix: &str) {
    cfg.route("/healthcheck", web::get().to(handlers::healthcheck_handler))
        .service(
            web::scope(prefix)
                .route("/get_register/{tablename}", web::get().to(handlers::get_register_handler))
                .route("/new_table", web::post().to(handlers::new_table_handler))
                .route("/new_record", web::post().to(handlers::new_record_handler))
                .route("/fetch_records", web::post().to(handlers::fetch_records_handler))
                .route("/update_records", web::post().to(handlers::update_records_handler))
                .route("/delete_records", web::post().to(handlers::delete_records_handler))
                .route("/get_rows", web::post().to(handlers::get_rows_handler))
                .route("/flush_table/{tablename}", web::get().to(handlers::flush_table_handler)),
        );
}

/// JSON extractor config: body size limit and `{code: 400, message}` on bad bodies.
pub fn json_config(max_body_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_bytes)
        .error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Deserialize(e) if e.is_syntax() || e.is_eof() => MALFORMED_MESSAGE,
        _ => BAD_REQUEST_MESSAGE,
    };
    log::debug!("Rejected body for {}: {}", req.path(), err);
    let response = ApiResponse::bad_request(message).into_http();
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use bundledb_configs::{ServerConfig, StorageBackend};
    use bundledb_core::AppContext;
    use object_store::memory::InMemory;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn memory_context() -> Arc<AppContext> {
        let mut config = ServerConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.retry.max_attempts = 1;
        AppContext::with_object_store(config, Arc::new(InMemory::new()))
    }

    macro_rules! app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Arc::clone(&$ctx)))
                    .app_data(json_config(1024 * 1024))
                    .configure(|cfg| configure_routes(cfg, "/ods")),
            )
            .await
        };
    }

    async fn body_of(resp: actix_web::dev::ServiceResponse) -> ApiResponse {
        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn test_healthcheck() {
        let ctx = memory_context();
        let app = app!(ctx);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/healthcheck").to_request()).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], json!("healthy"));
        assert_eq!(body["storage_backend"], json!("memory"));
    }

    #[actix_web::test]
    async fn test_missing_fields_are_rejected_without_mutation() {
        let ctx = memory_context();
        let app = app!(ctx);
        let req = test::TestRequest::post()
            .uri("/ods/fetch_records")
            .set_json(json!({"tablename": "users"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body = body_of(resp).await;
        assert_eq!(
            body.message,
            "Error: One or more required fields missing (check: `tablename`, `constraints`)"
        );

        let req = test::TestRequest::post()
            .uri("/ods/new_record")
            .set_json(json!({"data": {"name": "Ann"}}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
        assert!(ctx.queue().list_inactive().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_400() {
        let ctx = memory_context();
        let app = app!(ctx);
        let req = test::TestRequest::post()
            .uri("/ods/new_table")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"tablename\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body = body_of(resp).await;
        assert_eq!(body.code, 400);
        assert_eq!(body.message, MALFORMED_MESSAGE);
    }

    #[actix_web::test]
    async fn test_missing_table_degrades_to_no_data() {
        let ctx = memory_context();
        let app = app!(ctx);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/ods/get_register/ghost").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let body = body_of(resp).await;
        assert_eq!(body.message, "Error: No data");
        assert_eq!(body.data, json!({}));

        let req = test::TestRequest::post()
            .uri("/ods/fetch_records")
            .set_json(json!({"tablename": "ghost", "constraints": "*"}))
            .to_request();
        let body = body_of(test::call_service(&app, req).await).await;
        assert_eq!(body.message, "Error: no data");
        assert_eq!(body.data, json!([]));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/ods/flush_table/ghost").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_of(resp).await.message, "Error: no data");
    }

    #[actix_web::test]
    async fn test_users_scenario_over_http() {
        let ctx = memory_context();
        let worker = ctx.worker();
        let app = app!(ctx);

        let req = test::TestRequest::post()
            .uri("/ods/new_table")
            .set_json(json!({"tablename": "users", "fields": ["name", "age"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        assert_eq!(body_of(resp).await.message, "Success: Prototype updated for object: USERS");

        for (name, age) in [("Ann", 30), ("Bo", 25)] {
            let req = test::TestRequest::post()
                .uri("/ods/new_record")
                .set_json(json!({"tablename": "users", "data": {"name": name, "age": age}}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
            let body = body_of(resp).await;
            assert_eq!(body.data["name"], json!(name));
            assert!(body.data["users_id"].is_string());
        }
        worker.drain().await.unwrap();

        let req = test::TestRequest::post()
            .uri("/ods/fetch_records")
            .set_json(json!({
                "tablename": "users",
                "constraints": {"age": [20, 28]},
                "restrict": ["name", "age"]
            }))
            .to_request();
        let body = body_of(test::call_service(&app, req).await).await;
        assert_eq!(body.message, "Success: 1 records matched in object: USERS");
        assert_eq!(body.data, json!([{"name": "Bo", "age": 25}]));

        let req = test::TestRequest::post()
            .uri("/ods/update_records")
            .set_json(json!({
                "tablename": "users",
                "constraints": {"name": "bo"},
                "data": {"age": 26}
            }))
            .to_request();
        let body = body_of(test::call_service(&app, req).await).await;
        assert_eq!(body.message, "Success: 1 records updated in object: USERS");
        worker.drain().await.unwrap();

        let req = test::TestRequest::post()
            .uri("/ods/delete_records")
            .set_json(json!({"tablename": "users", "constraints": {"name": "ann"}}))
            .to_request();
        let body = body_of(test::call_service(&app, req).await).await;
        assert_eq!(body.message, "Success: 1 records deleted in object: USERS");
        worker.drain().await.unwrap();

        let req = test::TestRequest::post()
            .uri("/ods/get_rows")
            .set_json(json!({"tablename": "users", "row_ids": [1, "2"], "restrict": ["age"]}))
            .to_request();
        let body = body_of(test::call_service(&app, req).await).await;
        assert_eq!(body.message, "Success: 1 records fetched from object: USERS");
        assert_eq!(body.data, json!([{"age": 26}]));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/ods/get_register/users").to_request(),
        )
        .await;
        let body = body_of(resp).await;
        assert_eq!(body.data["row_count"], json!(2));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/ods/flush_table/users").to_request(),
        )
        .await;
        assert_eq!(body_of(resp).await.message, "Success: Table [USERS] was flushed");
        let req = test::TestRequest::post()
            .uri("/ods/fetch_records")
            .set_json(json!({"tablename": "users", "constraints": "*"}))
            .to_request();
        let body = body_of(test::call_service(&app, req).await).await;
        assert_eq!(body.data, json!([]));
    }
}
