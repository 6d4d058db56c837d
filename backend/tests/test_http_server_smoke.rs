//! Smoke tests for the near-production HTTP server wiring.

use serde_json::json;

#[path = "test_support/mod.rs"]
mod test_support;

use test_support::{get_json, post_json, start_memory_server};

#[tokio::test]
async fn test_healthcheck_outside_prefix() {
    let server = start_memory_server().await;

    let resp = reqwest::get(format!("{}/healthcheck", server.base_url))
        .await
        .expect("healthcheck request");
    assert!(resp.status().is_success(), "Expected 2xx, got {}", resp.status());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["route_prefix"], json!("/ods"));
    assert_eq!(body["storage_backend"], json!("memory"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_records_round_trip_through_worker() {
    let server = start_memory_server().await;
    let worker = server.app_context.worker();

    let (status, body) = post_json(
        &server,
        "new_table",
        json!({"tablename": "books", "fields": ["title", "year"]}),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], json!("Success: Prototype updated for object: BOOKS"));

    for (title, year) in [("Dune", 1965), ("Neuromancer", 1984), ("Hyperion", 1989)] {
        let (status, body) = post_json(
            &server,
            "new_record",
            json!({"tablename": "books", "data": {"title": title, "year": year}}),
        )
        .await;
        assert_eq!(status, 201);
        assert!(body["data"]["books_id"].is_string());
    }

    // Nothing is visible until the worker runs
    let (_, body) = get_json(&server, "get_register/books").await;
    assert_eq!(body["message"], json!("Error: No data"));

    let report = worker.drain().await.unwrap();
    assert_eq!(report.completed, 4);
    assert!(server.app_context.queue().list_inactive().await.unwrap().is_empty());

    let (status, body) = post_json(
        &server,
        "fetch_records",
        json!({
            "tablename": "books",
            "constraints": {"year": [1980, 1990]},
            "page_size": 1,
            "this_page": 2,
            "restrict": ["title"]
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], json!("Success: 1 records matched in object: BOOKS"));
    assert_eq!(body["data"], json!([{"title": "Hyperion"}]));

    let (_, body) = post_json(
        &server,
        "fetch_records",
        json!({"tablename": "books", "constraints": {"title_NOT": "dune"}}),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(&server, "get_register/books").await;
    assert_eq!(body["code"], json!(200));
    assert_eq!(body["data"]["row_count"], json!(3));

    server.shutdown().await;
}

#[tokio::test]
async fn test_bad_requests_are_rejected() {
    let server = start_memory_server().await;

    let (status, body) = post_json(&server, "new_record", json!({"tablename": "books"})).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("`data`"));

    let resp = reqwest::Client::new()
        .post(format!("{}/fetch_records", server.api_url()))
        .header("content-type", "application/json")
        .body("{\"tablename\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], json!("Malformed request. Check and try again."));

    let (status, body) = post_json(
        &server,
        "get_rows",
        json!({"tablename": "ghost", "row_ids": [1]}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], json!("Error: no data"));

    server.shutdown().await;
}
