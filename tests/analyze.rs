#![cfg(feature = "web")]

use analyzer::app::{AppState, router};
use analyzer::sort::SortDirection;
use analyzer::upload::UploadDir;
use analyzer::view;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "analyzer-test-boundary";

fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadDir::create(dir.path().join("uploads")).unwrap();
    let app = router(Arc::new(AppState::new(uploads)));
    (app, dir)
}

fn multipart_part(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    part.extend_from_slice(content);
    part.extend_from_slice(b"\r\n");
    part
}

fn analyze_request(parts: Vec<Vec<u8>>) -> Request<Body> {
    let mut body: Vec<u8> = parts.into_iter().flatten().collect();
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn upload_file(filename: &str, content: &str) -> Request<Body> {
    analyze_request(vec![multipart_part("file", filename, content.as_bytes())])
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn upload_dir_is_empty(dir: &TempDir) -> bool {
    let uploads = dir.path().join("uploads");
    std::fs::read_dir(&uploads).unwrap().next().is_none()
}

#[tokio::test]
async fn csv_upload_returns_rows_in_header_order() {
    let (app, dir) = test_app();

    let (status, body) = send(app, upload_file("people.csv", "name,age\nAlice,30\nBob,25\n")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "data": [{ "name": "Alice", "age": "30" }, { "name": "Bob", "age": "25" }] })
    );

    let keys: Vec<&str> = body["data"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 2);
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn response_body_keeps_column_order_on_the_wire() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(upload_file("z.csv", "zeta,alpha\n1,2\n"))
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    assert_eq!(&bytes[..], br#"{"data":[{"zeta":"1","alpha":"2"}]}"#);
}

#[tokio::test]
async fn every_row_has_the_header_key_set() {
    let (app, _dir) = test_app();
    let csv = "a,b,c\n1,2,3\n4,5,6\n7,8,9\n";

    let (status, body) = send(app, upload_file("grid.csv", csv)).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    for row in rows {
        let mut keys: Vec<&String> = row.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}

#[tokio::test]
async fn extension_check_ignores_case() {
    let (app, _dir) = test_app();

    let (status, body) = send(app, upload_file("PEOPLE.CSV", "x\n1\n")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [{ "x": "1" }] }));
}

#[tokio::test]
async fn header_only_file_returns_empty_list() {
    let (app, _dir) = test_app();

    let (status, body) = send(app, upload_file("empty.csv", "name,age\n")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn unsupported_extension_is_rejected_and_cleaned_up() {
    let (app, dir) = test_app();

    let (status, body) = send(app, upload_file("data.json", "{\"a\": 1}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unsupported file format" }));
    assert!(body.get("data").is_none());
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn picker_only_extensions_are_still_unsupported() {
    for name in ["table.data", "sheet.clsx", "noextension"] {
        let (app, _dir) = test_app();
        let (status, body) = send(app, upload_file(name, "a,b\n1,2\n")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", name);
        assert_eq!(body["error"], "Unsupported file format");
    }
}

#[tokio::test]
async fn malformed_csv_is_a_server_error_with_details() {
    let (app, dir) = test_app();

    let (status, body) = send(app, upload_file("bad.csv", "name,age\nAlice,30,extra\n")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error processing file");
    let details = body["details"].as_str().unwrap();
    assert!(!details.is_empty());
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn invalid_utf8_is_decoded_lossily() {
    let (app, dir) = test_app();
    let request = analyze_request(vec![multipart_part("file", "bin.csv", b"name\n\xff\xfe\n")]);

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [{ "name": "\u{FFFD}\u{FFFD}" }] }));
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn missing_file_field_is_a_client_error() {
    let (app, _dir) = test_app();
    let request = analyze_request(vec![multipart_part("attachment", "people.csv", b"a\n1\n")]);

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No file uploaded" }));
}

#[tokio::test]
async fn other_fields_before_the_file_are_skipped() {
    let (app, _dir) = test_app();
    let request = analyze_request(vec![
        multipart_part("comment", "note.txt", b"ignore me"),
        multipart_part("file", "people.csv", b"name\nAlice\n"),
    ]);

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [{ "name": "Alice" }] }));
}

#[tokio::test]
async fn concurrent_uploads_with_the_same_name_do_not_collide() {
    let (app, dir) = test_app();

    let first = send(app.clone(), upload_file("data.csv", "v\nfirst\n"));
    let second = send(app.clone(), upload_file("data.csv", "v\nsecond\n"));
    let ((s1, b1), (s2, b2)) = tokio::join!(first, second);

    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(b1, json!({ "data": [{ "v": "first" }] }));
    assert_eq!(b2, json!({ "data": [{ "v": "second" }] }));
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn body_limit_rejects_large_uploads_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadDir::create(dir.path()).unwrap();
    let app = router(Arc::new(AppState::new(uploads).with_body_limit(Some(64))));

    let big = format!("v\n{}\n", "x".repeat(1024));
    let response = app.oneshot(upload_file("big.csv", &big)).await.unwrap();

    assert!(response.status().is_client_error());
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn index_page_offers_csv_picker() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    let accept = view::ACCEPTED_EXTENSIONS.join(",");
    assert!(html.contains(&format!("accept=\"{}\"", accept)));
    assert!(html.contains(view::ANALYZE_PATH));
    assert!(html.contains("No data available"));
}

#[tokio::test]
async fn index_page_uses_the_view_model_strings() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    for text in [
        view::NO_FILE_MESSAGE,
        view::BAD_STATUS_MESSAGE,
        view::FALLBACK_MESSAGE,
        view::LOADING_LABEL,
        view::IDLE_LABEL,
        view::FILE_FIELD,
        SortDirection::Ascending.arrow(),
        SortDirection::Descending.arrow(),
    ] {
        assert!(html.contains(text), "page is missing {:?}", text);
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _dir) = test_app();

    let (status, body) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
