//! End-to-end tests of the reqwest transport against WireMock.

use segview_client::auth::{API_KEY_HEADER, SANDBOX_HEADER, SIGNATURE_HEADER};
use segview_client::transport::MIME_FORM;
use segview_client::{compute_signature, PhotoUpload, Picture, RequestDescriptor, SegViewClient};
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(server: &MockServer) -> SegViewClient {
    SegViewClient::builder()
        .client_id("client-1")
        .client_secret("s3cr3t")
        .base_url(server.uri())
        .certification_url("https://cert.segview.test")
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
async fn test_send_photos_round_trip() {
    let server = MockServer::start().await;
    let body = r#"{"pictures":[{"name":"picture_0","link":"https://img.test/0.jpg"}]}"#;
    let signature = compute_signature("s3cr3t", body.as_bytes()).unwrap();

    Mock::given(method("POST"))
        .and(path("/recognition/"))
        .and(header(API_KEY_HEADER, "client-1"))
        .and(header(SIGNATURE_HEADER, signature.as_str()))
        .and(header(SANDBOX_HEADER, "true"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_string(body))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"certificationId": "abc123"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    client.sandbox_mode(Some(true));

    let result = client
        .send_photos(&[Picture::new("picture_0", "https://img.test/0.jpg")])
        .await
        .unwrap();

    assert_eq!(result.status, 201);
    assert_eq!(result.certification_id(), Some("abc123"));
}

#[tokio::test]
async fn test_get_sends_query_and_user_agent() {
    let server = MockServer::start().await;
    let signature =
        compute_signature("s3cr3t", b"https://cert.segview.test/certifications").unwrap();

    Mock::given(method("GET"))
        .and(path("/certifications"))
        .and(query_param("plate", "AB123CD"))
        .and(header(SIGNATURE_HEADER, signature.as_str()))
        .and(header(
            "user-agent",
            format!("SegView Rust SDK v{}", SegViewClient::VERSION).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let result = client
        .get_with_params("/certifications", [("plate", "AB123CD")])
        .await
        .unwrap();

    assert_eq!(result.response, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_not_found_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/certifications/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let error = create_client(&server)
        .get("/certifications/nope")
        .await
        .unwrap_err();

    assert!(error.is_service());
    assert_eq!(error.message(), "not found");
    assert_eq!(error.status(), 404);
}

#[tokio::test]
async fn test_unparsable_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recognition/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not-json{"))
        .mount(&server)
        .await;

    let error = create_client(&server)
        .send_photos(&[Picture::new("p", "https://img.test/p.jpg")])
        .await
        .unwrap_err();

    assert_eq!(error.message(), "Bad response");
    assert_eq!(error.status(), 500);
}

#[tokio::test]
async fn test_form_encoded_data() {
    let server = MockServer::start().await;
    let unsigned_body = compute_signature("s3cr3t", b"").unwrap();

    Mock::given(method("POST"))
        .and(path("/forms/"))
        .and(header("content-type", MIME_FORM))
        .and(header("seg-view-signature", unsigned_body.as_str()))
        .and(body_string("plate=AB123CD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let result = create_client(&server)
        .post(
            RequestDescriptor::post("/forms/")
                .with_header("Content-Type", MIME_FORM)
                .with_data(json!({"plate": "AB123CD"})),
        )
        .await
        .unwrap();

    assert_eq!(result.response, json!({"ok": true}));
}

#[tokio::test]
async fn test_send_photo_file_upload() {
    let server = MockServer::start().await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"hello").unwrap();

    let expected = PhotoUpload::from_bytes(b"hello", "AB123CD")
        .to_json_string()
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/requestsOCR/sendPhoto/"))
        .and(body_string(expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let result = client
        .send_photo_file(file.path(), "AB123CD")
        .unwrap()
        .await
        .unwrap();

    assert_eq!(result.response["status"], "queued");
}

#[tokio::test]
async fn test_connection_failure_is_service_error() {
    let client = SegViewClient::builder()
        .client_id("client-1")
        .client_secret("s3cr3t")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let error = client.get("/anything").await.unwrap_err();

    assert!(error.is_service());
    assert_eq!(error.status(), 500);
}
