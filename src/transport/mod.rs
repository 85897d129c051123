//! HTTP transport layer for the SegView client.
//!
//! [`Transport`] turns a (signed) [`RequestDescriptor`] into a wire request,
//! sends it through an [`HttpTransport`] and maps the raw response to either
//! an [`ApiResponse`] or a service error. Each call settles exactly once.

mod http;
mod request;

pub use self::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use self::request::{HttpMethod, Payload, RequestDescriptor};

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::errors::{SegViewError, SegViewResult};
use crate::observability::redact_headers;
use crate::types::ApiResponse;

/// JSON media type.
pub const MIME_JSON: &str = "application/json";

/// Form media type.
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// Message used when a 2xx body is not valid JSON.
pub const BAD_RESPONSE: &str = "Bad response";

/// Message used when an error response has no body.
pub const UNKNOWN_ERROR: &str = "Unknown";

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// The response could not be read.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

impl From<TransportError> for SegViewError {
    fn from(err: TransportError) -> Self {
        SegViewError::service_default(err.to_string())
    }
}

/// Executes request descriptors against the SegView API.
#[derive(Clone)]
pub struct Transport {
    base_url: String,
    user_agent: String,
    http: Arc<dyn HttpTransport>,
}

impl Transport {
    /// Creates a transport rooted at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: user_agent.into(),
            http,
        }
    }

    /// Assembles the wire request for a descriptor.
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> SegViewResult<HttpRequest> {
        let mut url = format!("{}{}", self.base_url, descriptor.uri);
        if !descriptor.params.is_empty() {
            let query = serde_urlencoded::to_string(&descriptor.params).map_err(|e| {
                SegViewError::validation(format!("Invalid query parameters: {}", e))
            })?;
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), self.user_agent.clone());
        headers.insert("accept".to_string(), MIME_JSON.to_string());
        headers.insert("content-type".to_string(), MIME_JSON.to_string());
        for (name, value) in &descriptor.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        Ok(HttpRequest {
            method: descriptor.method,
            url,
            headers,
            body: descriptor.encode_body()?,
        })
    }

    /// Sends a descriptor and interprets the response.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method, uri = %descriptor.uri))]
    pub async fn execute(&self, descriptor: RequestDescriptor) -> SegViewResult<ApiResponse> {
        let request = self.build_request(&descriptor)?;
        tracing::debug!(
            url = %request.url,
            headers = ?redact_headers(&request.headers),
            "Sending request"
        );

        let response = self.http.send(request).await.map_err(|e| {
            tracing::debug!(error = %e, "Transport failure");
            SegViewError::from(e)
        })?;

        interpret_response(response)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Maps a raw response to the call outcome.
pub fn interpret_response(response: HttpResponse) -> SegViewResult<ApiResponse> {
    if !response.is_success() {
        let message = error_message(&response.body);
        tracing::debug!(status = response.status, message = %message, "Service returned an error");
        return Err(SegViewError::service(message, response.status));
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(body) => Ok(ApiResponse::new(response.status, body)),
        Err(e) => {
            tracing::debug!(error = %e, "Response body is not JSON");
            Err(SegViewError::service_default(BAD_RESPONSE))
        }
    }
}

fn error_message(body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        match map.get("message") {
            Some(Value::String(message)) if !message.is_empty() => return message.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn transport(mock: Arc<MockTransport>) -> Transport {
        Transport::new("https://api.segview.test", "test-agent", mock)
    }

    #[test]
    fn test_success_parses_json() {
        let result = interpret_response(response(200, r#"{"certificationId":"abc123"}"#)).unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.response, json!({"certificationId": "abc123"}));
    }

    #[test]
    fn test_error_uses_message_field() {
        let error = interpret_response(response(404, r#"{"message":"not found"}"#)).unwrap_err();
        assert_eq!(error.message(), "not found");
        assert_eq!(error.status(), 404);
    }

    #[test]
    fn test_error_falls_back_to_raw_body() {
        let error = interpret_response(response(502, "upstream gone")).unwrap_err();
        assert_eq!(error.message(), "upstream gone");
        assert_eq!(error.status(), 502);

        let error = interpret_response(response(400, r#"{"error":"x"}"#)).unwrap_err();
        assert_eq!(error.message(), r#"{"error":"x"}"#);
    }

    #[test]
    fn test_error_without_body_is_unknown() {
        let error = interpret_response(response(503, "")).unwrap_err();
        assert_eq!(error.message(), UNKNOWN_ERROR);
        assert_eq!(error.status(), 503);
    }

    #[test]
    fn test_unparsable_success_is_bad_response() {
        let error = interpret_response(response(200, "not-json{")).unwrap_err();
        assert!(error.is_service());
        assert_eq!(error.message(), BAD_RESPONSE);
        assert_eq!(error.status(), 500);
    }

    #[test]
    fn test_empty_success_is_bad_response() {
        for body in ["", "  \n"] {
            let error = interpret_response(response(200, body)).unwrap_err();
            assert!(error.is_service());
            assert_eq!(error.message(), BAD_RESPONSE);
            assert_eq!(error.status(), 500);
        }
    }

    #[test]
    fn test_build_request_merges_headers() {
        let transport = transport(Arc::new(MockTransport::new()));
        let descriptor = RequestDescriptor::post("/recognition/")
            .with_header("Content-Type", MIME_FORM)
            .with_header("X-Trace", "1")
            .with_data(json!({"a": "b"}));

        let request = transport.build_request(&descriptor).unwrap();

        assert_eq!(request.url, "https://api.segview.test/recognition/");
        assert_eq!(request.headers.get("content-type").unwrap(), MIME_FORM);
        assert_eq!(request.headers.get("accept").unwrap(), MIME_JSON);
        assert_eq!(request.headers.get("user-agent").unwrap(), "test-agent");
        assert_eq!(request.headers.get("x-trace").unwrap(), "1");
        assert!(!request.headers.contains_key("Content-Type"));
        assert_eq!(request.body, Some(b"a=b".to_vec()));
    }

    #[test]
    fn test_build_request_appends_query() {
        let transport = transport(Arc::new(MockTransport::new()));
        let descriptor = RequestDescriptor::get("/certifications")
            .with_param("plate", "AB 123")
            .with_param("page", "2");

        let request = transport.build_request(&descriptor).unwrap();
        assert_eq!(
            request.url,
            "https://api.segview.test/certifications?plate=AB+123&page=2"
        );
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn test_execute_maps_transport_failure() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_failure(TransportError::Connection {
            message: "connection refused".to_string(),
        });

        let error = transport(mock.clone())
            .execute(RequestDescriptor::get("/x"))
            .await
            .unwrap_err();

        assert!(error.is_service());
        assert_eq!(error.status(), 500);
        assert!(error.message().contains("connection refused"));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_sends_method() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::json(&json!({"deleted": true})));

        let result = transport(mock.clone())
            .execute(RequestDescriptor::delete("/certifications/1"))
            .await
            .unwrap();

        assert_eq!(result.response, json!({"deleted": true}));
        let recorded = mock.last_request().unwrap();
        assert_eq!(recorded.method, HttpMethod::Delete);
        assert_eq!(recorded.url, "https://api.segview.test/certifications/1");
    }
}
