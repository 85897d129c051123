//! Logical request descriptors and body encoding.

use serde_json::Value;
use std::collections::HashMap;

use super::{MIME_FORM, MIME_JSON};
use crate::errors::{SegViewError, SegViewResult};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// GET request.
    #[default]
    Get,
    /// POST request.
    Post,
    /// PUT request.
    Put,
    /// DELETE request.
    Delete,
}

impl HttpMethod {
    /// Converts to the `http` crate method.
    pub fn as_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_http().as_str())
    }
}

/// Request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured value, serialized by the transport.
    Json(Value),
    /// Pre-serialized text, sent as is.
    Text(String),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// A logical request against the SegView API.
///
/// `body` takes precedence over `data`; only one of them is expected per
/// call. A descriptor becomes a signed request once the client has added the
/// `seg-view-api-key` and `seg-view-signature` headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Path appended to the base URL.
    pub uri: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Raw body.
    pub body: Option<Payload>,
    /// Structured data, sent as JSON or form fields depending on content type.
    pub data: Option<Value>,
    /// Query string parameters.
    pub params: Vec<(String, String)>,
    /// Extra headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Whether the client attaches the signature headers.
    pub authenticate: bool,
}

impl RequestDescriptor {
    /// Creates a descriptor for `uri` with the given method.
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method,
            body: None,
            data: None,
            params: Vec::new(),
            headers: HashMap::new(),
            authenticate: true,
        }
    }

    /// Creates a GET descriptor.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, uri)
    }

    /// Creates a POST descriptor.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, uri)
    }

    /// Creates a PUT descriptor.
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, uri)
    }

    /// Creates a DELETE descriptor.
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, uri)
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Adds several query parameters.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a header. Names are stored lowercased.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a header in place, replacing any entry with the same name in
    /// another casing.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Skips the signature headers for this request.
    pub fn without_authentication(mut self) -> Self {
        self.authenticate = false;
        self
    }

    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        if let Some(value) = self.headers.get(&name) {
            return Some(value.as_str());
        }
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the effective content type.
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or(MIME_JSON)
    }

    /// Encodes the `body` payload alone, ignoring `data`.
    ///
    /// POST signatures are computed over these bytes (or the empty input when
    /// there is no body).
    pub fn encode_payload(&self) -> SegViewResult<Option<Vec<u8>>> {
        let json = is_json(self.content_type());
        let bytes = match &self.body {
            None => return Ok(None),
            Some(Payload::Text(text)) => text.as_bytes().to_vec(),
            Some(Payload::Json(Value::String(text))) if !json => text.as_bytes().to_vec(),
            Some(Payload::Json(value)) => serde_json::to_vec(value).map_err(|e| {
                SegViewError::validation(format!("Failed to serialize body: {}", e))
            })?,
        };
        Ok(Some(bytes))
    }

    /// Encodes the body exactly as it will go on the wire.
    ///
    /// `body` wins over `data`; `data` is JSON or form fields depending on
    /// the content type.
    pub fn encode_body(&self) -> SegViewResult<Option<Vec<u8>>> {
        if let Some(bytes) = self.encode_payload()? {
            return Ok(Some(bytes));
        }

        if let Some(data) = &self.data {
            let bytes = if is_json(self.content_type()) {
                serde_json::to_vec(data).map_err(|e| {
                    SegViewError::validation(format!("Failed to serialize data: {}", e))
                })?
            } else {
                serde_urlencoded::to_string(data)
                    .map_err(|e| {
                        SegViewError::validation(format!(
                            "Data cannot be sent as {}: {}",
                            MIME_FORM, e
                        ))
                    })?
                    .into_bytes()
            };
            return Ok(Some(bytes));
        }

        Ok(None)
    }
}

impl From<&str> for RequestDescriptor {
    fn from(uri: &str) -> Self {
        Self::get(uri)
    }
}

impl From<String> for RequestDescriptor {
    fn from(uri: String) -> Self {
        Self::get(uri)
    }
}

/// Returns true if `content_type` names JSON, ignoring parameters.
pub(crate) fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(MIME_JSON))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_is_compact() {
        let descriptor =
            RequestDescriptor::post("/recognition/").with_body(json!({"pictures": [{"name": "a"}]}));

        let body = descriptor.encode_body().unwrap().unwrap();
        assert_eq!(body, br#"{"pictures":[{"name":"a"}]}"#.to_vec());
    }

    #[test]
    fn test_text_body_is_verbatim() {
        let descriptor = RequestDescriptor::post("/x").with_body(r#"{"a": 1}"#);
        assert_eq!(
            descriptor.encode_body().unwrap().unwrap(),
            br#"{"a": 1}"#.to_vec()
        );
    }

    #[test]
    fn test_text_body_verbatim_under_plain_text() {
        let descriptor = RequestDescriptor::post("/x")
            .with_header("Content-Type", "text/plain")
            .with_body("plate=AB123CD\nraw");

        assert_eq!(
            descriptor.encode_body().unwrap().unwrap(),
            b"plate=AB123CD\nraw".to_vec()
        );
    }

    #[test]
    fn test_json_string_body_unquoted_under_plain_text() {
        let descriptor = RequestDescriptor::post("/x")
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body(json!("hello \"world\""));

        assert_eq!(
            descriptor.encode_body().unwrap().unwrap(),
            br#"hello "world""#.to_vec()
        );

        let quoted = RequestDescriptor::post("/x").with_body(json!("hello"));
        assert_eq!(quoted.encode_body().unwrap().unwrap(), br#""hello""#.to_vec());
    }

    #[test]
    fn test_payload_ignores_data() {
        let descriptor = RequestDescriptor::post("/x").with_data(json!({"text": "hi"}));
        assert_eq!(descriptor.encode_payload().unwrap(), None);
        assert_eq!(
            descriptor.encode_body().unwrap().unwrap(),
            br#"{"text":"hi"}"#.to_vec()
        );
    }

    #[test]
    fn test_headers_are_stored_lowercase() {
        let mut descriptor = RequestDescriptor::post("/x")
            .with_header("Content-Type", "text/plain")
            .with_header("CONTENT-TYPE", MIME_FORM);
        descriptor.headers.insert("Sandbox".to_string(), "true".to_string());
        descriptor.set_header("sandbox", "false");

        assert_eq!(descriptor.headers.len(), 2);
        assert_eq!(descriptor.content_type(), MIME_FORM);
        assert_eq!(descriptor.header("SANDBOX"), Some("false"));
        assert!(!descriptor.headers.contains_key("Sandbox"));
    }

    #[test]
    fn test_body_wins_over_data() {
        let descriptor = RequestDescriptor::post("/x")
            .with_body("raw")
            .with_data(json!({"ignored": true}));
        assert_eq!(descriptor.encode_body().unwrap().unwrap(), b"raw".to_vec());
    }

    #[test]
    fn test_data_as_form_when_not_json() {
        let descriptor = RequestDescriptor::post("/x")
            .with_header("Content-Type", MIME_FORM)
            .with_data(json!({"plate": "AB 123", "count": 2}));

        let body = String::from_utf8(descriptor.encode_body().unwrap().unwrap()).unwrap();
        assert!(body.contains("count=2"));
        assert!(body.contains("plate=AB+123"));
        assert_eq!(body.matches('&').count(), 1);
    }

    #[test]
    fn test_nested_form_data_is_rejected() {
        let descriptor = RequestDescriptor::post("/x")
            .with_header("content-type", MIME_FORM)
            .with_data(json!({"nested": {"a": 1}}));

        assert!(matches!(
            descriptor.encode_body(),
            Err(SegViewError::Validation { .. })
        ));
    }

    #[test]
    fn test_no_body() {
        assert_eq!(RequestDescriptor::get("/x").encode_body().unwrap(), None);
    }

    #[test]
    fn test_content_type_lookup_ignores_case() {
        let descriptor = RequestDescriptor::post("/x").with_header("CONTENT-TYPE", "text/plain");
        assert_eq!(descriptor.content_type(), "text/plain");
        assert_eq!(RequestDescriptor::get("/x").content_type(), MIME_JSON);
    }

    #[test]
    fn test_is_json_ignores_parameters() {
        assert!(is_json("application/json; charset=utf-8"));
        assert!(!is_json(MIME_FORM));
    }

    #[test]
    fn test_from_str_defaults() {
        let descriptor = RequestDescriptor::from("/certifications/1");
        assert_eq!(descriptor.method, HttpMethod::Get);
        assert!(descriptor.authenticate);
    }
}
