//! Response types.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{SegViewError, SegViewResult};

/// Outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed response body.
    pub response: Value,
}

impl ApiResponse {
    /// Creates a new response.
    pub fn new(status: u16, response: Value) -> Self {
        Self { status, response }
    }

    /// Decodes the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> SegViewResult<T> {
        T::deserialize(&self.response).map_err(|e| {
            SegViewError::service(format!("Unexpected response shape: {}", e), self.status)
        })
    }

    /// Returns `certificationId` if the body carries one.
    pub fn certification_id(&self) -> Option<&str> {
        self.response.get("certificationId").and_then(Value::as_str)
    }
}

/// Certification issued for a recognition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    /// Certification identifier.
    #[serde(rename = "certificationId")]
    pub certification_id: String,
    /// Remaining fields returned by the service.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
