//! Photo payloads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{SegViewError, SegViewResult};

/// A picture referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    /// Picture name.
    pub name: String,
    /// Publicly reachable URL of the picture.
    pub link: String,
}

impl Picture {
    /// Creates a new picture reference.
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
        }
    }
}

/// Checks a batch of pictures before anything is sent.
///
/// The batch must be non-empty and every picture needs a name and a link.
pub fn validate_pictures(pictures: &[Picture]) -> SegViewResult<()> {
    if pictures.is_empty() {
        return Err(SegViewError::validation("Wrong parameters, missing payload"));
    }

    for (index, picture) in pictures.iter().enumerate() {
        if picture.name.is_empty() || picture.link.is_empty() {
            return Err(SegViewError::validation(format!(
                "Wrong parameters, check documentation (picture {} needs a name and a link)",
                index
            )));
        }
    }

    Ok(())
}

/// A local photo prepared for the OCR endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUpload {
    /// Base64 encoded image.
    #[serde(rename = "viewThis")]
    pub view_this: String,
    /// License plate the caller expects on the photo.
    #[serde(rename = "suggestedLicencePlate")]
    pub suggested_licence_plate: String,
}

impl PhotoUpload {
    /// Encodes raw image bytes.
    pub fn from_bytes(bytes: &[u8], suggested_licence_plate: impl Into<String>) -> Self {
        Self {
            view_this: STANDARD.encode(bytes),
            suggested_licence_plate: suggested_licence_plate.into(),
        }
    }

    /// Reads and encodes a local file.
    ///
    /// The read is blocking and finishes before any request is issued.
    pub fn from_file(
        path: impl AsRef<Path>,
        suggested_licence_plate: impl Into<String>,
    ) -> SegViewResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SegViewError::LocalIo {
            message: format!("Failed to read {}: {}", path.display(), e),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Photo loaded");
        Ok(Self::from_bytes(&bytes, suggested_licence_plate))
    }

    /// Serializes the upload to the JSON string that is posted and signed.
    pub fn to_json_string(&self) -> SegViewResult<String> {
        serde_json::to_string(self)
            .map_err(|e| SegViewError::validation(format!("Failed to serialize photo: {}", e)))
    }
}

impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("view_this_len", &self.view_this.len())
            .field("suggested_licence_plate", &self.suggested_licence_plate)
            .finish()
    }
}
