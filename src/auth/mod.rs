//! Request signing for the SegView API.
//!
//! Requests are authenticated by an HMAC-SHA1 digest of a signing input,
//! keyed with the client secret and sent as `seg-view-signature` in the form
//! `sha1=<hex-digest>`. The secret itself never leaves the process.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use std::collections::HashMap;

use crate::errors::{SegViewError, SegViewResult};

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the public client identifier.
pub const API_KEY_HEADER: &str = "seg-view-api-key";

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "seg-view-signature";

/// Header carrying the sandbox flag.
pub const SANDBOX_HEADER: &str = "sandbox";

/// Prefix of every signature value.
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Computes `sha1=<hex(HMAC-SHA1(secret, payload))>`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> SegViewResult<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| SegViewError::configuration(format!("Failed to create HMAC: {}", e)))?;

    mac.update(payload);
    let result = mac.finalize();
    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(result.into_bytes())))
}

/// Signs requests on behalf of a client.
pub trait RequestSigner: Send + Sync {
    /// Returns the public client identifier.
    fn client_id(&self) -> &str;

    /// Signs the given input.
    fn sign(&self, signing_input: &[u8]) -> SegViewResult<String>;

    /// Inserts the identifier and signature headers for `signing_input`.
    ///
    /// Existing entries for either header, in any casing, are replaced.
    fn apply_auth(
        &self,
        headers: &mut HashMap<String, String>,
        signing_input: &[u8],
    ) -> SegViewResult<()> {
        let signature = self.sign(signing_input)?;
        headers.retain(|name, _| {
            !name.eq_ignore_ascii_case(API_KEY_HEADER)
                && !name.eq_ignore_ascii_case(SIGNATURE_HEADER)
        });
        headers.insert(API_KEY_HEADER.to_string(), self.client_id().to_string());
        headers.insert(SIGNATURE_HEADER.to_string(), signature);
        Ok(())
    }
}

/// HMAC-SHA1 signer backed by the client credentials.
pub struct HmacSigner {
    client_id: String,
    client_secret: SecretString,
}

impl HmacSigner {
    /// Creates a new signer.
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Creates a signer from a plain string secret.
    pub fn from_strings(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::new(client_id, SecretString::new(client_secret.into()))
    }
}

impl RequestSigner for HmacSigner {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn sign(&self, signing_input: &[u8]) -> SegViewResult<String> {
        compute_signature(self.client_secret.expose_secret(), signing_input)
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}
