//! Configuration module for the SegView client.
//!
//! Holds the credential pair, the sandbox default and the two base URLs the
//! API contract needs: one for executing requests and one that prefixes the
//! signing input of GET requests.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::errors::{SegViewError, SegViewResult};

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding the execution base URL.
pub const ENV_API_URL: &str = "SEGVIEW_API_URL";

/// Environment variable holding the certification base URL used for GET signing.
pub const ENV_CERTIFICATION_URL: &str = "UCERT_API_URL";

/// Environment variable holding the client ID.
pub const ENV_CLIENT_ID: &str = "SEGVIEW_CLIENT_ID";

/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "SEGVIEW_CLIENT_SECRET";

/// Environment variable enabling sandbox mode.
pub const ENV_SANDBOX: &str = "SEGVIEW_SANDBOX";

/// Environment variable holding the timeout in seconds.
pub const ENV_TIMEOUT: &str = "SEGVIEW_TIMEOUT";

/// Returns the default user agent for this SDK version.
pub fn default_user_agent() -> String {
    format!("SegView Rust SDK v{}", env!("CARGO_PKG_VERSION"))
}

/// Whether the `sandbox` header is attached to POST requests.
///
/// Published SDKs disagree here, so both shapes are available. GET requests
/// always carry the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SandboxHeader {
    /// Send `sandbox` on every request.
    #[default]
    Include,
    /// Leave `sandbox` off POST requests.
    OmitOnPost,
}

/// Configuration for the SegView client.
#[derive(Clone)]
pub struct SegViewConfig {
    /// Public client identifier, sent as `seg-view-api-key`.
    pub client_id: String,
    /// HMAC key. Never transmitted.
    pub(crate) client_secret: SecretString,
    /// Initial sandbox state.
    pub sandbox: bool,
    /// Base URL requests are executed against.
    pub base_url: String,
    /// Base URL prefixed to the URI when signing GET requests.
    pub certification_url: String,
    /// Sandbox header policy.
    pub sandbox_header: SandboxHeader,
    /// Request timeout.
    pub timeout: Duration,
    /// Value of the `user-agent` header.
    pub user_agent: String,
}

impl SegViewConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SegViewConfigBuilder {
        SegViewConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEGVIEW_API_URL` (required): execution base URL
    /// - `SEGVIEW_CLIENT_ID` (required): client identifier
    /// - `SEGVIEW_CLIENT_SECRET` (required): signing secret
    /// - `UCERT_API_URL` (optional): GET signing base URL
    /// - `SEGVIEW_SANDBOX` (optional): `true`/`1` enables sandbox mode
    /// - `SEGVIEW_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> SegViewResult<Self> {
        let base_url = std::env::var(ENV_API_URL).map_err(|_| {
            SegViewError::configuration(format!(
                "Missing API URL, configure {} environment variable",
                ENV_API_URL
            ))
        })?;

        let mut builder = SegViewConfigBuilder::new()
            .base_url(base_url)
            .client_id_from_env(ENV_CLIENT_ID)?
            .client_secret_from_env(ENV_CLIENT_SECRET)?;

        if let Ok(url) = std::env::var(ENV_CERTIFICATION_URL) {
            builder = builder.certification_url(url);
        }

        if let Ok(sandbox) = std::env::var(ENV_SANDBOX) {
            builder = builder.sandbox(matches!(sandbox.trim(), "1" | "true" | "TRUE" | "True"));
        }

        if let Ok(timeout_str) = std::env::var(ENV_TIMEOUT) {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }
}

impl std::fmt::Debug for SegViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegViewConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.base_url)
            .field("certification_url", &self.certification_url)
            .field("sandbox_header", &self.sandbox_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for `SegViewConfig`.
#[derive(Default)]
pub struct SegViewConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    sandbox: Option<bool>,
    base_url: Option<String>,
    certification_url: Option<String>,
    sandbox_header: SandboxHeader,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl SegViewConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the client ID from an environment variable.
    pub fn client_id_from_env(mut self, var_name: &str) -> SegViewResult<Self> {
        let client_id = std::env::var(var_name).map_err(|_| {
            SegViewError::configuration(format!("Environment variable {} not set", var_name))
        })?;
        self.client_id = Some(client_id);
        Ok(self)
    }

    /// Sets the client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the client secret from an environment variable.
    pub fn client_secret_from_env(mut self, var_name: &str) -> SegViewResult<Self> {
        let client_secret = std::env::var(var_name).map_err(|_| {
            SegViewError::configuration(format!("Environment variable {} not set", var_name))
        })?;
        self.client_secret = Some(client_secret);
        Ok(self)
    }

    /// Sets the initial sandbox state.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Sets the execution base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the base URL used as the GET signing prefix.
    pub fn certification_url(mut self, certification_url: impl Into<String>) -> Self {
        self.certification_url = Some(certification_url.into());
        self
    }

    /// Sets the sandbox header policy.
    pub fn sandbox_header(mut self, policy: SandboxHeader) -> Self {
        self.sandbox_header = policy;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the `user-agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SegViewResult<SegViewConfig> {
        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                SegViewError::configuration("Invalid arguments. Use CLIENT_ID and CLIENT_SECRET")
            })?;

        let client_secret = self
            .client_secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                SegViewError::configuration("Invalid arguments. Use CLIENT_ID and CLIENT_SECRET")
            })?;

        let base_url = self.base_url.filter(|url| !url.is_empty()).ok_or_else(|| {
            SegViewError::configuration(format!(
                "Missing API URL, configure {} environment variable",
                ENV_API_URL
            ))
        })?;
        url::Url::parse(&base_url)?;

        let certification_url = match self.certification_url {
            Some(url) => {
                url::Url::parse(&url)?;
                url
            }
            None => {
                tracing::warn!(
                    base_url = %base_url,
                    "No certification URL configured, GET requests will be signed against the base URL"
                );
                base_url.clone()
            }
        };

        Ok(SegViewConfig {
            client_id,
            client_secret: SecretString::new(client_secret),
            sandbox: self.sandbox.unwrap_or(false),
            base_url,
            certification_url,
            sandbox_header: self.sandbox_header,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        })
    }
}
