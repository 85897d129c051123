//! SegView API client.
//!
//! Provides the credential-scoped entry point: request signing, the sandbox
//! switch and the photo recognition operations.

mod callback;

pub use callback::{CallbackExt, WithCallback};

use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::auth::{HmacSigner, RequestSigner, SANDBOX_HEADER};
use crate::config::{SandboxHeader, SegViewConfig, SegViewConfigBuilder};
use crate::errors::{SegViewError, SegViewResult};
use crate::transport::{
    HttpMethod, HttpTransport, Payload, ReqwestTransport, RequestDescriptor, Transport,
};
use crate::types::{validate_pictures, ApiResponse, PhotoUpload, Picture};

/// Endpoint for batch recognition of pictures referenced by URL.
pub const RECOGNITION_PATH: &str = "/recognition/";

/// Endpoint for single photo OCR uploads.
pub const SEND_PHOTO_PATH: &str = "/api/requestsOCR/sendPhoto/";

/// The SegView client.
///
/// Built once per credential pair and reused across calls. Calls are
/// independent; the only mutable state is the sandbox flag.
///
/// # Example
///
/// ```rust,no_run
/// use segview_client::{Picture, SegViewClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SegViewClient::builder()
///         .client_id("my-client-id")
///         .client_secret("my-client-secret")
///         .base_url("https://api.segview.example")
///         .build()?;
///
///     let result = client
///         .send_photos(&[Picture::new("front", "https://img.example/front.jpg")])
///         .await?;
///     println!("{:?}", result.certification_id());
///     Ok(())
/// }
/// ```
pub struct SegViewClient {
    config: SegViewConfig,
    signer: Arc<dyn RequestSigner>,
    transport: Transport,
    sandbox: AtomicBool,
}

impl SegViewClient {
    /// SDK version reported in the user agent.
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// Creates a new client builder.
    pub fn builder() -> SegViewClientBuilder {
        SegViewClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// See [`SegViewConfig::from_env`] for the variables read.
    pub fn from_env() -> SegViewResult<Self> {
        let config = SegViewConfig::from_env()?;
        SegViewClientBuilder::from_config(config).build()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SegViewConfig {
        &self.config
    }

    /// Reads or switches sandbox mode.
    ///
    /// `Some(enable)` stores and returns the new state; `None` returns the
    /// current state untouched.
    pub fn sandbox_mode(&self, enable: Option<bool>) -> bool {
        match enable {
            Some(enable) => {
                self.sandbox.store(enable, Ordering::Relaxed);
                enable
            }
            None => self.sandbox.load(Ordering::Relaxed),
        }
    }

    /// Performs a signed GET.
    ///
    /// The signature covers the certification URL followed by the URI.
    #[instrument(skip_all)]
    pub async fn get(&self, request: impl Into<RequestDescriptor>) -> SegViewResult<ApiResponse> {
        let mut request = request.into();
        request.method = HttpMethod::Get;

        if request.authenticate {
            let signing_input = format!("{}{}", self.config.certification_url, request.uri);
            self.sign(&mut request, signing_input.as_bytes())?;
        }
        self.attach_sandbox(&mut request, true);

        tracing::debug!(uri = %request.uri, "GET");
        self.transport.execute(request).await
    }

    /// Performs a signed GET with query parameters.
    pub async fn get_with_params<I, K, V>(
        &self,
        uri: impl Into<String>,
        params: I,
    ) -> SegViewResult<ApiResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.get(RequestDescriptor::get(uri).with_params(params))
            .await
    }

    /// Performs a signed POST.
    ///
    /// The signature covers the encoded `body`, or the empty input when there
    /// is none. Form or JSON `data` is sent but never signed.
    #[instrument(skip_all)]
    pub async fn post(&self, request: impl Into<RequestDescriptor>) -> SegViewResult<ApiResponse> {
        let mut request = request.into();
        request.method = HttpMethod::Post;

        if request.authenticate {
            let signing_input = request.encode_payload()?.unwrap_or_default();
            self.sign(&mut request, &signing_input)?;
        }
        let include_sandbox = self.config.sandbox_header == SandboxHeader::Include;
        self.attach_sandbox(&mut request, include_sandbox);

        tracing::debug!(uri = %request.uri, "POST");
        self.transport.execute(request).await
    }

    /// Performs a signed POST of structured data with query parameters.
    pub async fn post_with_data<I, K, V>(
        &self,
        uri: impl Into<String>,
        data: Value,
        params: I,
    ) -> SegViewResult<ApiResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.post(
            RequestDescriptor::post(uri)
                .with_data(data)
                .with_params(params),
        )
        .await
    }

    /// Submits pictures referenced by URL for recognition.
    ///
    /// Fails with a validation error, without any request, when the batch is
    /// empty or a picture lacks a name or link.
    #[instrument(skip_all, fields(count = pictures.len()))]
    pub async fn send_photos(&self, pictures: &[Picture]) -> SegViewResult<ApiResponse> {
        validate_pictures(pictures)?;

        tracing::debug!("Posting recognition");
        let request =
            RequestDescriptor::post(RECOGNITION_PATH).with_body(json!({ "pictures": pictures }));
        self.post(request).await
    }

    /// Submits an encoded photo to the OCR endpoint.
    #[instrument(skip_all, fields(plate = %upload.suggested_licence_plate))]
    pub async fn send_photo(&self, upload: PhotoUpload) -> SegViewResult<ApiResponse> {
        let body = upload.to_json_string()?;
        let request = RequestDescriptor::post(SEND_PHOTO_PATH).with_body(Payload::Text(body));
        self.post(request).await
    }

    /// Reads a local photo and submits it to the OCR endpoint.
    ///
    /// The file is read before the future is created, so read failures are
    /// reported without any request being issued.
    pub fn send_photo_file(
        &self,
        path: impl AsRef<Path>,
        suggested_licence_plate: impl Into<String>,
    ) -> SegViewResult<impl std::future::Future<Output = SegViewResult<ApiResponse>> + '_> {
        let upload = PhotoUpload::from_file(path, suggested_licence_plate)?;
        Ok(self.send_photo(upload))
    }

    fn sign(&self, request: &mut RequestDescriptor, signing_input: &[u8]) -> SegViewResult<()> {
        self.signer.apply_auth(&mut request.headers, signing_input)
    }

    fn attach_sandbox(&self, request: &mut RequestDescriptor, include: bool) {
        if include {
            request.set_header(SANDBOX_HEADER, self.sandbox_mode(None).to_string());
        }
    }
}

impl std::fmt::Debug for SegViewClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegViewClient")
            .field("config", &self.config)
            .field("sandbox", &self.sandbox_mode(None))
            .finish()
    }
}

/// Builder for the SegView client.
pub struct SegViewClientBuilder {
    config_builder: SegViewConfigBuilder,
    config: Option<SegViewConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl SegViewClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: SegViewConfigBuilder::new(),
            config: None,
            transport: None,
            signer: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: SegViewConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::new()
        }
    }

    /// Sets the client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.client_id(client_id);
        self
    }

    /// Sets the client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.client_secret(client_secret);
        self
    }

    /// Sets the initial sandbox state.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config_builder = self.config_builder.sandbox(sandbox);
        self
    }

    /// Sets the execution base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the GET signing base URL.
    pub fn certification_url(mut self, certification_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.certification_url(certification_url);
        self
    }

    /// Sets the sandbox header policy.
    pub fn sandbox_header(mut self, policy: SandboxHeader) -> Self {
        self.config_builder = self.config_builder.sandbox_header(policy);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom request signer.
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Builds the client.
    pub fn build(self) -> SegViewResult<SegViewClient> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_builder.build()?,
        };

        let http: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                ReqwestTransport::new(config.timeout)
                    .map_err(|e| SegViewError::configuration(e.to_string()))?,
            ),
        };

        let signer: Arc<dyn RequestSigner> = match self.signer {
            Some(s) => s,
            None => Arc::new(HmacSigner::new(
                config.client_id.clone(),
                config.client_secret.clone(),
            )),
        };

        let transport = Transport::new(config.base_url.clone(), config.user_agent.clone(), http);

        tracing::debug!(client_id = %config.client_id, sandbox = config.sandbox, "SegView client ready");

        Ok(SegViewClient {
            sandbox: AtomicBool::new(config.sandbox),
            config,
            signer,
            transport,
        })
    }
}

impl Default for SegViewClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
