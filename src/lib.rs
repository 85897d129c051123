//! SegView Client Library
//!
//! A Rust client for the SegView image recognition and OCR API. Requests
//! are authenticated with an HMAC-SHA1 signature derived from the client
//! secret, so the secret never travels over the wire.
//!
//! # Features
//!
//! - **Signed requests**: `seg-view-api-key` / `seg-view-signature` headers on every call
//! - **Recognition**: batch submission of pictures referenced by URL
//! - **OCR**: single photo upload from a local file, base64 encoded
//! - **Sandbox mode**: per-client switch forwarded to the service
//! - **Callbacks**: optional callback delivery on top of plain futures
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use segview_client::{Picture, SegViewClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SegViewClient::builder()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .base_url("https://api.segview.example")
//!         .build()?;
//!
//!     let pictures = vec![
//!         Picture::new("picture_0", "https://img.example/0.jpg"),
//!         Picture::new("picture_1", "https://img.example/1.jpg"),
//!     ];
//!
//!     let result = client.send_photos(&pictures).await?;
//!     println!("certification: {:?}", result.certification_id());
//!     Ok(())
//! }
//! ```
//!
//! # Callback Example
//!
//! ```rust,no_run
//! use segview_client::{CallbackExt, SegViewClient};
//!
//! # async fn run(client: SegViewClient) -> Result<(), Box<dyn std::error::Error>> {
//! let upload = client.send_photo_file("plate.jpg", "AB123CD")?;
//! upload
//!     .with_callback(|result, error| match (result, error) {
//!         (Some(result), _) => println!("queued: {}", result.response),
//!         (_, Some(error)) => eprintln!("failed: {}", error),
//!         _ => {}
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod mocks;
pub mod observability;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use auth::{compute_signature, HmacSigner, RequestSigner};
pub use client::{CallbackExt, SegViewClient, SegViewClientBuilder, WithCallback};
pub use config::{SandboxHeader, SegViewConfig, SegViewConfigBuilder};
pub use errors::{SegViewError, SegViewResult};
pub use transport::{HttpMethod, Payload, RequestDescriptor};
pub use types::{ApiResponse, Certification, PhotoUpload, Picture};
