//! Logging support for the SegView client.
//!
//! The client emits `tracing` spans and events; applications decide where
//! they go. [`init_logging`] installs a ready-made subscriber for binaries
//! and demos.

use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

use crate::auth::{API_KEY_HEADER, SIGNATURE_HEADER};
use crate::errors::{SegViewError, SegViewResult};

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Installs a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_logging(format: LogFormat) -> SegViewResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| SegViewError::configuration(format!("Failed to install logger: {}", e)))
}

/// Returns a copy of `headers` safe to log.
pub fn redact_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name.eq_ignore_ascii_case(SIGNATURE_HEADER)
                || name.eq_ignore_ascii_case(API_KEY_HEADER)
            {
                "***".to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_headers() {
        let mut headers = HashMap::new();
        headers.insert(SIGNATURE_HEADER.to_string(), "sha1=abcdef".to_string());
        headers.insert("Seg-View-Api-Key".to_string(), "client-1".to_string());
        headers.insert("sandbox".to_string(), "true".to_string());

        let redacted = redact_headers(&headers);

        assert_eq!(redacted.get(SIGNATURE_HEADER).unwrap(), "***");
        assert_eq!(redacted.get("Seg-View-Api-Key").unwrap(), "***");
        assert_eq!(redacted.get("sandbox").unwrap(), "true");
    }
}
