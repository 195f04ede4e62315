//! Error types shared by the distbin front-end components.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed client input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The submitted attachment is not an absolute (or scheme-relative) URL.
    #[error("attachment must be a URL, but got {0}")]
    Attachment(String),
}

/// Failures creating or sending an outbound HTTP request.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The URL scheme is neither `http` nor `https`.
    #[error(
        "can't fetch with unsupported protocol in URL (only http, https supported): {url}"
    )]
    UnsupportedProtocol {
        /// The offending URL, as given by the caller.
        url: String,
    },

    /// The URL has a scheme but could not be parsed.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser failure.
        source: url::ParseError,
    },

    /// The request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Target of the request.
        url: String,
        /// Underlying client error.
        source: reqwest::Error,
    },

    /// No response arrived before the caller's deadline.
    #[error("request to {url} timed out after {after:?}")]
    Timeout {
        /// Target of the request.
        url: String,
        /// The deadline that elapsed.
        after: Duration,
    },
}

impl TransportError {
    /// Whether the failure was caused by the URL itself rather than the network.
    pub fn is_url_error(&self) -> bool {
        matches!(self, Self::UnsupportedProtocol { .. } | Self::InvalidUrl { .. })
    }
}

/// Failures resolving a JSON-LD document that is not bundled locally.
#[derive(Error, Debug)]
pub enum DocumentLoadError {
    /// Only `http` and `https` documents can be dereferenced.
    #[error("URL could not be dereferenced; only \"http\" and \"https\" URLs are supported: {url}")]
    UnsupportedUrl {
        /// The URL that was requested.
        url: String,
    },

    /// The fetch itself failed.
    #[error("failed to fetch document {url}: {source}")]
    Request {
        /// The URL that was requested.
        url: String,
        /// Underlying client error.
        source: reqwest::Error,
    },

    /// The remote server answered with a non-2xx status.
    #[error("document {url} responded with status {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body was not a JSON document.
    #[error("document {url} is not valid JSON: {source}")]
    Malformed {
        /// The URL that was requested.
        url: String,
        /// Parse failure.
        source: serde_json::Error,
    },
}

/// Errors that can occur anywhere in the core pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Client input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An outbound request could not be made.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A JSON-LD document could not be loaded.
    #[error(transparent)]
    DocumentLoad(#[from] DocumentLoadError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ValidationError::Attachment("not-a-url".to_string());
        assert_eq!(err.to_string(), "attachment must be a URL, but got not-a-url");
    }

    #[test]
    fn test_unsupported_protocol_display_carries_url() {
        let err = TransportError::UnsupportedProtocol {
            url: "ftp://example.com/file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("unsupported protocol"));
        assert!(msg.contains("ftp://example.com/file"));
        assert!(err.is_url_error());
    }

    #[test]
    fn test_timeout_is_not_url_error() {
        let err = TransportError::Timeout {
            url: "http://example.com".to_string(),
            after: Duration::from_secs(3),
        };
        assert!(!err.is_url_error());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_document_status_display() {
        let err = DocumentLoadError::Status {
            url: "https://example.com/ctx".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "document https://example.com/ctx responded with status 404"
        );
    }

    #[test]
    fn test_from_validation_error() {
        let err: Error = ValidationError::Attachment("x".to_string()).into();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("attachment must be a URL"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("JSON error"));
    }
}
