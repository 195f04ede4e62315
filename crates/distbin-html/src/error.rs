//! Error types for the HTML front-end.
//!
//! Errors are rendered as simple HTML error pages rather than JSON,
//! since this is a user-facing HTML service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use distbin_core::{DocumentLoadError, TransportError, ValidationError};
use maud::{DOCTYPE, PreEscaped, html};

use crate::render::components::ERROR_CSS;

/// Front-end error type.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    /// The submitted form was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request body could not be read or decoded.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No route matches the path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The route exists but does not accept this method.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// An outbound request could not be made or did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A JSON-LD context could not be resolved.
    #[error(transparent)]
    DocumentLoad(#[from] DocumentLoadError),

    /// The backend accepted the post but did not say where it lives.
    #[error("outbox responded with status {status} and no Location header")]
    MissingLocation {
        /// Status code returned by the outbox.
        status: u16,
    },

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HtmlError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Transport(err) if err.is_url_error() => StatusCode::BAD_REQUEST,
            Self::Transport(_) | Self::DocumentLoad(_) | Self::MissingLocation { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::Serialization(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = match &self {
            Self::Validation(err) => ("Invalid Submission", err.to_string()),
            Self::BadRequest(msg) => ("Bad Request", msg.clone()),
            Self::NotFound(path) => ("Not Found", format!("Nothing lives at {path}.")),
            Self::MethodNotAllowed(method) => (
                "Method Not Allowed",
                format!("{method} is not supported here."),
            ),
            Self::Transport(err) if err.is_url_error() => ("Invalid URL", err.to_string()),
            Self::Transport(err) => {
                tracing::error!(error = %err, "outbound request failed");
                (
                    "Upstream Unavailable",
                    "A server this post depends on could not be reached. Please try again later."
                        .to_string(),
                )
            }
            Self::DocumentLoad(err) => {
                tracing::error!(error = %err, "context resolution failed");
                (
                    "Upstream Unavailable",
                    "A JSON-LD context could not be loaded. Please try again later.".to_string(),
                )
            }
            Self::MissingLocation { status } => {
                tracing::error!(status, "outbox response missing Location");
                (
                    "Upstream Error",
                    "The post was sent but the server did not say where it was published."
                        .to_string(),
                )
            }
            Self::Serialization(err) => {
                tracing::error!(error = %err, "serialization error");
                (
                    "Internal Error",
                    "An internal error occurred. Please try again later.".to_string(),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    "Internal Error",
                    "An internal error occurred. Please try again later.".to_string(),
                )
            }
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) " - distbin" }
                    meta name="robots" content="noindex";
                    style { (PreEscaped(ERROR_CSS)) }
                }
                body {
                    main class="error-page" {
                        h1 { (title) }
                        p { (message) }
                        a href="/" { "Back to distbin" }
                    }
                }
            }
        };

        (status, markup).into_response()
    }
}
