//! Home page: the post composition form.

use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::render::components::CSP_HEADER;
use crate::render::compose::{self, ComposeDefaults};
use crate::state::AppState;

/// Render the composition form, pre-filled from `inReplyTo`, `title` and
/// `attachment` query parameters.
pub fn compose_page(state: &AppState, uri: &Uri) -> Response {
    let defaults = ComposeDefaults::from_query(uri.query());
    let markup = compose::render(&defaults, &state.config.outbox_url());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    (StatusCode::OK, headers, markup.into_string()).into_response()
}
