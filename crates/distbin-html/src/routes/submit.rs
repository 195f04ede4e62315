//! Form submission: turn a posted form into a Note and forward it to the
//! backend outbox.
//!
//! Steps run strictly in order and any failure aborts the whole submission:
//! 1. Buffer the form body
//! 2. Decode `content`, `inReplyTo` and `attachment`
//! 3. Reject an attachment that is not an absolute URL
//! 4. Probe the attachment URL to record its media type
//! 5. Build the Note
//! 6. POST it to `{api_url}/activitypub/outbox`
//! 7. Redirect the client to the `Location` the backend returned

use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use distbin_core::{
    ACTIVITYSTREAMS_MEDIA_TYPE, Application, Link, LinkPrefetch, Note, NoteSubmission,
    create_request,
};

use crate::error::HtmlError;
use crate::state::AppState;

const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Handle `POST /`.
pub async fn submit_note(state: &AppState, request: Request) -> Result<Response, HtmlError> {
    let result = submit(state, request).await;
    let outcome = match &result {
        Ok(_) => "redirected",
        Err(HtmlError::Validation(_)) => "invalid",
        Err(_) => "failed",
    };
    metrics::counter!("distbin_submissions_total", "outcome" => outcome).increment(1);
    result
}

async fn submit(state: &AppState, request: Request) -> Result<Response, HtmlError> {
    let (parts, body) = request.into_parts();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with(FORM_MEDIA_TYPE) {
        tracing::warn!(content_type = %content_type, "form submitted with unexpected content type");
    }

    let body = axum::body::to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| HtmlError::BadRequest(format!("could not read form body: {e}")))?;

    let submission: NoteSubmission = serde_urlencoded::from_bytes(&body)
        .map_err(|e| HtmlError::BadRequest(format!("could not decode form: {e}")))?;

    let note = build_note(state, &submission).await?;
    let location = post_to_outbox(state, &note).await?;

    tracing::debug!(location = %location, "note submitted");
    let location = HeaderValue::from_str(&location)
        .map_err(|e| HtmlError::Internal(anyhow::anyhow!("invalid Location from outbox: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Validate a submission, probe its attachment, and build the Note.
///
/// The attachment is validated before any network request is made.
pub async fn build_note(state: &AppState, submission: &NoteSubmission) -> Result<Note, HtmlError> {
    let attachment = match submission.attachment_url()? {
        Some(href) => Some(probe_attachment(state, href).await?),
        None => None,
    };

    Ok(Note::new(
        submission,
        attachment,
        Application::distbin_html(state.config.external_url.as_str()),
    ))
}

/// Fetch `href` and record the media type it serves, if it reports one.
async fn probe_attachment(state: &AppState, href: &str) -> Result<Link, HtmlError> {
    let result = async {
        let request = create_request(href)?;
        state
            .http
            .send_with_deadline(request, state.config.probe_timeout)
            .await
    }
    .await;

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            metrics::counter!("distbin_attachment_probes_total", "outcome" => "failed").increment(1);
            return Err(err.into());
        }
    };
    metrics::counter!("distbin_attachment_probes_total", "outcome" => "ok").increment(1);

    let link = Link::new(href);
    Ok(match response.content_type() {
        Some(media_type) => {
            tracing::debug!(href = %href, media_type = %media_type, "attachment probed");
            link.with_prefetch(LinkPrefetch::observed(media_type))
        }
        None => link,
    })
}

/// POST the Note to the backend outbox and return the `Location` it answers with.
async fn post_to_outbox(state: &AppState, note: &Note) -> Result<String, HtmlError> {
    let json = serde_json::to_value(note)?;

    // Every context the Note names must be resolvable before it is published.
    state.documents.load_contexts(&json).await?;

    let mut request = create_request(state.config.outbox_url())?
        .with_method(Method::POST)
        .with_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(ACTIVITYSTREAMS_MEDIA_TYPE),
        );
    request.write(serde_json::to_vec(&json)?);

    let started = Instant::now();
    let response = state
        .http
        .send_with_deadline(request, state.config.outbox_timeout)
        .await?;
    metrics::histogram!("distbin_outbox_duration_seconds").record(started.elapsed().as_secs_f64());

    let status = response.status();
    tracing::debug!(status = status.as_u16(), "outbox responded");

    response
        .location()
        .map(str::to_string)
        .ok_or(HtmlError::MissingLocation {
            status: status.as_u16(),
        })
}
