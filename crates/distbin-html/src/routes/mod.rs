//! Route definitions for the front-end.
//!
//! ## Routes
//!
//! - `GET /` - Composition form
//! - `POST /` - Form submission, forwarded to the backend outbox
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions
//! - `GET /ns/activitystreams` - Bundled ActivityStreams context
//! - `GET /activities/{id}` - Redirect to the activity on the backend
//!
//! Paths are matched by the [`RouteTable`]; axum only supplies the fallback
//! that hands every request to [`dispatch`].

mod health;
mod home;
mod submit;

use std::sync::LazyLock;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use distbin_core::jsonld::ACTIVITYSTREAMS_CONTEXT_URL;
use regex::Regex;

use crate::error::HtmlError;
use crate::route::RouteTable;
use crate::state::AppState;

pub use submit::build_note;

static ACTIVITY_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/activities/([^/]+)$").expect("activity regex should compile"));

/// What a request path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Home,
    Health,
    Robots,
    ActivityStreamsContext,
    Activity(String),
}

/// Methods the front-end serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestMethod {
    Get,
    Post,
}

impl TryFrom<&Method> for RequestMethod {
    type Error = HtmlError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET | Method::HEAD => Ok(Self::Get),
            Method::POST => Ok(Self::Post),
            _ => Err(HtmlError::MethodNotAllowed(method.to_string())),
        }
    }
}

/// The front-end's route table.
pub fn route_table() -> RouteTable<Endpoint> {
    RouteTable::new()
        .exact("/", || Endpoint::Home)
        .exact("/health", || Endpoint::Health)
        .exact("/robots.txt", || Endpoint::Robots)
        .exact("/ns/activitystreams", || Endpoint::ActivityStreamsContext)
        .pattern(ACTIVITY_PATH.clone(), |mut args| {
            Endpoint::Activity(args.swap_remove(0))
        })
}

/// Build the complete front-end router.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

/// Resolve the endpoint for a request and run its handler.
async fn dispatch(State(state): State<AppState>, request: Request) -> Result<Response, HtmlError> {
    let path = request.uri().path().to_string();
    let Some(endpoint) = state.routes.route(&path) else {
        tracing::debug!(path = %path, "no route");
        return Err(HtmlError::NotFound(path));
    };
    let method = RequestMethod::try_from(request.method())?;

    match (endpoint, method) {
        (Endpoint::Home, RequestMethod::Get) => Ok(home::compose_page(&state, request.uri())),
        (Endpoint::Home, RequestMethod::Post) => submit::submit_note(&state, request).await,
        (Endpoint::Health, RequestMethod::Get) => Ok(health::health_check().into_response()),
        (Endpoint::Robots, RequestMethod::Get) => Ok(robots_txt()),
        (Endpoint::ActivityStreamsContext, RequestMethod::Get) => activitystreams_context(&state),
        (Endpoint::Activity(id), RequestMethod::Get) => activity_redirect(&state, &id),
        (_, RequestMethod::Post) => Err(HtmlError::MethodNotAllowed(Method::POST.to_string())),
    }
}

/// Serve robots.txt allowing all crawlers.
fn robots_txt() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\n",
    )
        .into_response()
}

/// Serve the bundled ActivityStreams context.
fn activitystreams_context(state: &AppState) -> Result<Response, HtmlError> {
    let document = state
        .documents
        .bundled(ACTIVITYSTREAMS_CONTEXT_URL)
        .ok_or_else(|| HtmlError::NotFound(ACTIVITYSTREAMS_CONTEXT_URL.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/ld+json"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        document.document,
    )
        .into_response())
}

/// Send the client to the activity on the backend.
fn activity_redirect(state: &AppState, id: &str) -> Result<Response, HtmlError> {
    let target = format!("{}/activities/{id}", state.config.api_url);
    let location = HeaderValue::from_str(&target)
        .map_err(|e| HtmlError::BadRequest(format!("invalid activity id {id}: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}


#[cfg(test)]
mod tests {
    use super::test_support::{test_config, test_state};
    use super::*;

    use axum::body::Body;
    use tower::ServiceExt;

    async fn send(request: axum::http::Request<Body>) -> Response {
        let app = router(test_state(test_config("http://127.0.0.1:9")));
        app.oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn route_table_resolves_endpoints() {
        let table = route_table();
        assert_eq!(table.route("/"), Some(Endpoint::Home));
        assert_eq!(table.route("/?inReplyTo=x"), Some(Endpoint::Home));
        assert_eq!(table.route("/health"), Some(Endpoint::Health));
        assert_eq!(
            table.route("/activities/abc-123"),
            Some(Endpoint::Activity("abc-123".to_string()))
        );
        assert_eq!(table.route("/activities/a/b"), None);
        assert_eq!(table.route("/nope"), None);
    }

    #[tokio::test]
    async fn home_renders_form_with_defaults() {
        let response = send(get("/?title=Hello%20%3Cworld%3E&inReplyTo=https://x/1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"value="Hello &lt;world&gt;""#));
        assert!(html.contains(r#"value="https://x/1""#));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = send(get("/does-not-exist")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let request = axum::http::Request::builder()
            .method(Method::DELETE)
            .uri("/")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::METHOD_NOT_ALLOWED);

        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = send(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "distbin-html");
    }

    #[tokio::test]
    async fn serves_bundled_context() {
        let response = send(get("/ns/activitystreams")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/ld+json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["@context"]["Note"], "as:Note");
    }

    #[tokio::test]
    async fn activity_redirects_to_backend() {
        let response = send(get("/activities/42")).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "http://127.0.0.1:9/activities/42"
        );
    }

    #[tokio::test]
    async fn robots_allows_all() {
        let response = send(get("/robots.txt")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"User-agent: *\nAllow: /\n");
    }
}
