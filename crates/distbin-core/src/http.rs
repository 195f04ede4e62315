//! Outbound HTTP requests.
//!
//! [`create_request`] picks a transport from the URL scheme and returns an
//! [`OutboundRequest`] that can still be modified. Nothing touches the network
//! until the request is handed to [`HttpClient::send`], which consumes it and
//! resolves with the first response (or the transport failure).
//!
//! No deadline is applied by `send` itself; callers that need bounded latency
//! use [`HttpClient::send_with_deadline`].

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::TransportError;

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("distbin-html/", env!("CARGO_PKG_VERSION"));

/// The transport a URL scheme maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain `http`.
    Plaintext,
    /// `https` over TLS.
    Encrypted,
}

impl Transport {
    /// Select the transport for a parsed URL.
    pub fn for_url(url: &Url) -> Result<Self, TransportError> {
        match url.scheme() {
            "http" => Ok(Self::Plaintext),
            "https" => Ok(Self::Encrypted),
            _ => Err(TransportError::UnsupportedProtocol {
                url: url.to_string(),
            }),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plaintext => f.write_str("http"),
            Self::Encrypted => f.write_str("https"),
        }
    }
}

/// Anything that can name the target of an outbound request.
pub trait IntoTargetUrl {
    fn into_target_url(self) -> Result<Url, TransportError>;
}

impl IntoTargetUrl for Url {
    fn into_target_url(self) -> Result<Url, TransportError> {
        Ok(self)
    }
}

impl IntoTargetUrl for &Url {
    fn into_target_url(self) -> Result<Url, TransportError> {
        Ok(self.clone())
    }
}

impl IntoTargetUrl for &str {
    fn into_target_url(self) -> Result<Url, TransportError> {
        match Url::parse(self) {
            Ok(url) => Ok(url),
            // No scheme (e.g. `//host/path`) means no transport to pick.
            Err(url::ParseError::RelativeUrlWithoutBase) => Err(TransportError::UnsupportedProtocol {
                url: self.to_string(),
            }),
            Err(source) => Err(TransportError::InvalidUrl {
                url: self.to_string(),
                source,
            }),
        }
    }
}

impl IntoTargetUrl for &String {
    fn into_target_url(self) -> Result<Url, TransportError> {
        self.as_str().into_target_url()
    }
}

impl IntoTargetUrl for String {
    fn into_target_url(self) -> Result<Url, TransportError> {
        self.as_str().into_target_url()
    }
}

/// A request that has been described but not yet sent.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    transport: Transport,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Describe a `GET` request to `url`, choosing the transport from its scheme.
///
/// Fails with [`TransportError::UnsupportedProtocol`] for anything other
/// than `http` and `https`. Has no side effects.
pub fn create_request(url: impl IntoTargetUrl) -> Result<OutboundRequest, TransportError> {
    let url = url.into_target_url()?;
    let transport = Transport::for_url(&url)?;
    Ok(OutboundRequest {
        transport,
        method: Method::GET,
        url,
        headers: HeaderMap::new(),
        body: Vec::new(),
    })
}

impl OutboundRequest {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append bytes to the request body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// The head of a response, with the body still unread.
#[derive(Debug)]
pub struct ResponseHandle {
    inner: reqwest::Response,
}

impl ResponseHandle {
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// A header value, if present and valid UTF-8.
    pub fn header_str(&self, name: HeaderName) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header_str(CONTENT_TYPE)
    }

    pub fn location(&self) -> Option<&str> {
        self.header_str(LOCATION)
    }

    /// Read the remaining body.
    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        let url = self.inner.url().to_string();
        self.inner
            .bytes()
            .await
            .map_err(|source| TransportError::Request { url, source })
    }
}

/// Sends [`OutboundRequest`]s.
///
/// Redirects are not followed: the first response received is the result.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the default settings.
    pub fn new() -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { inner })
    }

    /// Wrap an already configured client.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Transmit `request` and wait for the first response.
    ///
    /// Taking the request by value finalizes it: it cannot be written to or
    /// sent again.
    pub async fn send(&self, request: OutboundRequest) -> Result<ResponseHandle, TransportError> {
        let OutboundRequest {
            transport,
            method,
            url,
            headers,
            body,
        } = request;

        tracing::debug!(%transport, %method, url = %url, body_len = body.len(), "sending request");

        let target = url.to_string();
        let mut builder = self.inner.request(method, url).headers(headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let inner = builder
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: target.clone(),
                source,
            })?;

        tracing::debug!(url = %target, status = inner.status().as_u16(), "received response");
        Ok(ResponseHandle { inner })
    }

    /// Like [`send`](Self::send), but give up after `deadline` if one is set.
    pub async fn send_with_deadline(
        &self,
        request: OutboundRequest,
        deadline: Option<Duration>,
    ) -> Result<ResponseHandle, TransportError> {
        let Some(after) = deadline else {
            return self.send(request).await;
        };

        let url = request.url().to_string();
        tokio::time::timeout(after, self.send(request))
            .await
            .map_err(|_| TransportError::Timeout { url, after })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::routing::{get, post};

    async fn spawn(app: Router) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client() -> HttpClient {
        HttpClient::with_client(
            reqwest::Client::builder()
                .no_proxy()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn selects_transport_by_scheme() {
        let plain = create_request("http://example.com/a").unwrap();
        assert_eq!(plain.transport(), Transport::Plaintext);

        let tls = create_request("https://example.com/a").unwrap();
        assert_eq!(tls.transport(), Transport::Encrypted);
    }

    #[test]
    fn accepts_parsed_url() {
        let url = Url::parse("https://example.com/x?y=1").unwrap();
        let request = create_request(&url).unwrap();
        assert_eq!(request.url(), &url);
        assert_eq!(request.method(), &Method::GET);
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = create_request("ftp://example.com/file").unwrap_err();
        match err {
            TransportError::UnsupportedProtocol { url } => {
                assert_eq!(url, "ftp://example.com/file");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scheme_relative_url_is_unsupported() {
        let err = create_request("//cdn.example.com/a.png").unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedProtocol { .. }));
    }

    #[test]
    fn malformed_url_is_invalid() {
        let err = create_request("http://").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn handles_are_independent() {
        let mut first = create_request("http://example.com/").unwrap();
        let second = create_request("http://example.com/").unwrap();

        first.write("hello");
        let first = first
            .with_method(Method::POST)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        assert_eq!(first.body(), b"hello");
        assert!(second.body().is_empty());
        assert_eq!(second.method(), &Method::GET);
        assert!(second.headers().is_empty());
    }

    #[test]
    fn creating_request_does_not_connect() {
        // Port 9 (discard) is never listened on in test environments; creation
        // must still succeed because nothing is sent.
        let request = create_request("http://127.0.0.1:9/never").unwrap();
        assert_eq!(request.url().port(), Some(9));
    }

    #[tokio::test]
    async fn send_resolves_with_first_response() {
        let app = Router::new().route(
            "/img.png",
            get(|| async { ([(CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G']) }),
        );
        let addr = spawn(app).await;

        let request = create_request(format!("http://{addr}/img.png")).unwrap();
        let response = client().send(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), Some("image/png"));
        assert_eq!(&response.bytes().await.unwrap()[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn send_transmits_method_headers_and_body() {
        let app = Router::new().route(
            "/echo",
            post(|headers: axum::http::HeaderMap, body: String| async move {
                let ct = headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                (
                    StatusCode::CREATED,
                    [(LOCATION, format!("/created?ct={ct}&body={body}"))],
                )
            }),
        );
        let addr = spawn(app).await;

        let mut request = create_request(format!("http://{addr}/echo"))
            .unwrap()
            .with_method(Method::POST)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        request.write("abc");

        let response = client().send(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.location(), Some("/created?ct=text/plain&body=abc"));
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let app = Router::new().route(
            "/moved",
            get(|| async { (StatusCode::FOUND, [(LOCATION, "/elsewhere")]) }),
        );
        let addr = spawn(app).await;

        let request = create_request(format!("http://{addr}/moved")).unwrap();
        let response = client().send(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.location(), Some("/elsewhere"));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = create_request(format!("http://{addr}/")).unwrap();
        let err = client().send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }

    #[tokio::test]
    async fn deadline_elapses_on_stalled_server() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let addr = spawn(app).await;

        let request = create_request(format!("http://{addr}/slow")).unwrap();
        let err = client()
            .send_with_deadline(request, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }
}
