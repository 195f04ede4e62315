//! JSON-LD document loading.
//!
//! A [`DocumentLoader`] answers context lookups from an immutable
//! [`ContextTable`] first and only falls back to a [`DocumentResolver`]
//! (normally [`NetworkResolver`]) for URLs it does not know. The
//! ActivityStreams context ships with the crate so it resolves the same way
//! with or without network access.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use serde::Serialize;
use url::Url;

use crate::error::DocumentLoadError;

/// Canonical URL of the ActivityStreams 2.0 context.
pub const ACTIVITYSTREAMS_CONTEXT_URL: &str = "https://www.w3.org/ns/activitystreams";

/// Bundled copy of the ActivityStreams 2.0 context.
pub const ACTIVITYSTREAMS_CONTEXT: &str = include_str!("as2context.json");

/// Link relation naming an external JSON-LD context for a plain JSON document.
pub const JSON_LD_CONTEXT_REL: &str = "http://www.w3.org/ns/json-ld#context";

const JSON_LD_MEDIA_TYPE: &str = "application/ld+json";

/// A loaded document, shaped like a JSON-LD `RemoteDocument`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    /// Context named by a `Link` header, if the document carried one.
    pub context_url: Option<String>,
    /// Raw document text.
    pub document: String,
    /// URL the document was finally loaded from.
    pub document_url: String,
}

impl RemoteDocument {
    /// Parse the document text as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.document)
    }
}

/// Context documents known without a network fetch.
#[derive(Debug, Clone, Default)]
pub struct ContextTable {
    contexts: HashMap<String, Arc<str>>,
}

impl ContextTable {
    /// A table with no entries; every lookup goes to the network.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A table holding the bundled ActivityStreams context.
    pub fn activitystreams() -> Self {
        Self::empty().with_context(ACTIVITYSTREAMS_CONTEXT_URL, ACTIVITYSTREAMS_CONTEXT)
    }

    /// Add (or replace) a context document.
    pub fn with_context(mut self, url: impl Into<String>, document: impl Into<Arc<str>>) -> Self {
        self.contexts.insert(url.into(), document.into());
        self
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.contexts.get(url).map(|doc| &**doc)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.contexts.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// Resolves documents the [`ContextTable`] does not hold.
pub trait DocumentResolver: Send + Sync {
    fn resolve(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<RemoteDocument, DocumentLoadError>> + Send;
}

/// Fetches documents over HTTP(S).
///
/// Follows redirects, asks for JSON-LD, rejects non-2xx responses and bodies
/// that are not JSON.
#[derive(Debug, Clone)]
pub struct NetworkResolver {
    client: reqwest::Client,
}

impl NetworkResolver {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(crate::http::USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl DocumentResolver for NetworkResolver {
    async fn resolve(&self, url: &str) -> Result<RemoteDocument, DocumentLoadError> {
        let unsupported = || DocumentLoadError::UnsupportedUrl {
            url: url.to_string(),
        };
        let parsed = Url::parse(url).map_err(|_| unsupported())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(unsupported());
        }

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, "application/ld+json, application/json")
            .send()
            .await
            .map_err(|source| DocumentLoadError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocumentLoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let is_json_ld = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with(JSON_LD_MEDIA_TYPE));

        let context_url = if is_json_ld {
            None
        } else {
            response
                .headers()
                .get_all(LINK)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(context_link)
                .and_then(|target| final_url.join(&target).ok())
                .map(String::from)
        };

        let document = response
            .text()
            .await
            .map_err(|source| DocumentLoadError::Request {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str::<serde_json::Value>(&document).map_err(|source| {
            DocumentLoadError::Malformed {
                url: url.to_string(),
                source,
            }
        })?;

        Ok(RemoteDocument {
            context_url,
            document,
            document_url: final_url.into(),
        })
    }
}

/// Find the target of a `rel="http://www.w3.org/ns/json-ld#context"` link in
/// a `Link` header value.
fn context_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let is_context = parts.any(|param| {
            let Some((key, value)) = param.split_once('=') else {
                return false;
            };
            key.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel == JSON_LD_CONTEXT_REL)
        });
        is_context.then(|| target.to_string())
    })
}

/// Loads JSON-LD documents, preferring bundled contexts.
#[derive(Debug, Clone)]
pub struct DocumentLoader<R = NetworkResolver> {
    contexts: Arc<ContextTable>,
    fallback: R,
}

impl<R: DocumentResolver> DocumentLoader<R> {
    pub fn new(contexts: ContextTable, fallback: R) -> Self {
        Self {
            contexts: Arc::new(contexts),
            fallback,
        }
    }

    pub fn contexts(&self) -> &ContextTable {
        &self.contexts
    }

    /// The bundled document for `url`, without touching the fallback.
    pub fn bundled(&self, url: &str) -> Option<RemoteDocument> {
        self.contexts.get(url).map(|document| RemoteDocument {
            context_url: None,
            document: document.to_string(),
            document_url: url.to_string(),
        })
    }

    /// Load the document at `url`.
    ///
    /// Fallback failures are returned unchanged; nothing is retried.
    pub async fn load(&self, url: &str) -> Result<RemoteDocument, DocumentLoadError> {
        if let Some(document) = self.bundled(url) {
            metrics::counter!("distbin_context_loads_total", "source" => "bundled").increment(1);
            return Ok(document);
        }

        tracing::debug!(url = %url, "context not bundled, resolving over network");
        metrics::counter!("distbin_context_loads_total", "source" => "network").increment(1);
        self.fallback.resolve(url).await
    }

    /// Load every remote context referenced by `value["@context"]`.
    ///
    /// Inline context objects need no loading and are skipped.
    pub async fn load_contexts(
        &self,
        value: &serde_json::Value,
    ) -> Result<Vec<RemoteDocument>, DocumentLoadError> {
        let urls: Vec<&str> = match value.get("@context") {
            Some(serde_json::Value::String(url)) => vec![url.as_str()],
            Some(serde_json::Value::Array(entries)) => {
                entries.iter().filter_map(|e| e.as_str()).collect()
            }
            _ => Vec::new(),
        };

        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            documents.push(self.load(url).await?);
        }
        Ok(documents)
    }
}

impl DocumentLoader<NetworkResolver> {
    /// Bundled ActivityStreams context in front of a network resolver.
    pub fn with_network(contexts: ContextTable) -> Result<Self, reqwest::Error> {
        Ok(Self::new(contexts, NetworkResolver::new()?))
    }
}
