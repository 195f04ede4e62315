//! Application state shared across all request handlers.

use std::sync::Arc;

use distbin_core::{ContextTable, DocumentLoader, HttpClient, NetworkResolver};

use crate::config::Config;
use crate::route::RouteTable;
use crate::routes::{Endpoint, route_table};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Client for attachment probes and outbox submissions.
    pub http: HttpClient,

    /// JSON-LD loader with the bundled ActivityStreams context.
    pub documents: Arc<DocumentLoader<NetworkResolver>>,

    /// Path dispatch table.
    pub routes: Arc<RouteTable<Endpoint>>,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = HttpClient::new()?;
        let documents = DocumentLoader::with_network(ContextTable::activitystreams())?;
        Ok(Self::with_parts(config, http, documents))
    }

    /// Assemble state from pre-built clients.
    pub fn with_parts(
        config: Config,
        http: HttpClient,
        documents: DocumentLoader<NetworkResolver>,
    ) -> Self {
        let routes = route_table();

        tracing::info!(
            routes = routes.len(),
            bundled_contexts = documents.contexts().len(),
            "application state initialized"
        );

        Self {
            config: Arc::new(config),
            http,
            documents: Arc::new(documents),
            routes: Arc::new(routes),
        }
    }
}
