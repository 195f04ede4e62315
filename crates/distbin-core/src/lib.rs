//! Core types and plumbing for the distbin HTML front-end.
//!
//! This crate provides:
//! - ActivityStreams vocabulary for the objects the front-end creates
//! - Outbound HTTP requests with scheme-based transport selection
//! - JSON-LD document loading backed by a bundled context table
//! - Prometheus metrics helpers
//! - Shared error types

pub mod activitypub;
mod error;
pub mod http;
pub mod jsonld;
pub mod metrics;

pub use activitypub::{
    ACTIVITYSTREAMS_MEDIA_TYPE, Application, Link, LinkPrefetch, Note, NoteSubmission,
    PUBLIC_COLLECTION_ID, is_probably_absolute_url,
};
pub use error::{DocumentLoadError, Error, Result, TransportError, ValidationError};
pub use http::{HttpClient, OutboundRequest, ResponseHandle, Transport, create_request};
pub use jsonld::{ContextTable, DocumentLoader, DocumentResolver, NetworkResolver, RemoteDocument};
