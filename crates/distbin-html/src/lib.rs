//! distbin-html - HTML front-end for posting to a distbin ActivityPub outbox.
//!
//! Renders a post composition form, turns submissions into ActivityStreams
//! `Note`s and forwards them to the backend's outbox.
//!
//! # Architecture
//!
//! - **Route**: ordered table of exact and pattern routes, first match wins
//! - **Submit**: form -> attachment probe -> Note -> outbox -> 302 redirect
//! - **Render**: maud templates; every interpolated value is HTML-escaped
//!
//! # Security
//!
//! - Attachment URLs must be absolute before anything is fetched
//! - Only `http` and `https` URLs are ever requested
//! - Content-Security-Policy limits forms to this origin

pub mod config;
pub mod error;
pub mod render;
pub mod route;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::HtmlError;
pub use routes::router;
pub use state::AppState;
