//! Application configuration loaded from environment variables.

use std::time::Duration;

use anyhow::Context;

/// Default limit on a buffered form body.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8001").
    pub bind_addr: String,

    /// Base URL of the distbin API that owns the outbox.
    pub api_url: String,

    /// Public URL of this front-end, recorded as the generator of new notes.
    pub external_url: String,

    /// Deadline for probing an attachment URL. `None` waits indefinitely.
    pub probe_timeout: Option<Duration>,

    /// Deadline for the outbox submission. `None` waits indefinitely.
    pub outbox_timeout: Option<Duration>,

    /// Largest form body accepted, in bytes.
    pub max_body_bytes: usize,

    /// Port for the Prometheus `/metrics` endpoint, if enabled.
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `DISTBIN_HTML_BIND_ADDR`: Server bind address (default: "0.0.0.0:8001")
    /// - `DISTBIN_API_URL`: Backend API base URL (default: "http://localhost:8000")
    /// - `DISTBIN_EXTERNAL_URL`: Public URL of this service (default: "http://localhost:8001")
    /// - `DISTBIN_PROBE_TIMEOUT_SECS`: Attachment probe deadline (default: none)
    /// - `DISTBIN_OUTBOX_TIMEOUT_SECS`: Outbox submission deadline (default: none)
    /// - `DISTBIN_MAX_BODY_BYTES`: Form body limit (default: 1 MiB)
    /// - `DISTBIN_METRICS_PORT`: Serve Prometheus metrics on this port (default: disabled)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("DISTBIN_HTML_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8001".to_string());

        let api_url = std::env::var("DISTBIN_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        // Fail at startup rather than on the first submission.
        distbin_core::create_request(api_url.as_str())
            .with_context(|| format!("DISTBIN_API_URL is not usable: {api_url}"))?;

        let external_url = std::env::var("DISTBIN_EXTERNAL_URL")
            .unwrap_or_else(|_| "http://localhost:8001".to_string())
            .trim_end_matches('/')
            .to_string();

        let probe_timeout = parse_var::<u64>("DISTBIN_PROBE_TIMEOUT_SECS")?.map(Duration::from_secs);
        let outbox_timeout =
            parse_var::<u64>("DISTBIN_OUTBOX_TIMEOUT_SECS")?.map(Duration::from_secs);
        let max_body_bytes =
            parse_var::<usize>("DISTBIN_MAX_BODY_BYTES")?.unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let metrics_port = parse_var::<u16>("DISTBIN_METRICS_PORT")?;

        tracing::info!(
            bind_addr = %bind_addr,
            api_url = %api_url,
            external_url = %external_url,
            probe_timeout_secs = probe_timeout.map(|d| d.as_secs()),
            outbox_timeout_secs = outbox_timeout.map(|d| d.as_secs()),
            max_body_bytes,
            metrics_port,
            "distbin-html configuration loaded"
        );

        Ok(Self {
            bind_addr,
            api_url,
            external_url,
            probe_timeout,
            outbox_timeout,
            max_body_bytes,
            metrics_port,
        })
    }

    /// The backend outbox that receives new notes.
    pub fn outbox_url(&self) -> String {
        format!("{}/activitypub/outbox", self.api_url)
    }
}

/// Parse an optional variable; empty counts as unset.
fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw}")),
        _ => Ok(None),
    }
}
