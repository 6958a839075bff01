//! HTTP transport implementation using `reqwest`.
//!
//! The reqwest client is built with a cookie store: the session
//! credential (an HttpOnly cookie set by the server on login/refresh)
//! rides along on every exchange without this crate ever touching it.
//! That's the "ambient credential" model — the transport carries the
//! credential, the session layer only reacts to its expiry.

use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::{Method, Request, Response, Transport, TransportError};

/// Default per-exchange timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP [`Transport`] backed by a shared `reqwest::Client`.
///
/// Cheap to clone (the inner client is reference-counted); the clones
/// share one cookie jar, so a refresh performed through any clone renews
/// the credential for all of them.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport targeting the given base URL, with the
    /// default timeout.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a transport with an explicit per-exchange timeout.
    ///
    /// A hung exchange — including a hung refresh — stalls its callers
    /// until this timeout fires, so keep it finite.
    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        tracing::debug!(%base, ?timeout, "HTTP transport created");
        Ok(Self { client, base })
    }

    /// Resolves a request path against the base URL. Full `http(s)://`
    /// URLs pass through unchanged.
    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
                .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
        } else {
            self.base
                .join(path)
                .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
        }
    }

    /// The base URL this transport targets.
    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

impl Transport for HttpTransport {
    async fn exchange(
        &self,
        request: &Request,
    ) -> Result<Response, TransportError> {
        let url = self.resolve(&request.path)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let reply = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Unreachable(e.to_string())
            }
        })?;

        let status = reply.status().as_u16();
        // Empty or non-JSON bodies become Null rather than an error —
        // a 204 or a bare 401 is still a perfectly good response.
        let body = reply.json::<Value>().await.unwrap_or(Value::Null);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            "exchange completed"
        );

        Ok(Response { status, body })
    }
}
