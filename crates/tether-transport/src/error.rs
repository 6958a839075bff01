//! Error types for the transport layer.

/// Errors that can occur in the transport layer.
///
/// These mean "no usable HTTP response was obtained". An HTTP error
/// *status* (401, 500, ...) is not a transport error — it comes back as
/// a normal `Response` so the session layer can classify it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL or request path could not be parsed into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The exchange failed before a response arrived — DNS failure,
    /// refused connection, TLS failure, broken pipe.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The transport's own timeout fired before a response arrived.
    /// The session layer imposes no timeout of its own; this is the
    /// only one.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response body did not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
