//! Transport abstraction layer for Tether.
//!
//! Provides the [`Transport`] trait — a single HTTP exchange — and the
//! request/response types that travel through it.
//!
//! The transport is deliberately dumb: it performs one exchange and
//! reports what happened. Every HTTP status, including 401, comes back
//! as a [`Response`]; a [`TransportError`] means the exchange itself
//! failed (unreachable host, timeout, malformed URL). The session layer
//! above decides what a 401 *means* — the transport never does.
//!
//! # Feature Flags
//!
//! - `http` (default) — HTTP transport via `reqwest`, with a cookie jar
//!   that carries the session credential across exchanges.

mod error;
#[cfg(feature = "http")]
mod http;
mod request;
mod response;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use request::{Method, Request};
pub use response::Response;

/// Performs a single HTTP exchange.
///
/// This is the seam between the session core and the network. Production
/// code uses [`HttpTransport`]; tests implement this trait with scripted
/// responses to drive the refresh logic deterministically.
///
/// # Trait bounds
///
/// - `Send + Sync` → the transport is shared across async tasks behind an
///   `Arc` (Tokio may call it from different threads simultaneously).
/// - `'static` → it doesn't borrow temporary data; it lives as long as
///   the client that owns it.
pub trait Transport: Send + Sync + 'static {
    /// Sends the request and returns the response, whatever its status.
    ///
    /// # Errors
    /// Returns [`TransportError`] only when no HTTP response was obtained
    /// at all — the host was unreachable, the exchange timed out, or the
    /// request could not be formed. An HTTP error status is NOT a
    /// transport error; it comes back as a normal [`Response`].
    fn exchange(
        &self,
        request: &Request,
    ) -> impl std::future::Future<Output = Result<Response, TransportError>> + Send;
}
