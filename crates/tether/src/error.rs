//! Unified error type for the Tether façade.

use tether_session::SessionError;
use tether_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tether` façade, callers deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
///
/// Note what is *not* here: HTTP failure statuses. A 500 — or a 401 on
/// an exempt path — is a normal [`Response`](tether_transport::Response)
/// with that status, because "the server said no" is business
/// information, not a client malfunction.
#[derive(Debug, thiserror::Error)]
pub enum TetherError {
    /// A transport-level failure (unreachable, timeout, bad URL).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A terminal session failure (refresh rejected or unreachable).
    #[error(transparent)]
    Session(#[from] SessionError),
}
