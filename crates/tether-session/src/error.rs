//! Error types for the session layer.

/// Errors that can occur during session refresh.
///
/// Both refresh failures are terminal for the current session: the
/// coordinator does not retry internally, and every queued caller
/// receives the same failure. `Clone` is required for exactly that —
/// one outcome fans out to many waiters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The refresh endpoint answered with a non-success status.
    /// The long-lived session proof is no longer accepted; the user
    /// must sign in again.
    #[error("session refresh rejected with status {status}")]
    RefreshRejected {
        /// The HTTP status the refresh endpoint returned.
        status: u16,
    },

    /// The refresh exchange failed at the transport level — the endpoint
    /// was unreachable or the exchange timed out.
    #[error("session refresh unreachable: {0}")]
    RefreshUnreachable(String),

    /// The refresh cycle was torn down before resolving this waiter's
    /// continuation. The cycle task resolves every waiter it ever takes,
    /// so this only surfaces when that task itself dies mid-cycle —
    /// runtime shutdown, in practice. A typed failure instead of a panic.
    #[error("session refresh was interrupted")]
    Interrupted,
}
