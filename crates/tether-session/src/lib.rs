//! Session lifecycle for Tether: refresh coordination and loss signaling.
//!
//! This crate owns the one genuinely concurrent problem in the system:
//! many in-flight requests can hit an expired credential at the same
//! moment, but the credential must be refreshed **exactly once**, every
//! blocked caller must resume after that single refresh, and a failed
//! refresh must announce "the session is gone" exactly once.
//!
//! Three pieces:
//!
//! 1. **Classification** — which endpoints' 401s are normal business
//!    outcomes rather than expiry evidence ([`ExemptPaths`])
//! 2. **Single-flight refresh** — one refresh exchange per cycle, with a
//!    FIFO queue of waiting callers ([`RefreshCoordinator`])
//! 3. **Loss signaling** — a payload-less broadcast fired once per failed
//!    refresh ([`SessionLossNotifier`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client Layer (above)  ← decides when a 401 warrants a refresh
//!     ↕
//! Session Layer (this crate)  ← coordinates the refresh, signals loss
//!     ↕
//! Transport Layer (below)  ← performs the actual HTTP exchanges
//! ```

mod error;
mod exempt;
mod notify;
mod refresh;

pub use error::SessionError;
pub use exempt::ExemptPaths;
pub use notify::{SessionLossListener, SessionLossNotifier};
pub use refresh::{RefreshConfig, RefreshCoordinator};
