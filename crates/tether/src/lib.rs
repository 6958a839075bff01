//! # Tether
//!
//! Authenticated HTTP session core for interactive clients.
//!
//! Tether keeps a cookie-carried access credential valid across many
//! concurrent requests without callers knowing anything about token
//! lifecycle. The application sees exactly two contracts:
//!
//! - **send a request, get a response or a typed failure** —
//!   [`SessionClient::send`]
//! - **be told when the session is definitively gone** —
//!   [`SessionClient::subscribe_session_loss`]
//!
//! Everything in between — noticing the 401, refreshing the credential
//! exactly once while other requests queue behind it, replaying each
//! request exactly once — is invisible choreography.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether::prelude::*;
//!
//! # async fn run() -> Result<(), TetherError> {
//! let transport = HttpTransport::new("https://api.example.com")?;
//! let client = SessionClient::new(transport);
//!
//! let mut lost = client.subscribe_session_loss();
//! tokio::spawn(async move {
//!     if lost.recv().await {
//!         // clear cached identity, route to sign-in
//!     }
//! });
//!
//! let feed = client.get("/feed").await?;
//! # let _ = feed;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{SessionClient, SessionClientBuilder};
pub use error::TetherError;

/// Everything an application typically needs, in one import.
pub mod prelude {
    pub use crate::{SessionClient, SessionClientBuilder, TetherError};
    pub use tether_session::{
        ExemptPaths, RefreshConfig, SessionError, SessionLossListener,
        SessionLossNotifier,
    };
    #[cfg(feature = "http")]
    pub use tether_transport::HttpTransport;
    pub use tether_transport::{
        Method, Request, Response, Transport, TransportError,
    };
}
