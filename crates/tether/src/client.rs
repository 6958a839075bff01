//! `SessionClient`: the façade every other layer calls.
//!
//! The client wraps a transport and decides, per response, whether a 401
//! is business information to pass through or expiry evidence worth a
//! refresh. The flow for one call is:
//!   1. Exchange the request
//!   2. Not a 401, already replayed, or exempt path → return as-is
//!   3. Otherwise: obtain a fresh session (single-flight), replay once,
//!      return whatever the replay yields

use std::sync::Arc;

use serde_json::Value;
use tether_session::{
    ExemptPaths, RefreshConfig, RefreshCoordinator, SessionLossListener,
    SessionLossNotifier,
};
use tether_transport::{Request, Response, Transport};

use crate::TetherError;

/// Builder for configuring a [`SessionClient`].
///
/// # Example
///
/// ```rust,no_run
/// use tether::prelude::*;
///
/// # fn build() -> Result<(), TetherError> {
/// let transport = HttpTransport::new("https://api.example.com")?;
/// let client = SessionClient::<HttpTransport>::builder()
///     .refresh_path("/auth/refresh")
///     .build(transport);
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct SessionClientBuilder {
    exempt: ExemptPaths,
    refresh_config: RefreshConfig,
}

impl SessionClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            exempt: ExemptPaths::default(),
            refresh_config: RefreshConfig::default(),
        }
    }

    /// Sets the refresh endpoint path.
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_config.refresh_path = path.into();
        self
    }

    /// Replaces the refresh-exempt path list.
    pub fn exempt_paths(mut self, exempt: ExemptPaths) -> Self {
        self.exempt = exempt;
        self
    }

    /// Builds the client around the given transport.
    pub fn build<T: Transport>(self, transport: T) -> SessionClient<T> {
        let transport = Arc::new(transport);
        let notifier = SessionLossNotifier::new();
        let refresh = RefreshCoordinator::with_config(
            Arc::clone(&transport),
            notifier.clone(),
            self.refresh_config,
        );
        SessionClient {
            transport,
            refresh,
            exempt: self.exempt,
            notifier,
        }
    }
}

impl Default for SessionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The authenticated session client.
///
/// One instance per application session, shared across every component
/// that talks to the backend. Callers receive either the eventual
/// successful response or a terminal failure; they never observe the
/// intermediate 401/refresh/replay choreography on a non-exempt path.
pub struct SessionClient<T: Transport> {
    transport: Arc<T>,
    refresh: RefreshCoordinator<T>,
    exempt: ExemptPaths,
    notifier: SessionLossNotifier,
}

impl<T: Transport> SessionClient<T> {
    /// Creates a client with default configuration.
    pub fn new(transport: T) -> Self {
        SessionClientBuilder::new().build(transport)
    }

    /// Creates a new builder.
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::new()
    }

    /// Sends a request, transparently renewing the session credential if
    /// it expired mid-flight.
    ///
    /// Any HTTP status comes back as `Ok(Response)` — including a 401
    /// from an exempt path ("bad password" is an answer, not an error)
    /// and a 401 that survived one refresh-and-replay cycle (the circuit
    /// breaker against endpoints that always reject).
    ///
    /// # Errors
    /// - [`TetherError::Transport`] — the exchange itself failed; never
    ///   triggers refresh logic.
    /// - [`TetherError::Session`] — the credential expired and could not
    ///   be renewed. The session-loss signal has already fired by the
    ///   time this returns.
    pub async fn send(
        &self,
        mut request: Request,
    ) -> Result<Response, TetherError> {
        // A reused request value must not carry a marker from an earlier
        // call: every independent send gets a fresh retry budget.
        request.reset_retry();
        self.dispatch(&mut request).await
    }

    /// The decision tree from the module docs. Split from [`send`] so
    /// the marker reset happens exactly once per logical call.
    async fn dispatch(
        &self,
        request: &mut Request,
    ) -> Result<Response, TetherError> {
        let response = self.transport.exchange(request).await?;

        if !response.is_unauthorized()
            || request.already_retried()
            || self.exempt.is_exempt(&request.path)
        {
            // Success, business-level failure, expected 401 from an
            // exempt endpoint, or the one permitted replay already
            // happened — pass through untouched.
            return Ok(response);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "401 on non-exempt path, obtaining fresh session"
        );

        request.mark_retried();

        // A refresh failure is this call's failure: the original request
        // is NOT replayed against a session known to be gone.
        self.refresh.obtain_fresh_session().await?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "session refreshed, replaying request"
        );

        // Exactly one replay, returned as-is — even if it fails again.
        let replay = self.transport.exchange(request).await?;
        Ok(replay)
    }

    /// Sends a GET request.
    pub async fn get(
        &self,
        path: impl Into<String>,
    ) -> Result<Response, TetherError> {
        self.send(Request::get(path)).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post(
        &self,
        path: impl Into<String>,
        body: Value,
    ) -> Result<Response, TetherError> {
        self.send(Request::post(path, body)).await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn put(
        &self,
        path: impl Into<String>,
        body: Value,
    ) -> Result<Response, TetherError> {
        self.send(Request::put(path, body)).await
    }

    /// Sends a PATCH request with a JSON body.
    pub async fn patch(
        &self,
        path: impl Into<String>,
        body: Value,
    ) -> Result<Response, TetherError> {
        self.send(Request::patch(path, body)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(
        &self,
        path: impl Into<String>,
    ) -> Result<Response, TetherError> {
        self.send(Request::delete(path)).await
    }

    /// Registers a listener for the session-loss signal.
    ///
    /// The signal fires exactly once per failed refresh cycle. The
    /// intended consumer clears cached identity state and routes the
    /// user to a sign-in surface; dropping the listener unsubscribes.
    pub fn subscribe_session_loss(&self) -> SessionLossListener {
        self.notifier.subscribe()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
