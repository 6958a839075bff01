//! The refresh coordinator: single-flight credential renewal.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Issuing exactly one refresh exchange per expiry, no matter how many
//!   requests observed the expired credential simultaneously
//! - Queuing every concurrent caller behind that one exchange
//! - Resuming the queue, in FIFO order, once the refresh settles
//! - Broadcasting the session-loss signal exactly once when it fails
//!
//! # Concurrency notes
//!
//! The one real race window in the whole system is the check-then-act on
//! `in_progress`: observe "no refresh running", decide to start one. Two
//! tasks racing through that window would issue two refresh exchanges.
//! The window is closed by taking the state mutex around the decision;
//! the lock is never held across a network exchange, so waiters enqueue
//! freely while the refresh is in flight.
//!
//! The cycle itself — exchange, state reset, FIFO drain, loss broadcast —
//! runs on its own spawned task, not inside any caller's future. Callers
//! routinely get cancelled (a `tokio::time::timeout` around `send`, a UI
//! navigating away), and a cancelled caller must not be able to abort the
//! shared refresh or strand `in_progress` at true. The settle step is
//! therefore guaranteed to run no matter what happens to the callers.
//!
//! ## Lifecycle
//!
//! ```text
//! obtain_fresh_session(): enqueue own continuation, then
//!        │
//!        ├── no cycle running ──→ mark in_progress, spawn the cycle task:
//!        │                            run the ONE exchange
//!        │                            settle: reset flag, drain FIFO
//!        │                            failure? broadcast loss (once)
//!        │
//!        └── cycle running ─────→ nothing extra to do
//!        │
//!        └── await own continuation, resume with the shared outcome
//! ```

use std::sync::Arc;

use tether_transport::{Method, Request, Transport};
use tokio::sync::{oneshot, Mutex};

use crate::{SessionError, SessionLossNotifier};

/// A suspended caller's continuation. The oneshot sender can be consumed
/// exactly once, which is precisely the guarantee a continuation needs.
type Waiter = oneshot::Sender<Result<(), SessionError>>;

/// Configuration for the refresh coordinator.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Path of the refresh endpoint. The refresh is a bare POST — the
    /// long-lived session proof rides in the transport's cookie jar, so
    /// no request body is needed.
    pub refresh_path: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_path: "/auth/refresh".to_string(),
        }
    }
}

/// The single-flight state. Only ever touched under the mutex.
struct RefreshState {
    /// Whether a refresh cycle is currently in flight.
    in_progress: bool,
    /// Every caller awaiting the in-flight cycle, in arrival order —
    /// including the caller that started it. Empty at rest; drained
    /// exactly once, by the cycle task, when the refresh settles.
    waiters: Vec<Waiter>,
}

/// Coordinates credential refresh across concurrent callers.
///
/// One instance per application session, injected into the client that
/// uses it — never a process-global. That keeps tests able to build
/// isolated coordinators and assert on their queue directly
/// ([`waiter_count`](Self::waiter_count)).
pub struct RefreshCoordinator<T: Transport> {
    transport: Arc<T>,
    // Shared with the spawned cycle task.
    state: Arc<Mutex<RefreshState>>,
    notifier: SessionLossNotifier,
    config: RefreshConfig,
}

impl<T: Transport> RefreshCoordinator<T> {
    /// Creates a coordinator with the default refresh path.
    pub fn new(transport: Arc<T>, notifier: SessionLossNotifier) -> Self {
        Self::with_config(transport, notifier, RefreshConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    pub fn with_config(
        transport: Arc<T>,
        notifier: SessionLossNotifier,
        config: RefreshConfig,
    ) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(RefreshState {
                in_progress: false,
                waiters: Vec::new(),
            })),
            notifier,
            config,
        }
    }

    /// Ensures a fresh session credential exists, or reports that the
    /// session is terminally lost.
    ///
    /// Callable concurrently from any number of call sites. The first
    /// caller per cycle spawns the refresh task; everyone — that caller
    /// included — suspends on a queued continuation and resumes with the
    /// shared outcome. Exactly one exchange per cycle, exactly one
    /// session-loss broadcast per failed cycle. Cancelling a caller's
    /// future abandons its continuation but never the cycle itself: the
    /// state reset and the drain are guaranteed to run.
    ///
    /// # Errors
    /// [`SessionError::RefreshRejected`] when the refresh endpoint said
    /// no, [`SessionError::RefreshUnreachable`] when it couldn't be
    /// reached. Both are terminal: no internal retry, no backoff. Retry
    /// policy, if any, belongs to a layer above.
    pub async fn obtain_fresh_session(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();

        // Decide under the lock: join the running cycle, or start one?
        let leader = {
            let mut state = self.state.lock().await;
            state.waiters.push(tx);
            if state.in_progress {
                false
            } else {
                state.in_progress = true;
                true
            }
        };

        if leader {
            tracing::debug!(path = %self.config.refresh_path, "starting session refresh");
            self.spawn_cycle();
        } else {
            tracing::debug!("refresh already in flight, joining queue");
        }

        // A dropped sender would surface as Interrupted, but the cycle
        // task resolves every waiter it ever takes.
        rx.await.unwrap_or(Err(SessionError::Interrupted))
    }

    /// Runs one refresh cycle — exchange, state reset, FIFO drain, loss
    /// broadcast — on a detached task, so no caller cancellation can
    /// abort it mid-way.
    fn spawn_cycle(&self) {
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let notifier = self.notifier.clone();
        let request =
            Request::new(Method::Post, self.config.refresh_path.clone());

        tokio::spawn(async move {
            let outcome = match transport.exchange(&request).await {
                Ok(response) if response.is_success() => Ok(()),
                Ok(response) => Err(SessionError::RefreshRejected {
                    status: response.status,
                }),
                Err(e) => Err(SessionError::RefreshUnreachable(e.to_string())),
            };

            // Settle: reset the flag and take the queue in one critical
            // section, so a caller arriving after this point starts a
            // fresh cycle instead of joining a settled one.
            let waiters = {
                let mut state = state.lock().await;
                state.in_progress = false;
                std::mem::take(&mut state.waiters)
            };

            let waited = waiters.len();
            // FIFO drain. A waiter that dropped its receiver is skipped —
            // abandoned callers keep their slot but nobody is owed an
            // answer.
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }

            match &outcome {
                Ok(()) => {
                    tracing::info!(waited, "session refreshed");
                }
                Err(error) => {
                    tracing::warn!(waited, %error, "session refresh failed");
                    notifier.broadcast();
                }
            }
        });
    }

    /// Whether a refresh cycle is currently in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.state.lock().await.in_progress
    }

    /// Number of callers currently awaiting the in-flight cycle,
    /// including the one that started it.
    pub async fn waiter_count(&self) -> usize {
        self.state.lock().await.waiters.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
