//! Session-loss signal: a process-wide, payload-less broadcast.
//!
//! Fired exactly once per failed refresh cycle. The intended consumer is
//! the piece of the application that clears cached identity state and
//! routes the user to a sign-in surface — it subscribes once at startup
//! and reacts without polling.
//!
//! Built on `tokio::sync::broadcast` rather than a handler registry:
//! subscribe/unsubscribe become `subscribe()`/drop, and a slow, panicking
//! or vanished listener can't prevent the others from being notified.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Broadcasts the session-loss signal to every live listener.
///
/// Cheap to clone; all clones feed the same set of listeners.
/// `broadcast()` never fails and is safe to call with zero listeners —
/// the signal is fire-and-forget, no acknowledgement expected.
#[derive(Debug, Clone)]
pub struct SessionLossNotifier {
    tx: broadcast::Sender<()>,
}

impl SessionLossNotifier {
    /// Creates a notifier with no listeners yet.
    pub fn new() -> Self {
        // Capacity only bounds unconsumed signals per listener; the
        // signal is payload-less, so a lagged listener loses nothing.
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Registers a new listener. Dropping the listener unsubscribes it.
    pub fn subscribe(&self) -> SessionLossListener {
        SessionLossListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Fires the session-loss signal to all current listeners.
    pub fn broadcast(&self) {
        // Err here just means nobody is listening right now.
        let reached = self.tx.send(()).unwrap_or(0);
        tracing::warn!(listeners = reached, "session lost");
    }

    /// Number of currently subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionLossNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the session-loss signal.
pub struct SessionLossListener {
    rx: broadcast::Receiver<()>,
}

impl SessionLossListener {
    /// Waits for the next session-loss signal.
    ///
    /// Returns `true` when the signal fired, `false` when every notifier
    /// handle was dropped (no signal can ever arrive again).
    pub async fn recv(&mut self) -> bool {
        match self.rx.recv().await {
            Ok(()) => true,
            // Lagging means signals fired faster than we consumed them.
            // They're indistinguishable, so collapsing them is correct.
            Err(RecvError::Lagged(_)) => true,
            Err(RecvError::Closed) => false,
        }
    }

    /// Non-blocking probe: `true` if a signal has fired since the last
    /// call. Mostly useful in tests.
    pub fn try_recv(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Lagged(_)) => true,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => false,
        }
    }
}
