//! Integration tests for the session client: pass-through, refresh,
//! single-flight, and session-loss behavior, driven by a scripted
//! transport.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};
use tether::prelude::*;
use tokio::sync::Semaphore;
use tokio::task::yield_now;

// =========================================================================
// Scripted mock transport
// =========================================================================

/// One scripted exchange outcome for a path.
enum Step {
    /// Respond with this HTTP status.
    Status(u16),
    /// Fail at the transport level.
    Unreachable,
}

/// A transport that replays a per-path script of outcomes.
///
/// Paths with no script (or an exhausted one) answer 200. The refresh
/// path can be gated on a semaphore so tests control exactly when a
/// refresh settles, which is how the concurrency scenarios pile several
/// 401s into one refresh window.
struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    counts: Mutex<HashMap<String, usize>>,
    refresh_gate: Option<Semaphore>,
    refresh_exchanges: AtomicUsize,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            counts: Mutex::new(HashMap::new()),
            refresh_gate: None,
            refresh_exchanges: AtomicUsize::new(0),
        }
    }

    /// Gate refresh exchanges on an initially-closed semaphore.
    fn with_gated_refresh(mut self) -> Self {
        self.refresh_gate = Some(Semaphore::new(0));
        self
    }

    /// Scripts the outcomes for a path, in order.
    fn script(
        self,
        path: &str,
        steps: impl IntoIterator<Item = Step>,
    ) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(path.to_string(), steps.into_iter().collect());
        self
    }

    /// Lets one gated refresh exchange proceed.
    fn release_refresh(&self) {
        if let Some(gate) = &self.refresh_gate {
            gate.add_permits(1);
        }
    }

    /// How many exchanges hit the given path.
    fn count(&self, path: &str) -> usize {
        *self
            .counts
            .lock()
            .expect("counts lock")
            .get(path)
            .unwrap_or(&0)
    }

    fn refresh_count(&self) -> usize {
        self.refresh_exchanges.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    async fn exchange(
        &self,
        request: &Request,
    ) -> Result<Response, TransportError> {
        *self
            .counts
            .lock()
            .expect("counts lock")
            .entry(request.path.clone())
            .or_insert(0) += 1;

        if request.path.contains("/auth/refresh") {
            self.refresh_exchanges.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.refresh_gate {
                let permit = gate.acquire().await.expect("gate closed");
                permit.forget();
            }
        }

        let step = self
            .scripts
            .lock()
            .expect("scripts lock")
            .get_mut(&request.path)
            .and_then(|q| q.pop_front());

        match step {
            Some(Step::Status(status)) => {
                Ok(Response::new(status, json!({"path": request.path})))
            }
            Some(Step::Unreachable) => {
                Err(TransportError::Unreachable("scripted outage".into()))
            }
            None => Ok(Response::new(200, Value::Null)),
        }
    }
}

fn client(transport: ScriptedTransport) -> SessionClient<ScriptedTransport> {
    SessionClient::new(transport)
}

// =========================================================================
// Pass-through: no refresh logic engaged
// =========================================================================

#[tokio::test]
async fn test_send_success_passes_through() {
    let c = client(ScriptedTransport::new().script("/feed", [Step::Status(200)]));

    let resp = c.get("/feed").await.expect("should succeed");

    assert_eq!(resp.status, 200);
    assert_eq!(c.transport().count("/feed"), 1);
    assert_eq!(c.transport().refresh_count(), 0);
}

#[tokio::test]
async fn test_send_non_401_failure_passes_through() {
    // A 500 is business information, not expiry evidence.
    let c = client(ScriptedTransport::new().script("/feed", [Step::Status(500)]));

    let resp = c.get("/feed").await.expect("still a response");

    assert_eq!(resp.status, 500);
    assert_eq!(c.transport().refresh_count(), 0);
}

#[tokio::test]
async fn test_send_transport_failure_surfaces_without_refresh() {
    let c = client(ScriptedTransport::new().script("/feed", [Step::Unreachable]));

    let result = c.get("/feed").await;

    assert!(matches!(result, Err(TetherError::Transport(_))));
    assert_eq!(c.transport().refresh_count(), 0);
}

// =========================================================================
// Exemption
// =========================================================================

#[tokio::test]
async fn test_exempt_login_401_passes_through() {
    // "Bad password" comes back to the caller untouched.
    let c = client(
        ScriptedTransport::new().script("/auth/login", [Step::Status(401)]),
    );

    let resp = c
        .post("/auth/login", json!({"username": "ada", "password": "nope"}))
        .await
        .expect("still a response");

    assert_eq!(resp.status, 401);
    assert_eq!(c.transport().refresh_count(), 0);
}

#[tokio::test]
async fn test_refresh_endpoint_401_does_not_recurse() {
    // A direct call to the refresh endpoint that 401s must not spawn
    // another refresh attempt.
    let c = client(
        ScriptedTransport::new().script("/auth/refresh", [Step::Status(401)]),
    );

    let resp = c
        .send(Request::new(Method::Post, "/auth/refresh"))
        .await
        .expect("still a response");

    assert_eq!(resp.status, 401);
    // The one exchange was the call itself; no coordinator cycle ran.
    assert_eq!(c.transport().refresh_count(), 1);
}

#[tokio::test]
async fn test_session_probe_401_passes_through() {
    // An anonymous page load probing /auth/session gets its 401 back
    // without a pointless refresh.
    let c = client(
        ScriptedTransport::new().script("/auth/session", [Step::Status(401)]),
    );

    let resp = c.get("/auth/session").await.expect("still a response");

    assert_eq!(resp.status, 401);
    assert_eq!(c.transport().refresh_count(), 0);
}

// =========================================================================
// Refresh-and-replay
// =========================================================================

#[tokio::test]
async fn test_401_refresh_replay_success() {
    let c = client(
        ScriptedTransport::new()
            .script("/feed", [Step::Status(401), Step::Status(200)]),
    );

    let resp = c.get("/feed").await.expect("should succeed after refresh");

    assert_eq!(resp.status, 200);
    assert_eq!(c.transport().count("/feed"), 2, "original + one replay");
    assert_eq!(c.transport().refresh_count(), 1);
}

#[tokio::test]
async fn test_replay_failure_returned_on_its_own_merits() {
    // The replay 403s — that's the answer, no further retry.
    let c = client(
        ScriptedTransport::new()
            .script("/feed", [Step::Status(401), Step::Status(403)]),
    );

    let resp = c.get("/feed").await.expect("still a response");

    assert_eq!(resp.status, 403);
    assert_eq!(c.transport().refresh_count(), 1);
}

#[tokio::test]
async fn test_second_401_breaks_the_loop() {
    // An endpoint that always rejects: one refresh-and-replay cycle,
    // then the 401 surfaces. Never a second refresh.
    let c = client(
        ScriptedTransport::new()
            .script("/feed", [Step::Status(401), Step::Status(401)]),
    );

    let resp = c.get("/feed").await.expect("still a response");

    assert_eq!(resp.status, 401);
    assert_eq!(c.transport().count("/feed"), 2);
    assert_eq!(c.transport().refresh_count(), 1);
}

#[tokio::test]
async fn test_refresh_failure_propagates_without_replay() {
    let c = client(
        ScriptedTransport::new()
            .script("/feed", [Step::Status(401)])
            .script("/auth/refresh", [Step::Status(401)]),
    );
    let mut lost = c.subscribe_session_loss();

    let result = c.get("/feed").await;

    assert!(matches!(
        result,
        Err(TetherError::Session(SessionError::RefreshRejected {
            status: 401
        }))
    ));
    // The original request was NOT replayed against a dead session.
    assert_eq!(c.transport().count("/feed"), 1);
    assert!(lost.try_recv(), "session-loss signal should have fired");
    assert!(!lost.try_recv(), "and fired exactly once");
}

#[tokio::test]
async fn test_stale_marker_is_reset_per_send() {
    // A request object reused across calls starts each send with a
    // fresh retry budget.
    let mut req = Request::get("/feed");
    req.mark_retried();

    let c = client(
        ScriptedTransport::new()
            .script("/feed", [Step::Status(401), Step::Status(200)]),
    );

    let resp = c.send(req).await.expect("should succeed after refresh");

    assert_eq!(resp.status, 200);
    assert_eq!(c.transport().refresh_count(), 1, "marker must not skip refresh");
}

// =========================================================================
// Concurrency scenarios
// =========================================================================

#[tokio::test(flavor = "current_thread")]
async fn test_five_concurrent_401s_share_one_refresh() {
    // Five requests to five different non-exempt endpoints all 401 in
    // the same window: one refresh, five independent replays.
    let paths = ["/feed", "/posts/1", "/groups", "/messages", "/profile"];
    let mut transport = ScriptedTransport::new().with_gated_refresh();
    for p in paths {
        transport = transport.script(p, [Step::Status(401), Step::Status(200)]);
    }
    let c = std::sync::Arc::new(client(transport));

    let tasks: Vec<_> = paths
        .iter()
        .map(|p| {
            let c = std::sync::Arc::clone(&c);
            let path = p.to_string();
            tokio::spawn(async move { c.get(path).await })
        })
        .collect();

    // Let every task hit its 401 and reach the refresh window.
    for _ in 0..10 {
        yield_now().await;
    }
    assert_eq!(c.transport().refresh_count(), 1, "single-flight violated");

    c.transport().release_refresh();

    for task in tasks {
        let resp = task.await.expect("join").expect("request ok");
        assert_eq!(resp.status, 200);
    }

    assert_eq!(c.transport().refresh_count(), 1);
    for p in paths {
        assert_eq!(c.transport().count(p), 2, "{p}: original + one replay");
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_queued_requests_all_reject_when_refresh_fails() {
    // Three requests queue behind a refresh that fails: all three
    // reject with the refresh error, the loss signal fires once, and
    // the coordinator is ready for a later fresh attempt.
    let paths = ["/feed", "/groups", "/messages"];
    let mut transport = ScriptedTransport::new()
        .with_gated_refresh()
        .script("/auth/refresh", [Step::Status(401), Step::Status(200)])
        .script("/profile", [Step::Status(401), Step::Status(200)]);
    for p in paths {
        transport = transport.script(p, [Step::Status(401)]);
    }
    let c = std::sync::Arc::new(client(transport));
    let mut lost = c.subscribe_session_loss();

    let tasks: Vec<_> = paths
        .iter()
        .map(|p| {
            let c = std::sync::Arc::clone(&c);
            let path = p.to_string();
            tokio::spawn(async move { c.get(path).await })
        })
        .collect();
    for _ in 0..6 {
        yield_now().await;
    }

    c.transport().release_refresh();

    for task in tasks {
        let result = task.await.expect("join");
        assert!(matches!(
            result,
            Err(TetherError::Session(SessionError::RefreshRejected {
                status: 401
            }))
        ));
    }

    assert!(lost.try_recv());
    assert!(!lost.try_recv(), "one broadcast per failed cycle");

    // A later 401 starts a brand-new cycle; this time the refresh
    // succeeds (second scripted step) and the request recovers.
    c.transport().release_refresh();
    let resp = c.get("/profile").await.expect("second cycle should recover");
    assert_eq!(resp.status, 200);
    assert_eq!(c.transport().refresh_count(), 2);
}

// =========================================================================
// Builder configuration
// =========================================================================

#[tokio::test]
async fn test_custom_refresh_path_is_used() {
    let c = SessionClient::<ScriptedTransport>::builder()
        .refresh_path("/v2/auth/refresh")
        .exempt_paths(ExemptPaths::with_paths([
            "/v2/auth/login",
            "/v2/auth/refresh",
        ]))
        .build(
            ScriptedTransport::new()
                .script("/feed", [Step::Status(401), Step::Status(200)])
                .script("/v2/auth/refresh", [Step::Status(200)]),
        );

    let resp = c.get("/feed").await.expect("should succeed");

    assert_eq!(resp.status, 200);
    assert_eq!(c.transport().count("/v2/auth/refresh"), 1);
}
