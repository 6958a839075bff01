//! A small feed reader demonstrating the session client end to end.
//!
//! Point it at a backend exposing `/auth/login`, `/auth/refresh` and
//! `/feed`, sign in, then hammer the feed from several tasks at once.
//! If the server expires the session mid-burst, the client refreshes
//! once and every task's request still comes back successfully.
//!
//! ```sh
//! TETHER_BASE_URL=http://localhost:3000 cargo run -p feed-client
//! ```

use std::sync::Arc;

use serde_json::json;
use tether::prelude::*;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn base_url() -> String {
    std::env::var("TETHER_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn credentials() -> serde_json::Value {
    json!({
        "username": std::env::var("TETHER_USER").unwrap_or_else(|_| "demo".into()),
        "password": std::env::var("TETHER_PASS").unwrap_or_else(|_| "demo".into()),
    })
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tether=debug".into()),
        )
        .init();

    let base = base_url();
    tracing::info!(%base, "connecting");

    let transport = HttpTransport::new(&base)?;
    let client = Arc::new(SessionClient::new(transport));

    // React to a dead session the way a UI shell would: drop cached
    // identity and send the user back to sign-in.
    let mut lost = client.subscribe_session_loss();
    tokio::spawn(async move {
        if lost.recv().await {
            tracing::warn!("session lost, sign in again");
        }
    });

    // Sign in. A 401 here is an answer (bad credentials), not a broken
    // session, so it comes back as a plain response.
    let login = client.post("/auth/login", credentials()).await?;
    if !login.is_success() {
        tracing::error!(status = login.status, "login rejected");
        return Ok(());
    }
    tracing::info!("signed in");

    // Burst of concurrent reads through the one shared client. Should
    // the credential expire mid-burst, all tasks ride a single refresh.
    let mut tasks = Vec::new();
    for worker in 0..8 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move {
            match client.get("/feed").await {
                Ok(resp) if resp.is_success() => {
                    let count = resp.body["posts"]
                        .as_array()
                        .map(|p| p.len())
                        .unwrap_or(0);
                    tracing::info!(worker, posts = count, "feed loaded");
                }
                Ok(resp) => {
                    tracing::warn!(worker, status = resp.status, "feed refused");
                }
                Err(err) => {
                    tracing::error!(worker, %err, "feed failed");
                }
            }
        }));
    }
    for task in tasks {
        task.await?;
    }

    Ok(())
}
