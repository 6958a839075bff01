//! Endpoint classification: which paths are exempt from refresh-on-401.
//!
//! A 401 from `/auth/login` means "bad password". A 401 from
//! `/auth/session` means "nobody is signed in". These are normal,
//! meaningful business outcomes — not evidence that a previously valid
//! credential expired. Treating them as refresh triggers would either
//! loop forever (the refresh endpoint refreshing itself) or refresh
//! needlessly on every anonymous page load. So the client checks this
//! list before engaging any refresh logic.

/// The fixed list of refresh-exempt path fragments.
///
/// Matching is a pure substring test, so entries match whether the
/// request path is a route fragment (`/auth/login`) or a full URL
/// (`https://api.example.com/auth/login`).
///
/// The list is static configuration, not runtime-discovered: any new
/// endpoint whose 401 is an expected outcome must be added here to
/// prevent spurious refresh attempts.
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    paths: Vec<String>,
}

/// The default list covers credential submission, account creation, the
/// refresh operation itself, and the current-session probe.
impl Default for ExemptPaths {
    fn default() -> Self {
        Self::with_paths([
            "/auth/login",
            "/auth/register",
            "/auth/refresh",
            "/auth/session",
        ])
    }
}

impl ExemptPaths {
    /// Creates a classifier from an explicit list of path fragments.
    pub fn with_paths(
        paths: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a path fragment to the exemption list.
    pub fn push(&mut self, path: impl Into<String>) {
        self.paths.push(path.into());
    }

    /// Whether a 401 from this path should bypass refresh handling.
    ///
    /// Pure substring test — no side effects, no failure modes.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.paths.iter().any(|p| path.contains(p.as_str()))
    }
}
