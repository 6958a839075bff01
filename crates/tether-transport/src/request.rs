//! Request descriptor: one outbound call, plus its retry marker.

use std::fmt;

use serde_json::Value;

/// HTTP method for a [`Request`].
///
/// A small closed enum instead of a string — you can't typo `"PSOT"`,
/// and matching on it is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// Describes one outbound call: method, target path, optional JSON body,
/// and a private retry marker.
///
/// The path may be a route fragment (`/posts/42`) resolved against the
/// transport's base URL, or a full `http(s)://` URL used as-is.
///
/// ## The retry marker
///
/// The marker exists to break refresh loops: a request that already went
/// through one refresh-and-replay cycle and *still* got a 401 must be
/// surfaced as a failure, not refreshed again. The marker is private —
/// only the session client flips it, at most once per call. It is also
/// cleared at the start of every independent `send`, so reusing a
/// `Request` value across calls can't smuggle in a stale marker.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Target path: route fragment or full URL.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// See the type-level docs. Mutated only through
    /// [`mark_retried`](Self::mark_retried) / [`reset_retry`](Self::reset_retry).
    retried: bool,
}

impl Request {
    /// Creates a request with an explicit method and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    /// Creates a PUT request with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    /// Creates a PATCH request with a JSON body.
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    /// Creates a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether this request has already been replayed once after a refresh.
    pub fn already_retried(&self) -> bool {
        self.retried
    }

    /// Marks the request as replayed. Set by the session client before
    /// the one permitted replay; never set anywhere else.
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Clears the retry marker. Called at the start of each independent
    /// `send` so a reused request starts a fresh retry budget.
    pub fn reset_retry(&mut self) {
        self.retried = false;
    }
}
