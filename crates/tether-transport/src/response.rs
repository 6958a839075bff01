//! Response type: status code plus decoded JSON body.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::TransportError;

/// The outcome of one HTTP exchange.
///
/// Carries the raw status so the session layer can classify it (success,
/// 401, business error) and the body as loosely-typed JSON. Callers that
/// know the shape of the payload use [`json`](Self::json) to get a typed
/// value out.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response body. `Value::Null` when the body was empty or not JSON.
    pub body: Value,
}

impl Response {
    /// Creates a response. Mostly useful for tests and mock transports.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status is 401 Unauthorized — the only status the
    /// session layer treats specially.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Deserializes the body into a typed value.
    ///
    /// # Errors
    /// Returns [`TransportError::Decode`] if the body doesn't match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_value(self.body.clone()).map_err(TransportError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_success_2xx_range() {
        assert!(Response::new(200, Value::Null).is_success());
        assert!(Response::new(204, Value::Null).is_success());
        assert!(!Response::new(199, Value::Null).is_success());
        assert!(!Response::new(301, Value::Null).is_success());
        assert!(!Response::new(500, Value::Null).is_success());
    }

    #[test]
    fn test_is_unauthorized_only_401() {
        assert!(Response::new(401, Value::Null).is_unauthorized());
        assert!(!Response::new(403, Value::Null).is_unauthorized());
        assert!(!Response::new(200, Value::Null).is_unauthorized());
    }

    #[test]
    fn test_json_decodes_typed_body() {
        #[derive(serde::Deserialize)]
        struct Who {
            name: String,
        }
        let resp = Response::new(200, json!({"name": "ada"}));
        let who: Who = resp.json().expect("should decode");
        assert_eq!(who.name, "ada");
    }

    #[test]
    fn test_json_wrong_shape_returns_decode_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Who {
            #[allow(dead_code)]
            name: String,
        }
        let resp = Response::new(200, json!({"nom": "ada"}));
        let result: Result<Who, _> = resp.json();
        assert!(matches!(result, Err(TransportError::Decode(_))));
    }
}
