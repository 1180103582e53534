use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::{ApiClientError, Result};

/// Outbound request description. Built fresh per call.
///
/// The body is any [`serde::Serialize`] value; it is encoded as JSON when the
/// request is sent, so encoding failures surface from
/// [`ApiClient::send_request`](crate::ApiClient::send_request).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest<B = serde_json::Value> {
    /// HTTP verb, e.g. `"GET"`. Validated at send time.
    pub method: String,
    /// Path appended verbatim to the base URL. Needs its own leading slash.
    pub endpoint: String,
    pub headers: HashMap<String, String>,
    pub body: Option<B>,
}

impl ApiRequest {
    /// Builds a request without a body.
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            endpoint: endpoint.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new("GET", endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new("POST", endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new("PUT", endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new("PATCH", endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new("DELETE", endpoint)
    }
}

impl<B> ApiRequest<B> {
    /// Sets a header, replacing any previous value under the same key.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches a body, changing the request's body type.
    pub fn with_body<T>(self, body: T) -> ApiRequest<T> {
        ApiRequest {
            method: self.method,
            endpoint: self.endpoint,
            headers: self.headers,
            body: Some(body),
        }
    }
}

/// Response of a completed attempt, with the body fully read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Header values keyed by lowercase name, in arrival order.
    pub headers: HashMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Returns `true` for 2xx statuses. The retry loop never looks at this.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Body as text; invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(ApiClientError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::{ApiRequest, ApiResponse};
    use crate::ApiClientError;

    fn response(status: u16, body: &[u8]) -> ApiResponse {
        let mut headers = HashMap::new();
        headers.insert(
            "set-cookie".to_owned(),
            vec!["a=1".to_owned(), "b=2".to_owned()],
        );
        ApiResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    #[test]
    fn verb_shorthands_set_method_and_endpoint() {
        let request = ApiRequest::delete("/items/7");
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.endpoint, "/items/7");
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
    }

    #[test]
    fn header_replaces_existing_key() {
        let request = ApiRequest::get("/")
            .header("X-Trace", "one")
            .header("X-Trace", "two");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers["X-Trace"], "two");
    }

    #[test]
    fn with_body_keeps_method_endpoint_and_headers() {
        let request = ApiRequest::post("/users")
            .header("Accept", "application/json")
            .with_body(vec![1u8, 2, 3]);
        assert_eq!(request.method, "POST");
        assert_eq!(request.endpoint, "/users");
        assert_eq!(request.headers["Accept"], "application/json");
        assert_eq!(request.body, Some(vec![1u8, 2, 3]));
    }

    #[test]
    fn header_lookup_is_case_insensitive_and_returns_first_value() {
        let response = response(200, b"");
        assert_eq!(response.header("Set-Cookie"), Some("a=1"));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn is_success_covers_only_2xx() {
        assert!(response(200, b"").is_success());
        assert!(response(204, b"").is_success());
        assert!(!response(301, b"").is_success());
        assert!(!response(404, b"").is_success());
        assert!(!response(500, b"").is_success());
    }

    #[test]
    fn json_decodes_body_and_reports_decode_errors() {
        let ok = response(200, br#"{"message": "success"}"#);
        let value: serde_json::Value = ok.json().expect("body must decode");
        assert_eq!(value, json!({"message": "success"}));

        let bad = response(200, b"not json");
        let err = bad
            .json::<serde_json::Value>()
            .expect_err("body must not decode");
        assert!(matches!(err, ApiClientError::Decode(_)));
    }

    #[test]
    fn text_is_lossy() {
        let response = response(200, &[b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
