//! Canonical request type handed to the embedded application.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP method enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Parse a method token from an envelope. Unknown tokens are rejected
    /// rather than defaulted so malformed envelopes surface as errors.
    pub fn parse(token: &str) -> Option<Method> {
        if token.eq_ignore_ascii_case("GET") {
            Some(Method::Get)
        } else if token.eq_ignore_ascii_case("POST") {
            Some(Method::Post)
        } else if token.eq_ignore_ascii_case("PUT") {
            Some(Method::Put)
        } else if token.eq_ignore_ascii_case("DELETE") {
            Some(Method::Delete)
        } else if token.eq_ignore_ascii_case("PATCH") {
            Some(Method::Patch)
        } else if token.eq_ignore_ascii_case("HEAD") {
            Some(Method::Head)
        } else if token.eq_ignore_ascii_case("OPTIONS") {
            Some(Method::Options)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
        }
    }
}

/// Normalized, platform-agnostic request produced by envelope normalization.
///
/// Header keys are lowercased on construction. `body` always holds the raw
/// bytes (base64 payloads are decoded before they reach the application);
/// `was_base64_encoded` preserves the platform's original encoding decision
/// for symmetric re-encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Query parameters, multi-value aware.
    pub query: HashMap<String, Vec<String>>,
    /// Headers with lowercased keys.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Bytes,
    /// Whether the platform delivered the body base64-encoded.
    pub was_base64_encoded: bool,
}

impl CanonicalRequest {
    /// Create a new request with an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: Bytes::new(),
            was_base64_encoded: false,
        }
    }

    /// Add a header. The key is lowercased.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter value.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header value, case-insensitively.
    pub fn header_value(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// First value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&String> {
        self.query.get(key).and_then(|values| values.first())
    }

    /// Get the body as text if non-empty.
    pub fn text(&self) -> Option<String> {
        if self.body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.body).to_string())
        }
    }

    /// Parse the body as JSON if non-empty.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        if self.body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&self.body))
        }
    }
}

impl Default for CanonicalRequest {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("get"), Some(Method::Get));
        assert_eq!(Method::parse("POST"), Some(Method::Post));
        assert_eq!(Method::parse("Options"), Some(Method::Options));
        assert_eq!(Method::parse("BREW"), None);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let request = CanonicalRequest::new(Method::Get, "/").header("X-Api-Key", "secret");

        assert_eq!(request.header_value("x-api-key"), Some(&"secret".to_string()));
        assert_eq!(request.header_value("X-API-KEY"), Some(&"secret".to_string()));
        assert_eq!(request.header_value("x-other"), None);
    }

    #[test]
    fn query_params_keep_multiple_values() {
        let request = CanonicalRequest::new(Method::Get, "/search")
            .query_param("tag", "a")
            .query_param("tag", "b");

        assert_eq!(request.query.get("tag").map(Vec::len), Some(2));
        assert_eq!(request.query_value("tag"), Some(&"a".to_string()));
    }
}
