//! # Request Accessor
//!
//! What the route layer hands to the core: raw body bytes, query parameters,
//! headers, and the authenticated caller (if the identity layer resolved one).

use rv_01_signature_verification::RequestError;
use std::collections::BTreeMap;

/// An inbound HTTP request, reduced to what the core reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    body: Vec<u8>,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    caller: Option<String>,
}

impl ApiRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// A bodiless request, as for reads.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add query parameters from a raw query string (`a=1&b=2`).
    ///
    /// `+` becomes a space; no other decoding is applied.
    pub fn with_query_string(mut self, query: &str) -> Self {
        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.query
                .insert(key.replace('+', " "), value.replace('+', " "));
        }
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    /// Header names are case-insensitive.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Mark the request as made by the signed-in user `user_id`.
    pub fn with_caller(mut self, user_id: impl Into<String>) -> Self {
        self.caller = Some(user_id.into());
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, RequestError> {
        serde_json::from_slice(&self.body).map_err(|e| RequestError::MalformedJson(e.to_string()))
    }
}
