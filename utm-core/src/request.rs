//! Read access to the inbound request's cookies and query string

use std::collections::HashMap;

/// What the engine needs from an inbound request
pub trait RequestSource {
    /// Decoded value of the cookie `name`, if the client sent one
    fn cookie(&self, name: &str) -> Option<String>;

    /// Decoded value of the query parameter `name`, if present
    fn query_param(&self, name: &str) -> Option<String>;
}

/// Owned copy of the cookies and query parameters of one request
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl RequestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a raw `Cookie` header and a raw query string (without `?`).
    ///
    /// When a cookie name repeats, the first occurrence wins. When a query
    /// parameter repeats, the last occurrence wins.
    pub fn from_parts(cookie_header: Option<&str>, query: Option<&str>) -> Self {
        let mut snapshot = Self::new();

        if let Some(header) = cookie_header {
            for pair in header.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() || snapshot.cookies.contains_key(name) {
                    continue;
                }
                snapshot
                    .cookies
                    .insert(name.to_string(), decode_cookie_value(value.trim()));
            }
        }

        if let Some(query) = query {
            for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
                snapshot.query.insert(name.into_owned(), value.into_owned());
            }
        }

        snapshot
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }
}

impl RequestSource for RequestSnapshot {
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }
}

/// Percent-decode a cookie value, treating `+` as a space.
/// Values that are not valid UTF-8 after decoding are kept verbatim.
fn decode_cookie_value(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
