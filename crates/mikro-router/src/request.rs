//! Incoming request data and HTTP method tokens.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{Result, RouterError};

/// An uppercase HTTP method token.
///
/// Tokens are open-ended: applications may recognize extra verbs through
/// [`MethodSet::add`]. The special token [`Method::ANY`] matches every verb.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Method(Cow<'static, str>);

impl Method {
    /// GET method
    pub const GET: Self = Self(Cow::Borrowed("GET"));
    /// POST method
    pub const POST: Self = Self(Cow::Borrowed("POST"));
    /// PUT method
    pub const PUT: Self = Self(Cow::Borrowed("PUT"));
    /// PATCH method
    pub const PATCH: Self = Self(Cow::Borrowed("PATCH"));
    /// DELETE method
    pub const DELETE: Self = Self(Cow::Borrowed("DELETE"));
    /// Wildcard that matches every verb.
    pub const ANY: Self = Self(Cow::Borrowed("ANY"));

    /// Creates a method token, normalizing it to uppercase.
    pub fn new(token: &str) -> Self {
        Self(Cow::Owned(token.trim().to_uppercase()))
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the `ANY` wildcard.
    pub fn is_any(&self) -> bool {
        self.as_str() == "ANY"
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// The set of method tokens routes may be registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    methods: Vec<Method>,
}

impl Default for MethodSet {
    fn default() -> Self {
        Self {
            methods: vec![Method::GET, Method::POST, Method::ANY],
        }
    }
}

impl MethodSet {
    /// Builds a set from arbitrary tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            methods: Vec::new(),
        };
        for token in tokens {
            set.add(token.as_ref());
        }
        set
    }

    /// Recognizes an additional method token.
    pub fn add(&mut self, token: &str) {
        let method = Method::new(token);
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    /// Stops recognizing a method token.
    pub fn remove(&mut self, token: &str) {
        let method = Method::new(token);
        self.methods.retain(|m| *m != method);
    }

    /// Case-insensitive membership check.
    pub fn contains(&self, token: &str) -> bool {
        let method = Method::new(token);
        self.methods.contains(&method)
    }

    /// Parses a token, failing when it is not recognized.
    pub fn parse(&self, token: &str) -> Result<Method> {
        let method = Method::new(token);
        if self.methods.contains(&method) {
            Ok(method)
        } else {
            Err(RouterError::InvalidMethod(token.to_string()))
        }
    }

    /// Returns the recognized tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }
}

/// An incoming request as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Raw URI path, without the query string.
    pub uri: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Whether the request arrived over TLS.
    pub secure: bool,
}

impl Request {
    /// Creates a new request, splitting off any query string.
    pub fn new(method: impl Into<Method>, uri: &str) -> Self {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        Self {
            method: method.into(),
            uri: path.to_string(),
            query: query.to_string(),
            headers: HashMap::new(),
            secure: false,
        }
    }

    /// Creates a GET request.
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Marks the request as received over TLS.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Host taken from the `Host` header.
    pub fn host(&self) -> Option<&str> {
        self.get_header("host")
    }

    /// Whether the request is secure, directly or through a proxy.
    pub fn is_secure(&self) -> bool {
        self.secure
            || self
                .get_header("x-forwarded-proto")
                .is_some_and(|v| v.eq_ignore_ascii_case("https"))
            || self
                .get_header("x-forwarded-ssl")
                .is_some_and(|v| v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("https"))
    }

    /// The raw query string.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Gets a decoded query parameter.
    pub fn query(&self, key: &str) -> Option<String> {
        Self::parse_query_string(&self.query).remove(key)
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or("");
                Some((urlencoding_decode(key), urlencoding_decode(value)))
            })
            .collect()
    }
}

/// Collapses runs of `/` and trims slashes from both ends.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Removes the base path prefix from a URI path.
pub fn strip_base_path<'a>(uri: &'a str, base_path: &str) -> &'a str {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return uri;
    }
    match uri.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => uri,
    }
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            b'+' => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
