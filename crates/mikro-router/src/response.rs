//! Response state accumulated while a request is dispatched.

use serde_json::Value;

use crate::error::Result;

/// A response header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// A `key: value` header. Keys are kept as given.
    Keyed(String, String),
    /// A verbatim header line, e.g. a repeated `set-cookie: ...`.
    Raw(String),
}

impl Header {
    /// Renders the header as a single line without the trailing CRLF.
    pub fn line(&self) -> String {
        match self {
            Self::Keyed(key, value) => format!("{key}:{value}"),
            Self::Raw(line) => line.clone(),
        }
    }

    /// Splits the header into name and value. Raw lines are split at the
    /// first `:`; lines without one yield `None`.
    pub fn name_value(&self) -> Option<(&str, &str)> {
        match self {
            Self::Keyed(key, value) => Some((key, value)),
            Self::Raw(line) => line
                .split_once(':')
                .map(|(name, value)| (name.trim(), value.trim())),
        }
    }

    fn key(&self) -> Option<&str> {
        match self {
            Self::Keyed(key, _) => Some(key),
            Self::Raw(_) => None,
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.key().is_some_and(|k| same_key(k, key))
    }
}

/// Keys compare exactly, except `content-type`, which ignores letter case.
fn same_key(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(CONTENT_TYPE) {
        b.eq_ignore_ascii_case(CONTENT_TYPE)
    } else {
        a == b
    }
}

const CONTENT_TYPE: &str = "content-type";

/// The response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body is written.
    #[default]
    Empty,
    /// Written verbatim.
    Text(String),
    /// Serialized to JSON when the response is finished.
    Structured(Value),
}

/// What a route callback or action hands back to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
    /// Leave the current body untouched.
    #[default]
    NoChange,
    /// Replace the body with text.
    Body(String),
    /// Replace the body with pretty JSON and set `content-type: application/json`.
    Structured(Value),
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Self::NoChange
    }
}

impl From<String> for Outcome {
    fn from(body: String) -> Self {
        Self::Body(body)
    }
}

impl From<&str> for Outcome {
    fn from(body: &str) -> Self {
        Self::Body(body.to_string())
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl<T: Into<Outcome>> From<Option<T>> for Outcome {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NoChange, Into::into)
    }
}

/// Mutable response state for one request.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Header lines in insertion order.
    pub headers: Vec<Header>,
    /// Response body.
    pub body: Body,
    /// Charset used for the default content type.
    pub encoding: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
            encoding: "UTF-8".to_string(),
        }
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        let mut res = Self::new(404);
        res.body("Not Found");
        res
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_server_error() -> Self {
        let mut res = Self::new(500);
        res.body("Internal Server Error");
        res
    }

    /// Sets the status code.
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets the charset used for the default content type.
    pub fn encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.encoding = encoding.into();
        self
    }

    /// Sets a keyed header, replacing an entry with the same key.
    ///
    /// `content-type` is matched in any letter case, so at most one keyed
    /// content type exists.
    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|h| h.has_key(&key)) {
            Some(existing) => *existing = Header::Keyed(key, value),
            None => self.headers.push(Header::Keyed(key, value)),
        }
        self
    }

    /// Appends a verbatim header line.
    pub fn raw_header(&mut self, line: impl Into<String>) -> &mut Self {
        self.headers.push(Header::Raw(line.into()));
        self
    }

    /// Adds several headers.
    pub fn headers<I>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = Header>,
    {
        for header in headers {
            match header {
                Header::Keyed(key, value) => self.header(key, value),
                Header::Raw(line) => self.raw_header(line),
            };
        }
        self
    }

    /// Value of a keyed header.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers.iter().find_map(|h| match h {
            Header::Keyed(k, v) if same_key(k, key) => Some(v.as_str()),
            _ => None,
        })
    }

    /// Removes keyed headers.
    pub fn remove_header(&mut self, key: &str) -> &mut Self {
        self.headers.retain(|h| !h.has_key(key));
        self
    }

    /// Sets the content type.
    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.header(CONTENT_TYPE, content_type)
    }

    /// Whether a keyed content type header exists, in any letter case.
    pub fn has_content_type(&self) -> bool {
        self.headers
            .iter()
            .any(|h| h.has_key(CONTENT_TYPE))
    }

    /// Sets a redirect status and `location` header.
    pub fn redirect(&mut self, url: impl Into<String>, status: u16) -> &mut Self {
        self.status(status).header("location", url)
    }

    /// Sets a text body.
    pub fn body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Body::Text(body.into());
        self
    }

    /// Sets a pretty-printed JSON body.
    pub fn json(&mut self, payload: &Value) -> Result<&mut Self> {
        let body = serde_json::to_string_pretty(payload)?;
        Ok(self.content_type("application/json").body(body))
    }

    /// Sets an XML body.
    pub fn xml(&mut self, xml: impl Into<String>) -> &mut Self {
        self.content_type("text/xml").body(xml)
    }

    /// Clears the body.
    pub fn remove_body(&mut self) -> &mut Self {
        self.body = Body::Empty;
        self
    }

    /// Applies a callback outcome to the body.
    pub fn apply(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::NoChange => {}
            Outcome::Body(body) => {
                self.body(body);
            }
            Outcome::Structured(value) => {
                self.json(&value)?;
            }
        }
        Ok(())
    }

    /// Returns the body as a string, if it is text.
    pub fn body_string(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Finalizes the response for the transport.
    ///
    /// Adds `content-type: text/html; charset=<encoding>` when no content
    /// type was set and serializes structured bodies.
    pub fn finish(mut self) -> FinishedResponse {
        if !self.has_content_type() {
            let default = format!("text/html; charset={}", self.encoding);
            self.headers.push(Header::Keyed(CONTENT_TYPE.to_string(), default));
        }

        let body = match self.body {
            Body::Empty => None,
            Body::Text(text) => Some(text),
            Body::Structured(value) => {
                Some(serde_json::to_string(&value).unwrap_or_else(|_| value.to_string()))
            }
        };

        FinishedResponse {
            status: self.status,
            headers: self.headers,
            body,
        }
    }
}

/// A response ready to be written to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header lines in insertion order.
    pub headers: Vec<Header>,
    /// Response body, if any.
    pub body: Option<String>,
}

impl FinishedResponse {
    /// Value of a keyed header, in any letter case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.iter().find_map(|h| match h {
            Header::Keyed(k, v) if k.eq_ignore_ascii_case(key) => Some(v.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_header_replaces() {
        let mut res = Response::default();
        res.header("x-trace", "a").header("x-trace", "b");
        assert_eq!(res.header_value("x-trace"), Some("b"));
        assert_eq!(res.headers.len(), 1);
    }

    #[test]
    fn test_other_keys_are_case_sensitive() {
        let mut res = Response::default();
        res.header("X-Trace", "a").header("x-trace", "b");
        assert_eq!(res.headers.len(), 2);
        assert_eq!(res.header_value("X-Trace"), Some("a"));
    }

    #[test]
    fn test_content_type_replaced_in_any_case() {
        let mut res = Response::default();
        res.header("Content-Type", "text/plain");
        res.apply(Outcome::Structured(serde_json::json!({"ok": true})))
            .unwrap();
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.header_value("CONTENT-TYPE"), Some("application/json"));

        res.xml("<a/>");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.header_value("content-type"), Some("text/xml"));

        res.remove_header("Content-type");
        assert!(res.headers.is_empty());
        assert!(!res.has_content_type());
    }

    #[test]
    fn test_header_name_value() {
        assert_eq!(
            Header::Keyed("x-a".into(), "1".into()).name_value(),
            Some(("x-a", "1"))
        );
        assert_eq!(
            Header::Raw("set-cookie: a=1; Path=/".into()).name_value(),
            Some(("set-cookie", "a=1; Path=/"))
        );
        assert_eq!(Header::Raw("garbage".into()).name_value(), None);
    }

    #[test]
    fn test_raw_headers_are_positional() {
        let mut res = Response::default();
        res.raw_header("set-cookie: a=1").raw_header("set-cookie: b=2");
        assert_eq!(res.headers.len(), 2);
        assert_eq!(res.headers[1].line(), "set-cookie: b=2");
    }

    #[test]
    fn test_finish_adds_default_content_type() {
        let mut res = Response::default();
        res.encoding("ISO-8859-1").body("hi");
        let done = res.finish();
        assert_eq!(done.header("content-type"), Some("text/html; charset=ISO-8859-1"));
        assert_eq!(done.body.as_deref(), Some("hi"));
    }

    #[test]
    fn test_finish_keeps_existing_content_type() {
        let mut res = Response::default();
        res.header("Content-Type", "text/plain");
        let done = res.finish();
        let count = done
            .headers
            .iter()
            .filter(|h| h.line().to_lowercase().starts_with("content-type"))
            .count();
        assert_eq!(count, 1);
        assert_eq!(done.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_apply_structured_sets_json() {
        let mut res = Response::default();
        res.apply(Outcome::Structured(serde_json::json!({"id": 7})))
            .unwrap();
        assert_eq!(res.header_value("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(res.body_string().unwrap()).unwrap();
        assert_eq!(body["id"], 7);
    }

    #[test]
    fn test_apply_no_change_keeps_body() {
        let mut res = Response::default();
        res.body("kept");
        res.apply(Outcome::NoChange).unwrap();
        assert_eq!(res.body_string(), Some("kept"));
    }

    #[test]
    fn test_structured_body_serialized_on_finish() {
        let mut res = Response::default();
        res.body = Body::Structured(serde_json::json!([1, 2]));
        assert_eq!(res.finish().body.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_redirect() {
        let mut res = Response::default();
        res.redirect("/login", 302);
        assert_eq!(res.status, 302);
        assert_eq!(res.header_value("location"), Some("/login"));
    }
}
