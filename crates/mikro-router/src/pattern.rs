//! Route pattern compilation and priority scoring.

use std::cmp::Reverse;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::params::{Params, UrlParams};

/// Fragment used for placeholders with no registered token.
const DEFAULT_FRAGMENT: &str = "[^/]+";

/// Mapping from placeholder token text (e.g. `{num}`) to a regex fragment.
#[derive(Debug, Clone)]
pub struct TokenPatterns {
    tokens: Vec<(String, String)>,
}

impl Default for TokenPatterns {
    fn default() -> Self {
        Self {
            tokens: vec![
                ("{any}".to_string(), DEFAULT_FRAGMENT.to_string()),
                ("{num}".to_string(), r"\d+".to_string()),
                ("{all}".to_string(), ".*".to_string()),
            ],
        }
    }
}

impl TokenPatterns {
    /// Registers or replaces the fragment for a token.
    ///
    /// The token may be given with or without braces. The fragment is
    /// validated eagerly.
    pub fn insert(&mut self, token: &str, fragment: &str) -> Result<()> {
        let token = braced(token);
        Regex::new(fragment).map_err(|e| RouterError::InvalidPattern {
            token: token.clone(),
            message: e.to_string(),
        })?;
        match self.tokens.iter_mut().find(|(t, _)| *t == token) {
            Some((_, existing)) => *existing = fragment.to_string(),
            None => self.tokens.push((token, fragment.to_string())),
        }
        Ok(())
    }

    /// Fragment registered for a token, if any.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, f)| f.as_str())
    }
}

fn braced(token: &str) -> String {
    if token.starts_with('{') && token.ends_with('}') {
        token.to_string()
    } else {
        format!("{{{token}}}")
    }
}

/// Ordering class of a route. Lower sorts first.
///
/// Routes with at least one literal segment are tried in declaration
/// order. Fully dynamic routes follow, latest declaration first. Routes
/// with a typed terminal placeholder come last: those whose label is a
/// number are ordered by it, the rest share the final bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Declaration index of a literal-bearing route.
    Declared(usize),
    /// Fully dynamic route, keyed by reversed declaration index.
    FullyDynamic(Reverse<usize>),
    /// Typed terminal placeholder with a numeric label.
    Ranked(u64),
    /// Typed terminal placeholder with a non-numeric label.
    Typed,
}

impl Priority {
    /// Computes the priority of a raw pattern declared at `index`.
    pub fn of(pattern: &str, index: usize) -> Self {
        Self::from_parts(pattern, &parse(pattern.trim_matches('/')), index)
    }

    fn from_parts(raw: &str, parts: &[Part], index: usize) -> Self {
        let segments = raw.split('/').filter(|s| !s.trim().is_empty()).count();
        let placeholders = parts
            .iter()
            .filter(|p| matches!(p, Part::Placeholder(_)))
            .count();

        let terminal = match parts.last() {
            Some(Part::Placeholder(p)) if raw.ends_with('}') => p.kind.as_ref(),
            _ => None,
        };

        if let Some(label) = terminal {
            return label.parse().map_or(Self::Typed, Self::Ranked);
        }

        if segments > 1 && segments == placeholders {
            Self::FullyDynamic(Reverse(index))
        } else {
            Self::Declared(index)
        }
    }
}

/// A `{...}` placeholder in a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Name used for captured params and URL generation.
    pub name: String,
    /// Token text looked up in [`TokenPatterns`], braces included.
    pub token: String,
    /// Label of a `{label:type}` placeholder.
    kind: Option<String>,
}

impl Placeholder {
    fn parse(inner: &str) -> Self {
        match inner.split_once(':') {
            Some((label, ty)) => {
                let numeric = !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit());
                Self {
                    name: if numeric { ty } else { label }.to_string(),
                    token: format!("{{{ty}}}"),
                    kind: Some(label.to_string()),
                }
            }
            None => Self {
                name: inner.to_string(),
                token: format!("{{{inner}}}"),
                kind: None,
            },
        }
    }

    /// Whether the placeholder carried a `:type` suffix.
    pub fn is_typed(&self) -> bool {
        self.kind.is_some()
    }

    fn names(&self) -> [&str; 2] {
        let ty = &self.token[1..self.token.len() - 1];
        [self.name.as_str(), ty]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder(Placeholder),
}

/// Splits a pattern into literal text and placeholders, left to right.
fn parse(pattern: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        if open > 0 {
            parts.push(Part::Literal(rest[..open].to_string()));
        }
        parts.push(Part::Placeholder(Placeholder::parse(&rest[open + 1..close])));
        rest = &rest[close + 1..];
    }

    if !rest.is_empty() {
        parts.push(Part::Literal(rest.to_string()));
    }

    parts
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The pattern as declared.
    pattern: String,
    /// The pattern with surrounding slashes removed.
    trimmed: String,
    parts: Vec<Part>,
    regex: Regex,
    priority: Priority,
}

impl PathPattern {
    /// Compiles a pattern declared at `index`.
    ///
    /// Pattern syntax:
    /// - `/users` - Literal path
    /// - `/users/{id}` - Single-segment parameter
    /// - `/users/{num}` - Shorthand token (`{any}`, `{num}`, `{all}`)
    /// - `/users/{id:num}` - Named parameter matched with a token
    ///
    /// # Example
    ///
    /// ```
    /// use mikro_router::{PathPattern, TokenPatterns};
    ///
    /// let pattern = PathPattern::compile("/posts/{id:num}", 0, &TokenPatterns::default()).unwrap();
    /// let params = pattern.match_path("posts/123").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert!(pattern.match_path("posts/abc").is_none());
    /// ```
    pub fn compile(pattern: &str, index: usize, tokens: &TokenPatterns) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        let parts = parse(trimmed);
        let priority = Priority::from_parts(pattern, &parts, index);

        let mut regex_str = String::from("^");
        let mut group = 0;
        for part in &parts {
            match part {
                Part::Literal(text) => regex_str.push_str(&regex::escape(text)),
                Part::Placeholder(p) => {
                    let fragment = tokens.get(&p.token).unwrap_or(DEFAULT_FRAGMENT);
                    regex_str.push_str(&format!("(?P<p{group}>{fragment})"));
                    group += 1;
                }
            }
        }
        regex_str.push('$');

        let regex = Regex::new(&regex_str).map_err(|e| RouterError::InvalidPattern {
            token: pattern.to_string(),
            message: e.to_string(),
        })?;

        debug!(pattern, regex = %regex_str, ?priority, "compiled route pattern");

        Ok(Self {
            pattern: pattern.to_string(),
            trimmed: trimmed.to_string(),
            parts,
            regex,
            priority,
        })
    }

    /// Matches a normalized request path (no surrounding slashes).
    pub fn match_path(&self, path: &str) -> Option<Params> {
        if self.trimmed == path {
            return Some(Params::new());
        }

        let caps = self.regex.captures(path)?;
        let mut params = Params::new();
        for (i, placeholder) in self.placeholders().enumerate() {
            let value = caps.name(&format!("p{i}")).map_or("", |m| m.as_str());
            params.push(placeholder.name.clone(), value);
        }
        Some(params)
    }

    /// Substitutes values into the placeholders, left to right.
    ///
    /// Placeholders with no value left keep their `{name}` form. The
    /// result has no leading slash.
    pub fn reverse(&self, params: &UrlParams) -> String {
        let mut cursor = params.cursor();
        let mut path = String::new();

        for part in &self.parts {
            match part {
                Part::Literal(text) => path.push_str(text),
                Part::Placeholder(p) => match cursor.take(&p.names()) {
                    Some(value) => path.push_str(value),
                    None => {
                        path.push('{');
                        path.push_str(&p.name);
                        path.push('}');
                    }
                },
            }
        }

        path
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the computed priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the placeholders in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.parts.iter().filter_map(|p| match p {
            Part::Placeholder(p) => Some(p),
            Part::Literal(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> PathPattern {
        PathPattern::compile(pattern, 0, &TokenPatterns::default()).unwrap()
    }

    #[test]
    fn test_literal_path() {
        let pattern = compile("/users");
        assert!(pattern.match_path("users").is_some());
        assert!(pattern.match_path("posts").is_none());
    }

    #[test]
    fn test_root_path() {
        let pattern = compile("/");
        assert!(pattern.match_path("").is_some());
        assert!(pattern.match_path("users").is_none());
    }

    #[test]
    fn test_shorthand_tokens() {
        let pattern = compile("/users/{num}");
        assert_eq!(pattern.match_path("users/42").unwrap().values(), vec!["42"]);
        assert!(pattern.match_path("users/abc").is_none());

        let pattern = compile("/files/{all}");
        let params = pattern.match_path("files/docs/readme.md").unwrap();
        assert_eq!(params.nth(0), Some("docs/readme.md"));

        let pattern = compile("/tags/{any}");
        assert!(pattern.match_path("tags/a/b").is_none());
    }

    #[test]
    fn test_generic_placeholder_is_single_segment() {
        let pattern = compile("/posts/{post_id}/comments/{comment_id}");
        let params = pattern.match_path("posts/42/comments/7").unwrap();
        assert_eq!(params.get("post_id"), Some("42"));
        assert_eq!(params.get("comment_id"), Some("7"));
        assert!(pattern.match_path("posts/42/7").is_none());
    }

    #[test]
    fn test_typed_placeholder_uses_token() {
        let pattern = compile("/users/{id:num}");
        let params = pattern.match_path("users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(pattern.match_path("users/abc").is_none());

        let placeholder = pattern.placeholders().next().unwrap();
        assert!(placeholder.is_typed());
        assert_eq!(placeholder.token, "{num}");
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let pattern = compile("/feed.xml");
        assert!(pattern.match_path("feed.xml").is_some());
        assert!(pattern.match_path("feedaxml").is_none());
    }

    #[test]
    fn test_custom_token() {
        let mut tokens = TokenPatterns::default();
        tokens.insert("slug", "[a-z-]+").unwrap();
        let pattern = PathPattern::compile("/blog/{slug}", 0, &tokens).unwrap();
        assert!(pattern.match_path("blog/hello-world").is_some());
        assert!(pattern.match_path("blog/Hello").is_none());
    }

    #[test]
    fn test_invalid_custom_token() {
        let mut tokens = TokenPatterns::default();
        let err = tokens.insert("{bad}", "([a-z").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { token, .. } if token == "{bad}"));
    }

    #[test]
    fn test_priority_classes() {
        assert_eq!(Priority::of("/about", 3), Priority::Declared(3));
        assert_eq!(Priority::of("/a/{any}", 1), Priority::Declared(1));
        assert_eq!(Priority::of("/{any}", 1), Priority::Declared(1));
        assert_eq!(
            Priority::of("/{any}/{any}", 0),
            Priority::FullyDynamic(Reverse(0))
        );
        assert_eq!(Priority::of("/users/{id:num}", 0), Priority::Typed);
        assert_eq!(Priority::of("/users/{5:num}", 0), Priority::Ranked(5));
        assert_eq!(Priority::of("/users/{id:num}/", 0), Priority::Declared(0));
    }

    #[test]
    fn test_priority_class_order() {
        let declared = Priority::of("/a/{any}", 500);
        let dynamic = Priority::of("/{any}/{any}", 0);
        let ranked = Priority::of("/a/{999:any}", 0);
        let typed = Priority::of("/a/{x:any}", 0);
        assert!(declared < dynamic);
        assert!(dynamic < ranked);
        assert!(ranked < typed);
        assert!(Priority::of("/{a}/{b}", 2) < Priority::of("/{a}/{b}", 1));
    }

    #[test]
    fn test_priority_is_pure() {
        assert_eq!(Priority::of("/x/{y:2}", 4), Priority::of("/x/{y:2}", 4));
    }

    #[test]
    fn test_reverse() {
        let pattern = compile("/posts/{id}");
        let params = UrlParams::new().with("id", 123);
        assert_eq!(pattern.reverse(&params), "posts/123");
    }

    #[test]
    fn test_reverse_typed_and_repeated() {
        let pattern = compile("/{any}/x/{any}/{id:num}");
        let params = UrlParams::new().with_all("any", ["a", "b"]).with("id", 9);
        assert_eq!(pattern.reverse(&params), "a/x/b/9");
    }

    #[test]
    fn test_reverse_positional_fallback() {
        let pattern = compile("/archive/{year}/{month}");
        let params = UrlParams::new().with("month", "06").push("2024");
        assert_eq!(pattern.reverse(&params), "archive/2024/06");
    }

    #[test]
    fn test_reverse_missing_param() {
        let pattern = compile("/posts/{id:num}");
        assert_eq!(pattern.reverse(&UrlParams::new()), "posts/{id}");
    }
}
