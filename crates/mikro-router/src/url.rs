//! Path and URL assembly relative to the application's base path.

use crate::config::RouterConfig;
use crate::request::Request;

/// Scheme, host and base path used to build links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl {
    scheme: String,
    host: String,
    base_path: String,
}

impl SiteUrl {
    /// Creates a site URL from its parts.
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            base_path: base_path.into(),
        }
    }

    /// Site URL from configuration alone.
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(&config.scheme, &config.host, &config.base_path)
    }

    /// Site URL for a request, preferring its `Host` header and TLS hints.
    pub fn for_request(config: &RouterConfig, request: &Request) -> Self {
        let scheme = if request.is_secure() {
            "https"
        } else {
            config.scheme.as_str()
        };
        let host = request.host().unwrap_or(&config.host);
        Self::new(scheme, host, &config.base_path)
    }

    /// Base-path-prefixed path for a relative route path.
    ///
    /// ```
    /// use mikro_router::SiteUrl;
    ///
    /// let site = SiteUrl::new("http", "example.com", "/app");
    /// assert_eq!(site.path("users/7"), "/app/users/7");
    /// assert_eq!(site.path(""), "/app");
    /// ```
    pub fn path(&self, relative: &str) -> String {
        let base = self.base_path.trim_matches('/');
        let relative = relative.trim_matches('/');
        match (base.is_empty(), relative.is_empty()) {
            (true, _) => format!("/{relative}"),
            (false, true) => format!("/{base}"),
            (false, false) => format!("/{base}/{relative}"),
        }
    }

    /// Absolute URL for a relative route path.
    pub fn url(&self, relative: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_base_path() {
        let site = SiteUrl::new("http", "localhost", "/");
        assert_eq!(site.path("u/7"), "/u/7");
        assert_eq!(site.path(""), "/");
        assert_eq!(site.url("u/7"), "http://localhost/u/7");
    }

    #[test]
    fn test_nested_base_path() {
        let site = SiteUrl::new("https", "example.com", "/blog/");
        assert_eq!(site.url("/posts/1/"), "https://example.com/blog/posts/1");
    }

    #[test]
    fn test_for_request_prefers_request_host() {
        let config = RouterConfig::default();
        let request = Request::get("/")
            .header("Host", "api.example.com")
            .header("X-Forwarded-Proto", "https");
        let site = SiteUrl::for_request(&config, &request);
        assert_eq!(site.url("ping"), "https://api.example.com/ping");
        assert_eq!(
            SiteUrl::from_config(&config).url("ping"),
            "http://localhost/ping"
        );
    }
}
