//! Router configuration.

use serde::{Deserialize, Serialize};

use crate::request::MethodSet;

/// Settings applied when a router is built.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use mikro_router::RouterConfig;
///
/// let config: RouterConfig = serde_json::from_str(r#"{"base_path": "/app"}"#).unwrap();
/// assert_eq!(config.base_path, "/app");
/// assert_eq!(config.encoding, "UTF-8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Path prefix the application is mounted under.
    pub base_path: String,
    /// Scheme used for absolute URLs when the request does not say otherwise.
    pub scheme: String,
    /// Host used for absolute URLs when the request has no `Host` header.
    pub host: String,
    /// Charset used for the default content type.
    pub encoding: String,
    /// Method tokens routes may be registered for.
    pub methods: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            encoding: "UTF-8".to_string(),
            methods: MethodSet::default()
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }
}

impl RouterConfig {
    /// Sets the base path.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Sets the fallback host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the fallback scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Builds the method set from the configured tokens.
    pub fn method_set(&self) -> MethodSet {
        MethodSet::from_tokens(&self.methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.base_path, "/");
        assert_eq!(config.methods, vec!["GET", "POST", "ANY"]);
        assert_eq!(config.method_set(), MethodSet::default());
    }

    #[test]
    fn test_partial_json() {
        let config: RouterConfig =
            serde_json::from_str(r#"{"host": "example.com", "methods": ["get", "put"]}"#).unwrap();
        assert_eq!(config.host, "example.com");
        assert_eq!(config.scheme, "http");
        assert!(config.method_set().contains("PUT"));
        assert!(!config.method_set().contains("POST"));
    }
}
