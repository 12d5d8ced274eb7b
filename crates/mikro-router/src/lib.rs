//! # mikro-router
//!
//! A small routing and dispatch core for HTTP-style requests.
//!
//! This crate provides:
//! - Path patterns with named, shorthand and typed placeholders
//! - Priority-ordered, first-match route resolution
//! - Per-method registration with a configurable method set
//! - Named actions run after each route, with per-route opt-in and opt-out
//! - Reverse path and URL generation for named routes
//! - A request cycle that canonicalizes trailing slashes and finalizes
//!   the response
//!
//! ## Quick Start
//!
//! ```
//! use mikro_router::{Request, Router};
//!
//! let mut router = Router::new();
//! router.get("/", |_| Ok("Hello, World!")).unwrap();
//! router
//!     .get("/users/{id:num}", |ctx| {
//!         Ok(serde_json::json!({ "id": ctx.param("id") }))
//!     })
//!     .unwrap()
//!     .name("user")
//!     .unwrap();
//!
//! let res = router.handle(&Request::get("/users/42"));
//! assert_eq!(res.status, 200);
//! assert_eq!(res.header("content-type"), Some("application/json"));
//! ```
//!
//! ## Patterns
//!
//! - `{any}` matches one segment, `{num}` one run of digits and `{all}`
//!   anything including slashes.
//! - `{name}` matches one segment and captures it under `name`, unless a
//!   fragment was registered for that exact token with
//!   [`Router::add_route_pattern`].
//! - `{name:type}` captures under `name` using the `type` token. When it
//!   ends the pattern it also moves the route behind all others; a numeric
//!   label (`{3:num}`) orders such routes among themselves.
//!
//! Routes containing a literal segment are tried in declaration order.
//! Routes made only of placeholders are tried after them.
//!
//! ## Named Routes
//!
//! ```
//! use mikro_router::{Router, UrlParams};
//!
//! let mut router = Router::new();
//! router.named_route("profile", &["GET"], "/u/{id}", |_| Ok(())).unwrap();
//!
//! let path = router.path("profile", &UrlParams::new().with("id", 7), false);
//! assert_eq!(path.as_deref(), Some("/u/7"));
//! ```

mod action;
mod config;
mod context;
mod error;
mod matcher;
mod params;
mod pattern;
mod request;
mod response;
mod route;
mod router;
mod url;

pub use action::{Action, ActionPipeline};
pub use config::RouterConfig;
pub use context::Context;
pub use error::{BoxError, Result, RouterError};
pub use matcher::{Matcher, RouteMatch};
pub use params::{Params, UrlParams};
pub use pattern::{PathPattern, Placeholder, Priority, TokenPatterns};
pub use request::{normalize_path, strip_base_path, Method, MethodSet, Request};
pub use response::{Body, FinishedResponse, Header, Outcome, Response};
pub use route::{Handler, Route, RouteTable};
pub use router::{Hook, Router};
pub use url::SiteUrl;
