//! First-match route resolution over the priority-sorted table.

use tracing::debug;

use crate::error::{Result, RouterError};
use crate::params::Params;
use crate::request::Method;
use crate::route::{Route, RouteTable};

/// A route resolved for a request path, with its captured params.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The matched route.
    pub route: &'a Route,
    /// Values captured by the route's placeholders, in order.
    pub params: Params,
}

/// Resolves normalized request paths against a route table.
///
/// Routes are tried in priority order and the first one whose pattern
/// matches wins; later routes are never consulted. The HTTP method plays
/// no part in matching and is only carried for the error report.
pub struct Matcher<'a> {
    table: &'a RouteTable,
}

impl<'a> Matcher<'a> {
    /// Creates a matcher over `table`.
    pub fn new(table: &'a RouteTable) -> Self {
        Self { table }
    }

    /// Finds the first route matching `path`.
    ///
    /// `path` must already be normalized: no surrounding slashes and no
    /// repeated slashes.
    pub fn find(&self, method: &Method, path: &str) -> Result<RouteMatch<'a>> {
        for route in self.table.sorted() {
            if let Some(params) = route.path_pattern().match_path(path) {
                debug!(
                    pattern = route.pattern(),
                    name = route.name(),
                    params = ?params.values(),
                    "route matched"
                );
                return Ok(RouteMatch { route, params });
            }
        }

        Err(RouterError::NoRouteMatched {
            method: method.to_string(),
            path: path.to_string(),
        })
    }
}
