//! Per-request state handed to callbacks, actions and hooks.

use tracing::warn;

use crate::error::Result;
use crate::params::{Params, UrlParams};
use crate::request::Request;
use crate::response::{Outcome, Response};
use crate::route::Route;
use crate::router::Router;
use crate::url::SiteUrl;

/// The request being dispatched, the current route and the response state.
///
/// One context is created per dispatch and dropped when it ends; nothing in
/// it is shared between requests.
pub struct Context<'a> {
    router: &'a Router,
    request: &'a Request,
    route: Option<&'a Route>,
    params: Params,
    response: Response,
}

impl<'a> Context<'a> {
    pub(crate) fn new(router: &'a Router, request: &'a Request, response: Response) -> Self {
        Self {
            router,
            request,
            route: None,
            params: Params::new(),
            response,
        }
    }

    pub(crate) fn enter(&mut self, route: &'a Route, params: Params) {
        self.route = Some(route);
        self.params = params;
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    /// The router dispatching this request.
    pub fn router(&self) -> &'a Router {
        self.router
    }

    /// The incoming request.
    pub fn request(&self) -> &'a Request {
        self.request
    }

    /// The current route. `None` until matching succeeded.
    pub fn route(&self) -> Option<&'a Route> {
        self.route
    }

    /// Name of the current route.
    pub fn route_name(&self) -> Option<&'a str> {
        self.route.and_then(Route::name)
    }

    /// Whether the current route carries one of `names`.
    pub fn is_route(&self, names: &[&str]) -> bool {
        self.route_name().is_some_and(|n| names.contains(&n))
    }

    /// Captured params of the current route.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A captured param by placeholder name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// A captured param by position.
    pub fn param_at(&self, index: usize) -> Option<&str> {
        self.params.nth(index)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains(name)
    }

    pub fn have_params(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.params.contains(n))
    }

    /// Whether param `name` equals `value`.
    pub fn is_param(&self, name: &str, value: &str) -> bool {
        self.params.get(name) == Some(value)
    }

    /// Whether every `(name, value)` pair matches.
    pub fn is_params(&self, pairs: &[(&str, &str)]) -> bool {
        pairs.iter().all(|(k, v)| self.is_param(k, v))
    }

    /// A decoded query parameter.
    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query(key)
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Site URL for the current request.
    pub fn site(&self) -> SiteUrl {
        SiteUrl::for_request(self.router.config(), self.request)
    }

    /// Base-path-prefixed path of a named route.
    pub fn path_for(&self, name: &str, params: &UrlParams) -> Option<String> {
        let route = self.router.route_named(name)?;
        Some(self.site().path(&route.path_pattern().reverse(params)))
    }

    /// Absolute URL of a named route, using this request's host and scheme.
    pub fn url_for(&self, name: &str, params: &UrlParams) -> Option<String> {
        let route = self.router.route_named(name)?;
        Some(self.site().url(&route.path_pattern().reverse(params)))
    }

    /// Redirects (302) to a named route. Unknown names leave the response
    /// untouched and return false.
    pub fn route_redirect(&mut self, name: &str, params: &UrlParams) -> bool {
        match self.url_for(name, params) {
            Some(url) => {
                self.response.redirect(url, 302);
                true
            }
            None => false,
        }
    }

    /// Switches to the named route and runs its callback.
    ///
    /// Captured params are kept. An unknown name is a no-op.
    pub fn next_route(&mut self, name: &str) -> Result<Outcome> {
        let Some(route) = self.router.route_named(name) else {
            warn!(route = name, "next_route target not found");
            return Ok(Outcome::NoChange);
        };
        self.route = Some(route);
        (route.callback())(self)
    }
}
