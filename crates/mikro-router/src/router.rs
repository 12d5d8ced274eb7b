//! Main router implementation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::action::{Action, ActionPipeline};
use crate::config::RouterConfig;
use crate::context::Context;
use crate::error::Result;
use crate::matcher::Matcher;
use crate::params::UrlParams;
use crate::request::{normalize_path, strip_base_path, Method, MethodSet, Request};
use crate::response::{FinishedResponse, Outcome, Response};
use crate::route::{handler, Route, RouteTable};
use crate::url::SiteUrl;

/// A hook run around dispatch.
pub type Hook = Arc<dyn Fn(&mut Context<'_>) -> Result<()> + Send + Sync>;

/// The route table, actions and hooks of an application.
///
/// Routes are registered during setup through `&mut self`; dispatch only
/// needs `&self`, so a finished router can be shared behind an `Arc`.
pub struct Router {
    config: RouterConfig,
    methods: MethodSet,
    table: RouteTable,
    actions: ActionPipeline,
    before_start: Option<Hook>,
    after_start: Option<Hook>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("methods", &self.methods)
            .field("routes", &self.table.len())
            .field("actions", &self.actions)
            .field("before_start", &self.before_start.is_some())
            .field("after_start", &self.after_start.is_some())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a router with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Creates a router from configuration.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            methods: config.method_set(),
            config,
            table: RouteTable::new(),
            actions: ActionPipeline::default(),
            before_start: None,
            after_start: None,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Recognizes an additional method token.
    pub fn add_http_method(&mut self, method: &str) -> &mut Self {
        self.methods.add(method);
        self
    }

    /// Recognizes several method tokens.
    pub fn add_http_methods(&mut self, methods: &[&str]) -> &mut Self {
        for method in methods {
            self.methods.add(method);
        }
        self
    }

    /// Stops recognizing a method token for future registrations.
    pub fn remove_http_method(&mut self, method: &str) -> &mut Self {
        self.methods.remove(method);
        self
    }

    /// Stops recognizing several method tokens.
    pub fn remove_http_methods(&mut self, methods: &[&str]) -> &mut Self {
        for method in methods {
            self.methods.remove(method);
        }
        self
    }

    /// The recognized method tokens.
    pub fn http_methods(&self) -> &MethodSet {
        &self.methods
    }

    /// Case-insensitive check against the recognized method tokens.
    pub fn is_http_method(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    /// Registers a placeholder token such as `{slug}` with a regex fragment.
    ///
    /// Existing routes are recompiled.
    pub fn add_route_pattern(&mut self, token: &str, fragment: &str) -> Result<&mut Self> {
        self.table.set_token(token, fragment)?;
        Ok(self)
    }

    /// Registers a route for several methods.
    ///
    /// Every method must be recognized, otherwise nothing is registered and
    /// [`RouterError::InvalidMethod`](crate::RouterError::InvalidMethod) is
    /// returned.
    pub fn route<F, O>(&mut self, methods: &[&str], pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.register(methods, pattern, None, callback)
    }

    /// Registers a named route for several methods.
    pub fn named_route<F, O>(
        &mut self,
        name: &str,
        methods: &[&str],
        pattern: &str,
        callback: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.register(methods, pattern, Some(name), callback)
    }

    fn register<F, O>(
        &mut self,
        methods: &[&str],
        pattern: &str,
        name: Option<&str>,
        callback: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        let methods = methods
            .iter()
            .map(|m| self.methods.parse(m))
            .collect::<Result<Vec<Method>>>()?;
        debug!(?methods, pattern, name, "registering route");
        self.table
            .push(methods, pattern, name.map(str::to_string), handler(callback))?;
        Ok(self)
    }

    /// Adds a GET route.
    pub fn get<F, O>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.route(&["GET"], pattern, callback)
    }

    /// Adds a POST route.
    pub fn post<F, O>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.route(&["POST"], pattern, callback)
    }

    /// Adds a PUT route. PUT must have been added to the method set.
    pub fn put<F, O>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.route(&["PUT"], pattern, callback)
    }

    /// Adds a PATCH route. PATCH must have been added to the method set.
    pub fn patch<F, O>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.route(&["PATCH"], pattern, callback)
    }

    /// Adds a DELETE route. DELETE must have been added to the method set.
    pub fn delete<F, O>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.route(&["DELETE"], pattern, callback)
    }

    /// Adds a route answering every method.
    pub fn any<F, O>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.route(&["ANY"], pattern, callback)
    }

    /// Names the most recently registered route.
    pub fn name(&mut self, name: &str) -> Result<&mut Self> {
        self.table.name_last(name)?;
        Ok(self)
    }

    /// Opts the most recently registered route into actions.
    pub fn with_action(&mut self, names: &[&str]) -> Result<&mut Self> {
        self.table.with_actions(names)?;
        Ok(self)
    }

    /// Excludes actions from the most recently registered route.
    pub fn except_action(&mut self, names: &[&str]) -> Result<&mut Self> {
        self.table.except_actions(names)?;
        Ok(self)
    }

    /// Registers an action. Global actions run on every route that does not
    /// exclude them.
    pub fn action<F, O>(&mut self, name: &str, global: bool, callback: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        self.actions.push(Action::new(name, handler(callback), global));
        self
    }

    /// Sets the hook run before matching.
    pub fn before_start<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.before_start = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run after the callback and actions.
    pub fn after_start<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.after_start = Some(Arc::new(hook));
        self
    }

    /// First route registered under `name`.
    pub fn route_named(&self, name: &str) -> Option<&Route> {
        self.table.named(name)
    }

    /// Routes in the order the matcher tries them.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.table.sorted()
    }

    /// Registered actions.
    pub fn actions(&self) -> &ActionPipeline {
        &self.actions
    }

    /// Path (or absolute URL when `absolute`) of a named route.
    ///
    /// Absolute URLs use the configured scheme and host; inside a handler
    /// prefer [`Context::url_for`], which uses the request's host.
    pub fn path(&self, name: &str, params: &UrlParams, absolute: bool) -> Option<String> {
        let route = self.route_named(name)?;
        let relative = route.path_pattern().reverse(params);
        let site = SiteUrl::from_config(&self.config);
        Some(if absolute {
            site.url(&relative)
        } else {
            site.path(&relative)
        })
    }

    /// The normalized path used for matching.
    pub fn request_path(&self, request: &Request) -> String {
        normalize_path(strip_base_path(&request.uri, &self.config.base_path))
    }

    /// Matches the request, runs the route callback and its actions.
    ///
    /// A route that does not serve the request method yields a 405 response
    /// without running the callback or actions. Errors from hooks,
    /// callbacks and actions abort the dispatch and are returned as is; in
    /// particular a failing action stops the remaining actions and the
    /// `after_start` hook.
    pub fn dispatch(&self, request: &Request) -> Result<Response> {
        let path = self.request_path(request);
        let mut response = Response::default();
        response.encoding(&self.config.encoding);
        let mut ctx = Context::new(self, request, response);

        if let Some(hook) = &self.before_start {
            hook(&mut ctx)?;
        }

        let matched = Matcher::new(&self.table).find(&request.method, &path)?;
        let route = matched.route;
        ctx.enter(route, matched.params);

        if route.allows_method(&request.method) {
            let outcome = (route.callback())(&mut ctx)?;
            ctx.response_mut().apply(outcome)?;

            for action in self.actions.for_route(route) {
                debug!(action = action.name(), "running action");
                let outcome = (action.callback())(&mut ctx)?;
                ctx.response_mut().apply(outcome)?;
            }
        } else {
            warn!(
                method = %request.method,
                pattern = route.pattern(),
                "method not allowed"
            );
            ctx.response_mut().status(405);
        }

        if let Some(hook) = &self.after_start {
            hook(&mut ctx)?;
        }

        Ok(ctx.into_response())
    }

    /// Runs a full request cycle and finalizes the response.
    ///
    /// A trailing slash is answered with a 301 to the canonical URL.
    /// Unmatched paths become 404 and any other dispatch error becomes 500.
    pub fn handle(&self, request: &Request) -> FinishedResponse {
        let local = strip_base_path(&request.uri, &self.config.base_path);

        let response = if local.len() > 1 && local.ends_with('/') {
            let site = SiteUrl::for_request(&self.config, request);
            let mut location = site.url(&normalize_path(local));
            if !request.query.is_empty() {
                location.push('?');
                location.push_str(&request.query);
            }
            info!(uri = %request.uri, %location, "redirecting to canonical url");
            let mut res = Response::default();
            res.encoding(&self.config.encoding).redirect(location, 301);
            res
        } else {
            match self.dispatch(request) {
                Ok(res) => res,
                Err(e) if e.is_not_found() => {
                    warn!(method = %request.method, uri = %request.uri, "no route matched");
                    let mut res = Response::not_found();
                    res.encoding(&self.config.encoding);
                    res
                }
                Err(e) => {
                    error!(method = %request.method, uri = %request.uri, error = %e, "dispatch failed");
                    let mut res = Response::internal_server_error();
                    res.encoding(&self.config.encoding);
                    res
                }
            }
        };

        response.finish()
    }
}
