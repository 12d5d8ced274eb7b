//! Route records and the registration-ordered route table.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Result, RouterError};
use crate::pattern::{PathPattern, Priority, TokenPatterns};
use crate::request::Method;
use crate::response::Outcome;

/// A route callback, action or hook body.
pub type Handler = Arc<dyn Fn(&mut Context<'_>) -> Result<Outcome> + Send + Sync>;

/// Boxes a closure into a [`Handler`].
pub(crate) fn handler<F, O>(f: F) -> Handler
where
    F: Fn(&mut Context<'_>) -> Result<O> + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Arc::new(move |ctx| f(ctx).map(Into::into))
}

/// A single route definition.
#[derive(Clone)]
pub struct Route {
    methods: Vec<Method>,
    pattern: PathPattern,
    name: Option<String>,
    callback: Handler,
    actions: Vec<String>,
    except_actions: Vec<String>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("pattern", &self.pattern.pattern())
            .field("name", &self.name)
            .field("priority", &self.pattern.priority())
            .field("actions", &self.actions)
            .field("except_actions", &self.except_actions)
            .finish_non_exhaustive()
    }
}

impl Route {
    /// Route name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The pattern as declared.
    pub fn pattern(&self) -> &str {
        self.pattern.pattern()
    }

    /// The compiled pattern.
    pub fn path_pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Methods this route was registered for.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Ordering class used by the matcher.
    pub fn priority(&self) -> Priority {
        self.pattern.priority()
    }

    /// Whether the route serves `method`.
    pub fn allows_method(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| m.is_any() || m == method)
    }

    /// Actions this route opted into.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Actions this route excludes.
    pub fn except_actions(&self) -> &[String] {
        &self.except_actions
    }

    pub(crate) fn callback(&self) -> &Handler {
        &self.callback
    }
}

/// Routes in registration order, plus their priority order.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    order: Vec<usize>,
    tokens: TokenPatterns,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Method tokens must already be validated.
    pub fn push(
        &mut self,
        methods: Vec<Method>,
        pattern: &str,
        name: Option<String>,
        callback: Handler,
    ) -> Result<()> {
        let pattern = PathPattern::compile(pattern, self.routes.len(), &self.tokens)?;
        self.routes.push(Route {
            methods,
            pattern,
            name,
            callback,
            actions: Vec::new(),
            except_actions: Vec::new(),
        });
        self.reorder();
        Ok(())
    }

    /// Registers a placeholder token and recompiles every route.
    ///
    /// Nothing changes unless every route recompiles with the new token.
    pub fn set_token(&mut self, token: &str, fragment: &str) -> Result<()> {
        let mut tokens = self.tokens.clone();
        tokens.insert(token, fragment)?;
        let patterns = self
            .routes
            .iter()
            .enumerate()
            .map(|(index, route)| PathPattern::compile(route.pattern.pattern(), index, &tokens))
            .collect::<Result<Vec<_>>>()?;

        self.tokens = tokens;
        for (route, pattern) in self.routes.iter_mut().zip(patterns) {
            route.pattern = pattern;
        }
        self.reorder();
        Ok(())
    }

    /// The most recently registered route.
    pub fn last_mut(&mut self) -> Result<&mut Route> {
        self.routes.last_mut().ok_or(RouterError::NoRouteRegistered)
    }

    /// Names the most recently registered route.
    pub fn name_last(&mut self, name: &str) -> Result<()> {
        self.last_mut()?.name = Some(name.to_string());
        Ok(())
    }

    /// Adds opted-in actions to the most recently registered route.
    pub fn with_actions(&mut self, names: &[&str]) -> Result<()> {
        let route = self.last_mut()?;
        route
            .actions
            .extend(names.iter().map(|n| (*n).to_string()));
        Ok(())
    }

    /// Adds excluded actions to the most recently registered route.
    pub fn except_actions(&mut self, names: &[&str]) -> Result<()> {
        let route = self.last_mut()?;
        route
            .except_actions
            .extend(names.iter().map(|n| (*n).to_string()));
        Ok(())
    }

    /// First route, in registration order, carrying `name`.
    pub fn named(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == Some(name))
    }

    /// Routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Routes sorted by priority; equal priorities keep registration order.
    pub fn sorted(&self) -> impl Iterator<Item = &Route> {
        self.order.iter().map(|&i| &self.routes[i])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn reorder(&mut self) {
        let mut order: Vec<usize> = (0..self.routes.len()).collect();
        order.sort_by_key(|&i| self.routes[i].priority());
        self.order = order;
    }
}
