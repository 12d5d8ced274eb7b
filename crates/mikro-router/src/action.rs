//! Named actions run after a route callback.
//!
//! An action is a callback registered once on the router. Global actions
//! run on every route unless the route excludes them with
//! `except_action`; other actions run only on routes that opted in with
//! `with_action`. Actions run in registration order, and each one may
//! replace the response body by returning something other than
//! [`Outcome::NoChange`](crate::Outcome::NoChange).
//!
//! # Example
//!
//! ```
//! use mikro_router::{Request, Router};
//!
//! let mut router = Router::new();
//! router.action("powered-by", true, |ctx| {
//!     ctx.response_mut().header("x-powered-by", "mikro");
//!     Ok(())
//! });
//! router.action("shout", false, |ctx| {
//!     Ok(ctx.response().body_string().map(str::to_uppercase))
//! });
//!
//! router.get("/", |_| Ok("hello")).unwrap().with_action(&["shout"]).unwrap();
//!
//! let res = router.dispatch(&Request::get("/")).unwrap();
//! assert_eq!(res.body_string(), Some("HELLO"));
//! assert_eq!(res.header_value("x-powered-by"), Some("mikro"));
//! ```

use crate::route::{Handler, Route};

/// A named, registered action.
#[derive(Clone)]
pub struct Action {
    name: String,
    callback: Handler,
    global: bool,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("global", &self.global)
            .finish_non_exhaustive()
    }
}

impl Action {
    pub(crate) fn new(name: impl Into<String>, callback: Handler, global: bool) -> Self {
        Self {
            name: name.into(),
            callback,
            global,
        }
    }

    /// Action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the action runs on every route by default.
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Whether the action runs for `route`.
    ///
    /// Exclusion wins over both the global flag and an explicit opt-in.
    pub fn applies_to(&self, route: &Route) -> bool {
        if route.except_actions().iter().any(|n| *n == self.name) {
            return false;
        }
        self.global || route.actions().iter().any(|n| *n == self.name)
    }

    pub(crate) fn callback(&self) -> &Handler {
        &self.callback
    }
}

/// Registered actions in execution order.
#[derive(Debug, Clone, Default)]
pub struct ActionPipeline {
    actions: Vec<Action>,
}

impl ActionPipeline {
    pub(crate) fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Actions that run for `route`, in registration order.
    pub fn for_route<'a>(&'a self, route: &'a Route) -> impl Iterator<Item = &'a Action> + 'a {
        self.actions.iter().filter(move |a| a.applies_to(route))
    }

    /// All registered actions.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use crate::route::{handler, RouteTable};

    fn action(name: &str, global: bool) -> Action {
        Action::new(name, handler(|_| Ok(())), global)
    }

    #[test]
    fn test_applies_to() {
        let mut table = RouteTable::new();
        table
            .push(vec![Method::GET], "/plain", None, handler(|_| Ok(())))
            .unwrap();
        table
            .push(vec![Method::GET], "/opted", None, handler(|_| Ok(())))
            .unwrap();
        table.with_actions(&["auth"]).unwrap();
        table.except_actions(&["log"]).unwrap();
        let routes: Vec<&Route> = table.iter().collect();

        let log = action("log", true);
        let auth = action("auth", false);

        assert!(log.applies_to(routes[0]));
        assert!(!log.applies_to(routes[1]));
        assert!(!auth.applies_to(routes[0]));
        assert!(auth.applies_to(routes[1]));
    }

    #[test]
    fn test_exclusion_beats_opt_in() {
        let mut table = RouteTable::new();
        table
            .push(vec![Method::GET], "/", None, handler(|_| Ok(())))
            .unwrap();
        table.with_actions(&["cache"]).unwrap();
        table.except_actions(&["cache"]).unwrap();
        let route = table.iter().next().unwrap();
        assert!(!action("cache", false).applies_to(route));
    }

    #[test]
    fn test_pipeline_keeps_registration_order() {
        let mut table = RouteTable::new();
        table
            .push(vec![Method::GET], "/", None, handler(|_| Ok(())))
            .unwrap();
        table.with_actions(&["b"]).unwrap();
        let route = table.iter().next().unwrap();

        let mut pipeline = ActionPipeline::default();
        pipeline.push(action("a", true));
        pipeline.push(action("b", false));
        pipeline.push(action("c", false));
        pipeline.push(action("d", true));

        let names: Vec<&str> = pipeline.for_route(route).map(Action::name).collect();
        assert_eq!(names, vec!["a", "b", "d"]);
    }
}
