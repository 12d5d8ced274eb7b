//! The demo application served by the binary.

use mikro_router::{Result, Router, RouterConfig, UrlParams};
use serde_json::json;

/// Builds the demo routes on top of `config`.
///
/// - `GET /` greets and links to the first user
/// - `GET /users/{id:num}` returns a user as JSON
/// - `GET /hello/{name}` greets by name, shouted
/// - `ANY /echo/{all}` echoes the rest of the path, without the `x-route` header
/// - `GET /old-home` redirects to `/`
pub fn demo_router(config: RouterConfig) -> Result<Router> {
    let mut router = Router::with_config(config);

    router.action("powered-by", true, |ctx| {
        ctx.response_mut().header("x-powered-by", "mikro");
        Ok(())
    });
    router.action("route-name", true, |ctx| {
        if let Some(name) = ctx.route_name() {
            ctx.response_mut().header("x-route", name);
        }
        Ok(())
    });
    router.action("shout", false, |ctx| {
        Ok(ctx.response().body_string().map(str::to_uppercase))
    });

    router
        .get("/", |ctx| {
            let link = ctx
                .path_for("user", &UrlParams::new().with("id", 1))
                .unwrap_or_default();
            Ok(format!("<h1>mikro</h1><a href=\"{link}\">first user</a>"))
        })?
        .name("home")?;

    router
        .get("/users/{id:num}", |ctx| {
            let id = ctx.params().parse::<u64>("id").unwrap_or_default();
            Ok(json!({ "id": id, "name": format!("user-{id}") }))
        })?
        .name("user")?;

    router
        .get("/hello/{name}", |ctx| {
            Ok(format!("hello, {}", ctx.param("name").unwrap_or("stranger")))
        })?
        .name("greet")?
        .with_action(&["shout"])?;

    router
        .any("/echo/{all}", |ctx| Ok(ctx.param_at(0).unwrap_or("").to_string()))?
        .name("echo")?
        .except_action(&["route-name"])?;

    router.get("/old-home", |ctx| {
        ctx.route_redirect("home", &UrlParams::new());
        Ok(())
    })?;

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mikro_router::Request;

    fn router() -> Router {
        demo_router(RouterConfig::default()).unwrap()
    }

    #[test]
    fn test_user_by_id_is_json() {
        let res = router().handle(&Request::get("/users/7"));
        assert_eq!(res.status, 200);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.header("x-route"), Some("user"));
        let body: serde_json::Value = serde_json::from_str(res.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "user-7");
    }

    #[test]
    fn test_non_numeric_user_is_not_found() {
        assert_eq!(router().handle(&Request::get("/users/ada")).status, 404);
    }

    #[test]
    fn test_greeting_is_shouted() {
        let res = router().handle(&Request::get("/hello/ada"));
        assert_eq!(res.body.as_deref(), Some("HELLO, ADA"));
        assert_eq!(res.header("x-route"), Some("greet"));
    }

    #[test]
    fn test_home_links_to_first_user() {
        let res = router().handle(&Request::get("/"));
        assert!(res.body.as_deref().unwrap().contains("href=\"/users/1\""));
    }

    #[test]
    fn test_echo_skips_route_header() {
        let res = router().handle(&Request::post("/echo/a/b/c"));
        assert_eq!(res.body.as_deref(), Some("a/b/c"));
        assert_eq!(res.header("x-powered-by"), Some("mikro"));
        assert_eq!(res.header("x-route"), None);
    }

    #[test]
    fn test_old_home_redirects() {
        let res = router().handle(&Request::get("/old-home").header("Host", "demo.test"));
        assert_eq!(res.status, 302);
        assert_eq!(res.header("location"), Some("http://demo.test/"));
    }
}
