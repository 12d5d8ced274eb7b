//! Tests for the full request cycle: canonical redirects and finalization.

mod common;
use common::*;

use mikro_router::{Header, Request, Router, RouterConfig, RouterError};

#[test]
fn test_trailing_slash_redirects_to_canonical_url() {
    let mut router = Router::new();
    router.get("/users/{id}", |_| Ok("user")).unwrap();

    let res = handle(&router, "GET", "/users//42/?tab=posts");
    assert_eq!(res.status, 301);
    assert_eq!(
        res.header("location"),
        Some("http://example.com/users/42?tab=posts")
    );
    assert!(res.body.is_none());
}

#[test]
fn test_root_path_is_not_redirected() {
    let mut router = Router::new();
    router.get("/", |_| Ok("home")).unwrap();

    let res = handle(&router, "GET", "/");
    assert_eq!(res.status, 200);
    assert_eq!(res.body.as_deref(), Some("home"));
}

#[test]
fn test_base_path_root_is_not_redirected() {
    let mut router = Router::with_config(RouterConfig::default().base_path("/app"));
    router.get("/", |_| Ok("home")).unwrap();

    assert_eq!(handle(&router, "GET", "/app/").status, 200);
    assert_eq!(handle(&router, "GET", "/app").status, 200);

    let res = handle(&router, "GET", "/app/about/");
    assert_eq!(res.status, 301);
    assert_eq!(res.header("location"), Some("http://example.com/app/about"));
}

#[test]
fn test_unmatched_path_is_404() {
    let router = Router::new();
    let res = handle(&router, "GET", "/missing");
    assert_eq!(res.status, 404);
}

#[test]
fn test_error_pages_use_configured_encoding() {
    let config = RouterConfig {
        encoding: "ISO-8859-1".to_string(),
        ..RouterConfig::default()
    };
    let mut router = Router::with_config(config);
    router
        .get("/fail", |_| -> mikro_router::Result<()> {
            Err(RouterError::handler(std::io::Error::other("boom")))
        })
        .unwrap();

    let missing = handle(&router, "GET", "/missing");
    assert_eq!(missing.status, 404);
    assert_eq!(
        missing.header("content-type"),
        Some("text/html; charset=ISO-8859-1")
    );

    let failed = handle(&router, "GET", "/fail");
    assert_eq!(failed.status, 500);
    assert_eq!(
        failed.header("content-type"),
        Some("text/html; charset=ISO-8859-1")
    );
}

#[test]
fn test_structured_outcome_replaces_handler_content_type() {
    let mut router = Router::new();
    router
        .get("/api", |ctx| {
            ctx.response_mut().header("Content-Type", "text/plain");
            Ok(serde_json::json!({ "ok": true }))
        })
        .unwrap();

    let res = handle(&router, "GET", "/api");
    let content_types: Vec<&Header> = res
        .headers
        .iter()
        .filter(|h| matches!(h, Header::Keyed(k, _) if k.eq_ignore_ascii_case("content-type")))
        .collect();
    assert_eq!(content_types.len(), 1);
    assert_eq!(res.header("content-type"), Some("application/json"));
}

#[test]
fn test_handler_error_is_500() {
    let mut router = Router::new();
    router
        .get("/fail", |_| -> mikro_router::Result<()> {
            Err(RouterError::handler(std::io::Error::other("disk gone")))
        })
        .unwrap();

    assert_eq!(handle(&router, "GET", "/fail").status, 500);
}

#[test]
fn test_method_mismatch_flushes_405_with_empty_body() {
    let mut router = Router::new();
    router.get("/form", |_| Ok("form")).unwrap();

    let res = handle(&router, "POST", "/form");
    assert_eq!(res.status, 405);
    assert!(res.body.is_none());
}

#[test]
fn test_default_content_type_uses_configured_encoding() {
    let config = RouterConfig {
        encoding: "ISO-8859-1".to_string(),
        ..RouterConfig::default()
    };
    let mut router = Router::with_config(config);
    router.get("/", |_| Ok("hi")).unwrap();

    let res = handle(&router, "GET", "/");
    assert_eq!(res.header("content-type"), Some("text/html; charset=ISO-8859-1"));
}

#[test]
fn test_raw_and_keyed_headers_are_flushed_in_order() {
    let mut router = Router::new();
    router
        .get("/cookies", |ctx| {
            ctx.response_mut()
                .raw_header("set-cookie: a=1")
                .raw_header("set-cookie: b=2")
                .content_type("text/plain");
            Ok("ok")
        })
        .unwrap();

    let res = router.handle(&Request::get("/cookies"));
    assert_eq!(
        res.headers,
        vec![
            Header::Raw("set-cookie: a=1".to_string()),
            Header::Raw("set-cookie: b=2".to_string()),
            Header::Keyed("content-type".to_string(), "text/plain".to_string()),
        ]
    );
}

#[test]
fn test_router_is_shareable_across_threads() {
    let mut router = Router::new();
    router
        .get("/n/{num}", |ctx| Ok(ctx.param_at(0).unwrap_or("").to_string()))
        .unwrap();
    let router = std::sync::Arc::new(router);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let router = std::sync::Arc::clone(&router);
            std::thread::spawn(move || {
                let res = router.handle(&Request::get(&format!("/n/{i}")));
                res.body.unwrap_or_default()
            })
        })
        .collect();

    let bodies: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(bodies, vec!["0", "1", "2", "3"]);
}
