#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mikro_router::{FinishedResponse, Request, Response, Router};

/// Shared call counter for asserting whether callbacks ran.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn dispatch(router: &Router, method: &str, uri: &str) -> Response {
    router
        .dispatch(&Request::new(method, uri))
        .unwrap_or_else(|e| panic!("Failed to dispatch {method} {uri}: {e}"))
}

pub fn handle(router: &Router, method: &str, uri: &str) -> FinishedResponse {
    router.handle(&Request::new(method, uri).header("Host", "example.com"))
}

pub fn body(response: &Response) -> &str {
    response
        .body_string()
        .unwrap_or_else(|| panic!("Expected text body, got {:?}", response.body))
}
