//! # mikro-server
//!
//! An HTTP/1 front end for a [`mikro_router::Router`].
//!
//! Connections are served by hyper. Each request is converted into a router
//! [`Request`], the shared router runs the full request cycle, and the
//! finished response is converted back into a hyper response.

pub mod app;
pub mod error;

use std::path::Path;
use std::sync::Arc;

use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use mikro_router::{FinishedResponse, Method, Request, Router, RouterConfig};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

pub use error::{Result, ServerError};

/// Loads a router config from a JSON file.
pub fn load_config(path: &Path) -> Result<RouterConfig> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| ServerError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Accepts connections forever, answering each with `router`.
///
/// Failed accepts are logged and skipped.
pub async fn serve(listener: TcpListener, router: Arc<Router>) -> Result<()> {
    info!(addr = %listener.local_addr()?, "listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, router).await {
                debug!(%peer, error = %e, "connection ended with error");
            }
        });
    }
}

/// Serves every request on `stream` until the client closes it.
pub async fn handle_connection(stream: TcpStream, router: Arc<Router>) -> Result<()> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
        let router = Arc::clone(&router);
        async move {
            let (parts, body) = req.into_parts();
            // drained so the connection can carry the next request
            body.collect().await?;
            Ok::<_, hyper::Error>(respond(&router, &parts))
        }
    });

    http1::Builder::new().serve_connection(io, service).await?;
    Ok(())
}

fn respond(router: &Router, parts: &http::request::Parts) -> hyper::Response<Full<Bytes>> {
    let request = to_router_request(parts);
    debug!(method = %request.method, uri = %request.uri, "request");

    let finished = router.handle(&request);
    info!(
        method = %request.method,
        uri = %request.uri,
        status = finished.status,
        "handled"
    );

    to_hyper_response(finished).unwrap_or_else(|e| {
        error!(error = %e, "dropping invalid response");
        let mut res = hyper::Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
        *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        res
    })
}

/// Converts a request head into a router request.
///
/// Header values that are not visible ASCII are skipped.
pub fn to_router_request(parts: &http::request::Parts) -> Request {
    let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut request = Request::new(Method::new(parts.method.as_str()), target);
    for (name, value) in &parts.headers {
        match value.to_str() {
            Ok(value) => request = request.header(name.as_str(), value),
            Err(_) => debug!(header = %name, "skipping non-text header value"),
        }
    }
    request
}

/// Converts a finished router response into a hyper response.
///
/// Raw header lines are split at their first `:`; lines without one are
/// dropped.
pub fn to_hyper_response(finished: FinishedResponse) -> Result<hyper::Response<Full<Bytes>>> {
    let mut builder = hyper::Response::builder().status(finished.status);
    for header in &finished.headers {
        match header.name_value() {
            Some((name, value)) => builder = builder.header(name, value),
            None => warn!(line = %header.line(), "dropping header line without a name"),
        }
    }

    let body = finished.body.map(Bytes::from).unwrap_or_default();
    Ok(builder.body(Full::new(body))?)
}
