//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, route resolution, dispatching, and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};

use crate::config::{AppState, SiteConfig};
use crate::handler::{pages, projects};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// The one data endpoint this service exposes.
pub const PROJECTS_PATH: &str = "/donorschoose/projects";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
}

/// Resolved target for a request path
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    /// Dashboard landing page at the root path
    Index,
    /// Projects CSV rendered as a JSON array of records
    Projects,
    /// Favicon lookup in the static directory
    Favicon(&'a str),
    /// Asset under the static prefix
    StaticAsset(&'a str),
    NotFound,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let is_head = method == Method::HEAD;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&method, state.config.http.enable_cors) {
        return Ok(resp);
    }

    // 2. Check declared body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(resp);
    }

    // 3. Log headers if enabled
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let referer = header_string(&req, "referer");
    let user_agent = header_string(&req, "user-agent");
    drop(req); // body is never read

    let ctx = RequestContext {
        path: uri.path(),
        is_head,
    };
    let response = dispatch(&ctx, &state).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = version_str(version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes(&response);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve a request path to its route target.
///
/// Pure function of the path and the site configuration, so routing
/// decisions are testable without a running server.
pub fn resolve<'a>(path: &'a str, site: &SiteConfig) -> Route<'a> {
    if path == "/" {
        return Route::Index;
    }
    if path == PROJECTS_PATH {
        return Route::Projects;
    }
    if site.favicon_paths.iter().any(|p| p == path) {
        return Route::Favicon(path);
    }
    if let Some(rest) = path.strip_prefix(site.static_prefix.as_str()) {
        if rest.is_empty() || rest.starts_with('/') {
            return Route::StaticAsset(path);
        }
    }
    Route::NotFound
}

/// Dispatch a resolved route to its handler
async fn dispatch(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match resolve(ctx.path, &state.config.site) {
        Route::Index => pages::serve_index(ctx, &state.config.site).await,
        Route::Projects => projects::serve_projects(ctx, &state.config.data).await,
        Route::Favicon(path) => pages::serve_favicon(ctx, &state.config.site, path).await,
        Route::StaticAsset(path) => pages::serve_static(ctx, &state.config.site, path).await,
        Route::NotFound => http::build_404_response(),
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_str(version: hyper::Version) -> &'static str {
    if version == hyper::Version::HTTP_10 {
        "1.0"
    } else if version == hyper::Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

/// Response body size as declared by Content-Length
fn body_bytes(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
