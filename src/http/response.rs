//! HTTP response building module
//!
//! Provides builders for the status codes this server can answer with,
//! decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 JSON response from an already-serialized body
pub fn build_json_response(json: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = json.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(json)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build static file response with the detected content type
pub fn build_file_response(
    data: Vec<u8>,
    content_type: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(data)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(413)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(Full::new(Bytes::from("413 Payload Too Large")))
        })
}

/// Build 500 Internal Server Error response with a JSON error body.
///
/// Used when the data file cannot be read or decoded: the client gets a
/// whole error document, never a truncated array.
pub fn build_500_json_response(message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "internal server error",
        "detail": message,
    });
    Response::builder()
        .status(500)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::from("Internal Server Error")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
