//! Landing page and static asset serving
//!
//! Serves the dashboard HTML shell at the root path and the supporting
//! JS/CSS/GeoJSON assets under the static prefix.

use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::config::SiteConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, response};
use crate::logger;

/// Serve the dashboard landing page.
///
/// A missing template is a deployment problem, not a request failure: the
/// built-in shell is served instead so the process stays useful.
pub async fn serve_index(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let html = match fs::read_to_string(&site.index_page).await {
        Ok(html) => html,
        Err(e) => {
            logger::log_warning(&format!(
                "Index page '{}' unavailable ({e}), serving built-in page",
                site.index_page
            ));
            default_index_page()
        }
    };
    response::build_html_response(html, ctx.is_head)
}

/// Serve a favicon request from the static directory
pub async fn serve_favicon(
    ctx: &RequestContext<'_>,
    site: &SiteConfig,
    request_path: &str,
) -> Response<Full<Bytes>> {
    let name = request_path.trim_start_matches('/');
    let file_path = Path::new(&site.static_dir).join(name);

    match fs::read(&file_path).await {
        Ok(data) => {
            let content_type =
                mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
            response::build_file_response(data, content_type, ctx.is_head)
        }
        Err(_) => http::build_404_response(),
    }
}

/// Serve an asset under the static prefix
pub async fn serve_static(
    ctx: &RequestContext<'_>,
    site: &SiteConfig,
    request_path: &str,
) -> Response<Full<Bytes>> {
    match load_from_directory(&site.static_dir, request_path, &site.static_prefix).await {
        Some((content, content_type)) => {
            response::build_file_response(content, content_type, ctx.is_head)
        }
        None => http::build_404_response(),
    }
}

/// Load a static asset, confining the lookup to the asset directory
async fn load_from_directory(
    static_dir: &str,
    path: &str,
    route_prefix: &str,
) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and prevent directory traversal
    let clean_path = path.trim_start_matches('/').replace("..", "");

    // Remove route prefix from path
    let prefix_clean = route_prefix.trim_matches('/');
    let relative_path = if prefix_clean.is_empty() {
        clean_path.as_str()
    } else {
        clean_path
            .strip_prefix(&format!("{prefix_clean}/"))
            .unwrap_or(&clean_path)
    };

    if relative_path.is_empty() {
        return None;
    }

    let file_path = Path::new(static_dir).join(relative_path);

    // Containment check: the canonical path must stay inside static_dir
    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Built-in dashboard shell, used when the index template is missing
fn default_index_page() -> String {
    String::from(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>DonorsChoose Dashboard</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            margin: 0;
            background: #f4f6f8;
            color: #2d3748;
        }
        header {
            background: #2b6cb0;
            color: white;
            padding: 24px 32px;
        }
        header h1 { margin: 0; font-size: 1.6em; }
        main { padding: 32px; max-width: 720px; }
        code {
            background: #e2e8f0;
            padding: 2px 6px;
            border-radius: 4px;
        }
        .note { color: #718096; font-size: 0.9em; margin-top: 24px; }
    </style>
</head>
<body>
    <header>
        <h1>DonorsChoose Dashboard</h1>
    </header>
    <main>
        <p>The dashboard template was not found, so this built-in page is
        being served instead.</p>
        <p>Project data is available as JSON at
        <a href="/donorschoose/projects"><code>/donorschoose/projects</code></a>.</p>
        <p class="note">Place the dashboard HTML at the configured index page
        path and its assets under the static directory to restore the full
        UI.</p>
    </main>
</body>
</html>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_asset_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let js_dir = dir.path().join("js");
        std::fs::create_dir(&js_dir).unwrap();
        let mut file = std::fs::File::create(js_dir.join("graphs.js")).unwrap();
        write!(file, "// dashboard").unwrap();
        drop(file);

        let static_dir = dir.path().to_str().unwrap();
        let loaded = load_from_directory(static_dir, "/static/js/graphs.js", "/static").await;

        let (content, content_type) = loaded.unwrap();
        assert_eq!(content, b"// dashboard");
        assert_eq!(content_type, "application/javascript");
    }

    #[tokio::test]
    async fn test_missing_asset_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().to_str().unwrap();

        assert!(load_from_directory(static_dir, "/static/nope.css", "/static")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_traversal_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("assets");
        std::fs::create_dir(&static_dir).unwrap();
        std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

        let loaded = load_from_directory(
            static_dir.to_str().unwrap(),
            "/static/../secret.txt",
            "/static",
        )
        .await;

        assert!(loaded.is_none());
    }

    #[test]
    fn test_default_page_links_data_endpoint() {
        assert!(default_index_page().contains("/donorschoose/projects"));
    }
}
