//! Projects data endpoint
//!
//! Re-reads the projects CSV on every request and answers with a JSON array
//! of records. Nothing is cached between requests; the file on disk is the
//! single source of truth.

use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::DataConfig;
use crate::data;
use crate::handler::router::RequestContext;
use crate::http::{self, response};
use crate::logger;

/// Serve the projects table as JSON records.
///
/// A missing or undecodable file is answered with 500 and a JSON error
/// body. The response is always a whole document, never a partial array.
pub async fn serve_projects(
    ctx: &RequestContext<'_>,
    cfg: &DataConfig,
) -> Response<Full<Bytes>> {
    let table = match data::read_table(Path::new(&cfg.csv_path)).await {
        Ok(table) => table,
        Err(e) => {
            logger::log_error(&format!("Projects endpoint failed: {e}"));
            return http::build_500_json_response("could not load project data");
        }
    };

    match table.to_json() {
        Ok(json) => response::build_json_response(json, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize projects table: {e}"));
            http::build_500_json_response("could not encode project data")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(is_head: bool) -> RequestContext<'static> {
        RequestContext {
            path: "/donorschoose/projects",
            is_head,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = DataConfig {
            csv_path: dir
                .path()
                .join("missing.csv")
                .to_string_lossy()
                .into_owned(),
        };

        let resp = serve_projects(&ctx(false), &cfg).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
    }

    #[tokio::test]
    async fn test_csv_served_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        std::fs::write(&path, "id,school_state\n1,CA\n2,NY\n").unwrap();
        let cfg = DataConfig {
            csv_path: path.to_string_lossy().into_owned(),
        };

        let resp = serve_projects(&ctx(false), &cfg).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
    }

    #[tokio::test]
    async fn test_head_keeps_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        std::fs::write(&path, "id\n1\n").unwrap();
        let cfg = DataConfig {
            csv_path: path.to_string_lossy().into_owned(),
        };

        let resp = serve_projects(&ctx(true), &cfg).await;
        assert_eq!(resp.status(), 200);
        assert!(resp.headers().contains_key("Content-Length"));
    }
}
