//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",

        // Scripts and data
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("geojson") => "application/geo+json",
        Some("csv") => "text/csv",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // Default
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_asset_types() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("js")), "application/javascript");
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("geojson")), "application/geo+json");
        assert_eq!(get_content_type(Some("ico")), "image/x-icon");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }
}
