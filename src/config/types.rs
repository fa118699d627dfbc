// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub data: DataConfig,
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Data endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// CSV file re-read on every request, relative to the working directory
    pub csv_path: String,
}

/// Landing page and static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// HTML document served at the root path
    pub index_page: String,
    /// Directory holding the dashboard's JS/CSS/GeoJSON assets
    pub static_dir: String,
    /// URL prefix under which `static_dir` is exposed
    pub static_prefix: String,
    #[serde(default = "default_favicon_paths")]
    pub favicon_paths: Vec<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_favicon_paths() -> Vec<String> {
    vec!["/favicon.ico".to_string(), "/favicon.svg".to_string()]
}
