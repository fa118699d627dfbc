// Configuration module entry point
// Builds the startup configuration and the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DataConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
};

impl Config {
    /// Load configuration from "config.toml" in the working directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension).
    ///
    /// Only a file source is layered over the built-in defaults: the process
    /// recognizes no CLI flags and no environment variables. The defaults
    /// reproduce the fixed upstream surface (bind 0.0.0.0:5000, read
    /// output.csv from the working directory).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("data.csv_path", "output.csv")?
            .set_default("site.index_page", "templates/index.html")?
            .set_default("site.static_dir", "static")?
            .set_default("site.static_prefix", "/static")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = Config::load_from("no-such-config-file").unwrap();

        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.data.csv_path, "output.csv");
        assert_eq!(cfg.site.static_prefix, "/static");
        assert_eq!(cfg.site.favicon_paths, ["/favicon.ico", "/favicon.svg"]);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_socket_addr_from_defaults() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_unspecified());
    }
}
