// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, Wiki};
pub use types::Config;

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `WIKI_` environment variables override it, with
    /// `__` separating nested keys (e.g. `WIKI_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WIKI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("storage.data_dir", ".")?
            .set_default("templates.dir", "templates")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 30)?
            .set_default("http.server_name", "pagewiki")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-not-a-config-file").expect("defaults");
        assert_eq!(cfg.storage.data_dir, ".");
        assert_eq!(cfg.templates.dir, "templates");
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.logging.access_log_file.is_none());
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(cfg.performance.shutdown_timeout, 30);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("wiki.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[storage]\ndata_dir = \"/var/lib/wiki\"\n\n[logging]\naccess_log_format = \"json\"\n",
        )
        .expect("write config");

        let stem = dir.path().join("wiki");
        let cfg = Config::load_from(stem.to_str().expect("utf-8 path")).expect("load");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.storage.data_dir, "/var/lib/wiki");
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.templates.dir, "templates");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("definitely-not-a-config-file").expect("defaults");
        cfg.server.host = "0.0.0.0".to_string();
        cfg.server.port = 8081;
        assert_eq!(
            cfg.get_socket_addr().expect("valid"),
            "0.0.0.0:8081".parse::<SocketAddr>().expect("addr")
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
