use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_registry_capacity")]
    pub registry_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Metadata wait applied when a request gives no timeout
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Upper bound on any requested timeout
    #[serde(default = "default_max_timeout_ms")]
    pub max_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            max_timeout_ms: default_max_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_registry_capacity() -> usize {
    1024
}

fn default_timeout_ms() -> u64 {
    30_000 // 30 seconds
}

fn default_max_timeout_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl QueryConfig {
    /// Resolve the metadata wait for one request
    ///
    /// Missing values fall back to the default; anything above the maximum is
    /// clamped to it.
    pub fn effective_timeout(&self, requested_ms: Option<u64>) -> Duration {
        let ms = requested_ms
            .unwrap_or(self.default_timeout_ms)
            .min(self.max_timeout_ms);
        Duration::from_millis(ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.server.registry_capacity == 0 {
            bail!("registry_capacity must be greater than 0");
        }

        if self.query.default_timeout_ms == 0 {
            bail!("default_timeout_ms must be greater than 0");
        }

        if self.query.max_timeout_ms == 0 {
            bail!("max_timeout_ms must be greater than 0");
        }

        if self.query.default_timeout_ms > self.query.max_timeout_ms {
            bail!(
                "default_timeout_ms ({}) must not exceed max_timeout_ms ({})",
                self.query.default_timeout_ms,
                self.query.max_timeout_ms
            );
        }

        if self.admin.api_key.is_empty() {
            bail!("api_key must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [server]
        port = 8080

        [admin]
        api_key = "secret"
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.server.port, Some(8080));
        assert!(config.server.unix_socket.is_none());
        assert!(config.server.num_threads > 0);
        assert_eq!(config.query.default_timeout_ms, 30_000);
        assert_eq!(config.query.max_timeout_ms, 300_000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert!(!config.logging.console);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            unix_socket = "/tmp/torrent-info.sock"
            num_threads = 2

            [query]
            default_timeout_ms = 1000
            max_timeout_ms = 5000

            [admin]
            api_key = "secret"

            [logging]
            level = "debug"
            format = "console"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.server.unix_socket,
            Some(PathBuf::from("/tmp/torrent-info.sock"))
        );
        assert_eq!(config.server.num_threads, 2);
        assert_eq!(config.query.default_timeout_ms, 1000);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_requires_a_listener() {
        let err = Config::from_toml("[server]\n[admin]\napi_key = \"k\"\n").unwrap_err();
        assert!(err.to_string().contains("port or unix_socket"));
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let err = Config::from_toml("[server]\nport = 1\n[admin]\napi_key = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_rejects_default_above_max() {
        let toml = format!("{MINIMAL}\n[query]\ndefault_timeout_ms = 10\nmax_timeout_ms = 5\n");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let toml = format!("{MINIMAL}\n[logging]\nformat = \"xml\"\n");
        let err = Config::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_effective_timeout() {
        let query = QueryConfig {
            default_timeout_ms: 1000,
            max_timeout_ms: 5000,
        };

        assert_eq!(query.effective_timeout(None), Duration::from_millis(1000));
        assert_eq!(query.effective_timeout(Some(200)), Duration::from_millis(200));
        assert_eq!(query.effective_timeout(Some(60_000)), Duration::from_millis(5000));
    }
}
