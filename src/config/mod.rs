//! Configuration management.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML config file (explicit path, else the platform config dir)
//! 3. Environment variables (a `.env` file is read into the environment first)
//! 4. CLI flags, applied by the binary
//!
//! ```toml
//! data_dir = "data"
//! port = 8001
//! cors_origins = ["http://localhost:3000"]
//!
//! [logging]
//! level = "info,tower_http=debug"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! port = 9090
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8001;

/// Default metrics exporter port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Name of the task document inside the data directory.
const TASKS_FILE_NAME: &str = "tasks.json";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to `Pretty`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive string; `None` defers to `RUST_LOG` or `info`.
    pub level: Option<String>,
    /// Output format.
    pub format: LogFormat,
}

/// Metrics settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Whether the Prometheus exporter is installed.
    pub enabled: bool,
    /// Port of the exporter's HTTP listener.
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: DEFAULT_METRICS_PORT,
        }
    }
}

/// Main configuration for taskboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskboardConfig {
    /// Directory holding the task document.
    pub data_dir: PathBuf,
    /// Explicit document path; overrides `data_dir/tasks.json`.
    pub tasks_file: Option<PathBuf>,
    /// Address the HTTP server binds to.
    pub host: IpAddr,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
    /// Config files that contributed to this configuration.
    pub config_sources: Vec<PathBuf>,
}

impl Default for TaskboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            tasks_file: None,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            logging: LoggingSettings::default(),
            metrics: MetricsSettings::default(),
            config_sources: Vec::new(),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Task document path.
    pub tasks_file: Option<String>,
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Allowed CORS origins.
    pub cors_origins: Option<Vec<String>>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Filter directives.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileMetrics {
    /// Enable the exporter.
    pub enabled: Option<bool>,
    /// Exporter port.
    pub port: Option<u16>,
}

impl TaskboardConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let mut config = Self::default();
        config.apply_file(file)?;
        config.config_sources.push(path.to_path_buf());
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Looks for `taskboard/config.toml` in the platform config dir
    /// (`~/.config` on Linux, `~/Library/Application Support` on macOS).
    /// Returns defaults when the file is missing or unreadable.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let path = base_dirs.config_dir().join("taskboard").join("config.toml");
        if !path.exists() {
            return Self::default();
        }

        Self::load_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
            Self::default()
        })
    }

    /// Loads configuration for the running process.
    ///
    /// Reads `.env` from the working directory if present, loads the given
    /// file (or `TASKBOARD_CONFIG_PATH`, or the default location), then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named config file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let explicit = path.map(Path::to_path_buf).or_else(|| {
            std::env::var("TASKBOARD_CONFIG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
        });

        let mut config = match explicit {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(data_dir) = file.data_dir {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(tasks_file) = file.tasks_file {
            self.tasks_file = Some(PathBuf::from(tasks_file));
        }
        if let Some(host) = file.host {
            self.host = parse_host(&host)?;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(origins) = file.cors_origins {
            self.cors_origins = origins;
        }
        if let Some(logging) = file.logging {
            if logging.level.is_some() {
                self.logging.level = logging.level;
            }
            if let Some(format) = logging.format {
                self.logging.format = LogFormat::parse(&format);
            }
        }
        if let Some(metrics) = file.metrics {
            if let Some(enabled) = metrics.enabled {
                self.metrics.enabled = enabled;
            }
            if let Some(port) = metrics.port {
                self.metrics.port = port;
            }
        }
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var("TASKBOARD_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = var("TASKBOARD_TASKS_FILE") {
            self.tasks_file = Some(PathBuf::from(file));
        }
        if let Some(host) = var("TASKBOARD_HOST") {
            match parse_host(&host) {
                Ok(host) => self.host = host,
                Err(e) => tracing::warn!(error = %e, "Ignoring TASKBOARD_HOST"),
            }
        }
        if let Some(port) = var("TASKBOARD_PORT").and_then(|v| parse_or_warn("TASKBOARD_PORT", &v)) {
            self.port = port;
        }
        if let Some(origins) = var("CORS_ORIGINS") {
            self.cors_origins = split_origins(&origins);
        }
        if let Some(level) = var("TASKBOARD_LOG") {
            self.logging.level = Some(level);
        }
        if let Some(format) = var("TASKBOARD_LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&format);
        }
        if let Some(enabled) = var("TASKBOARD_METRICS_ENABLED")
            .and_then(|v| parse_bool_or_warn("TASKBOARD_METRICS_ENABLED", &v))
        {
            self.metrics.enabled = enabled;
        }
        if let Some(port) = var("TASKBOARD_METRICS_PORT")
            .and_then(|v| parse_or_warn("TASKBOARD_METRICS_PORT", &v))
        {
            self.metrics.port = port;
        }
    }

    /// Returns the task document path.
    #[must_use]
    pub fn tasks_path(&self) -> PathBuf {
        self.tasks_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(TASKS_FILE_NAME))
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the metrics exporter address.
    #[must_use]
    pub const fn metrics_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.metrics.port)
    }

    /// Sets the task document path.
    #[must_use]
    pub fn with_tasks_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tasks_file = Some(path.into());
        self
    }

    /// Sets the bind host. Accepts an IP address or `localhost`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the host is not an address.
    pub fn with_host(mut self, host: &str) -> Result<Self> {
        self.host = parse_host(host)?;
        Ok(self)
    }

    /// Sets the bind port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

fn parse_host(raw: &str) -> Result<IpAddr> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    raw.parse()
        .map_err(|e| Error::InvalidInput(format!("invalid host '{raw}': {e}")))
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    warn_if_unparsed(key, raw, raw.trim().parse().ok())
}

fn parse_bool_or_warn(key: &str, raw: &str) -> Option<bool> {
    let parsed = match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    };
    warn_if_unparsed(key, raw, parsed)
}

fn warn_if_unparsed<T>(key: &str, raw: &str, parsed: Option<T>) -> Option<T> {
    if parsed.is_none() {
        tracing::warn!(key, value = raw, "Ignoring unparseable environment override");
    }
    parsed
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TaskboardConfig::default();
        assert_eq!(config.tasks_path(), PathBuf::from("data").join("tasks.json"));
        assert_eq!(config.bind_addr().port(), DEFAULT_PORT);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/var/lib/taskboard"
host = "127.0.0.1"
port = 9000
cors_origins = ["http://localhost:3000"]

[logging]
level = "debug"
format = "json"

[metrics]
enabled = true
port = 9100
"#,
        )
        .unwrap();

        let config = TaskboardConfig::load_from_file(&path).unwrap();
        assert_eq!(
            config.tasks_path(),
            PathBuf::from("/var/lib/taskboard").join("tasks.json")
        );
        assert_eq!(config.bind_addr(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);
        assert_eq!(config.config_sources, vec![path]);
    }

    #[test]
    fn test_load_from_file_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "prot = 9000\n").unwrap();

        let err = TaskboardConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("parse_config_file"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TaskboardConfig::default();
        config.apply_overrides_from(lookup(&[
            ("TASKBOARD_DATA_DIR", "/tmp/tb"),
            ("TASKBOARD_PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("TASKBOARD_LOG_FORMAT", "JSON"),
            ("TASKBOARD_METRICS_ENABLED", "yes"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tb"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_env_tasks_file_wins_over_data_dir() {
        let mut config = TaskboardConfig::default();
        config.apply_overrides_from(lookup(&[
            ("TASKBOARD_DATA_DIR", "/tmp/tb"),
            ("TASKBOARD_TASKS_FILE", "/srv/board.json"),
        ]));
        assert_eq!(config.tasks_path(), PathBuf::from("/srv/board.json"));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = TaskboardConfig::default();
        config.apply_overrides_from(lookup(&[
            ("TASKBOARD_PORT", "eighty"),
            ("TASKBOARD_HOST", "not-an-ip"),
            ("TASKBOARD_METRICS_ENABLED", "maybe"),
        ]));
        assert_eq!(config, TaskboardConfig::default());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unparseable_metrics_flag_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut config = TaskboardConfig::default();
        tracing::subscriber::with_default(subscriber, || {
            config.apply_overrides_from(lookup(&[("TASKBOARD_METRICS_ENABLED", "maybe")]));
        });

        assert!(!config.metrics.enabled);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Ignoring unparseable environment override"));
        assert!(output.contains("TASKBOARD_METRICS_ENABLED"));
        assert!(output.contains("maybe"));
    }

    #[test]
    fn test_metrics_flag_spellings() {
        for raw in ["1", "true", "YES", " on "] {
            assert_eq!(parse_bool_or_warn("TASKBOARD_METRICS_ENABLED", raw), Some(true));
        }
        for raw in ["0", "False", "no", "off"] {
            assert_eq!(parse_bool_or_warn("TASKBOARD_METRICS_ENABLED", raw), Some(false));
        }
        assert_eq!(parse_bool_or_warn("TASKBOARD_METRICS_ENABLED", "maybe"), None);
    }

    #[test]
    fn test_parse_host_localhost() {
        assert_eq!(
            parse_host("localhost").unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
        assert!(parse_host("example").is_err());
    }
}
