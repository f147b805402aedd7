//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chat::SessionConfig;
use crate::websocket::HubConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Seed the default staff directory when the table is empty
    #[serde(default = "default_true")]
    pub seed_staff: bool,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("concierge").join("concierge.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./concierge_data/concierge.db".to_string())
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            seed_staff: true,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body() -> usize {
    64 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body(),
        }
    }
}

impl ApiConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Names of the identity headers set by the auth proxy
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_user_id_header")]
    pub user_id_header: String,

    #[serde(default = "default_name_header")]
    pub name_header: String,

    #[serde(default = "default_email_header")]
    pub email_header: String,

    #[serde(default = "default_phone_header")]
    pub phone_header: String,
}

fn default_user_id_header() -> String {
    "x-auth-user-id".to_string()
}

fn default_name_header() -> String {
    "x-auth-user-name".to_string()
}

fn default_email_header() -> String {
    "x-auth-user-email".to_string()
}

fn default_phone_header() -> String {
    "x-auth-user-phone".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_id_header: default_user_id_header(),
            name_header: default_name_header(),
            email_header: default_email_header(),
            phone_header: default_phone_header(),
        }
    }
}

/// Chat session and socket limits
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_ttl() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            session_ttl_minutes: default_session_ttl(),
            max_connections: default_max_connections(),
        }
    }
}

impl ChatConfig {
    pub fn sessions(&self) -> SessionConfig {
        SessionConfig {
            max_sessions: self.max_sessions,
            ttl: Duration::from_secs(self.session_ttl_minutes.saturating_mul(60)),
        }
    }

    pub fn hub(&self) -> HubConfig {
        HubConfig {
            max_connections: self.max_connections,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let mut config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.database.path = expand_home(&config.database.path);
        Ok(config)
    }

    /// Defaults with environment variable overrides
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("concierge").join("config.toml")),
            Some(PathBuf::from("/etc/concierge/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CONCIERGE_DB_PATH") {
            self.database.path = expand_home(&path);
        }

        if let Ok(host) = std::env::var("CONCIERGE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("CONCIERGE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(level) = std::env::var("CONCIERGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CONCIERGE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Resolve a leading `~` against the home directory. SQLite would otherwise
/// create a directory literally named `~`.
pub fn expand_home(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return path.to_string(),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.to_string_lossy().to_string(),
        Some(home) => home.join(rest).to_string_lossy().to_string(),
        None => path.to_string(),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Concierge Configuration
#
# Environment variables override these settings:
# - CONCIERGE_DB_PATH
# - CONCIERGE_API_HOST
# - CONCIERGE_API_PORT
# - CONCIERGE_LOG_LEVEL
# - CONCIERGE_LOG_FORMAT

[database]
# SQLite database file
path = "~/.local/share/concierge/concierge.db"

# Seed the default staff directory when the staff table is empty
seed_staff = true

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Maximum request body size in bytes
max_body_bytes = 65536

[auth]
# Headers carrying the signed-in user, set by the auth proxy
user_id_header = "x-auth-user-id"
name_header = "x-auth-user-name"
email_header = "x-auth-user-email"
phone_header = "x-auth-user-phone"

[chat]
# Maximum concurrent chat sessions
max_sessions = 10000

# Idle minutes before a chat session is dropped
session_ttl_minutes = 30

# Maximum concurrent chat sockets
max_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
