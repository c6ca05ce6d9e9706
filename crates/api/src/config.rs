use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use domain::services::RsvpSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT verification of owner tokens
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sites: SitesConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Limit for JSON and form bodies. Photo uploads use `media.max_upload_bytes`.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Public RSVP submissions allowed per client address per minute. 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Send Strict-Transport-Security. Only behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA public key in PEM format for verifying owner tokens
    #[serde(default)]
    pub public_key: String,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

/// Which store implementation backs sites, the RSVP inbox and guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitesConfig {
    /// First path segment of public site URLs (`/{prefix}/{slug}`)
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,

    /// Origin used to build the public link shown to owners
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Where the "back to editor" link on a public page points
    #[serde(default = "default_editor_url")]
    pub editor_url: String,

    #[serde(default = "default_dedup_window")]
    pub rsvp_dedup_window_secs: u64,

    #[serde(default = "default_read_retry_delay")]
    pub read_retry_delay_ms: u64,
}

impl SitesConfig {
    pub fn read_retry_delay(&self) -> Duration {
        Duration::from_millis(self.read_retry_delay_ms)
    }

    pub fn rsvp_settings(&self) -> RsvpSettings {
        RsvpSettings {
            dedup_window: Duration::from_secs(self.rsvp_dedup_window_secs),
            read_retry_delay: self.read_retry_delay(),
        }
    }
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            public_prefix: default_public_prefix(),
            public_base_url: default_public_base_url(),
            editor_url: default_editor_url(),
            rsvp_dedup_window_secs: default_dedup_window(),
            read_retry_delay_ms: default_read_retry_delay(),
        }
    }
}

/// Where uploaded photos are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    /// Files under `upload_dir`, served by this process at `public_path`
    #[default]
    Local,
    /// HTTP PUT to an object store at `endpoint`
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub backend: MediaBackend,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_media_path")]
    pub public_path: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Object store base URL (http backend)
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token sent to the object store (http backend)
    #[serde(default)]
    pub auth_token: String,

    /// Public URL prefix of stored objects (http backend). Defaults to `endpoint`.
    #[serde(default)]
    pub public_base_url: String,

    #[serde(default = "default_media_timeout")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::Local,
            upload_dir: default_upload_dir(),
            public_path: default_media_path(),
            max_upload_bytes: default_max_upload_bytes(),
            endpoint: String::new(),
            auth_token: String::new(),
            public_base_url: String::new(),
            timeout_secs: default_media_timeout(),
        }
    }
}

/// Owner session cookie, so a browser opening the public link is recognized.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cookie_name")]
    pub name: String,

    #[serde(default = "default_true")]
    pub secure: bool,

    /// Lax keeps the cookie on top-level navigation from shared links
    #[serde(default = "default_same_site")]
    pub same_site: String,

    #[serde(default)]
    pub domain: String,

    #[serde(default = "default_cookie_path")]
    pub path: String,

    #[serde(default = "default_cookie_max_age")]
    pub max_age_secs: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_cookie_name(),
            secure: true,
            same_site: default_same_site(),
            domain: String::new(),
            path: default_cookie_path(),
            max_age_secs: default_cookie_max_age(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_cookie_name() -> String {
    "ws_owner_session".to_string()
}
fn default_same_site() -> String {
    "Lax".to_string()
}
fn default_cookie_path() -> String {
    "/".to_string()
}
fn default_cookie_max_age() -> i64 {
    3600
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    20
}
fn default_jwt_leeway() -> u64 {
    30
}
fn default_public_prefix() -> String {
    "sites".to_string()
}
fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_editor_url() -> String {
    "/app/site".to_string()
}
fn default_dedup_window() -> u64 {
    120
}
fn default_read_retry_delay() -> u64 {
    150
}
fn default_upload_dir() -> String {
    "data/media".to_string()
}
fn default_media_path() -> String {
    "/media".to_string()
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_media_timeout() -> u64 {
    30
}

/// First path segments owned by the internal router.
const RESERVED_PREFIXES: &[&str] = &["api", "media", "metrics"];

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with WS__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("WS")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the config directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = ""

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 20

            [jwt]
            public_key = "test-public-key"
            leeway_secs = 30

            [storage]
            backend = "postgres"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "WS__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        self.socket_addr()?;

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.jwt.public_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "WS__JWT__PUBLIC_KEY environment variable must be set".to_string(),
            ));
        }

        let prefix = self.sites.public_prefix.trim_matches('/');
        let prefix_ok = !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !prefix_ok {
            return Err(ConfigValidationError::InvalidValue(format!(
                "sites.public_prefix '{}' must be a single URL-safe path segment",
                self.sites.public_prefix
            )));
        }
        if RESERVED_PREFIXES.contains(&prefix) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "sites.public_prefix '{}' collides with an internal route",
                prefix
            )));
        }

        if !self.media.public_path.starts_with('/') || self.media.public_path.len() < 2 {
            return Err(ConfigValidationError::InvalidValue(
                "media.public_path must be an absolute path such as /media".to_string(),
            ));
        }

        if self.media.backend == MediaBackend::Http && self.media.endpoint.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "media.endpoint is required for the http media backend".to_string(),
            ));
        }

        if !["Strict", "Lax", "None"].contains(&self.cookies.same_site.as_str()) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "cookies.same_site '{}' must be Strict, Lax or None",
                self.cookies.same_site
            )));
        }
        if self.cookies.same_site == "None" && !self.cookies.secure {
            return Err(ConfigValidationError::InvalidValue(
                "cookies.same_site None requires cookies.secure".to_string(),
            ));
        }

        if self.media.max_upload_bytes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "media.max_upload_bytes must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }

    /// Public prefix without surrounding slashes.
    pub fn public_prefix(&self) -> &str {
        self.sites.public_prefix.trim_matches('/')
    }
}
