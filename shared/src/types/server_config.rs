use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLx connection string.
    ///
    /// The `DATABASE_URL` environment variable takes priority, see
    /// [`DatabaseConfig::resolved_url`].
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Token claim settings plus the location of the RSA key pair.
///
/// Key paths are resolved relative to the working directory of the process.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,
    #[serde(default = "default_public_key_path")]
    pub public_key_path: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default = "default_token_validity_days")]
    pub token_validity_days: u64,
    #[serde(default = "default_not_before_secs")]
    pub not_before_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UsersConfig {
    /// Maximum number of rows returned by the user listing.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:8080"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl DatabaseConfig {
    /// Resolve the connection string with `DATABASE_URL` taking priority over
    /// the config file field.
    pub fn resolved_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.url.clone())
    }
}

/// Longest token lifetime `validate_config` accepts.
pub const MAX_TOKEN_VALIDITY_DAYS: u64 = 3650;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

impl AuthConfig {
    /// Validity window in seconds, saturating at `u64::MAX` for unvalidated
    /// configs.
    pub fn token_validity_secs(&self) -> u64 {
        self.token_validity_days
            .checked_mul(SECS_PER_DAY)
            .unwrap_or(u64::MAX)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            private_key_path: default_private_key_path(),
            public_key_path: default_public_key_path(),
            issuer: default_issuer(),
            audience: default_audience(),
            subject_prefix: default_subject_prefix(),
            token_validity_days: default_token_validity_days(),
            not_before_secs: default_not_before_secs(),
        }
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            users: UsersConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_database_url() -> String {
    "sqlite://userkey.db?mode=rwc".to_string()
}

pub fn default_max_connections() -> u32 {
    5
}

pub fn default_private_key_path() -> String {
    "keys/private.pem".to_string()
}

pub fn default_public_key_path() -> String {
    "keys/public.pem".to_string()
}

pub fn default_issuer() -> String {
    "api".to_string()
}

pub fn default_audience() -> String {
    "client".to_string()
}

pub fn default_subject_prefix() -> String {
    "uid-".to_string()
}

pub fn default_token_validity_days() -> u64 {
    30
}

pub fn default_not_before_secs() -> u64 {
    30
}

pub fn default_list_limit() -> u32 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.auth.issuer, "api");
        assert_eq!(cfg.auth.audience, "client");
        assert_eq!(cfg.auth.subject_prefix, "uid-");
        assert_eq!(cfg.auth.not_before_secs, 30);
        assert_eq!(cfg.users.list_limit, 50);
    }

    #[test]
    fn validity_is_thirty_days_in_seconds() {
        assert_eq!(AuthConfig::default().token_validity_secs(), 2_592_000);
    }

    #[test]
    fn huge_validity_saturates_instead_of_wrapping() {
        let auth = AuthConfig {
            token_validity_days: u64::MAX / 1000,
            ..AuthConfig::default()
        };
        assert_eq!(auth.token_validity_secs(), u64::MAX);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.auth.private_key_path, "keys/private.pem");
    }
}
