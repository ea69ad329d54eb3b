use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError, MAX_TOKEN_VALIDITY_DAYS};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.bind.is_empty() {
        return Err(ConfigError::InvalidConfig("bind cannot be empty".into()));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    let auth = &config.auth;
    if auth.private_key_path.is_empty() || auth.public_key_path.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "private_key_path and public_key_path must both be set".into(),
        ));
    }

    if auth.issuer.is_empty() || auth.audience.is_empty() || auth.subject_prefix.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "issuer, audience and subject_prefix cannot be empty".into(),
        ));
    }

    // A prefix ending in a digit would make `prefix + id` ambiguous to parse.
    if auth
        .subject_prefix
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_digit())
    {
        return Err(ConfigError::InvalidConfig(
            "subject_prefix cannot end with a digit".into(),
        ));
    }

    if auth.token_validity_days == 0 || auth.token_validity_days > MAX_TOKEN_VALIDITY_DAYS {
        return Err(ConfigError::InvalidConfig(format!(
            "token_validity_days must be between 1 and {}",
            MAX_TOKEN_VALIDITY_DAYS
        )));
    }

    if auth.not_before_secs >= auth.token_validity_secs() {
        return Err(ConfigError::InvalidConfig(
            "not_before_secs must be shorter than the token validity window".into(),
        ));
    }

    if config.users.list_limit == 0 || config.users.list_limit > 1000 {
        return Err(ConfigError::InvalidConfig(
            "list_limit must be between 1 and 1000".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_full_file() {
        let file = write_config(
            r#"
[server]
bind = "0.0.0.0"
port = 9090

[database]
url = "sqlite::memory:"
max_connections = 1

[auth]
private_key_path = "k/priv.pem"
public_key_path = "k/pub.pem"
issuer = "tests"
audience = "suite"
subject_prefix = "user:"
token_validity_days = 1
not_before_secs = 0

[users]
list_limit = 10
"#,
        );

        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.addr(), "0.0.0.0:9090");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.auth.issuer, "tests");
        assert_eq!(cfg.auth.subject_prefix, "user:");
        assert_eq!(cfg.users.list_limit, 10);
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = write_config("   \n");
        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let file = write_config("[server\nport = ");
        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn zero_validity_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.auth.token_validity_days = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn oversized_validity_is_rejected() {
        let mut cfg = AppConfig::default();
        for days in [MAX_TOKEN_VALIDITY_DAYS + 1, 150_000_000_000_000, u64::MAX / 1000, u64::MAX] {
            cfg.auth.token_validity_days = days;
            assert!(
                matches!(validate_config(&cfg), Err(ConfigError::InvalidConfig(_))),
                "{} days should be rejected",
                days
            );
        }

        cfg.auth.token_validity_days = MAX_TOKEN_VALIDITY_DAYS;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn grace_longer_than_validity_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.auth.token_validity_days = 1;
        cfg.auth.not_before_secs = 86_400;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn numeric_subject_prefix_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.auth.subject_prefix = "uid1".into();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn list_limit_bounds_are_enforced() {
        let mut cfg = AppConfig::default();
        cfg.users.list_limit = 0;
        assert!(validate_config(&cfg).is_err());
        cfg.users.list_limit = 1001;
        assert!(validate_config(&cfg).is_err());
        cfg.users.list_limit = 50;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn bundled_config_file_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");
        let cfg = load_config(path).unwrap();
        assert_eq!(cfg.server.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.auth.token_validity_days, 30);
    }
}
