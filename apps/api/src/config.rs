//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;

/// Development-only signing secret used when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "cabshop-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind (`CABSHOP_HOST`)
    pub host: String,

    /// HTTP port (`CABSHOP_PORT`)
    pub port: u16,

    /// SQLite database file (`CABSHOP_DB_PATH`)
    pub db_path: String,

    /// Pool size (`CABSHOP_DB_MAX_CONNECTIONS`)
    pub db_max_connections: u32,

    /// HS256 signing secret (`JWT_SECRET`)
    pub jwt_secret: String,

    /// Token lifetime in seconds (`JWT_LIFETIME_SECS`)
    pub jwt_lifetime_secs: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            host: get("CABSHOP_HOST", "0.0.0.0"),

            port: get("CABSHOP_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CABSHOP_PORT".to_string()))?,

            db_path: get("CABSHOP_DB_PATH", "./cabshop.db"),

            db_max_connections: get("CABSHOP_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CABSHOP_DB_MAX_CONNECTIONS".to_string()))?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: get("JWT_LIFETIME_SECS", "86400") // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "CABSHOP_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }

        Ok(config)
    }

    /// Whether the built-in development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CABSHOP_HOST".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, "./cabshop.db");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_lifetime_secs, 86_400);
        assert!(config.uses_dev_secret());
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CABSHOP_PORT", "9000"),
            ("CABSHOP_HOST", "127.0.0.1"),
            ("JWT_SECRET", "prod-secret"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("CABSHOP_PORT", "eighty")]),
            Err(ConfigError::InvalidValue(key)) if key == "CABSHOP_PORT"
        ));
        assert!(config_from(&[("CABSHOP_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config_from(&[("JWT_LIFETIME_SECS", "-5")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "")]).is_err());
    }
}
