use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Environment variable overriding `admin_key`
pub const ADMIN_KEY_ENV: &str = "ADMIN_KEY";
/// Environment variable overriding `server_addr`
pub const SERVER_ADDR_ENV: &str = "PRODUCTDB_ADDR";

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("admin_key is not configured (set it in the config file or via ADMIN_KEY)")]
    MissingAdminKey,

    #[error("kv backend 'rocksdb' requires kv.data_path")]
    MissingDataPath,
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    /// Log file path, if not set, logs will be printed to stdout
    pub file: Option<String>,
    /// Log level, default is "info"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

/// Key-value store backend
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    Memory,
    Rocksdb,
}

/// Key-value store binding
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KvConfig {
    pub backend: KvBackend,
    /// Database directory, required by the rocksdb backend
    pub data_path: Option<String>,
}

/// Product service configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// HTTP listening address
    #[serde(default = "default_server_addr")]
    pub server_addr: String,

    /// Shared secret expected in `X-Admin-Key` for writes
    #[serde(default)]
    pub admin_key: Option<String>,

    /// Largest accepted PUT body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Store binding; when absent the service answers reads and writes
    /// with a configuration error
    #[serde(default)]
    pub kv: Option<KvConfig>,

    /// Log configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_server_addr() -> String {
    "0.0.0.0:8787".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            admin_key: None,
            max_body_bytes: default_max_body_bytes(),
            kv: None,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

        toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ADMIN_KEY_ENV) {
            self.admin_key = Some(key);
        }
        if let Some(addr) = lookup(SERVER_ADDR_ENV) {
            self.server_addr = addr;
        }
        self
    }

    /// Check the configuration and return the admin secret.
    ///
    /// There is no fallback secret: an absent or empty key refuses startup.
    pub fn validate(&self) -> Result<&str, ConfigError> {
        if let Some(kv) = &self.kv {
            if kv.backend == KvBackend::Rocksdb && kv.data_path.is_none() {
                return Err(ConfigError::MissingDataPath);
            }
        }

        match self.admin_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingAdminKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_full_config() {
        let config_str = r#"
server_addr = "127.0.0.1:9000"
admin_key = "s3cret"
max_body_bytes = 4096

[kv]
backend = "rocksdb"
data_path = "/tmp/productdb"

[log]
level = "debug"
"#;

        let config: Config = toml::from_str(config_str).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:9000");
        assert_eq!(config.max_body_bytes, 4096);
        assert_eq!(config.log.level, "debug");

        let kv = config.kv.as_ref().unwrap();
        assert_eq!(kv.backend, KvBackend::Rocksdb);
        assert_eq!(kv.data_path.as_deref(), Some("/tmp/productdb"));
        assert_eq!(config.validate().unwrap(), "s3cret");
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str(r#"admin_key = "k""#).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8787");
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert!(config.kv.is_none());
        assert_eq!(config.log.level, "info");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_missing_admin_key_is_rejected() {
        let config = Config::default().with_env(no_env);
        assert!(matches!(config.validate(), Err(ConfigError::MissingAdminKey)));

        let config = Config {
            admin_key: Some(String::new()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingAdminKey)));
    }

    #[test]
    fn test_rocksdb_without_path_is_rejected() {
        let config = Config {
            admin_key: Some("k".to_string()),
            kv: Some(KvConfig {
                backend: KvBackend::Rocksdb,
                data_path: None,
            }),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingDataPath)));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config {
            admin_key: Some("from-file".to_string()),
            ..Config::default()
        }
        .with_env(|name| match name {
            ADMIN_KEY_ENV => Some("from-env".to_string()),
            SERVER_ADDR_ENV => Some("127.0.0.1:1234".to_string()),
            _ => None,
        });

        assert_eq!(config.validate().unwrap(), "from-env");
        assert_eq!(config.server_addr, "127.0.0.1:1234");
    }

    #[test]
    fn test_unknown_backend_fails_to_parse() {
        let config_str = r#"
[kv]
backend = "redis"
"#;
        assert!(toml::from_str::<Config>(config_str).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/productdb.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/productdb.toml"));
    }
}
