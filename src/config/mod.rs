use serde::{Deserialize, Serialize};

use crate::api::ControllerErrors;

pub mod validation;

/// Prefix for environment overrides, e.g. `CAR_SHOP__SERVER__PORT=4000`
pub const ENV_PREFIX: &str = "CAR_SHOP";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub limits: StorageLimitsConfig,
    pub behavior: StorageBehaviorConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageLimitsConfig {
    pub max_documents_per_collection: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageBehaviorConfig {
    pub reject_on_capacity: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub messages: ControllerErrors,
}

impl AppConfig {
    /// Loads `config.{yaml,toml,json}` from the working directory if present,
    /// layered over built-in defaults and under environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config")
    }

    pub fn load_from(file_stem: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default("logging.level", "info")?
            .set_default("storage.limits.max_documents_per_collection", 10_000)?
            .set_default("storage.behavior.reject_on_capacity", true)?
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;

        // Validate the loaded configuration
        validation::validate_config(&config)?;

        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(test)]
    pub fn create_test_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            storage: StorageConfig {
                limits: StorageLimitsConfig {
                    max_documents_per_collection: 100,
                },
                behavior: StorageBehaviorConfig {
                    reject_on_capacity: true,
                },
            },
            api: ApiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let config = AppConfig::load_from("does-not-exist").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.behavior.reject_on_capacity);
        assert_eq!(config.api.messages.not_found, "Object not found");
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 4000\napi:\n  messages:\n    not_found: \"Vehicle not found\""
        )
        .unwrap();

        let stem = file.path().with_extension("");
        let config = AppConfig::load_from(stem.to_str().unwrap()).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.api.messages.not_found, "Vehicle not found");
        assert_eq!(config.api.messages.internal, "Internal Server Error");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_defaults() {
        std::env::set_var("CAR_SHOP__SERVER__PORT", "4100");
        let result = AppConfig::load_from("does-not-exist");
        std::env::remove_var("CAR_SHOP__SERVER__PORT");

        assert_eq!(result.unwrap().server.port, 4100);
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server:\n  port: 0").unwrap();

        let stem = file.path().with_extension("");
        let result = AppConfig::load_from(stem.to_str().unwrap());
        assert!(result.is_err());
    }
}
