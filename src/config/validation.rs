use super::{AppConfig, ServerConfig, StorageConfig};
use anyhow::{bail, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Configuration validation errors with helpful messages
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Port {port} is invalid: {reason}")]
    InvalidPort { port: u16, reason: String },

    #[error("Invalid host address '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("Invalid storage limit {value}: {reason}")]
    InvalidLimit { value: usize, reason: String },

    #[error("Invalid log level '{level}': {reason}")]
    InvalidLogLevel { level: String, reason: String },

    #[error("Invalid message for '{name}': {reason}")]
    InvalidMessage { name: String, reason: String },
}

/// Validates the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    validate_server_config(&config.server)?;
    validate_storage_config(&config.storage)?;
    validate_log_level(&config.logging.level)?;
    validate_messages(config)?;
    Ok(())
}

/// Validates server configuration (port, host)
fn validate_server_config(server: &ServerConfig) -> Result<()> {
    validate_port(server.port, "server.port")?;
    validate_host(&server.host)?;
    Ok(())
}

/// Validates a single port is in valid range
fn validate_port(port: u16, port_name: &str) -> Result<()> {
    if port == 0 {
        bail!(ValidationError::InvalidPort {
            port,
            reason: format!("{port_name} cannot be 0 (reserved)")
        });
    }

    if port < 1024 {
        warn!(port, "{port_name} is a privileged port (requires root on Unix systems)");
    }

    Ok(())
}

/// Validates host address format
fn validate_host(host: &str) -> Result<()> {
    if host.is_empty() {
        bail!(ValidationError::InvalidHost {
            host: host.to_string(),
            reason: "host cannot be empty".to_string(),
        });
    }

    if host.contains(' ') {
        bail!(ValidationError::InvalidHost {
            host: host.to_string(),
            reason: "host cannot contain spaces".to_string(),
        });
    }

    if is_ip_address(host) {
        validate_ip_address(host)?;
    } else {
        validate_hostname(host)?;
    }

    Ok(())
}

/// Simple check if string looks like an IP address (contains only digits and dots)
fn is_ip_address(host: &str) -> bool {
    host.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn validate_ip_address(ip: &str) -> Result<()> {
    if ip.parse::<std::net::Ipv4Addr>().is_err() {
        bail!(ValidationError::InvalidHost {
            host: ip.to_string(),
            reason: "IP address must have 4 octets in the range 0-255".to_string(),
        });
    }
    Ok(())
}

/// Validates hostname format (basic rules)
fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.len() > 253 {
        bail!(ValidationError::InvalidHost {
            host: hostname.to_string(),
            reason: "hostname cannot exceed 253 characters".to_string(),
        });
    }

    if let Some(c) = hostname
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-')
    {
        bail!(ValidationError::InvalidHost {
            host: hostname.to_string(),
            reason: format!("hostname contains invalid character '{c}'"),
        });
    }

    if hostname.starts_with('-') || hostname.ends_with('-') {
        bail!(ValidationError::InvalidHost {
            host: hostname.to_string(),
            reason: "hostname cannot start or end with dash".to_string(),
        });
    }

    Ok(())
}

fn validate_storage_config(storage: &StorageConfig) -> Result<()> {
    let limit = storage.limits.max_documents_per_collection;
    if limit == 0 {
        bail!(ValidationError::InvalidLimit {
            value: limit,
            reason: "max_documents_per_collection cannot be 0".to_string(),
        });
    }
    Ok(())
}

fn validate_log_level(level: &str) -> Result<()> {
    if let Err(e) = EnvFilter::try_new(level) {
        bail!(ValidationError::InvalidLogLevel {
            level: level.to_string(),
            reason: e.to_string(),
        });
    }
    Ok(())
}

/// Response messages must not be blank
fn validate_messages(config: &AppConfig) -> Result<()> {
    let messages = &config.api.messages;
    for (name, message) in [
        ("internal", &messages.internal),
        ("not_found", &messages.not_found),
        ("required_id", &messages.required_id),
    ] {
        if message.trim().is_empty() {
            bail!(ValidationError::InvalidMessage {
                name: name.to_string(),
                reason: "message cannot be blank".to_string(),
            });
        }
    }
    Ok(())
}
