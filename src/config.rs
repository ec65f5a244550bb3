//! Configuration management for the RAX chat server
//!
//! Values come from built-in defaults, an optional `config.toml` in the working
//! directory, and `RAX_CHAT_*` environment overrides, in that order.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "config";
const ENV_PREFIX: &str = "RAX_CHAT";

/// Complete server configuration, loaded once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the listener binds to
    pub bind_address: String,

    /// Listening port
    pub port: u16,

    /// Room capacity. Connection attempts beyond this are turned away.
    pub max_clients: usize,

    /// Largest single read from a client socket
    pub buffer_size: usize,

    /// Display names longer than this are truncated at handshake
    pub max_username_length: usize,

    /// Lines queued per client before further lines to it are dropped
    pub outbound_queue_len: usize,

    /// How long a closing session may spend flushing queued lines
    pub writer_drain_timeout_ms: u64,

    /// Public chat and system notices
    pub chat_log_path: String,

    /// Private message exchanges
    pub private_log_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_clients: 100,
            buffer_size: 1024,
            max_username_length: 31,
            outbound_queue_len: 256,
            writer_drain_timeout_ms: 5000,
            chat_log_path: "chat_log.txt".to_string(),
            private_log_path: "private_log.txt".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("buffer_size", defaults.buffer_size as i64)?
            .set_default("max_username_length", defaults.max_username_length as i64)?
            .set_default("outbound_queue_len", defaults.outbound_queue_len as i64)?
            .set_default(
                "writer_drain_timeout_ms",
                defaults.writer_drain_timeout_ms as i64,
            )?
            .set_default("chat_log_path", defaults.chat_log_path)?
            .set_default("private_log_path", defaults.private_log_path)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_username_length == 0 {
            return Err(config::ConfigError::Message(
                "max_username_length must be greater than 0".into(),
            ));
        }

        if self.outbound_queue_len == 0 {
            return Err(config::ConfigError::Message(
                "outbound_queue_len must be greater than 0".into(),
            ));
        }

        if self.chat_log_path.is_empty() || self.private_log_path.is_empty() {
            return Err(config::ConfigError::Message(
                "log paths cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn writer_drain_timeout(&self) -> Duration {
        Duration::from_millis(self.writer_drain_timeout_ms)
    }

    pub fn chat_log(&self) -> PathBuf {
        PathBuf::from(&self.chat_log_path)
    }

    pub fn private_log(&self) -> PathBuf {
        PathBuf::from(&self.private_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_server() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_clients, 100);
        assert_eq!(config.buffer_size, 1024);
        assert_eq!(config.listen_socket(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = ServerConfig {
            max_clients: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_queue_length_is_rejected() {
        let config = ServerConfig {
            outbound_queue_len: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_log_path_is_rejected() {
        let config = ServerConfig {
            private_log_path: String::new(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
