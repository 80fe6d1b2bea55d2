use std::{env, net::SocketAddr, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// `0` asks the OS for an ephemeral port.
    pub bind_port: u16,
    pub fixtures_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MOCK_RPC_BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 0,
            fixtures_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = env::var("MOCK_RPC_BIND_ADDR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.bind_addr);
        let bind_port = env::var("MOCK_RPC_BIND_PORT")
            .ok()
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort)
            })
            .transpose()?
            .unwrap_or(defaults.bind_port);
        let fixtures_path = env::var("MOCK_RPC_FIXTURES")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let config = Self {
            bind_addr,
            bind_port,
            fixtures_path,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-wide, so everything env-related runs in one test.
    #[test]
    fn from_env_reads_overrides_and_rejects_bad_values() {
        env::remove_var("MOCK_RPC_BIND_ADDR");
        env::remove_var("MOCK_RPC_BIND_PORT");
        env::remove_var("MOCK_RPC_FIXTURES");

        let config = ServerConfig::from_env().expect("config should parse");
        assert_eq!(config, ServerConfig::default());

        env::set_var("MOCK_RPC_BIND_ADDR", "0.0.0.0");
        env::set_var("MOCK_RPC_BIND_PORT", "8545");
        env::set_var("MOCK_RPC_FIXTURES", "fixtures.json");
        let config = ServerConfig::from_env().expect("config should parse");
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.bind_port, 8545);
        assert_eq!(config.fixtures_path, Some(PathBuf::from("fixtures.json")));

        env::set_var("MOCK_RPC_BIND_PORT", "70000");
        let err = ServerConfig::from_env().expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));

        env::set_var("MOCK_RPC_BIND_PORT", "8545");
        env::set_var("MOCK_RPC_BIND_ADDR", "not an address");
        let err = ServerConfig::from_env().expect_err("expected invalid socket error");
        assert!(matches!(err, ConfigError::InvalidSocket));

        env::remove_var("MOCK_RPC_BIND_ADDR");
        env::remove_var("MOCK_RPC_BIND_PORT");
        env::remove_var("MOCK_RPC_FIXTURES");
    }

    #[test]
    fn default_binds_ephemeral_loopback() {
        let socket = ServerConfig::default().bind_socket().expect("valid socket");
        assert!(socket.ip().is_loopback());
        assert_eq!(socket.port(), 0);
    }
}
