/// Server Configuration
///
/// All settings come from environment variables (optionally loaded from a
/// `.env` file at startup):
/// - SERVER_NAME: Name of the server (default: "mcp-echo")
/// - SERVER_VERSION: Version string (default: crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "http")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 8000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, max 16)

use std::str::FromStr;

use crate::core::error::ConfigError;

pub const DEFAULT_SERVER_NAME: &str = "mcp-echo";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Which transports the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP with Actix Web
    Http,
    /// STDIO and HTTP concurrently
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = lookup("SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
        let version =
            lookup("SERVER_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        let transport = match lookup("MCP_TRANSPORT_MODE") {
            Some(mode) => mode.parse()?,
            None => TransportMode::Http,
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        // Defaults to CPU count but capped at 16 to avoid excessive context switching
        let workers = match lookup("WORKER_THREADS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "WORKER_THREADS",
                        value: raw,
                    });
                }
            },
            None => num_cpus::get().clamp(1, 16),
        };

        Ok(Self {
            name,
            version,
            transport,
            host,
            port,
            workers,
        })
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.name, "mcp-echo");
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.transport, TransportMode::Http);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert!((1..=16).contains(&config.workers));
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("SERVER_NAME", "echo-test"),
            ("MCP_TRANSPORT_MODE", "Both"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("WORKER_THREADS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.name, "echo-test");
        assert_eq!(config.transport, TransportMode::Both);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ServerConfig::from_lookup(lookup_from(&[("MCP_TRANSPORT_MODE", "carrier-pigeon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTransport(_)));

        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "99999")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = ServerConfig::from_lookup(lookup_from(&[("WORKER_THREADS", "0")])).unwrap_err();
        assert!(err.to_string().contains("WORKER_THREADS"));
    }
}
