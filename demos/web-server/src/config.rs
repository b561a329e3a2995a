//! Environment-driven server configuration.

use std::net::SocketAddr;

use thiserror::Error;

const ADDR_VAR: &str = "FORGE_ADDR";
const OLLAMA_URL_VAR: &str = "FORGE_OLLAMA_URL";
const MODEL_VAR: &str = "FORGE_MODEL";

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MODEL: &str = "llama3";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Ollama base URL; `/instruct` is disabled when unset.
    pub ollama_url: Option<String>,
    /// Model name passed to Ollama.
    pub model: String,
}

impl ServerConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let ollama_url = lookup(OLLAMA_URL_VAR).filter(|url| !url.trim().is_empty());

        let model = match lookup(MODEL_VAR) {
            Some(model) if model.trim().is_empty() => {
                return Err(ConfigError::Empty { var: MODEL_VAR });
            }
            Some(model) => model,
            None => DEFAULT_MODEL.to_string(),
        };

        Ok(Self {
            addr,
            ollama_url,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert_eq!(config.ollama_url, None);
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("FORGE_ADDR", "0.0.0.0:9000"),
            ("FORGE_OLLAMA_URL", "http://localhost:11434"),
            ("FORGE_MODEL", "llama3.1"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.ollama_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.model, "llama3.1");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("FORGE_ADDR", "localhost")]),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            config(&[("FORGE_MODEL", " ")]),
            Err(ConfigError::Empty { .. })
        ));
    }
}
