//! Executor configuration.
//!
//! `ExecutorConfig` derives `Deserialize` so a host application can embed it
//! in its own config file. `from_env` covers the common case of a single
//! service endpoint supplied through the environment.

use serde::Deserialize;

use crate::error::ConfigError;

pub const ENV_BASE_ADDRESS: &str = "REQUEST_BASE_ADDRESS";
pub const ENV_AUTHORIZATION: &str = "REQUEST_AUTHORIZATION";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutorConfig {
    /// Absolute URL every request path is joined onto.
    pub base_address: String,
    /// Value of the `authorization` header sent with every request.
    #[serde(default)]
    pub authorization: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub default_headers: Vec<(String, String)>,
}

impl ExecutorConfig {
    pub fn new(base_address: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
            authorization: None,
            default_headers: Vec::new(),
        }
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_address = lookup(ENV_BASE_ADDRESS)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv(ENV_BASE_ADDRESS))?;
        let authorization = lookup(ENV_AUTHORIZATION).filter(|v| !v.is_empty());
        Ok(Self {
            base_address,
            authorization,
            default_headers: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_requires_base_address() {
        let err = ExecutorConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv(ENV_BASE_ADDRESS));
    }

    #[test]
    fn env_reads_authorization() {
        let config = ExecutorConfig::from_lookup(lookup(&[
            (ENV_BASE_ADDRESS, "https://api.example.com/"),
            (ENV_AUTHORIZATION, "Bearer abc"),
        ]))
        .unwrap();
        assert_eq!(config.base_address, "https://api.example.com/");
        assert_eq!(config.authorization.as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn empty_authorization_is_ignored() {
        let config = ExecutorConfig::from_lookup(lookup(&[
            (ENV_BASE_ADDRESS, "https://api.example.com/"),
            (ENV_AUTHORIZATION, ""),
        ]))
        .unwrap();
        assert!(config.authorization.is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"base_address":"https://api.example.com/"}"#).unwrap();
        assert_eq!(config, ExecutorConfig::new("https://api.example.com/"));
    }

    #[test]
    fn deserializes_headers_as_pairs() {
        let raw = r#"{
            "base_address": "https://api.example.com/",
            "default_headers": [["x-client", "mobile"]]
        }"#;
        let config: ExecutorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(
            config.default_headers,
            vec![("x-client".to_string(), "mobile".to_string())]
        );
    }
}
