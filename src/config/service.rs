//! Generation service connection settings

use serde::Deserialize;
use std::collections::BTreeMap;

use super::DEFAULT_ENDPOINT;

/// How to reach the generation service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// URL the prompt is POSTed to
    pub endpoint: String,
    /// Bearer token, if the service needs one
    pub api_key: Option<String>,
    /// Env var the key was read from (persisted instead of the key itself)
    pub api_key_env: Option<String>,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// TCP connect timeout
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_key_env: None,
            headers: BTreeMap::new(),
            connect_timeout_secs: 10,
        }
    }
}

/// [service] section as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileService {
    pub connect_timeout_secs: Option<u64>,
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Create from file config. `CODECAST_API_KEY` wins over `api_key_env`.
    pub fn from_file(
        endpoint: String,
        file: Option<FileService>,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let api_key = env("CODECAST_API_KEY")
            .or_else(|| file.api_key_env.as_deref().and_then(env))
            .filter(|key| !key.trim().is_empty());

        Self {
            endpoint,
            api_key,
            api_key_env: file.api_key_env,
            headers: file.headers,
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs),
        }
    }
}
