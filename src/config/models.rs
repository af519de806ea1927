use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::collector::DEFAULT_PREFIX;
use crate::td::{ClientConfig, DEFAULT_ENDPOINT};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
}

/// Treasure Data API access
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key (loaded from environment or CLI, never from the config file)
    #[serde(skip)]
    pub api_key: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientConfig::default()
        };
        if let Some(ref user_agent) = self.user_agent {
            client.user_agent = user_agent.clone();
        }
        client
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Metric naming
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginConfig {
    #[serde(default = "default_metric_key_prefix")]
    pub metric_key_prefix: String,
    /// Key table metrics as `<database>_<table>` instead of the bare table name
    #[serde(default)]
    pub qualify_table_names: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            metric_key_prefix: default_metric_key_prefix(),
            qualify_table_names: false,
        }
    }
}

fn default_metric_key_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
