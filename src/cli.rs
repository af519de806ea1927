use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Treasure Data plugin for mackerel-agent
///
/// Prints metric values, or graph definitions when
/// MACKEREL_AGENT_PLUGIN_META is set.
#[derive(Parser, Debug, Default)]
#[command(name = "mackerel-plugin-td")]
#[command(about = "Treasure Data metrics plugin for mackerel-agent", long_about = None)]
pub struct Cli {
    /// Metric key prefix
    #[arg(long = "metric-key-prefix")]
    pub metric_key_prefix: Option<String>,

    /// Treasure Data API key (defaults to $TD_API_KEY)
    #[arg(long = "td-apikey", visible_alias = "api-key")]
    pub api_key: Option<String>,

    /// Treasure Data API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Key table metrics as <database>_<table> so equally named tables in
    /// different databases do not overwrite each other
    #[arg(long)]
    pub qualify_table_names: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Apply flags given on the command line on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref prefix) = self.metric_key_prefix {
            config.plugin.metric_key_prefix = prefix.clone();
        }
        if let Some(ref api_key) = self.api_key {
            config.api.api_key = api_key.clone();
        }
        if let Some(ref endpoint) = self.endpoint {
            config.api.endpoint = endpoint.clone();
        }
        if self.qualify_table_names {
            config.plugin.qualify_table_names = true;
        }
    }
}
