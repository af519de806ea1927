//! Mackerel agent plugin contract
//!
//! A plugin declares its graphs ([`GraphDefinitions`]) and reports a flat
//! sample of metric values ([`MetricValues`]). [`PluginRunner`] turns both
//! into the text protocol the agent reads from the plugin's stdout.

mod runner;

pub use runner::{META_ENV_VAR, Mode, PluginRunner};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::CollectError;

/// Metric name to current value
pub type MetricValues = IndexMap<String, f64>;

/// Graph key (without prefix) to graph
pub type GraphDefinitions = IndexMap<String, Graph>;

/// One metric series inside a graph
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Metric {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub diff: bool,
    #[serde(default)]
    pub stacked: bool,
}

impl Metric {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            diff: false,
            stacked: false,
        }
    }
}

/// A display group of metrics
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Graph {
    pub label: String,
    pub unit: String,
    pub metrics: Vec<Metric>,
}

impl Graph {
    pub fn integer(label: impl Into<String>, metrics: Vec<Metric>) -> Self {
        Self {
            label: label.into(),
            unit: "integer".to_string(),
            metrics,
        }
    }
}

/// Body of the definitions line: `{"graphs": {...}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphDef {
    pub graphs: GraphDefinitions,
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("failed to write plugin output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode graph definitions: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A metrics source the agent can query
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Graphs and the metrics each one displays
    async fn graph_definition(&self) -> Result<GraphDefinitions, CollectError>;

    /// Current value of every metric
    async fn fetch_metrics(&self) -> Result<MetricValues, CollectError>;

    /// Namespace prepended to every graph and metric key
    fn metric_key_prefix(&self) -> &str;
}
