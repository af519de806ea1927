use chrono::Utc;
use std::io::Write;
use tracing::debug;

use super::{Graph, GraphDef, GraphDefinitions, Plugin, PluginError};

/// Set (non-empty) by the agent when it asks for graph definitions
pub const META_ENV_VAR: &str = "MACKEREL_AGENT_PLUGIN_META";

const META_HEADER: &str = "# mackerel-agent-plugin";

/// What the agent asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Definitions,
    Values,
}

impl Mode {
    pub fn from_env() -> Self {
        Self::from_meta_var(std::env::var(META_ENV_VAR).ok().as_deref())
    }

    pub fn from_meta_var(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Mode::Definitions,
            _ => Mode::Values,
        }
    }
}

/// Drives a [`Plugin`] and writes the agent protocol
pub struct PluginRunner<'a, P: Plugin> {
    plugin: &'a P,
}

impl<'a, P: Plugin> PluginRunner<'a, P> {
    pub fn new(plugin: &'a P) -> Self {
        Self { plugin }
    }

    pub async fn run<W: Write>(&self, mode: Mode, out: &mut W) -> Result<(), PluginError> {
        self.run_at(mode, out, Utc::now().timestamp()).await
    }

    /// Same as [`run`](Self::run) with a fixed timestamp for value lines.
    ///
    /// Everything is fetched before the first write, so a failed API call
    /// leaves `out` untouched.
    pub async fn run_at<W: Write>(
        &self,
        mode: Mode,
        out: &mut W,
        timestamp: i64,
    ) -> Result<(), PluginError> {
        let rendered = match mode {
            Mode::Definitions => self.render_definitions().await?,
            Mode::Values => self.render_values(timestamp).await?,
        };
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    async fn render_definitions(&self) -> Result<String, PluginError> {
        let prefix = self.plugin.metric_key_prefix();
        let mut graphs = GraphDefinitions::new();

        for (key, mut graph) in self.plugin.graph_definition().await? {
            let key = prefixed(prefix, &key);
            if graph.label.is_empty() {
                graph.label = title(&key);
            }
            for metric in &mut graph.metrics {
                if metric.label.is_empty() {
                    metric.label = title(&metric.name);
                }
            }
            graphs.insert(key, graph);
        }

        let json = serde_json::to_string(&GraphDef { graphs })?;
        Ok(format!("{META_HEADER}\n{json}\n"))
    }

    async fn render_values(&self, timestamp: i64) -> Result<String, PluginError> {
        let graphs = self.plugin.graph_definition().await?;
        let values = self.plugin.fetch_metrics().await?;
        let prefix = self.plugin.metric_key_prefix();

        let mut rendered = String::new();
        let mut emitted = 0usize;
        for (key, Graph { metrics, .. }) in &graphs {
            for metric in metrics {
                let Some(value) = values.get(&metric.name) else {
                    debug!(metric = %metric.name, graph = %key, "No value for metric");
                    continue;
                };
                let name = format!("{}.{}", prefixed(prefix, key), metric.name);
                rendered.push_str(&format!("{name}\t{value:.6}\t{timestamp}\n"));
                emitted += 1;
            }
        }

        debug!(emitted, "Rendered metric values");
        Ok(rendered)
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    match (prefix.is_empty(), key.is_empty()) {
        (_, true) => prefix.to_string(),
        (true, false) => key.to_string(),
        (false, false) => format!("{prefix}.{key}"),
    }
}

/// `td.jobs` -> `Td Jobs`
fn title(key: &str) -> String {
    key.split('.')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
