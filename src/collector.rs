//! Treasure Data metrics collector
//!
//! Reports per-database and per-table record counts, their total, and the
//! number of queued/running jobs. Nothing is cached: every call re-reads the
//! API, so graphs follow databases and tables as they come and go.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PluginConfig;
use crate::plugin::{Graph, GraphDefinitions, Metric, MetricValues, Plugin};
use crate::td::{ApiError, Database, Job, JobStatus, Table, TreasureDataApi};

pub const DEFAULT_PREFIX: &str = "td";

pub const TOTAL_RECORDS: &str = "total_records";
pub const QUEUED: &str = "queued";
pub const RUNNING: &str = "running";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Treasure Data API call failed: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, CollectError>;

/// Collector over any [`TreasureDataApi`]
pub struct TdPlugin<'a, A: TreasureDataApi> {
    api: &'a A,
    prefix: String,
    qualify_table_names: bool,
}

impl<'a, A: TreasureDataApi> TdPlugin<'a, A> {
    pub fn new(api: &'a A, config: &PluginConfig) -> Self {
        Self {
            api,
            prefix: config.metric_key_prefix.clone(),
            qualify_table_names: config.qualify_table_names,
        }
    }

    /// Metric key for a table.
    ///
    /// Bare table names are shared across databases, so by default two
    /// databases holding a table of the same name report into one key and
    /// the one listed last wins.
    fn table_key(&self, database: &Database, table: &Table) -> String {
        if self.qualify_table_names {
            format!("{}_{}", database.name, table.name)
        } else {
            table.name.clone()
        }
    }

    async fn databases_with_tables(&self) -> Result<Vec<(Database, Vec<Table>)>> {
        let databases = self.api.list_databases().await?;
        let mut out = Vec::with_capacity(databases.len());
        for database in databases {
            let tables = self.api.list_tables(&database.name).await?;
            debug!(database = %database.name, tables = tables.len(), "Listed tables");
            out.push((database, tables));
        }
        Ok(out)
    }
}

fn db_key(database: &Database) -> String {
    format!("db_{}", database.name)
}

fn count_jobs(jobs: &[Job], status: &JobStatus) -> usize {
    jobs.iter().filter(|job| &job.status == status).count()
}

#[async_trait]
impl<'a, A: TreasureDataApi> Plugin for TdPlugin<'a, A> {
    async fn graph_definition(&self) -> Result<GraphDefinitions> {
        let mut graphs = GraphDefinitions::new();
        let mut db_metrics = Vec::new();

        for (database, tables) in self.databases_with_tables().await? {
            db_metrics.push(Metric::new(db_key(&database), database.name.clone()));

            let table_metrics = tables
                .iter()
                .map(|table| Metric::new(self.table_key(&database, table), table.name.clone()))
                .collect();

            graphs.insert(
                database.name.clone(),
                Graph::integer(format!("Count {} records", database.name), table_metrics),
            );
        }

        graphs.insert(
            TOTAL_RECORDS.to_string(),
            Graph::integer(
                "Count total records",
                vec![Metric::new(TOTAL_RECORDS, "Total Records")],
            ),
        );
        graphs.insert(
            "jobs".to_string(),
            Graph::integer(
                "Count running/queued jobs",
                vec![Metric::new(QUEUED, "Queued"), Metric::new(RUNNING, "Running")],
            ),
        );
        graphs.insert(
            "records".to_string(),
            Graph::integer("Count DB records", db_metrics),
        );

        Ok(graphs)
    }

    async fn fetch_metrics(&self) -> Result<MetricValues> {
        let jobs = self.api.list_jobs().await?;

        let mut stat = MetricValues::new();
        stat.insert(QUEUED.to_string(), 0.0);
        stat.insert(RUNNING.to_string(), 0.0);
        stat.insert(TOTAL_RECORDS.to_string(), 0.0);

        let mut total: u64 = 0;
        for (database, tables) in self.databases_with_tables().await? {
            stat.insert(db_key(&database), database.count as f64);
            total = total.saturating_add(database.count);

            for table in &tables {
                stat.insert(self.table_key(&database, table), table.count as f64);
            }
        }
        stat.insert(TOTAL_RECORDS.to_string(), total as f64);

        let queued = count_jobs(&jobs, &JobStatus::Queued);
        let running = count_jobs(&jobs, &JobStatus::Running);
        stat.insert(QUEUED.to_string(), queued as f64);
        stat.insert(RUNNING.to_string(), running as f64);

        info!(
            total_records = total,
            queued,
            running,
            metrics = stat.len(),
            "Collected Treasure Data metrics"
        );

        Ok(stat)
    }

    fn metric_key_prefix(&self) -> &str {
        if self.prefix.is_empty() {
            DEFAULT_PREFIX
        } else {
            &self.prefix
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::td;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeApi {
        databases: Vec<Database>,
        tables: HashMap<String, Vec<Table>>,
        jobs: Vec<Job>,
        fail_databases: bool,
        fail_tables: bool,
        fail_jobs: bool,
    }

    impl FakeApi {
        fn with_database(mut self, name: &str, count: u64, tables: &[(&str, u64)]) -> Self {
            self.databases.push(Database::new(name, count));
            self.tables.insert(
                name.to_string(),
                tables.iter().map(|(t, c)| Table::new(*t, *c)).collect(),
            );
            self
        }

        fn with_jobs(mut self, statuses: &[&str]) -> Self {
            for status in statuses {
                self.jobs.push(Job::new(*status));
            }
            self
        }
    }

    fn unavailable(path: &str) -> ApiError {
        ApiError::Status {
            path: path.to_string(),
            status: 503,
            body: "Service Unavailable".to_string(),
        }
    }

    #[async_trait]
    impl TreasureDataApi for FakeApi {
        async fn list_databases(&self) -> td::Result<Vec<Database>> {
            if self.fail_databases {
                return Err(unavailable("/v3/database/list"));
            }
            Ok(self.databases.clone())
        }

        async fn list_tables(&self, database: &str) -> td::Result<Vec<Table>> {
            if self.fail_tables {
                return Err(unavailable("/v3/table/list"));
            }
            Ok(self.tables.get(database).cloned().unwrap_or_default())
        }

        async fn list_jobs(&self) -> td::Result<Vec<Job>> {
            if self.fail_jobs {
                return Err(unavailable("/v3/job/list"));
            }
            Ok(self.jobs.clone())
        }
    }

    fn plugin_config(prefix: &str, qualify: bool) -> PluginConfig {
        PluginConfig {
            metric_key_prefix: prefix.to_string(),
            qualify_table_names: qualify,
        }
    }

    fn sample_api() -> FakeApi {
        FakeApi::default()
            .with_database("web", 300, &[("access", 200), ("errors", 100)])
            .with_database("batch", 50, &[("runs", 50)])
            .with_jobs(&["queued", "running", "queued", "success", "error", "killed"])
    }

    #[tokio::test]
    async fn test_fetch_metrics() {
        let api = sample_api();
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        let stat = plugin.fetch_metrics().await.unwrap();

        assert_eq!(stat["db_web"], 300.0);
        assert_eq!(stat["db_batch"], 50.0);
        assert_eq!(stat["access"], 200.0);
        assert_eq!(stat["errors"], 100.0);
        assert_eq!(stat["runs"], 50.0);
        assert_eq!(stat[TOTAL_RECORDS], 350.0);
        assert_eq!(stat[QUEUED], 2.0);
        assert_eq!(stat[RUNNING], 1.0);
        assert_eq!(stat.len(), 8);
    }

    #[tokio::test]
    async fn test_total_is_sum_of_database_counts() {
        let api = FakeApi::default()
            .with_database("a", 1, &[])
            .with_database("b", 20, &[])
            .with_database("c", 300, &[("t", 7)]);
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        let stat = plugin.fetch_metrics().await.unwrap();

        let db_sum: f64 = stat
            .iter()
            .filter(|(k, _)| k.starts_with("db_"))
            .map(|(_, v)| v)
            .sum();
        assert_eq!(stat[TOTAL_RECORDS], db_sum);
        assert_eq!(stat[TOTAL_RECORDS], 321.0);
    }

    #[tokio::test]
    async fn test_job_status_matching_is_exact() {
        let api = FakeApi::default().with_jobs(&["Queued", "RUNNING", "running ", "waiting"]);
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        let stat = plugin.fetch_metrics().await.unwrap();

        assert_eq!(stat[QUEUED], 0.0);
        assert_eq!(stat[RUNNING], 0.0);
    }

    #[tokio::test]
    async fn test_empty_account() {
        let api = FakeApi::default();
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        let stat = plugin.fetch_metrics().await.unwrap();
        assert_eq!(stat.len(), 3);
        assert_eq!(stat[TOTAL_RECORDS], 0.0);
        assert_eq!(stat[QUEUED], 0.0);
        assert_eq!(stat[RUNNING], 0.0);

        let graphs = plugin.graph_definition().await.unwrap();
        assert!(graphs["records"].metrics.is_empty());
        let keys: Vec<&str> = graphs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["total_records", "jobs", "records"]);
    }

    #[tokio::test]
    async fn test_same_table_name_in_two_databases_collides() {
        let api = FakeApi::default()
            .with_database("first", 10, &[("events", 10)])
            .with_database("second", 99, &[("events", 99)]);
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        let stat = plugin.fetch_metrics().await.unwrap();
        assert_eq!(stat["events"], 99.0);
        assert_eq!(stat.keys().filter(|k| k.as_str() == "events").count(), 1);

        let graphs = plugin.graph_definition().await.unwrap();
        assert_eq!(graphs["first"].metrics[0].name, "events");
        assert_eq!(graphs["second"].metrics[0].name, "events");
    }

    #[tokio::test]
    async fn test_qualified_table_names_do_not_collide() {
        let api = FakeApi::default()
            .with_database("first", 10, &[("events", 10)])
            .with_database("second", 99, &[("events", 99)]);
        let plugin = TdPlugin::new(&api, &plugin_config("td", true));

        let stat = plugin.fetch_metrics().await.unwrap();
        assert_eq!(stat["first_events"], 10.0);
        assert_eq!(stat["second_events"], 99.0);
        assert!(!stat.contains_key("events"));

        let graphs = plugin.graph_definition().await.unwrap();
        assert_eq!(graphs["first"].metrics[0].name, "first_events");
        assert_eq!(graphs["first"].metrics[0].label, "events");
    }

    #[tokio::test]
    async fn test_graph_definition() {
        let api = sample_api();
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        let graphs = plugin.graph_definition().await.unwrap();

        let keys: Vec<&str> = graphs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["web", "batch", "total_records", "jobs", "records"]);

        let web = &graphs["web"];
        assert_eq!(web.label, "Count web records");
        assert_eq!(web.unit, "integer");
        assert_eq!(
            web.metrics,
            vec![Metric::new("access", "access"), Metric::new("errors", "errors")]
        );

        assert_eq!(
            graphs["records"].metrics,
            vec![Metric::new("db_web", "web"), Metric::new("db_batch", "batch")]
        );
        assert_eq!(
            graphs["total_records"].metrics,
            vec![Metric::new("total_records", "Total Records")]
        );
        assert_eq!(graphs["jobs"].label, "Count running/queued jobs");
        assert_eq!(
            graphs["jobs"].metrics,
            vec![Metric::new("queued", "Queued"), Metric::new("running", "Running")]
        );
    }

    #[test]
    fn test_metric_key_prefix() {
        let api = FakeApi::default();

        let plugin = TdPlugin::new(&api, &plugin_config("", false));
        assert_eq!(plugin.metric_key_prefix(), "td");

        let plugin = TdPlugin::new(&api, &plugin_config(" Treasure.Data ", false));
        assert_eq!(plugin.metric_key_prefix(), " Treasure.Data ");
    }

    #[tokio::test]
    async fn test_any_failing_call_aborts_collection() {
        for (dbs, tables, jobs) in [(true, false, false), (false, true, false), (false, false, true)] {
            let mut api = sample_api();
            api.fail_databases = dbs;
            api.fail_tables = tables;
            api.fail_jobs = jobs;
            let plugin = TdPlugin::new(&api, &plugin_config("td", false));

            let result = plugin.fetch_metrics().await;
            assert!(matches!(
                result,
                Err(CollectError::Api(ApiError::Status { status: 503, .. }))
            ));
        }
    }

    #[tokio::test]
    async fn test_graph_definition_fails_on_table_error() {
        let mut api = sample_api();
        api.fail_tables = true;
        let plugin = TdPlugin::new(&api, &plugin_config("td", false));

        assert!(plugin.graph_definition().await.is_err());
    }
}
