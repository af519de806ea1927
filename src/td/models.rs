//! Response bodies of the list endpoints.
//!
//! Only the fields the collector reads are decoded; everything else the API
//! sends (ids, timestamps, permissions, schemas) is ignored.

use serde::Deserialize;
use std::fmt;

/// A database as returned by `GET /v3/database/list`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Database {
    pub name: String,
    /// Number of records across all tables of the database
    #[serde(default)]
    pub count: u64,
}

impl Database {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListDatabasesResponse {
    #[serde(default)]
    pub databases: Vec<Database>,
}

/// A table as returned by `GET /v3/table/list/<database>`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

impl Table {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListTablesResponse {
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// Job status. Statuses the API adds later are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Error,
    Killed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
            JobStatus::Killed => "killed",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        // Case-sensitive: "Queued" is not "queued".
        match value.as_str() {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "success" => JobStatus::Success,
            "error" => JobStatus::Error,
            "killed" => JobStatus::Killed,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        JobStatus::from(value.to_string())
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job as returned by `GET /v3/job/list`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub status: JobStatus,
}

impl Job {
    pub fn new(status: impl Into<JobStatus>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListJobsResponse {
    #[serde(default)]
    pub jobs: Vec<Job>,
}
