//! Treasure Data REST API access
//!
//! Only the three read-only list calls the collector needs are covered.
//! The [`TreasureDataApi`] trait is the seam the collector is written
//! against; [`TdClient`] is the HTTP implementation.

mod client;
mod models;

pub use client::{ClientConfig, TdClient};
pub use models::{
    Database, Job, JobStatus, ListDatabasesResponse, ListJobsResponse, ListTablesResponse,
    Table,
};

use async_trait::async_trait;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.treasuredata.com";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {message}")]
    Request { path: String, message: String },

    #[error("request to {path} timed out")]
    Timeout { path: String },

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Read-only list operations of the Treasure Data API
#[async_trait]
pub trait TreasureDataApi: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<Database>>;

    async fn list_tables(&self, database: &str) -> Result<Vec<Table>>;

    async fn list_jobs(&self) -> Result<Vec<Job>>;
}
