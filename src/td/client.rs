//! HTTP client for the Treasure Data API

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::{
    Database, Job, ListDatabasesResponse, ListJobsResponse, ListTablesResponse, Table,
};
use super::{ApiError, DEFAULT_ENDPOINT, Result, TreasureDataApi};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: concat!("mptd/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Treasure Data API client
///
/// Every call is a single attempt. Failures are returned to the caller
/// as-is; there is no retry.
pub struct TdClient {
    client: Client,
    endpoint: Url,
    authorization: String,
}

impl TdClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(ApiError::InvalidEndpoint(config.endpoint));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Request {
                path: config.endpoint.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            authorization: format!("TD1 {}", config.api_key),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build `<endpoint>/v3/<segments...>`, percent-encoding each segment
    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push("v3")
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url_for(segments)?;
        let path = url.path().to_string();

        debug!(path = %path, "Calling Treasure Data API");

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, &self.authorization)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout { path: path.clone() }
                } else {
                    ApiError::Request {
                        path: path.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Request {
            path: path.clone(),
            message: format!("failed to read body: {}", e),
        })?;

        debug!(path = %path, status = status.as_u16(), size = body.len(), "API response");

        if !status.is_success() {
            return Err(status_error(path, status, body));
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { path, source })
    }
}

fn status_error(path: String, status: StatusCode, body: String) -> ApiError {
    let body = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown").to_string()
    } else {
        body
    };
    ApiError::Status {
        path,
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl TreasureDataApi for TdClient {
    async fn list_databases(&self) -> Result<Vec<Database>> {
        let resp: ListDatabasesResponse = self.get_json(&["database", "list"]).await?;
        Ok(resp.databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<Table>> {
        let resp: ListTablesResponse = self.get_json(&["table", "list", database]).await?;
        Ok(resp.tables)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let resp: ListJobsResponse = self.get_json(&["job", "list"]).await?;
        Ok(resp.jobs)
    }
}
