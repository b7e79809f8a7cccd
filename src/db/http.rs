//! Neo4j HTTP Query API client.
//!
//! Talks to `POST {base}/db/{database}/query/v2` with basic authentication.
//! Inspection sends `EXPLAIN <statement>` and classifies the returned plan.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{CypherError, Result};
use crate::safety::QueryType;

use super::plan::{classify_plan, PlanNode};
use super::types::{Counters, QueryParams, QueryResult, Value};
use super::{GraphClient, QueryInspector, QueryRunner};

/// Default timeout for API requests.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Graph client backed by the HTTP Query API.
#[derive(Debug, Clone)]
pub struct HttpGraphClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl HttpGraphClient {
    /// Creates a client for the given connection configuration.
    ///
    /// No request is made until the first call.
    pub fn new(config: &ConnectionConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CypherError::connection(format!("Failed to create HTTP client: {}", e)))?;

        let base = config.http_base_url()?;
        let endpoint = format!(
            "{}/db/{}/query/v2",
            base.trim_end_matches('/'),
            config.database_name()
        );

        Ok(Self {
            client,
            endpoint,
            username: config.username().to_string(),
            password: config.password().to_string(),
        })
    }

    /// Returns the Query API endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a statement and returns the decoded response body.
    async fn post(&self, statement: &str, params: &QueryParams) -> Result<QueryResponse> {
        let request = QueryRequest {
            statement,
            parameters: params,
            include_counters: true,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CypherError::connection("Request timed out. Try again.")
                } else if e.is_connect() {
                    CypherError::connection(format!(
                        "Failed to connect to {}. Is Neo4j running?",
                        self.endpoint
                    ))
                } else {
                    CypherError::connection(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CypherError::connection(format!("Failed to read response: {}", e)))?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CypherError::connection(format!(
                "Authentication failed ({}). Check the username and password.",
                status
            )));
        }

        // Error responses still carry a JSON body with `errors`.
        let parsed: QueryResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                CypherError::query(format!("Failed to parse response: {}", e))
            } else {
                CypherError::query(format!("Server error ({}): {}", status, body))
            }
        })?;

        if let Some(error) = parsed.errors.first() {
            return Err(map_server_error(error));
        }

        if !status.is_success() {
            return Err(CypherError::query(format!("Server error ({})", status)));
        }

        Ok(parsed)
    }
}

/// Maps a server error to the crate error type.
fn map_server_error(error: &ServerError) -> CypherError {
    if error.code.contains("Security") {
        CypherError::connection(format!("{}: {}", error.code, error.message))
    } else {
        CypherError::query(format!("{}: {}", error.code, error.message))
    }
}

#[async_trait]
impl QueryInspector for HttpGraphClient {
    async fn inspect(&self, statement: &str, params: &QueryParams) -> Result<QueryType> {
        let explain = format!("EXPLAIN {}", statement);
        let response = self.post(&explain, params).await.map_err(|e| match e {
            CypherError::Query(msg) => CypherError::classification(msg),
            other => other,
        })?;

        let plan = response.query_plan.ok_or_else(|| {
            CypherError::classification("EXPLAIN returned no query plan")
        })?;

        let query_type = classify_plan(&plan);
        debug!("EXPLAIN plan root {} -> {}", plan.operator_type, query_type);
        Ok(query_type)
    }
}

#[async_trait]
impl QueryRunner for HttpGraphClient {
    async fn run(&self, statement: &str, params: &QueryParams) -> Result<QueryResult> {
        let start = Instant::now();
        let response = self.post(statement, params).await?;
        let elapsed = start.elapsed();

        let data = response.data.unwrap_or_default();
        let rows = data
            .values
            .into_iter()
            .map(|row| row.into_iter().map(Value::from_json).collect())
            .collect();

        Ok(QueryResult::with_data(data.fields, rows)
            .with_counters(response.counters.unwrap_or_default())
            .with_execution_time(elapsed))
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn verify_connectivity(&self) -> Result<()> {
        self.post("RETURN 1", &QueryParams::new()).await?;
        debug!("Verified connectivity to {}", self.endpoint);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // HTTP connections are pooled by reqwest and dropped with the client.
        Ok(())
    }
}

// Query API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    statement: &'a str,
    parameters: &'a QueryParams,
    include_counters: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    counters: Option<Counters>,
    #[serde(default)]
    query_plan: Option<PlanNode>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseData {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}
