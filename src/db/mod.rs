//! Graph database abstraction layer for cypher-cells.
//!
//! Provides trait-based interfaces for the two capabilities a cell needs:
//! non-mutating inspection (EXPLAIN) and execution. Backends implement both
//! through [`GraphClient`]; tests stub them with [`MockGraphClient`].

mod http;
mod mock;
mod plan;
mod types;

pub use http::HttpGraphClient;
pub use mock::{MockConnector, MockGraphClient};
pub use plan::{classify_plan, PlanNode};
pub use types::{Counters, Node, QueryParams, QueryResult, Relationship, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::safety::QueryType;
use async_trait::async_trait;

/// Classification oracle: reports the query type of a statement without
/// mutating data.
#[async_trait]
pub trait QueryInspector: Send + Sync {
    /// Inspects a statement with EXPLAIN and returns its query type.
    ///
    /// Parameters are only used for syntax validation.
    async fn inspect(&self, statement: &str, params: &QueryParams) -> Result<QueryType>;
}

/// Execution capability: runs a statement and collects its result.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Executes a statement and returns rows, columns and counters.
    async fn run(&self, statement: &str, params: &QueryParams) -> Result<QueryResult>;
}

/// A live connection to a graph database.
#[async_trait]
pub trait GraphClient: QueryInspector + QueryRunner {
    /// Checks that the server is reachable and the credentials are valid.
    async fn verify_connectivity(&self) -> Result<()>;

    /// Closes the connection.
    async fn close(&self) -> Result<()>;
}

/// Opens graph clients for connection configurations.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn GraphClient>>;
}

/// Connector for the Neo4j HTTP Query API.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout_secs: u64,
}

impl HttpConnector {
    /// Creates a connector whose clients use the given request timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(http::DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn GraphClient>> {
        connect(config, self.timeout_secs).await
    }
}

/// Creates a graph client for the given configuration and verifies it.
///
/// This is the central factory function for database connections.
pub async fn connect(
    config: &ConnectionConfig,
    timeout_secs: u64,
) -> Result<Box<dyn GraphClient>> {
    let client = HttpGraphClient::new(config, timeout_secs)?;
    client.verify_connectivity().await?;
    Ok(Box::new(client))
}
