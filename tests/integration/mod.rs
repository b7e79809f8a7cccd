//! Integration tests for cypher-cells.
//!
//! Notebook scenarios run against the mock client. Live tests need a
//! running Neo4j; set NEO4J_TEST_URI (and NEO4J_TEST_PASSWORD) to run them.

pub mod connection_test;
pub mod live_test;
pub mod notebook_test;
pub mod splitter_test;

use std::sync::Arc;

use cypher_cells::config::ConnectionConfig;
use cypher_cells::connection::ConnectionManager;
use cypher_cells::db::{MockConnector, MockGraphClient};
use cypher_cells::notebook::Notebook;

/// Session config with every field set, so the environment never leaks in.
pub fn session_config() -> ConnectionConfig {
    ConnectionConfig {
        uri: Some("bolt://localhost:7687".to_string()),
        username: Some("neo4j".to_string()),
        password: Some("secret".to_string()),
        database: Some("neo4j".to_string()),
        http_url: None,
    }
}

/// A notebook backed by the given mock client.
///
/// Returns the connector too, so tests can inspect connection attempts.
pub fn notebook_with(client: &MockGraphClient) -> (Notebook, MockConnector) {
    let connector = MockConnector::new(client.clone());
    let manager = ConnectionManager::new(Arc::new(connector.clone()))
        .with_default_config(session_config());
    (Notebook::new(manager), connector)
}
