//! Live tests against a running Neo4j over the HTTP Query API.
//!
//! Skipped unless NEO4J_TEST_URI is set (e.g. bolt://localhost:7687).
//! Credentials come from NEO4J_TEST_USERNAME and NEO4J_TEST_PASSWORD.

use cypher_cells::config::ConnectionConfig;
use cypher_cells::db::{connect, GraphClient, QueryParams, Value};
use cypher_cells::query::{CellExecutor, CellOptions, CellOutcome};
use cypher_cells::safety::QueryType;

/// Helper to get the test connection config from the environment.
fn get_test_config() -> Option<ConnectionConfig> {
    let uri = std::env::var("NEO4J_TEST_URI").ok()?;
    let mut config = ConnectionConfig::from_connection_string(&uri).ok()?;
    if let Ok(user) = std::env::var("NEO4J_TEST_USERNAME") {
        config.username = Some(user);
    }
    if let Ok(password) = std::env::var("NEO4J_TEST_PASSWORD") {
        config.password = Some(password);
    }
    Some(config)
}

/// Helper to create a test client.
async fn get_test_client() -> Option<Box<dyn GraphClient>> {
    let config = get_test_config()?;
    connect(&config, 30).await.ok()
}

#[tokio::test]
async fn test_inspect_read_and_write() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };
    let params = QueryParams::new();

    let read = client
        .inspect("MATCH (n) RETURN n LIMIT 1", &params)
        .await
        .unwrap();
    assert_eq!(read, QueryType::Read);

    let write = client
        .inspect("CREATE (n:CypherCellsTest) RETURN n", &params)
        .await
        .unwrap();
    assert!(!write.is_read_only());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_run_returns_rows() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };

    let mut params = QueryParams::new();
    params.insert("x".to_string(), serde_json::json!(41));
    let result = client
        .run("RETURN $x + 1 AS answer, 'hi' AS greeting", &params)
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["answer", "greeting"]);
    assert_eq!(result.get(0, "answer"), Some(&Value::Int(42)));
    assert_eq!(result.get(0, "greeting"), Some(&Value::from("hi")));
}

#[tokio::test]
async fn test_write_cell_is_blocked_live() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };
    let params = QueryParams::new();

    let outcome = CellExecutor::new(client.as_ref(), &params)
        .execute(
            "MATCH (n) RETURN n LIMIT 1;\nCREATE (m:CypherCellsTest) RETURN m",
            CellOptions::default(),
        )
        .await;

    let CellOutcome::Blocked(rejection) = outcome else {
        panic!("Expected the cell to be blocked, got {:?}", outcome);
    };
    assert_eq!(rejection.position, 2);
}

#[tokio::test]
async fn test_syntax_error_is_classification_error() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };

    let err = client
        .inspect("MATCH (n RETURN n", &QueryParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.category(), "Classification Error");
}
