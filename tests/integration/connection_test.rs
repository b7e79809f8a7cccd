//! `%neo4j` connection management and one-off connections.

use std::io::Write;
use std::sync::Arc;

use cypher_cells::connection::ConnectionManager;
use cypher_cells::db::{MockConnector, MockGraphClient};
use cypher_cells::notebook::Notebook;
use cypher_cells::render::Display;

use super::{notebook_with, session_config};

fn status(displays: &[Display]) -> (bool, String) {
    match displays {
        [Display::Status { connected, message }] => (*connected, message.clone()),
        other => panic!("Expected a status display, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_before_connecting() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let (connected, message) = status(&nb.run_cell("%neo4j --status").await);

    assert!(!connected);
    assert_eq!(message, "Not connected. Use %neo4j to connect.");
}

#[tokio::test]
async fn test_connect_with_uri_credentials() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    let (connected, message) = status(
        &nb.run_cell("%neo4j bolt://alice:pw@graph.local:7687/movies")
            .await,
    );

    assert!(connected);
    assert_eq!(
        message,
        "Connected to alice @ bolt://graph.local:7687 (database: movies)"
    );
    let config = &connector.connections()[0];
    assert_eq!(config.uri.as_deref(), Some("bolt://graph.local:7687"));
    assert_eq!(config.password.as_deref(), Some("pw"));

    let (_, message) = status(&nb.run_cell("%neo4j --status").await);
    assert_eq!(
        message,
        "Connected to bolt://graph.local:7687 as alice (database: movies)"
    );
}

#[tokio::test]
async fn test_flags_override_uri_credentials() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    nb.run_cell("%neo4j bolt://alice:pw@graph.local:7687 -u bob -d films")
        .await;

    let config = &connector.connections()[0];
    assert_eq!(config.username.as_deref(), Some("bob"));
    assert_eq!(config.password.as_deref(), Some("pw"));
    assert_eq!(config.database.as_deref(), Some("films"));
}

#[tokio::test]
async fn test_reconnect_closes_previous_client() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    nb.run_cell("%neo4j bolt://a:7687 -u neo4j -p pw").await;
    nb.run_cell("%neo4j bolt://b:7687 -u neo4j -p pw").await;

    assert_eq!(client.close_count(), 1);
    assert_eq!(nb.connections().status().uri.as_deref(), Some("bolt://b:7687"));
}

#[tokio::test]
async fn test_close() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    nb.run_cell("%neo4j bolt://a:7687 -u neo4j -p pw").await;
    let (connected, message) = status(&nb.run_cell("%neo4j --close").await);
    assert!(!connected);
    assert_eq!(message, "Connection closed.");
    assert_eq!(client.close_count(), 1);
    assert!(!nb.connections().is_connected());

    let (_, message) = status(&nb.run_cell("%neo4j --close").await);
    assert_eq!(message, "No active connection to close.");
}

#[tokio::test]
async fn test_missing_env_file_does_not_connect() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    let displays = nb
        .run_cell("%neo4j --env-file /nonexistent/cypher-cells/.env")
        .await;

    let [Display::Error { category, message, .. }] = displays.as_slice() else {
        panic!("Expected an error display, got {:?}", displays);
    };
    assert_eq!(category, "Configuration Error");
    assert!(message.starts_with("Env file not found"));
    assert!(connector.connections().is_empty());
}

#[tokio::test]
async fn test_env_file_below_flags() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "NEO4J_URI=bolt://envhost:7687").unwrap();
    writeln!(file, "NEO4J_USERNAME=envuser").unwrap();
    writeln!(file, "NEO4J_PASSWORD=envpw").unwrap();
    writeln!(file, "NEO4J_DATABASE=envdb").unwrap();

    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    let cell = format!("%neo4j --env-file {} -u flaguser", file.path().display());
    let (connected, _) = status(&nb.run_cell(&cell).await);

    assert!(connected);
    let config = &connector.connections()[0];
    assert_eq!(config.uri.as_deref(), Some("bolt://envhost:7687"));
    assert_eq!(config.username.as_deref(), Some("flaguser"));
    assert_eq!(config.password.as_deref(), Some("envpw"));
    assert_eq!(config.database.as_deref(), Some("envdb"));
}

#[tokio::test]
async fn test_cypher_auto_connects_once() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    nb.run_cell("%cypher RETURN 1").await;
    nb.run_cell("%cypher RETURN 2").await;

    assert_eq!(connector.connections(), vec![session_config()]);
    assert!(nb.connections().is_connected());
}

#[tokio::test]
async fn test_database_override_is_one_off() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    nb.run_cell("%cypher RETURN 1").await;
    nb.run_cell("%cypher -d movies RETURN 1").await;

    let connections = connector.connections();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[1].database.as_deref(), Some("movies"));
    assert_eq!(connections[1].uri, session_config().uri);
    // The one-off client is closed; the session stays on its database.
    assert_eq!(client.close_count(), 1);
    assert_eq!(nb.connections().status().database.as_deref(), Some("neo4j"));
}

#[tokio::test]
async fn test_uri_override_is_one_off() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    nb.run_cell("%cypher -u bolt://other:7687 --username bob -p pw RETURN 1")
        .await;

    let connections = connector.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].uri.as_deref(), Some("bolt://other:7687"));
    assert_eq!(connections[0].username.as_deref(), Some("bob"));
    assert!(!nb.connections().is_connected());
    assert_eq!(client.executed(), vec!["RETURN 1"]);
}

#[tokio::test]
async fn test_connection_failure_is_reported_with_hints() {
    let manager = ConnectionManager::new(Arc::new(MockConnector::refusing()))
        .with_default_config(session_config());
    let mut nb = Notebook::new(manager);

    let displays = nb.run_cell("%cypher RETURN 1").await;

    let [Display::Error { category, hints, .. }] = displays.as_slice() else {
        panic!("Expected an error display, got {:?}", displays);
    };
    assert_eq!(category, "Connection Error");
    assert!(!hints.is_empty());
}

#[tokio::test]
async fn test_lost_connection_during_preflight() {
    let client = MockGraphClient::new().disconnected();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%cypher RETURN 1").await;

    let [Display::Error { category, message, .. }] = displays.as_slice() else {
        panic!("Expected an error display, got {:?}", displays);
    };
    assert_eq!(category, "Classification Error");
    assert!(message.contains("Failed to connect"));
    assert!(client.executed().is_empty());
}
