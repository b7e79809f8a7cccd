//! Notebook scenarios: pre-flight blocking, execution and result handling.

use cypher_cells::config::MagicConfig;
use cypher_cells::db::{MockGraphClient, QueryResult, Value};
use cypher_cells::notebook::Stored;
use cypher_cells::render::{DataFrame, Display};
use cypher_cells::safety::QueryType;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::notebook_with;

#[tokio::test]
async fn test_read_cell_executes() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%%cypher\nMATCH (n) RETURN n LIMIT 10").await;

    assert!(matches!(displays.as_slice(), [Display::Table { .. }]));
    assert_eq!(client.inspected(), vec!["MATCH (n) RETURN n LIMIT 10"]);
    assert_eq!(client.executed(), vec!["MATCH (n) RETURN n LIMIT 10"]);
}

#[tokio::test]
async fn test_write_is_blocked_without_permission() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%%cypher\nCREATE (n) RETURN n").await;

    let [Display::Blocked { rejection }] = displays.as_slice() else {
        panic!("Expected a blocked display, got {:?}", displays);
    };
    assert_eq!(rejection.query_type, QueryType::Write);
    assert_eq!(rejection.position, 1);
    assert!(rejection.message.contains("--write"));
    assert!(client.executed().is_empty());
}

#[tokio::test]
async fn test_wcypher_allows_write() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%%wcypher\nCREATE (n:Person {name:'Alice'}) RETURN n")
        .await;

    assert!(matches!(displays.as_slice(), [Display::Table { .. }]));
    assert_eq!(client.executed().len(), 1);
}

#[tokio::test]
async fn test_write_flag_on_line_magic() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    nb.run_cell("%cypher -w CREATE (n) RETURN n").await;

    assert_eq!(client.executed(), vec!["CREATE (n) RETURN n"]);
}

#[tokio::test]
async fn test_second_statement_blocks_whole_cell() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%%cypher\nMATCH (n) RETURN n LIMIT 10;\nCREATE (m) RETURN m")
        .await;

    let [Display::Blocked { rejection }] = displays.as_slice() else {
        panic!("Expected a blocked display, got {:?}", displays);
    };
    assert_eq!(rejection.position, 2);
    assert_eq!(rejection.statement_count, 2);
    assert_eq!(rejection.query_type, QueryType::Write);
    assert_eq!(rejection.statement.text, "CREATE (m) RETURN m");
    assert_eq!(client.inspected().len(), 2);
    assert!(client.executed().is_empty());
}

#[tokio::test]
async fn test_schema_statement_is_blocked() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%%cypher\nCREATE INDEX person_name FOR (p:Person) ON (p.name)")
        .await;

    let [Display::Blocked { rejection }] = displays.as_slice() else {
        panic!("Expected a blocked display, got {:?}", displays);
    };
    assert_eq!(rejection.query_type, QueryType::Schema);
}

#[tokio::test]
async fn test_no_preflight_never_inspects() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%%cypher --no-preflight\nCREATE (n) RETURN n;\nDELETE n")
        .await;

    assert!(client.inspected().is_empty());
    assert_eq!(client.executed().len(), 2);
    assert!(!displays.iter().any(Display::is_error));
}

#[tokio::test]
async fn test_classification_failure_stops_inspection() {
    let client = MockGraphClient::new().failing_inspection_on("BROKEN");
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%%cypher\nRETURN 1;\nBROKEN;\nRETURN 3").await;

    let [Display::Error {
        category, query, ..
    }] = displays.as_slice()
    else {
        panic!("Expected an error display, got {:?}", displays);
    };
    assert_eq!(category, "Classification Error");
    assert_eq!(query.as_deref(), Some("BROKEN"));
    assert_eq!(client.inspected(), vec!["RETURN 1", "BROKEN"]);
    assert!(client.executed().is_empty());
}

#[tokio::test]
async fn test_execution_failure_keeps_earlier_results() {
    let client = MockGraphClient::new().failing_execution_on("boom");
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%%cypher\nRETURN 1;\nMATCH (n) RETURN n.boom;\nRETURN 3")
        .await;

    assert_eq!(displays.len(), 3);
    assert!(matches!(
        &displays[0],
        Display::StatementHeader { position: 1, count: 3, .. }
    ));
    assert!(matches!(&displays[1], Display::Table { .. }));
    let Display::Error { category, .. } = &displays[2] else {
        panic!("Expected an error display, got {:?}", displays[2]);
    };
    assert_eq!(category, "Query Error");
    assert_eq!(client.executed(), vec!["RETURN 1", "MATCH (n) RETURN n.boom"]);
}

#[tokio::test]
async fn test_multi_statement_headers_and_last_result_stored() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%%cypher -o last\nRETURN 1;\nRETURN 'two' AS b")
        .await;

    assert_eq!(displays.len(), 5);
    let Display::StatementHeader { preview, count, .. } = &displays[2] else {
        panic!("Expected a statement header, got {:?}", displays[2]);
    };
    assert_eq!(preview, "RETURN 'two' AS b");
    assert_eq!(*count, 2);
    assert_eq!(
        displays[4],
        Display::Success {
            message: "Last result stored in last (1 rows)".to_string()
        }
    );

    let stored = nb.variable("last").and_then(Stored::as_result).unwrap();
    assert_eq!(stored.columns, vec!["b"]);
    assert_eq!(stored.rows[0][0], Value::from("two"));
}

#[tokio::test]
async fn test_single_result_stored() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb
        .run_cell("%cypher -o people MATCH (p:Person) RETURN p")
        .await;

    assert_eq!(
        displays,
        vec![Display::Success {
            message: "Stored in people (1 rows)".to_string()
        }]
    );
    assert!(nb.variable("people").and_then(Stored::as_result).is_some());
}

#[tokio::test]
async fn test_dataframe_stored() {
    let result = QueryResult::with_data(
        vec!["name".to_string()],
        vec![vec![Value::from("Alice")], vec![Value::from("Bob")]],
    );
    let client = MockGraphClient::new().with_result("p.name", result);
    let (mut nb, _) = notebook_with(&client);

    nb.run_cell("%cypher --df -o names MATCH (p:Person) RETURN p.name AS name")
        .await;

    let frame = nb.variable("names").and_then(Stored::as_frame).unwrap();
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.column("name").unwrap(), vec![&json!("Alice"), &json!("Bob")]);
}

#[tokio::test]
async fn test_dataframe_displayed() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%cypher --df RETURN 1 AS one").await;

    let [Display::Frame { frame, total_rows }] = displays.as_slice() else {
        panic!("Expected a frame display, got {:?}", displays);
    };
    assert_eq!(*total_rows, 1);
    assert_eq!(
        frame,
        &DataFrame {
            columns: vec!["one".to_string()],
            rows: vec![vec![json!(1)]],
        }
    );
}

#[tokio::test]
async fn test_visualization() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%cypher --viz MATCH (p:Person) RETURN p").await;

    let [Display::Graph { graph }] = displays.as_slice() else {
        panic!("Expected a graph display, got {:?}", displays);
    };
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].caption, "Person");
}

#[tokio::test]
async fn test_visualization_without_graph_values() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%cypher --visualize RETURN 1").await;

    assert!(matches!(
        displays.as_slice(),
        [Display::Warning { .. }, Display::Table { .. }]
    ));
}

#[tokio::test]
async fn test_empty_query_warns_without_connecting() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    for cell in ["%cypher", "%%cypher -w\n   \n", "%%cypher\n;\n"] {
        let displays = nb.run_cell(cell).await;
        assert_eq!(
            displays,
            vec![Display::Warning {
                message: "No Cypher query provided.".to_string()
            }],
            "cell: {cell:?}"
        );
    }
    assert!(client.executed().is_empty());
    assert!(connector.connections().len() <= 1);
}

#[tokio::test]
async fn test_params_passed_to_every_statement() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    nb.run_cell(
        "%%cypher -P '{\"name\": \"Alice\"}'\nMATCH (p {name: $name}) RETURN p;\nRETURN $name",
    )
    .await;

    let params = client.executed_params();
    assert_eq!(params.len(), 2);
    assert!(params.iter().all(|p| p.get("name") == Some(&json!("Alice"))));
}

#[tokio::test]
async fn test_params_from_namespace_variable() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);
    nb.set_variable("filters", Stored::Json(json!({"limit": 3})));

    nb.run_cell("%cypher -P filters MATCH (n) RETURN n LIMIT $limit")
        .await;

    assert_eq!(client.executed_params()[0].get("limit"), Some(&json!(3)));
}

#[tokio::test]
async fn test_bad_params_fail_before_connecting() {
    let client = MockGraphClient::new();
    let (mut nb, connector) = notebook_with(&client);

    let displays = nb.run_cell("%cypher -P undefined_var RETURN 1").await;

    let [Display::Error { category, .. }] = displays.as_slice() else {
        panic!("Expected an error display, got {:?}", displays);
    };
    assert_eq!(category, "Magic Error");
    assert!(connector.connections().is_empty());
}

#[tokio::test]
async fn test_plain_cell_runs_as_read_only_cypher() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let read = nb.run_cell("MATCH (n) RETURN n").await;
    let write = nb.run_cell("CREATE (n)").await;

    assert!(matches!(read.as_slice(), [Display::Table { .. }]));
    assert!(matches!(write.as_slice(), [Display::Blocked { .. }]));
}

#[tokio::test]
async fn test_settings_allow_write_by_default() {
    let client = MockGraphClient::new();
    let (nb, _) = notebook_with(&client);
    let mut nb = nb.with_settings(MagicConfig {
        allow_write: true,
        ..Default::default()
    });

    let displays = nb.run_cell("%cypher CREATE (n:Person)").await;

    let [Display::WriteSummary { counters }] = displays.as_slice() else {
        panic!("Expected a write summary, got {:?}", displays);
    };
    assert_eq!(counters[0].name, "nodes_created");
    assert_eq!(counters[0].value, 1);
}

#[tokio::test]
async fn test_max_display_rows() {
    let result = QueryResult::with_data(
        vec!["n".to_string()],
        (0..5).map(|i| vec![Value::Int(i)]).collect(),
    );
    let client = MockGraphClient::new().with_result("UNWIND", result);
    let (nb, _) = notebook_with(&client);
    let mut nb = nb.with_settings(MagicConfig {
        max_display_rows: 2,
        ..Default::default()
    });

    let displays = nb.run_cell("%cypher UNWIND range(0, 4) AS n RETURN n").await;

    let [Display::Table {
        rows, total_rows, ..
    }] = displays.as_slice()
    else {
        panic!("Expected a table, got {:?}", displays);
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(*total_rows, 5);
}

#[tokio::test]
async fn test_unknown_magic() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%sql SELECT 1").await;

    let [Display::Error { category, message, .. }] = displays.as_slice() else {
        panic!("Expected an error display, got {:?}", displays);
    };
    assert_eq!(category, "Magic Error");
    assert!(message.starts_with("Unknown magic: %sql"));
}

#[tokio::test]
async fn test_invalid_output_variable() {
    let client = MockGraphClient::new();
    let (mut nb, _) = notebook_with(&client);

    let displays = nb.run_cell("%cypher -o 9lives RETURN 1").await;

    assert!(displays.iter().any(Display::is_error));
    assert!(client.executed().is_empty());
}
