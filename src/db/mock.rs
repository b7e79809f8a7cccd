//! Mock graph client for testing.
//!
//! Classifies statements with keyword heuristics, fabricates small results
//! and records every inspected and executed statement. Clones share state,
//! so a test can keep a handle while the session owns another.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::types::{Counters, Node, QueryParams, QueryResult, Value};
use super::{Connector, GraphClient, QueryInspector, QueryRunner};
use crate::config::ConnectionConfig;
use crate::error::{CypherError, Result};
use crate::safety::QueryType;

#[derive(Debug, Default)]
struct MockState {
    query_types: Vec<(String, QueryType)>,
    results: Vec<(String, QueryResult)>,
    failing_inspection: Vec<String>,
    failing_execution: Vec<String>,
    disconnected: bool,
    inspected: Vec<String>,
    executed: Vec<String>,
    params: Vec<QueryParams>,
    closed: usize,
}

/// A mock graph client with scripted behaviour.
#[derive(Debug, Clone, Default)]
pub struct MockGraphClient {
    state: Arc<Mutex<MockState>>,
}

impl MockGraphClient {
    /// Creates a mock client using keyword heuristics for everything.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reports `query_type` for statements containing `pattern`.
    pub fn with_query_type(self, pattern: &str, query_type: QueryType) -> Self {
        self.lock().query_types.push((pattern.to_string(), query_type));
        self
    }

    /// Returns `result` for statements containing `pattern`.
    pub fn with_result(self, pattern: &str, result: QueryResult) -> Self {
        self.lock().results.push((pattern.to_string(), result));
        self
    }

    /// Fails inspection of statements containing `pattern` with a syntax error.
    pub fn failing_inspection_on(self, pattern: &str) -> Self {
        self.lock().failing_inspection.push(pattern.to_string());
        self
    }

    /// Fails execution of statements containing `pattern`.
    pub fn failing_execution_on(self, pattern: &str) -> Self {
        self.lock().failing_execution.push(pattern.to_string());
        self
    }

    /// Makes every call fail with a connection error.
    pub fn disconnected(self) -> Self {
        self.lock().disconnected = true;
        self
    }

    /// Statements passed to `inspect`, in call order.
    pub fn inspected(&self) -> Vec<String> {
        self.lock().inspected.clone()
    }

    /// Statements passed to `run`, in call order.
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    /// Parameters passed to `run`, in call order.
    pub fn executed_params(&self) -> Vec<QueryParams> {
        self.lock().params.clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        self.lock().closed
    }

    fn check_connected(&self) -> Result<()> {
        if self.lock().disconnected {
            return Err(CypherError::connection(
                "Failed to connect to localhost:7474. Is Neo4j running?",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryInspector for MockGraphClient {
    async fn inspect(&self, statement: &str, _params: &QueryParams) -> Result<QueryType> {
        self.lock().inspected.push(statement.to_string());
        self.check_connected()?;

        let state = self.lock();
        if let Some(pattern) = state
            .failing_inspection
            .iter()
            .find(|p| statement.contains(p.as_str()))
        {
            return Err(CypherError::classification(format!(
                "Neo.ClientError.Statement.SyntaxError: Invalid input near '{}'",
                pattern
            )));
        }

        let scripted = state
            .query_types
            .iter()
            .find(|(p, _)| statement.contains(p.as_str()))
            .map(|(_, t)| *t);
        Ok(scripted.unwrap_or_else(|| heuristic_type(statement)))
    }
}

#[async_trait]
impl QueryRunner for MockGraphClient {
    async fn run(&self, statement: &str, params: &QueryParams) -> Result<QueryResult> {
        {
            let mut state = self.lock();
            state.executed.push(statement.to_string());
            state.params.push(params.clone());
        }
        self.check_connected()?;

        let state = self.lock();
        if state
            .failing_execution
            .iter()
            .any(|p| statement.contains(p.as_str()))
        {
            return Err(CypherError::query(
                "Neo.ClientError.Schema.ConstraintValidationFailed: mock execution failure",
            ));
        }

        if let Some((_, result)) = state
            .results
            .iter()
            .find(|(p, _)| statement.contains(p.as_str()))
        {
            return Ok(result.clone());
        }

        Ok(fabricate_result(statement))
    }
}

#[async_trait]
impl GraphClient for MockGraphClient {
    async fn verify_connectivity(&self) -> Result<()> {
        self.check_connected()
    }

    async fn close(&self) -> Result<()> {
        self.lock().closed += 1;
        Ok(())
    }
}

/// Upper-cased keywords of a statement.
fn keywords(statement: &str) -> Vec<String> {
    statement
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Classifies a statement from its keywords.
fn heuristic_type(statement: &str) -> QueryType {
    let words = keywords(statement);
    let has = |w: &str| words.iter().any(|x| x == w);

    if (has("CREATE") || has("DROP")) && (has("INDEX") || has("CONSTRAINT")) {
        return QueryType::Schema;
    }

    let writes = ["CREATE", "MERGE", "SET", "DELETE", "REMOVE"]
        .into_iter()
        .any(has);
    let reads = has("MATCH");

    match (writes, reads) {
        (true, true) => QueryType::ReadWrite,
        (true, false) => QueryType::Write,
        _ => QueryType::Read,
    }
}

/// Builds a plausible result: counters for writes, one row for RETURN.
fn fabricate_result(statement: &str) -> QueryResult {
    let words = keywords(statement);
    let has = |w: &str| words.iter().any(|x| x == w);

    let mut counters = Counters::default();
    if has("INDEX") && has("CREATE") {
        counters.indexes_added = 1;
    } else if has("INDEX") && has("DROP") {
        counters.indexes_removed = 1;
    } else if has("CONSTRAINT") && has("CREATE") {
        counters.constraints_added = 1;
    } else if has("CONSTRAINT") && has("DROP") {
        counters.constraints_removed = 1;
    } else {
        if has("CREATE") || has("MERGE") {
            counters.nodes_created = 1;
            counters.labels_added = u64::from(statement.contains(':'));
        }
        if has("SET") {
            counters.properties_set = 1;
        }
        if has("DELETE") {
            counters.nodes_deleted = 1;
        }
    }
    counters.contains_updates = !counters.is_empty();

    let (columns, row) = match return_items(statement) {
        Some(items) => items
            .iter()
            .map(|(expr, alias)| (alias.clone(), mock_value(statement, expr)))
            .unzip(),
        None => (Vec::new(), Vec::new()),
    };
    let rows = if columns.is_empty() { Vec::new() } else { vec![row] };

    QueryResult::with_data(columns, rows)
        .with_counters(counters)
        .with_execution_time(Duration::from_millis(1))
}

/// Splits the last RETURN clause into (expression, column name) pairs.
fn return_items(statement: &str) -> Option<Vec<(String, String)>> {
    let upper = statement.to_ascii_uppercase();
    let at = upper.rfind("RETURN ")?;
    let mut clause = &statement[at + "RETURN ".len()..];
    for stop in [" LIMIT ", " ORDER BY ", " SKIP "] {
        if let Some(pos) = clause.to_ascii_uppercase().find(stop) {
            clause = &clause[..pos];
        }
    }

    let items = clause
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.to_ascii_uppercase().find(" AS ") {
            Some(pos) => (item[..pos].trim().to_string(), item[pos + 4..].trim().to_string()),
            None => (item.to_string(), item.to_string()),
        })
        .collect::<Vec<_>>();
    (!items.is_empty()).then_some(items)
}

/// Value for a RETURN expression: literals as themselves, variables as nodes.
fn mock_value(statement: &str, expr: &str) -> Value {
    if let Ok(i) = expr.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = expr.parse::<f64>() {
        return Value::Float(f);
    }
    let quoted = expr.len() >= 2
        && ((expr.starts_with('\'') && expr.ends_with('\''))
            || (expr.starts_with('"') && expr.ends_with('"')));
    if quoted {
        return Value::String(expr[1..expr.len() - 1].to_string());
    }
    if expr.chars().all(|c| c.is_alphanumeric() || c == '_') {
        let label = Regex::new(&format!(r"\(\s*{}\s*:\s*(\w+)", regex::escape(expr)))
            .ok()
            .and_then(|re| re.captures(statement))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        return Value::Node(Node {
            element_id: format!("mock:{}", expr),
            labels: label.into_iter().collect(),
            properties: Default::default(),
        });
    }
    Value::String(format!("mock:{}", expr))
}

/// Connector handing out clones of a shared mock client.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    client: MockGraphClient,
    refuse: bool,
    connections: Arc<Mutex<Vec<ConnectionConfig>>>,
}

impl MockConnector {
    /// Creates a connector that always returns clones of `client`.
    pub fn new(client: MockGraphClient) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    /// Creates a connector whose every attempt fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    /// Configurations passed to `connect`, in call order.
    pub fn connections(&self) -> Vec<ConnectionConfig> {
        self.connections
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn GraphClient>> {
        if let Ok(mut log) = self.connections.lock() {
            log.push(config.clone());
        }
        if self.refuse {
            return Err(CypherError::connection(format!(
                "Failed to connect to {}. Is Neo4j running?",
                config.display_string()
            )));
        }
        Ok(Box::new(self.client.clone()))
    }
}
