//! Query result types for cypher-cells.
//!
//! Defines the structures used to represent results returned by the graph
//! database, including graph values (nodes and relationships) and the
//! write counters reported in the result summary.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Query parameters sent alongside a statement.
pub type QueryParams = serde_json::Map<String, JsonValue>;

/// Represents the result of executing a single statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names, in return order.
    pub columns: Vec<String>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Write counters from the result summary.
    #[serde(default)]
    pub counters: Counters,

    /// Time taken to execute the statement.
    #[serde(with = "duration_serde")]
    pub execution_time: Duration,

    /// Number of rows in the result.
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            counters: Counters::default(),
            execution_time: Duration::ZERO,
            row_count,
        }
    }

    /// Sets the write counters.
    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the value at the given row and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Write counters reported by the engine.
///
/// Field names deserialize from the camelCase keys of the Query API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Counters {
    pub contains_updates: bool,
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
    pub labels_added: u64,
    pub labels_removed: u64,
    pub indexes_added: u64,
    pub indexes_removed: u64,
    pub constraints_added: u64,
    pub constraints_removed: u64,
    pub contains_system_updates: bool,
    pub system_updates: u64,
}

impl Counters {
    /// Returns all counters as (name, value) pairs in display order.
    pub fn entries(&self) -> [(&'static str, u64); 12] {
        [
            ("nodes_created", self.nodes_created),
            ("nodes_deleted", self.nodes_deleted),
            ("relationships_created", self.relationships_created),
            ("relationships_deleted", self.relationships_deleted),
            ("properties_set", self.properties_set),
            ("labels_added", self.labels_added),
            ("labels_removed", self.labels_removed),
            ("indexes_added", self.indexes_added),
            ("indexes_removed", self.indexes_removed),
            ("constraints_added", self.constraints_added),
            ("constraints_removed", self.constraints_removed),
            ("system_updates", self.system_updates),
        ]
    }

    /// Returns only the non-zero counters.
    pub fn active(&self) -> Vec<(&'static str, u64)> {
        self.entries().into_iter().filter(|(_, v)| *v > 0).collect()
    }

    /// Returns true if no counter is set.
    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }
}

/// A node returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, Value>,
}

/// A relationship returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub element_id: String,
    pub rel_type: String,
    pub start_node_element_id: String,
    pub end_node_element_id: String,
    pub properties: BTreeMap<String, Value>,
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value returned by the graph database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Node(Node),
    Relationship(Relationship),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a plain JSON value from the Query API into a graph value.
    ///
    /// Objects shaped like nodes (`elementId`, `labels`, `properties`) or
    /// relationships (`elementId`, `type`, `startNodeElementId`, ...) are
    /// recognised; other objects become maps.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from_json).collect()),
            JsonValue::Object(mut map) => {
                let is_entity = map.contains_key("elementId") && map.contains_key("properties");
                if is_entity && map.contains_key("labels") {
                    Value::Node(Node {
                        element_id: take_string(&mut map, "elementId"),
                        labels: match map.remove("labels") {
                            Some(JsonValue::Array(labels)) => labels
                                .into_iter()
                                .filter_map(|l| l.as_str().map(String::from))
                                .collect(),
                            _ => Vec::new(),
                        },
                        properties: take_properties(&mut map),
                    })
                } else if is_entity && map.contains_key("startNodeElementId") {
                    Value::Relationship(Relationship {
                        element_id: take_string(&mut map, "elementId"),
                        rel_type: take_string(&mut map, "type"),
                        start_node_element_id: take_string(&mut map, "startNodeElementId"),
                        end_node_element_id: take_string(&mut map, "endNodeElementId"),
                        properties: take_properties(&mut map),
                    })
                } else {
                    Value::Map(
                        map.into_iter()
                            .map(|(k, v)| (k, Value::from_json(v)))
                            .collect(),
                    )
                }
            }
        }
    }

    /// Converts to plain JSON, flattening nodes and relationships to their
    /// properties.
    pub fn to_plain_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_plain_json).collect()),
            Value::Map(map) => properties_json(map),
            Value::Node(node) => properties_json(&node.properties),
            Value::Relationship(rel) => properties_json(&rel.properties),
        }
    }

    /// Converts back to the Query API's JSON shape, keeping graph metadata.
    pub fn to_json(&self) -> JsonValue {
        let props = |map: &BTreeMap<String, Value>| {
            JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
        };
        match self {
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => props(map),
            Value::Node(node) => serde_json::json!({
                "elementId": node.element_id,
                "labels": node.labels,
                "properties": props(&node.properties),
            }),
            Value::Relationship(rel) => serde_json::json!({
                "elementId": rel.element_id,
                "type": rel.rel_type,
                "startNodeElementId": rel.start_node_element_id,
                "endNodeElementId": rel.end_node_element_id,
                "properties": props(&rel.properties),
            }),
            scalar => scalar.to_plain_json(),
        }
    }

    /// Returns the value as it should appear in a table cell.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_literal(),
        }
    }

    /// Cypher-literal-like rendering used for nested values.
    fn to_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => format!("{s:?}"),
            Value::List(items) => format!(
                "[{}]",
                items.iter().map(Value::to_literal).collect::<Vec<_>>().join(", ")
            ),
            Value::Map(map) => format_properties(map),
            Value::Node(node) => {
                let labels: String = node.labels.iter().map(|l| format!(":{l}")).collect();
                if node.properties.is_empty() {
                    format!("({labels})")
                } else {
                    format!("({labels} {})", format_properties(&node.properties))
                }
            }
            Value::Relationship(rel) => {
                if rel.properties.is_empty() {
                    format!("[:{}]", rel.rel_type)
                } else {
                    format!("[:{} {}]", rel.rel_type, format_properties(&rel.properties))
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

fn take_string(map: &mut serde_json::Map<String, JsonValue>, key: &str) -> String {
    match map.remove(key) {
        Some(JsonValue::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn take_properties(map: &mut serde_json::Map<String, JsonValue>) -> BTreeMap<String, Value> {
    match map.remove("properties") {
        Some(JsonValue::Object(props)) => props
            .into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn properties_json(map: &BTreeMap<String, Value>) -> JsonValue {
    JsonValue::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), v.to_plain_json()))
            .collect(),
    )
}

fn format_properties(map: &BTreeMap<String, Value>) -> String {
    let inner = map
        .iter()
        .map(|(k, v)| format!("{k}: {}", v.to_literal()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{inner}}}")
}

// Conversion implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Serde support for Duration (not natively supported by serde).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
