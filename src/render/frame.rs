//! Data frame conversion.
//!
//! A [`DataFrame`] is the tabular, plain-JSON view of a result: graph values
//! are flattened to their properties so the frame can be exported as
//! records without any graph metadata.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::db::{QueryResult, Value};

/// Columnar table of plain JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl DataFrame {
    /// Builds a frame from a query result.
    pub fn from_result(result: &QueryResult) -> Self {
        let rows = result
            .rows
            .iter()
            .map(|row| {
                (0..result.columns.len())
                    .map(|i| row.get(i).map(Value::to_plain_json).unwrap_or(JsonValue::Null))
                    .collect()
            })
            .collect();

        Self {
            columns: result.columns.clone(),
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&JsonValue>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// Rows as `{column: value}` records.
    pub fn to_records(&self) -> Vec<Map<String, JsonValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Rows converted for table rendering.
    pub fn table_rows(&self) -> Vec<Vec<Value>> {
        self.rows
            .iter()
            .map(|row| row.iter().cloned().map(Value::from_json).collect())
            .collect()
    }
}
