//! Query safety classification module.
//!
//! Splits a cell into statements and classifies each one through the
//! engine's EXPLAIN capability to decide whether the cell may run.

mod preflight;
mod splitter;

pub use preflight::{
    classify_statement, classify_statements, decide, CellDecision, ClassifiedStatement,
    Rejection, StatementFailure,
};
pub use splitter::split_statements;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query type reported by the engine for a single statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Read-only statement (`r`).
    Read,
    /// Write-only statement (`w`).
    Write,
    /// Statement that both reads and writes (`rw`).
    ReadWrite,
    /// Schema change such as index or constraint DDL (`s`).
    Schema,
}

impl QueryType {
    /// Parses the engine's query-type code (`r`, `w`, `rw`, `s`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "r" => Some(Self::Read),
            "w" => Some(Self::Write),
            "rw" => Some(Self::ReadWrite),
            "s" => Some(Self::Schema),
            _ => None,
        }
    }

    /// Returns the engine's code for this query type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::ReadWrite => "rw",
            Self::Schema => "s",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "read-write",
            Self::Schema => "schema",
        }
    }

    /// Returns true if the statement cannot change data or schema.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Read)
    }

    /// Priority used for aggregation (higher = more restrictive).
    fn restrictiveness(&self) -> u8 {
        match self {
            Self::Read => 0,
            Self::Write => 1,
            Self::ReadWrite => 2,
            Self::Schema => 3,
        }
    }

    /// Returns the most restrictive query type, or None for an empty input.
    pub fn most_restrictive<I>(types: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        types.into_iter().max_by_key(Self::restrictiveness)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single statement sliced out of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Trimmed statement text without the separating semicolon.
    pub text: String,
    /// Byte offset of the trimmed text in the cell.
    pub start: usize,
    /// Byte offset one past the end of the trimmed text in the cell.
    pub end: usize,
}

impl Statement {
    /// Creates a statement from its text and start offset.
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let end = start + text.len();
        Self { text, start, end }
    }

    /// Returns a single-line preview of at most `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        let flat = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= max_chars {
            flat
        } else {
            let mut short: String = flat.chars().take(max_chars).collect();
            short.push('…');
            short
        }
    }
}
