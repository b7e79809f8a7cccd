//! Pre-flight classification and cell decision aggregation.
//!
//! Every statement is inspected with the engine's EXPLAIN capability before
//! anything runs. The resulting classifications are folded into a single
//! decision: execute the cell, or block it at the first non-read statement.

use serde::Serialize;
use tracing::{debug, info};

use crate::db::{QueryInspector, QueryParams};
use crate::error::{CypherError, Result};

use super::{QueryType, Statement};

/// A statement paired with its pre-flight classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedStatement {
    pub statement: Statement,
    pub query_type: QueryType,
}

/// A statement that failed during inspection or execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    /// 1-based position of the statement in the cell.
    pub position: usize,
    pub statement: Statement,
    #[serde(serialize_with = "serialize_error")]
    pub error: CypherError,
}

fn serialize_error<S>(error: &CypherError, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&error.to_string())
}

/// Classifies a single statement through the inspector.
///
/// Any inspection failure, including connectivity and authentication
/// problems, is reported as a classification error.
pub async fn classify_statement<I>(
    inspector: &I,
    statement: &Statement,
    params: &QueryParams,
) -> Result<QueryType>
where
    I: QueryInspector + ?Sized,
{
    match inspector.inspect(&statement.text, params).await {
        Ok(query_type) => Ok(query_type),
        Err(CypherError::Classification(msg)) => Err(CypherError::Classification(msg)),
        Err(other) => Err(CypherError::classification(other.to_string())),
    }
}

/// Classifies statements in order, stopping at the first failure.
///
/// No statement after a failing one is inspected.
pub async fn classify_statements<I>(
    inspector: &I,
    statements: &[Statement],
    params: &QueryParams,
) -> std::result::Result<Vec<ClassifiedStatement>, StatementFailure>
where
    I: QueryInspector + ?Sized,
{
    let mut classified = Vec::with_capacity(statements.len());

    for (index, statement) in statements.iter().enumerate() {
        match classify_statement(inspector, statement, params).await {
            Ok(query_type) => {
                debug!(
                    "Pre-flight: statement {} classified as {}",
                    index + 1,
                    query_type
                );
                classified.push(ClassifiedStatement {
                    statement: statement.clone(),
                    query_type,
                });
            }
            Err(error) => {
                info!("Pre-flight failed on statement {}: {}", index + 1, error);
                return Err(StatementFailure {
                    position: index + 1,
                    statement: statement.clone(),
                    error,
                });
            }
        }
    }

    Ok(classified)
}

/// Cell-level decision derived from per-statement classifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDecision {
    /// Whether the cell may execute.
    pub allowed: bool,
    /// 0-based index of the first statement that blocked the cell.
    pub blocking_index: Option<usize>,
    /// Most restrictive classification observed; None when pre-flight was skipped.
    pub aggregate: Option<QueryType>,
    /// Classifications in statement order; empty when pre-flight was skipped.
    pub classifications: Vec<QueryType>,
}

impl CellDecision {
    /// Decision for a cell whose pre-flight was skipped: everything is permitted.
    pub fn preflight_skipped() -> Self {
        Self {
            allowed: true,
            blocking_index: None,
            aggregate: None,
            classifications: Vec::new(),
        }
    }

    /// Returns true if the cell must not execute.
    pub fn is_blocked(&self) -> bool {
        !self.allowed
    }
}

/// Folds classifications into a decision under the given write permission.
pub fn decide(classified: &[ClassifiedStatement], allow_write: bool) -> CellDecision {
    let classifications: Vec<QueryType> = classified.iter().map(|c| c.query_type).collect();
    let aggregate = QueryType::most_restrictive(classifications.iter().copied());

    let blocking_index = if allow_write {
        None
    } else {
        classifications.iter().position(|t| !t.is_read_only())
    };

    CellDecision {
        allowed: blocking_index.is_none(),
        blocking_index,
        aggregate,
        classifications,
    }
}

/// Structured explanation of why a cell was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// 1-based position of the offending statement.
    pub position: usize,
    /// Number of statements in the cell.
    pub statement_count: usize,
    pub statement: Statement,
    pub query_type: QueryType,
    pub aggregate: QueryType,
    pub message: String,
}

impl Rejection {
    /// Builds the rejection for a blocked decision, or None if it is allowed.
    pub fn from_decision(
        decision: &CellDecision,
        classified: &[ClassifiedStatement],
    ) -> Option<Self> {
        let index = decision.blocking_index?;
        let offending = classified.get(index)?;
        let aggregate = decision.aggregate.unwrap_or(offending.query_type);

        let subject = if classified.len() > 1 {
            format!("Statement {} of {}", index + 1, classified.len())
        } else {
            "This statement".to_string()
        };
        let message = format!(
            "{} was detected as a {} query. Use %%cypher --write or %%wcypher to allow \
             write and schema operations explicitly.",
            subject,
            offending.query_type.label()
        );

        Some(Self {
            position: index + 1,
            statement_count: classified.len(),
            statement: offending.statement.clone(),
            query_type: offending.query_type,
            aggregate,
            message,
        })
    }
}
