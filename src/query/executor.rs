//! Cell execution with pre-flight classification.
//!
//! A cell is split into statements, classified in order, and then either
//! blocked or executed statement by statement. Execution stops at the first
//! failing statement; earlier results are kept.

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::db::{QueryInspector, QueryParams, QueryResult, QueryRunner};
use crate::safety::{
    classify_statements, decide, split_statements, CellDecision, QueryType, Rejection, Statement,
    StatementFailure,
};

/// Per-cell execution switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellOptions {
    /// Permit write, read-write and schema statements.
    pub allow_write: bool,
    /// Bypass classification entirely; the inspector is never called.
    pub skip_preflight: bool,
}

/// The result of one executed statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementResult {
    /// 1-based position of the statement in the cell.
    pub position: usize,
    pub statement: Statement,
    /// Classification, when pre-flight ran.
    pub query_type: Option<QueryType>,
    pub result: QueryResult,
}

/// Outcome of executing a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    /// The cell contained no statements.
    Empty,
    /// A statement was not permitted; nothing ran.
    Blocked(Rejection),
    /// Inspection failed; nothing ran.
    ClassificationFailed(StatementFailure),
    /// A permitted statement failed; results before it are kept.
    ExecutionFailed {
        statement_count: usize,
        completed: Vec<StatementResult>,
        failure: StatementFailure,
    },
    /// Every statement ran.
    Completed {
        decision: CellDecision,
        results: Vec<StatementResult>,
    },
}

impl CellOutcome {
    /// Results of the statements that ran, in order.
    pub fn results(&self) -> &[StatementResult] {
        match self {
            Self::Completed { results, .. } => results,
            Self::ExecutionFailed { completed, .. } => completed,
            _ => &[],
        }
    }

    /// The result eligible for variable capture.
    pub fn last_result(&self) -> Option<&StatementResult> {
        self.results().last()
    }

    /// Returns true for classification and execution failures.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ClassificationFailed(_) | Self::ExecutionFailed { .. }
        )
    }
}

/// Executes cells against a client.
pub struct CellExecutor<'a, C: ?Sized> {
    client: &'a C,
    params: &'a QueryParams,
}

impl<'a, C> CellExecutor<'a, C>
where
    C: QueryInspector + QueryRunner + ?Sized,
{
    /// Creates a new cell executor.
    pub fn new(client: &'a C, params: &'a QueryParams) -> Self {
        Self { client, params }
    }

    /// Splits, classifies and executes a cell.
    pub async fn execute(&self, cell: &str, options: CellOptions) -> CellOutcome {
        let statements = split_statements(cell);
        if statements.is_empty() {
            return CellOutcome::Empty;
        }
        debug!("Cell split into {} statement(s)", statements.len());

        if options.skip_preflight {
            info!("Pre-flight skipped for {} statement(s)", statements.len());
            let planned = statements.into_iter().map(|s| (s, None)).collect();
            return self.run_all(planned, CellDecision::preflight_skipped()).await;
        }

        let classified = match classify_statements(self.client, &statements, self.params).await {
            Ok(classified) => classified,
            Err(failure) => return CellOutcome::ClassificationFailed(failure),
        };

        let decision = decide(&classified, options.allow_write);
        if let Some(rejection) = Rejection::from_decision(&decision, &classified) {
            info!(
                "Cell blocked at statement {} ({})",
                rejection.position, rejection.query_type
            );
            return CellOutcome::Blocked(rejection);
        }

        let planned = classified
            .into_iter()
            .map(|c| (c.statement, Some(c.query_type)))
            .collect();
        self.run_all(planned, decision).await
    }

    /// Runs statements in order, stopping at the first failure.
    async fn run_all(
        &self,
        planned: Vec<(Statement, Option<QueryType>)>,
        decision: CellDecision,
    ) -> CellOutcome {
        let statement_count = planned.len();
        let mut results = Vec::with_capacity(statement_count);

        for (index, (statement, query_type)) in planned.into_iter().enumerate() {
            let start = Instant::now();
            match self.client.run(&statement.text, self.params).await {
                Ok(result) => {
                    debug!(
                        "Statement {} returned {} row(s) in {:?}",
                        index + 1,
                        result.row_count,
                        start.elapsed()
                    );
                    results.push(StatementResult {
                        position: index + 1,
                        statement,
                        query_type,
                        result,
                    });
                }
                Err(error) => {
                    warn!("Statement {} failed: {}", index + 1, error);
                    return CellOutcome::ExecutionFailed {
                        statement_count,
                        completed: results,
                        failure: StatementFailure {
                            position: index + 1,
                            statement,
                            error,
                        },
                    };
                }
            }
        }

        CellOutcome::Completed { decision, results }
    }
}
