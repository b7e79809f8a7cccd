//! Cell execution for cypher-cells.
//!
//! Drives pre-flight classification, blocking and sequential execution.

pub mod executor;

pub use executor::{CellExecutor, CellOptions, CellOutcome, StatementResult};
