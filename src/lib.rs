//! cypher-cells - notebook-style Cypher magics for Neo4j.
//!
//! Cells are split into statements, classified through EXPLAIN and only
//! executed when the write permission allows every statement. This library
//! exposes the core modules for the `cypher` binary and integration tests.

pub mod cli;
pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod logging;
pub mod magic;
pub mod notebook;
pub mod query;
pub mod render;
pub mod safety;
