//! Connection management for cypher-cells.
//!
//! Holds the session connection with explicit connect and close transitions.

pub mod manager;

pub use manager::{ActiveConnection, ConnectionManager, ConnectionStatus};
