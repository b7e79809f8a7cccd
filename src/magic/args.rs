//! Argument definitions for the `%neo4j` and `%cypher` magics.

use clap::Parser;
use std::path::PathBuf;

use crate::config::ConnectionConfig;

/// Connect to a Neo4j instance.
///
/// Precedence (highest first): flags and URI, `--env-file`, process
/// environment, built-in defaults.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "%neo4j", no_binary_name = true)]
pub struct ConnectArgs {
    /// Connection URI (e.g. bolt://localhost:7687)
    #[arg(value_name = "URI")]
    pub uri: Option<String>,

    /// Username (default: NEO4J_USERNAME env)
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Password (default: NEO4J_PASSWORD env)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Database name (default: NEO4J_DATABASE env or 'neo4j')
    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// Load connection settings from a .env file
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Close the current connection
    #[arg(long)]
    pub close: bool,

    /// Show current connection status
    #[arg(long)]
    pub status: bool,
}

impl ConnectArgs {
    /// Explicit flags as a partial connection config.
    ///
    /// URI credentials are extracted; explicit `-u`/`-p`/`-d` win over them.
    pub fn to_connection_config(&self) -> crate::error::Result<ConnectionConfig> {
        let mut config = match &self.uri {
            Some(uri) => ConnectionConfig::from_connection_string(uri)?,
            None => ConnectionConfig::default(),
        };
        config.merge(&ConnectionConfig {
            uri: None,
            username: self.username.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            http_url: None,
        });
        Ok(config)
    }
}

/// Execute a Cypher query against Neo4j.
///
/// Only read queries run by default; write and schema queries need
/// `--write` (or `%wcypher`).
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "%cypher", no_binary_name = true)]
pub struct CypherArgs {
    /// Override connection URI for this query
    #[arg(short = 'u', long)]
    pub uri: Option<String>,

    /// Override username for this query
    #[arg(long)]
    pub username: Option<String>,

    /// Override password for this query
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Override database for this query
    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// Store the result in this namespace variable
    #[arg(short = 'o', long, value_name = "VAR")]
    pub output: Option<String>,

    /// Store/show a data frame instead of the raw result
    #[arg(long)]
    pub df: bool,

    /// Render a graph visualization
    #[arg(long, visible_alias = "visualize")]
    pub viz: bool,

    /// Query parameters: a JSON object or the name of a variable holding one
    #[arg(short = 'P', long, value_name = "JSON|VAR")]
    pub params: Option<String>,

    /// Allow write and schema queries
    #[arg(short = 'w', long)]
    pub write: bool,

    /// Skip the EXPLAIN pre-flight query-type check
    #[arg(long)]
    pub no_preflight: bool,
}

impl CypherArgs {
    /// Returns true if any connection override flag was given.
    pub fn has_connection_override(&self) -> bool {
        self.uri.is_some()
            || self.username.is_some()
            || self.password.is_some()
            || self.database.is_some()
    }

    /// Connection override flags as a partial connection config.
    pub fn override_config(&self) -> crate::error::Result<ConnectionConfig> {
        let connect = ConnectArgs {
            uri: self.uri.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            ..Default::default()
        };
        connect.to_connection_config()
    }
}

/// Long and short flags of `%cypher` that consume the following word.
pub(crate) const CYPHER_VALUE_FLAGS: &[&str] = &[
    "-u",
    "--uri",
    "--username",
    "-p",
    "--password",
    "-d",
    "--database",
    "-o",
    "--output",
    "-P",
    "--params",
];
