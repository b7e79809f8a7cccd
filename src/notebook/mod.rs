//! Notebook session for cypher-cells.
//!
//! A [`Notebook`] owns the user namespace and the session connection, and
//! turns each cell into a list of [`Display`] items. Cells without a magic
//! header run as Cypher with default options.

mod script;

pub use script::split_cells;

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, MagicConfig};
use crate::connection::ConnectionManager;
use crate::db::{QueryParams, QueryResult};
use crate::error::{CypherError, Result};
use crate::magic::{self, ConnectArgs, CypherArgs, CypherCall, Magic};
use crate::query::{CellExecutor, CellOptions, CellOutcome, StatementResult};
use crate::render::{DataFrame, Display, VisualizationGraph};

/// Characters of statement text shown in multi-statement headers.
const PREVIEW_CHARS: usize = 80;

const NO_QUERY: &str = "No Cypher query provided.";

/// A value held in the user namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Stored {
    /// A query result stored with `-o VAR`.
    Result(QueryResult),
    /// A data frame stored with `-o VAR --df`.
    Frame(DataFrame),
    /// A plain JSON value, e.g. parameters for `-P VAR`.
    Json(JsonValue),
}

impl Stored {
    /// Number of rows held by a result or frame.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Result(result) => result.rows.len(),
            Self::Frame(frame) => frame.len(),
            Self::Json(JsonValue::Array(items)) => items.len(),
            Self::Json(_) => 1,
        }
    }

    /// The stored query result, if any.
    pub fn as_result(&self) -> Option<&QueryResult> {
        match self {
            Self::Result(result) => Some(result),
            _ => None,
        }
    }

    /// The stored data frame, if any.
    pub fn as_frame(&self) -> Option<&DataFrame> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

/// A notebook session: namespace, connection and magic settings.
pub struct Notebook {
    connections: ConnectionManager,
    namespace: HashMap<String, Stored>,
    settings: MagicConfig,
}

impl Notebook {
    /// Creates a notebook with default magic settings.
    pub fn new(connections: ConnectionManager) -> Self {
        Self {
            connections,
            namespace: HashMap::new(),
            settings: MagicConfig::default(),
        }
    }

    /// Replaces the magic settings.
    pub fn with_settings(mut self, settings: MagicConfig) -> Self {
        self.settings = settings;
        self
    }

    /// The session connection.
    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Defines a namespace variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Stored) {
        self.namespace.insert(name.into(), value);
    }

    /// Looks up a namespace variable.
    pub fn variable(&self, name: &str) -> Option<&Stored> {
        self.namespace.get(name)
    }

    /// Closes the session connection, if any.
    pub async fn close(&mut self) -> Result<bool> {
        self.connections.close().await
    }

    /// Runs one cell and returns what it displays.
    pub async fn run_cell(&mut self, cell: &str) -> Vec<Display> {
        if cell.trim().is_empty() {
            return Vec::new();
        }

        if !magic::is_magic(cell) {
            let call = CypherCall {
                args: CypherArgs::default(),
                query: cell.trim().to_string(),
                is_cell: true,
                allow_write: false,
            };
            return self.run_cypher(call).await;
        }

        match magic::parse_cell(cell) {
            Ok(Magic::Connect(args)) => self.run_connect(args).await,
            Ok(Magic::Cypher(call)) => self.run_cypher(call).await,
            Ok(Magic::Help(text)) => vec![Display::Help { text }],
            Err(e) => vec![Display::error(&e, None)],
        }
    }

    async fn run_connect(&mut self, args: ConnectArgs) -> Vec<Display> {
        if args.status {
            let status = self.connections.status();
            return vec![Display::Status {
                connected: status.connected,
                message: status.summary(),
            }];
        }

        if args.close {
            let message = match self.connections.close().await {
                Ok(true) => "Connection closed.",
                Ok(false) => "No active connection to close.",
                Err(e) => return vec![Display::error(&e, None)],
            };
            return vec![Display::Status {
                connected: false,
                message: message.to_string(),
            }];
        }

        let config = match resolve_connect_config(&args) {
            Ok(config) => config,
            Err(e) => return vec![Display::error(&e, None)],
        };

        match self.connections.connect(config.clone(), None).await {
            Ok(()) => vec![Display::Status {
                connected: true,
                message: format!("Connected to {}", config.display_string()),
            }],
            Err(e) => vec![Display::error(&e, None)],
        }
    }

    async fn run_cypher(&mut self, call: CypherCall) -> Vec<Display> {
        let CypherCall {
            args,
            query,
            allow_write,
            ..
        } = call;

        if query.trim().is_empty() {
            return vec![Display::Warning {
                message: NO_QUERY.to_string(),
            }];
        }

        if let Some(name) = &args.output {
            if let Err(e) = validate_variable_name(name) {
                return vec![Display::error(&e, None)];
            }
        }

        let params = match self.resolve_params(args.params.as_deref()) {
            Ok(params) => params,
            Err(e) => return vec![Display::error(&e, Some(&query))],
        };

        let options = CellOptions {
            allow_write: allow_write || self.settings.allow_write,
            skip_preflight: args.no_preflight || !self.settings.preflight,
        };
        debug!(
            "Running cell (allow_write: {}, skip_preflight: {})",
            options.allow_write, options.skip_preflight
        );

        let outcome = if args.has_connection_override() {
            let config = match self.override_config(&args) {
                Ok(config) => config,
                Err(e) => return vec![Display::error(&e, None)],
            };
            let client = match self.connections.connect_ephemeral(&config).await {
                Ok(client) => client,
                Err(e) => return vec![Display::error(&e, None)],
            };
            info!("Using one-off connection to {}", config.display_string());

            let outcome = CellExecutor::new(client.as_ref(), &params)
                .execute(&query, options)
                .await;
            if let Err(e) = client.close().await {
                warn!("Failed to close one-off connection: {}", e);
            }
            outcome
        } else {
            let client = match self.connections.client().await {
                Ok(client) => client,
                Err(e) => return vec![Display::error(&e, None)],
            };
            CellExecutor::new(client, &params)
                .execute(&query, options)
                .await
        };

        self.present(outcome, &args)
    }

    /// Resolves `-P`: a JSON object literal or a variable holding one.
    fn resolve_params(&self, raw: Option<&str>) -> Result<QueryParams> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(QueryParams::new());
        };

        let value = if raw.starts_with('{') {
            serde_json::from_str::<JsonValue>(raw)
                .map_err(|e| CypherError::magic(format!("Invalid --params JSON: {e}")))?
        } else {
            match self.namespace.get(raw) {
                Some(Stored::Json(value)) => value.clone(),
                Some(_) => {
                    return Err(CypherError::magic(format!(
                        "--params variable '{raw}' does not hold a JSON object"
                    )))
                }
                None => {
                    return Err(CypherError::magic(format!(
                        "--params must be a JSON object or a variable name; '{raw}' is not defined"
                    )))
                }
            }
        };

        match value {
            JsonValue::Object(map) => Ok(map),
            _ => Err(CypherError::magic("--params must evaluate to a JSON object")),
        }
    }

    /// Configuration for a one-off connection.
    ///
    /// URI or credential flags start from the environment; `-d` alone
    /// reuses the session connection with another database.
    fn override_config(&self, args: &CypherArgs) -> Result<ConnectionConfig> {
        if args.uri.is_some() || args.username.is_some() || args.password.is_some() {
            let mut config = args.override_config()?;
            config.apply_env_defaults()?;
            return Ok(config);
        }

        let mut config = match self.connections.active_config() {
            Some(active) => active.clone(),
            None => self.connections.auto_config()?,
        };
        config.database = args.database.clone();
        Ok(config)
    }

    fn present(&mut self, outcome: CellOutcome, args: &CypherArgs) -> Vec<Display> {
        let max_rows = self.settings.max_display_rows;

        match outcome {
            CellOutcome::Empty => vec![Display::Warning {
                message: NO_QUERY.to_string(),
            }],
            CellOutcome::Blocked(rejection) => vec![Display::Blocked { rejection }],
            CellOutcome::ClassificationFailed(failure) => {
                vec![Display::error(&failure.error, Some(&failure.statement.text))]
            }
            CellOutcome::ExecutionFailed {
                statement_count,
                completed,
                failure,
            } => {
                let mut displays = Vec::new();
                for result in &completed {
                    if statement_count > 1 {
                        displays.push(statement_header(result, statement_count));
                    }
                    displays.push(Display::for_result(&result.result, max_rows));
                }
                displays.push(Display::error(&failure.error, Some(&failure.statement.text)));
                displays
            }
            CellOutcome::Completed { mut results, .. } => {
                if results.len() == 1 {
                    let single = results.remove(0);
                    self.present_single(single.result, args)
                } else {
                    self.present_many(results, args)
                }
            }
        }
    }

    fn present_single(&mut self, result: QueryResult, args: &CypherArgs) -> Vec<Display> {
        let max_rows = self.settings.max_display_rows;

        if args.viz {
            let graph = VisualizationGraph::from_result(&result);
            if graph.is_empty() {
                return vec![
                    Display::Warning {
                        message: "Result contains no nodes or relationships to visualize."
                            .to_string(),
                    },
                    Display::for_result(&result, max_rows),
                ];
            }
            return vec![Display::Graph { graph }];
        }

        let rows = result.rows.len();
        let frame = args.df.then(|| DataFrame::from_result(&result));

        if let Some(name) = &args.output {
            let value = match frame {
                Some(frame) => Stored::Frame(frame),
                None => Stored::Result(result),
            };
            self.set_variable(name.clone(), value);
            return vec![Display::Success {
                message: format!("Stored in {} ({} rows)", name, rows),
            }];
        }

        match frame {
            Some(frame) => vec![Display::for_frame(&frame, max_rows)],
            None => vec![Display::for_result(&result, max_rows)],
        }
    }

    fn present_many(&mut self, mut results: Vec<StatementResult>, args: &CypherArgs) -> Vec<Display> {
        let max_rows = self.settings.max_display_rows;
        let count = results.len();

        let mut displays = Vec::with_capacity(count * 2 + 1);
        for result in &results {
            displays.push(statement_header(result, count));
            displays.push(Display::for_result(&result.result, max_rows));
        }

        if let (Some(name), Some(last)) = (&args.output, results.pop()) {
            let rows = last.result.rows.len();
            let value = if args.df {
                Stored::Frame(DataFrame::from_result(&last.result))
            } else {
                Stored::Result(last.result)
            };
            self.set_variable(name.clone(), value);
            displays.push(Display::Success {
                message: format!("Last result stored in {} ({} rows)", name, rows),
            });
        }

        displays
    }
}

fn statement_header(result: &StatementResult, count: usize) -> Display {
    Display::StatementHeader {
        position: result.position,
        count,
        preview: result.statement.preview(PREVIEW_CHARS),
    }
}

/// `%neo4j` precedence: flags, then `--env-file`, then the process environment.
fn resolve_connect_config(args: &ConnectArgs) -> Result<ConnectionConfig> {
    let mut config = ConnectionConfig::from_env()?;
    if let Some(path) = &args.env_file {
        config.merge(&ConnectionConfig::from_env_file(path)?);
    }
    config.merge(&args.to_connection_config()?);
    Ok(config)
}

fn validate_variable_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CypherError::magic(format!("Invalid variable name: {name}")))
    }
}
