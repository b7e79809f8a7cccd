//! Cell output rendering for cypher-cells.
//!
//! Every cell produces a list of [`Display`] items. They are rendered as
//! text (ratatui lines, optionally ANSI coloured), as one HTML document, or
//! as JSON.

mod frame;
mod graph;
mod html;
mod table;
mod terminal;

pub use frame::DataFrame;
pub use graph::{VisualizationGraph, VizNode, VizRelationship};
pub use html::{escape_html, render_html};
pub use table::ResultTable;
pub use terminal::{lines_to_ansi, lines_to_plain};

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde::{Serialize, Serializer};

use crate::db::{QueryResult, Value};
use crate::error::{CypherError, Result};
use crate::safety::Rejection;

/// Width used to fit tables in text output.
const TEXT_WIDTH: usize = 120;

/// Output format for rendered cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Box-drawn tables and plain messages.
    #[default]
    Text,
    /// A single HTML document.
    Html,
    /// Serialized display items.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: text, html, or json"
            )),
        }
    }
}

/// One non-zero write counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterEntry {
    pub name: String,
    pub value: u64,
}

/// A single item of cell output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Display {
    /// Connection state change or status report.
    Status { connected: bool, message: String },
    /// Confirmation such as a stored variable.
    Success { message: String },
    /// Non-fatal notice such as an empty query.
    Warning { message: String },
    /// A failure with its category and optional setup hints.
    Error {
        category: String,
        message: String,
        query: Option<String>,
        hints: Vec<String>,
    },
    /// Header preceding a result in a multi-statement cell.
    StatementHeader {
        position: usize,
        count: usize,
        preview: String,
    },
    /// Result rows, possibly truncated for display.
    Table {
        columns: Vec<String>,
        #[serde(serialize_with = "serialize_rows")]
        rows: Vec<Vec<Value>>,
        total_rows: usize,
        elapsed_ms: u64,
    },
    /// Counters of a write statement that returned no rows.
    WriteSummary { counters: Vec<CounterEntry> },
    /// Empty result without counters.
    NoResults,
    /// A data frame view, possibly truncated for display.
    Frame { frame: DataFrame, total_rows: usize },
    /// A graph visualization.
    Graph { graph: VisualizationGraph },
    /// A cell refused by the write guard.
    Blocked { rejection: Rejection },
    /// Usage text.
    Help { text: String },
}

fn serialize_rows<S>(rows: &[Vec<Value>], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let json: Vec<Vec<serde_json::Value>> = rows
        .iter()
        .map(|row| row.iter().map(Value::to_json).collect())
        .collect();
    json.serialize(serializer)
}

impl Display {
    /// Display for a query result, following the empty/write/table rules.
    pub fn for_result(result: &QueryResult, max_rows: usize) -> Self {
        if result.is_empty() {
            let active = result.counters.active();
            if active.is_empty() {
                return Self::NoResults;
            }
            return Self::WriteSummary {
                counters: active
                    .into_iter()
                    .map(|(name, value)| CounterEntry {
                        name: name.to_string(),
                        value,
                    })
                    .collect(),
            };
        }

        Self::Table {
            columns: result.columns.clone(),
            rows: result.rows.iter().take(max_rows).cloned().collect(),
            total_rows: result.rows.len(),
            elapsed_ms: result.execution_time.as_millis() as u64,
        }
    }

    /// Display for a data frame, truncated to `max_rows`.
    pub fn for_frame(frame: &DataFrame, max_rows: usize) -> Self {
        Self::Frame {
            frame: DataFrame {
                columns: frame.columns.clone(),
                rows: frame.rows.iter().take(max_rows).cloned().collect(),
            },
            total_rows: frame.len(),
        }
    }

    /// Display for an error, with setup hints for connection problems.
    pub fn error(error: &CypherError, query: Option<&str>) -> Self {
        let hints = match error {
            CypherError::Connection(_) => vec![
                "Ensure the Neo4j instance is running.".to_string(),
                "Check the NEO4J_URI environment variable (default: bolt://localhost:7687)."
                    .to_string(),
                "Set NEO4J_USERNAME and NEO4J_PASSWORD, or run %neo4j bolt://localhost:7687 -u neo4j -p <password>."
                    .to_string(),
            ],
            _ => Vec::new(),
        };

        Self::Error {
            category: error.category().to_string(),
            message: error.message().to_string(),
            query: query
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
            hints,
        }
    }

    /// Returns true if this display reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Renders this display as styled text lines.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        let dim = Style::default().fg(Color::DarkGray);
        let bold = Style::default().add_modifier(Modifier::BOLD);

        match self {
            Self::Status { connected, message } => {
                let color = if *connected { Color::Green } else { Color::Red };
                vec![Line::from(vec![
                    Span::styled("●", Style::default().fg(color)),
                    Span::raw(format!(" {}", message)),
                ])]
            }
            Self::Success { message } => vec![Line::from(Span::styled(
                format!("✔ {}", message),
                Style::default().fg(Color::Green),
            ))],
            Self::Warning { message } => vec![Line::from(Span::styled(
                format!("⚠ {}", message),
                Style::default().fg(Color::Yellow),
            ))],
            Self::Error {
                category,
                message,
                query,
                hints,
            } => {
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("✗ {}: ", category),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(message.clone()),
                ])];
                for hint in hints {
                    lines.push(Line::from(Span::styled(format!("  • {}", hint), dim)));
                }
                if let Some(query) = query {
                    lines.push(Line::from(Span::styled("  Query:", dim)));
                    lines.extend(indented(query, dim));
                }
                lines
            }
            Self::StatementHeader {
                position,
                count,
                preview,
            } => vec![Line::from(vec![
                Span::styled(format!("Statement {}/{}: ", position, count), bold),
                Span::styled(preview.clone(), Style::default().fg(Color::Cyan)),
            ])],
            Self::Table {
                columns,
                rows,
                total_rows,
                elapsed_ms,
            } => ResultTable::new(columns, rows)
                .with_footer(format!(
                    "{} — {} ms",
                    row_summary(*total_rows, rows.len()),
                    elapsed_ms
                ))
                .render_to_lines(TEXT_WIDTH),
            Self::WriteSummary { counters } => {
                let columns = vec!["Counter".to_string(), "Value".to_string()];
                let rows: Vec<Vec<Value>> = counters
                    .iter()
                    .map(|c| vec![Value::from(c.name.as_str()), Value::Int(c.value as i64)])
                    .collect();
                let mut lines = vec![Line::from(Span::styled("Write result", bold))];
                lines.extend(ResultTable::new(&columns, &rows).render_to_lines(TEXT_WIDTH));
                lines
            }
            Self::NoResults => vec![Line::from(Span::styled(
                "Query returned no results.",
                dim.add_modifier(Modifier::ITALIC),
            ))],
            Self::Frame { frame, total_rows } => {
                let rows = frame.table_rows();
                ResultTable::new(&frame.columns, &rows)
                    .with_footer(format!(
                        "{} × {} columns",
                        row_summary(*total_rows, rows.len()),
                        frame.columns.len()
                    ))
                    .render_to_lines(TEXT_WIDTH)
            }
            Self::Graph { graph } => graph_lines(graph),
            Self::Blocked { rejection } => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        "⛔ Write query blocked",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(rejection.message.clone()),
                    Line::from(Span::styled(
                        format!(
                            "  Statement {}/{} ({}):",
                            rejection.position,
                            rejection.statement_count,
                            rejection.query_type.label()
                        ),
                        dim,
                    )),
                ];
                lines.extend(indented(&rejection.statement.text, dim));
                lines
            }
            Self::Help { text } => text.lines().map(|l| Line::from(l.to_string())).collect(),
        }
    }
}

/// "N rows" or "N rows (showing first M)".
fn row_summary(total: usize, shown: usize) -> String {
    let noun = if total == 1 { "row" } else { "rows" };
    if shown < total {
        format!("{} {} (showing first {})", total, noun, shown)
    } else {
        format!("{} {}", total, noun)
    }
}

fn indented(text: &str, style: Style) -> Vec<Line<'static>> {
    text.lines()
        .map(|l| Line::from(Span::styled(format!("    {}", l), style)))
        .collect()
}

fn graph_lines(graph: &VisualizationGraph) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "Graph: {} node{}, {} relationship{}",
            graph.nodes.len(),
            if graph.nodes.len() == 1 { "" } else { "s" },
            graph.relationships.len(),
            if graph.relationships.len() == 1 { "" } else { "s" },
        ),
        bold,
    ))];

    let caption = |id: &str| {
        graph
            .node(id)
            .map(|n| n.caption.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut connected = std::collections::HashSet::new();
    for rel in &graph.relationships {
        connected.insert(rel.source.as_str());
        connected.insert(rel.target.as_str());
        lines.push(Line::from(vec![
            Span::styled(format!("  ({})", caption(&rel.source)), Style::default().fg(Color::Cyan)),
            Span::raw(format!("-[:{}]->", rel.caption)),
            Span::styled(format!("({})", caption(&rel.target)), Style::default().fg(Color::Cyan)),
        ]));
    }
    for node in graph.nodes.iter().filter(|n| !connected.contains(n.id.as_str())) {
        lines.push(Line::from(Span::styled(
            format!("  ({})", node.caption),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines
}

/// Renders displays in the requested format.
pub fn render(displays: &[Display], format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let lines: Vec<Line<'static>> = displays.iter().flat_map(Display::to_lines).collect();
            Ok(if color {
                lines_to_ansi(&lines)
            } else {
                lines_to_plain(&lines)
            })
        }
        OutputFormat::Html => Ok(render_html(displays)),
        OutputFormat::Json => serde_json::to_string_pretty(displays)
            .map(|json| format!("{json}\n"))
            .map_err(|e| CypherError::internal(format!("Failed to serialize output: {e}"))),
    }
}
