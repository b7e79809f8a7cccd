//! HTML rendering of cell displays.

use std::fmt::Write;

use super::{Display, VisualizationGraph};
use crate::db::Value;

const STYLE: &str = "\
body{font-family:sans-serif;font-size:13px;color:#333;margin:16px}\
table.cypher{border-collapse:collapse;margin:6px 0}\
table.cypher th{background:#f0f4f8;text-align:left;padding:4px 8px;border:1px solid #d0d7de}\
table.cypher td{padding:4px 8px;border:1px solid #d0d7de;font-family:monospace}\
td.null{color:#999;font-style:italic}\
.footer{color:#777;font-size:12px}\
.statement{font-weight:bold;margin-top:12px}\
.statement code{font-weight:normal;color:#0b6e99}\
.message{padding:6px 10px;margin:6px 0;border-radius:3px}\
.success{background:#eafaf1;color:#1e8449}\
.warning{background:#fef9e7;color:#b9770e}\
.status{background:#f4f6f7}\
.error{border-left:4px solid #c0392b;padding:10px 14px;margin:6px 0;background:#fff8f8}\
.error .title{font-weight:bold;color:#c0392b;font-size:14px}\
.blocked{border-left:4px solid #e67e22;padding:10px 14px;margin:6px 0;background:#fffaf3}\
.blocked .title{font-weight:bold;color:#e67e22;font-size:14px}\
pre{background:#f8f8f8;padding:8px;border-radius:3px;font-size:12px}\
ul.hints{font-size:12px;color:#555;margin:6px 0 0 14px}";

/// Escapes text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders all displays as one standalone HTML document.
pub fn render_html(displays: &[Display]) -> String {
    let mut body = String::new();
    for display in displays {
        body.push_str(&render_fragment(display));
        body.push('\n');
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>cypher-cells</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

/// Renders a single display as an HTML fragment.
pub fn render_fragment(display: &Display) -> String {
    match display {
        Display::Status { connected, message } => format!(
            "<div class=\"message status\">{} {}</div>",
            if *connected { "&#x1F7E2;" } else { "&#x26AA;" },
            escape_html(message)
        ),
        Display::Success { message } => format!(
            "<div class=\"message success\">&#x2714; {}</div>",
            escape_html(message)
        ),
        Display::Warning { message } => format!(
            "<div class=\"message warning\">&#x26A0; {}</div>",
            escape_html(message)
        ),
        Display::Error {
            category,
            message,
            query,
            hints,
        } => {
            let mut out = format!(
                "<div class=\"error\"><div class=\"title\">&#x2717; {}</div><div>{}</div>",
                escape_html(category),
                escape_html(message)
            );
            if !hints.is_empty() {
                out.push_str("<ul class=\"hints\">");
                for hint in hints {
                    let _ = write!(out, "<li>{}</li>", escape_html(hint));
                }
                out.push_str("</ul>");
            }
            if let Some(query) = query {
                let _ = write!(
                    out,
                    "<details><summary>Query</summary><pre>{}</pre></details>",
                    escape_html(query)
                );
            }
            out.push_str("</div>");
            out
        }
        Display::StatementHeader {
            position,
            count,
            preview,
        } => format!(
            "<div class=\"statement\">Statement {}/{}: <code>{}</code></div>",
            position,
            count,
            escape_html(preview)
        ),
        Display::Table {
            columns,
            rows,
            total_rows,
            elapsed_ms,
        } => {
            let mut out = table(columns, rows);
            let _ = write!(
                out,
                "<div class=\"footer\">{} &#x2014; {} ms</div>",
                escape_html(&super::row_summary(*total_rows, rows.len())),
                elapsed_ms
            );
            out
        }
        Display::WriteSummary { counters } => {
            let columns = vec!["Counter".to_string(), "Value".to_string()];
            let rows: Vec<Vec<Value>> = counters
                .iter()
                .map(|c| vec![Value::from(c.name.as_str()), Value::Int(c.value as i64)])
                .collect();
            format!("<div><strong>Write result</strong></div>{}", table(&columns, &rows))
        }
        Display::NoResults => {
            "<div class=\"footer\"><em>Query returned no results.</em></div>".to_string()
        }
        Display::Frame { frame, total_rows } => {
            let rows = frame.table_rows();
            let mut out = table(&frame.columns, &rows);
            let _ = write!(
                out,
                "<div class=\"footer\">{} &#xD7; {} columns</div>",
                escape_html(&super::row_summary(*total_rows, rows.len())),
                frame.columns.len()
            );
            out
        }
        Display::Graph { graph } => graph_fragment(graph),
        Display::Blocked { rejection } => format!(
            "<div class=\"blocked\"><div class=\"title\">&#x26D4; Write query blocked</div>\
             <div>{}</div><div>Statement {}/{} detected as <strong>{}</strong>:</div>\
             <pre>{}</pre></div>",
            escape_html(&rejection.message),
            rejection.position,
            rejection.statement_count,
            rejection.query_type.label(),
            escape_html(&rejection.statement.text)
        ),
        Display::Help { text } => format!("<pre>{}</pre>", escape_html(text)),
    }
}

fn table(columns: &[String], rows: &[Vec<Value>]) -> String {
    let mut out = String::from("<table class=\"cypher\"><thead><tr>");
    for column in columns {
        let _ = write!(out, "<th>{}</th>", escape_html(column));
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for i in 0..columns.len() {
            match row.get(i) {
                Some(value) if !value.is_null() => {
                    let _ = write!(out, "<td>{}</td>", escape_html(&value.to_display_string()));
                }
                _ => out.push_str("<td class=\"null\">null</td>"),
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

/// Graph data is embedded as JSON for client-side drawing, with a readable list.
fn graph_fragment(graph: &VisualizationGraph) -> String {
    let data = serde_json::to_string(graph).unwrap_or_else(|_| "{}".to_string());
    let mut out = format!(
        "<div class=\"graph\"><div><strong>Graph</strong>: {} nodes, {} relationships</div><ul>",
        graph.nodes.len(),
        graph.relationships.len()
    );
    let caption = |id: &str| {
        graph
            .node(id)
            .map(|n| n.caption.clone())
            .unwrap_or_else(|| id.to_string())
    };
    for rel in &graph.relationships {
        let _ = write!(
            out,
            "<li>({})-[:{}]-&gt;({})</li>",
            escape_html(&caption(&rel.source)),
            escape_html(&rel.caption),
            escape_html(&caption(&rel.target))
        );
    }
    // JSON inside a script tag must not close the tag early.
    let _ = write!(
        out,
        "</ul><script type=\"application/json\" class=\"graph-data\">{}</script></div>",
        data.replace("</", "<\\/")
    );
    out
}
