//! Result table rendering.
//!
//! Renders rows as box-drawn tables with column headers, auto-sized
//! columns and styled null values, as ratatui `Line`s.

use crate::db::Value;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Table of values with an optional dimmed footer line.
pub struct ResultTable<'a> {
    columns: &'a [String],
    rows: &'a [Vec<Value>],
    footer: Option<String>,
}

impl<'a> ResultTable<'a> {
    /// Creates a new result table.
    pub fn new(columns: &'a [String], rows: &'a [Vec<Value>]) -> Self {
        Self {
            columns,
            rows,
            footer: None,
        }
    }

    /// Sets the footer shown below the table.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Calculates the optimal width for each column, in characters.
    fn calculate_column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|col| col.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in self.rows {
            for (i, value) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    let value_len = cell_text(value).chars().count();
                    *width = (*width).max(value_len);
                }
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates a string to fit within the given width, adding ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let head: String = s.chars().take(max_width - 3).collect();
            format!("{head}...")
        }
    }

    /// Renders the table to lines, shrinking columns to fit `available_width`.
    pub fn render_to_lines(&self, available_width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if self.columns.is_empty() {
            lines.push(Line::from(Span::styled(
                "(empty result)",
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        let widths = self.calculate_column_widths();

        // Borders and padding take three characters per column plus one.
        let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
        let scale_factor = if total_width > available_width && available_width > 0 {
            available_width as f64 / total_width as f64
        } else {
            1.0
        };

        let adjusted_widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        lines.push(render_border(&adjusted_widths, '┌', '┬', '┐'));
        lines.push(self.render_header_row(&adjusted_widths));
        lines.push(render_border(&adjusted_widths, '├', '┼', '┤'));

        for row in self.rows {
            lines.push(render_data_row(row, &adjusted_widths));
        }

        lines.push(render_border(&adjusted_widths, '└', '┴', '┘'));

        if let Some(footer) = &self.footer {
            lines.push(Line::from(Span::styled(
                footer.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        lines
    }

    /// Renders the header row with column names.
    fn render_header_row(&self, widths: &[usize]) -> Line<'static> {
        let mut spans = vec![border_span()];

        for (i, col) in self.columns.iter().enumerate() {
            let width = widths.get(i).copied().unwrap_or(MIN_COLUMN_WIDTH);
            spans.push(Span::styled(
                pad(&Self::truncate(col, width), width),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(border_span());
        }

        Line::from(spans)
    }
}

/// Single-line text of a value; newlines would break the table grid.
fn cell_text(value: &Value) -> String {
    value.to_display_string().replace(['\n', '\r'], " ")
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.chars().count());
    format!(" {}{} ", text, " ".repeat(fill))
}

fn border_span() -> Span<'static> {
    Span::styled("│", Style::default().fg(Color::DarkGray))
}

/// Renders a horizontal border line.
fn render_border(widths: &[usize], left: char, mid: char, right: char) -> Line<'static> {
    let mut border = String::new();
    border.push(left);

    for (i, &width) in widths.iter().enumerate() {
        border.push_str(&"─".repeat(width + 2));
        if i + 1 < widths.len() {
            border.push(mid);
        }
    }

    border.push(right);

    Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
}

/// Renders a data row.
fn render_data_row(row: &[Value], widths: &[usize]) -> Line<'static> {
    let mut spans = vec![border_span()];

    for (i, &width) in widths.iter().enumerate() {
        let value = row.get(i).unwrap_or(&Value::Null);
        let truncated = ResultTable::truncate(&cell_text(value), width);

        let style = if value.is_null() {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
        };

        spans.push(Span::styled(pad(&truncated, width), style));
        spans.push(border_span());
    }

    Line::from(spans)
}
