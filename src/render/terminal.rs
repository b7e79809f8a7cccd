//! Terminal output for rendered lines.
//!
//! Converts styled ratatui lines to plain text or ANSI-coloured text using
//! crossterm's styling commands.

use crossterm::{
    queue,
    style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use ratatui::style::{Color, Modifier};
use ratatui::text::Line;
use std::io::Write;

/// Renders lines as plain text, trimming trailing spaces.
pub fn lines_to_plain(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        out.push_str(text.trim_end_matches(' '));
        out.push('\n');
    }
    out
}

/// Renders lines with ANSI colour and attribute sequences.
pub fn lines_to_ansi(lines: &[Line<'_>]) -> String {
    let mut out = Vec::new();
    match write_ansi(&mut out, lines) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => lines_to_plain(lines),
    }
}

fn write_ansi<W: Write>(out: &mut W, lines: &[Line<'_>]) -> std::io::Result<()> {
    for line in lines {
        for span in &line.spans {
            let style = span.style;
            let styled = style.fg.is_some() || !style.add_modifier.is_empty();

            if let Some(color) = style.fg.and_then(map_color) {
                queue!(out, SetForegroundColor(color))?;
            }
            if style.add_modifier.contains(Modifier::BOLD) {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if style.add_modifier.contains(Modifier::ITALIC) {
                queue!(out, SetAttribute(Attribute::Italic))?;
            }

            queue!(out, Print(span.content.as_ref()))?;

            if styled {
                queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
            }
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

/// Maps a ratatui colour to its crossterm equivalent.
fn map_color(color: Color) -> Option<TermColor> {
    let mapped = match color {
        Color::Reset => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;
    use ratatui::text::Span;

    fn sample() -> Vec<Line<'static>> {
        vec![
            Line::from(vec![
                Span::styled("Error", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw(": boom   "),
            ]),
            Line::from("plain"),
        ]
    }

    #[test]
    fn test_plain_output() {
        assert_eq!(lines_to_plain(&sample()), "Error: boom\nplain\n");
    }

    #[test]
    fn test_ansi_output_contains_escape_codes() {
        let ansi = lines_to_ansi(&sample());
        assert!(ansi.contains("\u{1b}["));
        assert!(ansi.contains("Error"));
        assert!(ansi.ends_with("plain\n"));
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(map_color(Color::Reset), None);
        assert_eq!(map_color(Color::DarkGray), Some(TermColor::DarkGrey));
        assert_eq!(
            map_color(Color::Rgb(1, 2, 3)),
            Some(TermColor::Rgb { r: 1, g: 2, b: 3 })
        );
    }
}
