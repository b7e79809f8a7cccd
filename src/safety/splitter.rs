//! Statement splitting for multi-statement cells.
//!
//! A statement ends at a semicolon that is the last non-whitespace character
//! on its line. String literals, backtick identifiers and comments are opaque:
//! a semicolon inside them never ends a statement.
//!
//! Literals follow Cypher's lexical grammar: `'...'` and `"..."` use
//! backslash escapes, so `\'` does not close a single-quoted string.

use super::Statement;

/// Lexer state while scanning a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    /// Inside a quoted literal or identifier opened by the given character.
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Splits cell text into ordered, trimmed, non-empty statements.
///
/// Splitting is total: unterminated literals or comments simply run to the
/// end of the cell.
pub fn split_statements(cell: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut state = LexState::Code;
    let mut segment_start = 0;
    let mut chars = cell.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match state {
            LexState::Code => match c {
                '\'' | '"' | '`' => state = LexState::Quoted(c),
                '/' if matches!(chars.peek(), Some((_, '/'))) => {
                    chars.next();
                    state = LexState::LineComment;
                }
                '/' if matches!(chars.peek(), Some((_, '*'))) => {
                    chars.next();
                    state = LexState::BlockComment;
                }
                ';' if ends_line(cell, pos + 1) => {
                    push_segment(&mut statements, cell, segment_start, pos);
                    segment_start = pos + 1;
                }
                _ => {}
            },
            LexState::Quoted(quote) => {
                if c == '\\' && quote != '`' {
                    chars.next();
                } else if c == quote {
                    state = LexState::Code;
                }
            }
            LexState::LineComment => {
                if c == '\n' {
                    state = LexState::Code;
                }
            }
            LexState::BlockComment => {
                if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    state = LexState::Code;
                }
            }
        }
    }

    push_segment(&mut statements, cell, segment_start, cell.len());
    statements
}

/// Returns true if only whitespace follows `from` up to the next newline.
fn ends_line(cell: &str, from: usize) -> bool {
    cell[from..]
        .chars()
        .take_while(|&c| c != '\n')
        .all(char::is_whitespace)
}

/// Trims `cell[start..end]` and records it unless it is blank.
fn push_segment(statements: &mut Vec<Statement>, cell: &str, start: usize, end: usize) {
    let segment = &cell[start..end];
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = segment.len() - segment.trim_start().len();
    statements.push(Statement::new(trimmed, start + leading));
}
