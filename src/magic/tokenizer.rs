//! Tokenizer for magic argument lines.
//!
//! Splits a magic line into shell-like words with support for:
//! - Quoted strings (single and double quotes)
//! - Escape sequences within quotes
//! - Byte spans, so the unparsed remainder of a line can be recovered

/// A word parsed from a magic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The word with quotes removed and escapes applied.
    pub text: String,
    /// Byte offset of the first character of the word in the input.
    pub start: usize,
    /// Byte offset one past the last character of the word.
    pub end: usize,
}

impl Token {
    /// Returns true if this word looks like a flag (`-x` or `--name`).
    pub fn is_flag(&self) -> bool {
        self.text.len() > 1 && self.text.starts_with('-')
    }

    /// Returns the flag name without its inline `=value`, if any.
    pub fn flag_name(&self) -> &str {
        match self.text.find('=') {
            Some(pos) => &self.text[..pos],
            None => &self.text,
        }
    }
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

/// Tokenizes a magic argument line.
///
/// Handles:
/// - Whitespace-separated words
/// - Double-quoted strings: `"hello world"` → `hello world`
/// - Single-quoted strings: `'{"a": 1}'` → `{"a": 1}`
/// - Escape sequences in quotes: `"say \"hi\""` → `say "hi"`
/// - Quotes inside a word: `--params='{"a": 1}'` → `--params={"a": 1}`
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let text = collect_word(&mut chars);
        let end = chars.peek().map(|&(pos, _)| pos).unwrap_or(input.len());
        tokens.push(Token { text, start, end });
    }

    tokens
}

/// Collects a word, handling quoted sections.
fn collect_word(chars: &mut Chars<'_>) -> String {
    let mut result = String::new();

    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            break;
        }

        chars.next();
        if c == '"' || c == '\'' {
            let quoted = collect_quoted(chars, c);
            result.push_str(&quoted);
            continue;
        }

        result.push(c);
    }

    result
}

/// Collects characters inside quotes, handling escape sequences.
fn collect_quoted(chars: &mut Chars<'_>, quote: char) -> String {
    let mut result = String::new();
    let mut escaped = false;

    for (_, c) in chars.by_ref() {
        if escaped {
            match c {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                '\\' => result.push('\\'),
                '"' => result.push('"'),
                '\'' => result.push('\''),
                _ => {
                    // Unknown escape, keep as-is
                    result.push('\\');
                    result.push(c);
                }
            }
            escaped = false;
            continue;
        }

        if c == '\\' {
            escaped = true;
            continue;
        }

        if c == quote {
            break;
        }

        result.push(c);
    }

    result
}
