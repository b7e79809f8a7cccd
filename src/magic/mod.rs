//! Magic command parsing for cypher-cells.
//!
//! A cell starting with `%name` is a line magic whose arguments follow on the
//! same line; `%%name` is a cell magic whose header holds the flags and whose
//! body is the query. Supported magics are `%neo4j`, `%cypher`/`%%cypher`
//! and `%wcypher`/`%%wcypher`.

mod args;
mod tokenizer;

pub use args::{ConnectArgs, CypherArgs};
pub use tokenizer::{tokenize, Token};

use clap::error::ErrorKind;
use clap::Parser;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{CypherError, Result};
use args::CYPHER_VALUE_FLAGS;

/// A parsed magic invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Magic {
    /// `%neo4j`: connection management.
    Connect(ConnectArgs),
    /// `%cypher`, `%%cypher`, `%wcypher` or `%%wcypher`.
    Cypher(CypherCall),
    /// `--help` was requested; holds the rendered help text.
    Help(String),
}

/// A Cypher magic invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CypherCall {
    pub args: CypherArgs,
    /// Query text (line remainder or cell body), trimmed.
    pub query: String,
    /// True for `%%` cell magics.
    pub is_cell: bool,
    /// True when write permission was granted by `--write` or `%wcypher`.
    pub allow_write: bool,
}

fn header_regex() -> Result<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(r"^(%%?)([A-Za-z_]\w*)(?:[ \t]+(.*))?$").ok())
        .as_ref()
        .ok_or_else(|| CypherError::internal("Invalid magic header pattern"))
}

/// Returns true if the text starts with a magic marker.
pub fn is_magic(text: &str) -> bool {
    text.trim_start().starts_with('%')
}

/// Parses a cell that starts with a magic.
pub fn parse_cell(text: &str) -> Result<Magic> {
    let text = text.trim_start();
    let (header, body) = match text.split_once('\n') {
        Some((header, body)) => (header.trim_end_matches('\r'), body),
        None => (text, ""),
    };

    let caps = header_regex()?
        .captures(header.trim_end())
        .ok_or_else(|| CypherError::magic(format!("Not a magic invocation: {}", header)))?;

    let is_cell = &caps[1] == "%%";
    let name = &caps[2];
    let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");

    match (name, is_cell) {
        ("neo4j", false) => {
            // Line magics take everything after the name.
            let line = join_line(rest, body);
            let words: Vec<String> = tokenize(&line).into_iter().map(|t| t.text).collect();
            match ConnectArgs::try_parse_from(words) {
                Ok(args) => Ok(Magic::Connect(args)),
                Err(e) => clap_error(e),
            }
        }
        ("neo4j", true) => Err(CypherError::magic(
            "%neo4j is a line magic; use %neo4j instead of %%neo4j",
        )),
        ("cypher" | "wcypher", _) => {
            let (flags, query) = if is_cell {
                let flags: Vec<String> = tokenize(rest).into_iter().map(|t| t.text).collect();
                (flags, body.trim().to_string())
            } else {
                split_line_query(&join_line(rest, body))
            };

            let args = match CypherArgs::try_parse_from(flags) {
                Ok(args) => args,
                Err(e) => return clap_error(e),
            };
            let allow_write = name == "wcypher" || args.write;

            Ok(Magic::Cypher(CypherCall {
                args,
                query,
                is_cell,
                allow_write,
            }))
        }
        (other, _) => Err(CypherError::magic(format!(
            "Unknown magic: {}{}. Available: %neo4j, %cypher, %%cypher, %wcypher, %%wcypher",
            &caps[1], other
        ))),
    }
}

/// Joins a line magic's header remainder with any following lines.
fn join_line(rest: &str, body: &str) -> String {
    if body.trim().is_empty() {
        rest.to_string()
    } else {
        format!("{}\n{}", rest, body)
    }
}

/// Splits a line magic into leading flag words and the raw query remainder.
fn split_line_query(line: &str) -> (Vec<String>, String) {
    let tokens = tokenize(line);
    let mut flags = Vec::new();
    let mut i = 0;

    while i < tokens.len() && tokens[i].is_flag() {
        let token = &tokens[i];
        flags.push(token.text.clone());
        // `--output=res` carries its value inline.
        let inline_value = token.flag_name().len() < token.text.len();
        let takes_value = !inline_value && CYPHER_VALUE_FLAGS.contains(&token.flag_name());
        if takes_value && i + 1 < tokens.len() {
            flags.push(tokens[i + 1].text.clone());
            i += 2;
        } else {
            i += 1;
        }
    }

    let query = tokens
        .get(i)
        .map(|t| line[t.start..].trim().to_string())
        .unwrap_or_default();
    (flags, query)
}

fn clap_error(e: clap::Error) -> Result<Magic> {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(Magic::Help(e.to_string())),
        _ => Err(CypherError::magic(e.to_string().trim().to_string())),
    }
}
