//! Notebook script parsing.
//!
//! A script is a plain-text notebook. Cells are separated by `# %%` marker
//! lines, and every line starting with `%` begins a new cell. A `%name` line
//! magic is a cell on its own; a `%%name` cell magic takes the lines that
//! follow it, up to the next marker or magic line.

/// Cell marker line (percent-format notebooks).
const CELL_MARKER: &str = "# %%";

/// Splits a notebook script into cells, dropping blank ones.
pub fn split_cells(script: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in script.lines() {
        let trimmed = line.trim_end();

        if trimmed.trim_start().starts_with(CELL_MARKER) {
            flush(&mut cells, &mut current);
            continue;
        }

        if trimmed.starts_with("%%") {
            flush(&mut cells, &mut current);
            current.push(trimmed);
        } else if trimmed.starts_with('%') {
            flush(&mut cells, &mut current);
            cells.push(trimmed.to_string());
        } else {
            current.push(line);
        }
    }
    flush(&mut cells, &mut current);

    cells
}

fn flush(cells: &mut Vec<String>, current: &mut Vec<&str>) {
    let cell = current.join("\n");
    current.clear();
    if !cell.trim().is_empty() {
        cells.push(cell.trim_end().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_magics_are_single_cells() {
        let cells = split_cells("%neo4j bolt://localhost:7687\n%cypher MATCH (n) RETURN n\n");
        assert_eq!(
            cells,
            vec![
                "%neo4j bolt://localhost:7687".to_string(),
                "%cypher MATCH (n) RETURN n".to_string(),
            ]
        );
    }

    #[test]
    fn test_cell_magic_takes_following_lines() {
        let script = "%%cypher -o people\nMATCH (p:Person)\nRETURN p.name;\n\n%cypher RETURN 1";
        let cells = split_cells(script);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], "%%cypher -o people\nMATCH (p:Person)\nRETURN p.name;");
        assert_eq!(cells[1], "%cypher RETURN 1");
    }

    #[test]
    fn test_markers_separate_plain_cells() {
        let script = "# %%\nRETURN 1\n# %% second\nRETURN 2\n";
        assert_eq!(
            split_cells(script),
            vec!["RETURN 1".to_string(), "RETURN 2".to_string()]
        );
    }

    #[test]
    fn test_blank_cells_are_dropped() {
        assert!(split_cells("\n\n# %%\n   \n# %%\n").is_empty());
    }

    #[test]
    fn test_marker_ends_cell_magic() {
        let script = "%%wcypher\nCREATE (n)\n# %%\nRETURN 1";
        assert_eq!(
            split_cells(script),
            vec!["%%wcypher\nCREATE (n)".to_string(), "RETURN 1".to_string()]
        );
    }
}
