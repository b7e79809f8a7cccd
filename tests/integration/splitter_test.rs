//! Statement splitting properties over realistic cells.

use cypher_cells::safety::split_statements;

fn texts(cell: &str) -> Vec<String> {
    split_statements(cell).into_iter().map(|s| s.text).collect()
}

#[test]
fn test_no_trailing_semicolon_is_one_statement() {
    let cell = "  MATCH (n:Person)\n  WHERE n.age > 30\n  RETURN n.name  ";
    assert_eq!(texts(cell), vec![cell.trim()]);
}

#[test]
fn test_semicolon_in_literal_only() {
    let cell = "MATCH (n) WHERE n.bio = 'a;\nb' RETURN n";
    assert_eq!(texts(cell), vec![cell]);
}

#[test]
fn test_n_separators_give_n_plus_one_statements() {
    let cell = "CREATE (a:Person {name: 'Ann; Lee'});\n\
                CREATE (b:Person {name: \"Bob\"});\n\
                MATCH (a:Person), (b:Person) CREATE (a)-[:KNOWS]->(b);\n\
                MATCH (n) RETURN count(n)";
    let statements = texts(cell);
    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0], "CREATE (a:Person {name: 'Ann; Lee'})");
    assert_eq!(statements[3], "MATCH (n) RETURN count(n)");
}

#[test]
fn test_resplitting_is_idempotent() {
    let cell = "MATCH (n) RETURN n LIMIT 10;\nRETURN 'x;y' AS s;\nRETURN 1; RETURN 2";
    for statement in split_statements(cell) {
        let again = split_statements(&statement.text);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].text, statement.text);
    }
}

#[test]
fn test_offsets_slice_the_cell() {
    let cell = "RETURN 'é';\n  RETURN 2  ";
    for statement in split_statements(cell) {
        assert_eq!(&cell[statement.start..statement.end], statement.text);
    }
}
