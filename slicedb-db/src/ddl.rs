//! Splits a block of DDL text (as emitted by an external `pg_dump`-style
//! tool) into individual statements (§4.3.6). The restore side executes
//! pre-data/post-data statements one at a time against the simple query
//! protocol, so statement boundaries matter.
//!
//! The tokenizer is a small state machine over single-quoted string
//! literals, double-quoted identifiers, and `--` line comments; a `;`
//! outside all three ends a statement. `"` opens a quoted identifier, not
//! just `'` strings, since DDL frequently quotes identifiers that collide
//! with reserved words.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Other,
    CommentStart,
    Comment,
    String,
    StringQuote,
    Identifier,
}

/// Splits `text` into trimmed, non-empty statements (the trailing `;` is
/// dropped from each).
pub fn split_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Other;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            State::Other => match c {
                '-' if chars.peek() == Some(&'-') => {
                    state = State::CommentStart;
                    current.push(c);
                }
                '\'' => {
                    state = State::String;
                    current.push(c);
                }
                '"' => {
                    state = State::Identifier;
                    current.push(c);
                }
                ';' => {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        statements.push(trimmed.to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
            State::CommentStart => {
                // The second `-` of `--`; fall through into a full comment.
                state = State::Comment;
                current.push(c);
            }
            State::Comment => {
                current.push(c);
                if c == '\n' {
                    state = State::Other;
                }
            }
            State::String => {
                current.push(c);
                if c == '\'' {
                    state = State::StringQuote;
                }
            }
            State::StringQuote => {
                if c == '\'' {
                    // Doubled quote: an escaped `'` inside the literal.
                    current.push(c);
                    state = State::String;
                } else {
                    state = State::Other;
                    // Re-dispatch `c` under `Other` rules.
                    match c {
                        ';' => {
                            let trimmed = current.trim();
                            if !trimmed.is_empty() {
                                statements.push(trimmed.to_string());
                            }
                            current.clear();
                        }
                        '\'' => unreachable!(),
                        '"' => {
                            state = State::Identifier;
                            current.push(c);
                        }
                        '-' if chars.peek() == Some(&'-') => {
                            state = State::CommentStart;
                            current.push(c);
                        }
                        _ => current.push(c),
                    }
                }
            }
            State::Identifier => {
                current.push(c);
                if c == '"' {
                    state = State::Other;
                }
            }
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_outside_literals() {
        let stmts = split_statements("CREATE TABLE a (id int); CREATE TABLE b (id int);");
        assert_eq!(stmts, vec!["CREATE TABLE a (id int)", "CREATE TABLE b (id int)"]);
    }

    #[test]
    fn ignores_semicolons_inside_string_literals() {
        let stmts = split_statements("INSERT INTO a VALUES ('a;b'); SELECT 1;");
        assert_eq!(stmts, vec!["INSERT INTO a VALUES ('a;b')", "SELECT 1"]);
    }

    #[test]
    fn handles_escaped_quotes_inside_a_literal() {
        let stmts = split_statements("INSERT INTO a VALUES ('it''s; fine');");
        assert_eq!(stmts, vec!["INSERT INTO a VALUES ('it''s; fine')"]);
    }

    #[test]
    fn ignores_semicolons_inside_quoted_identifiers() {
        let stmts = split_statements(r#"CREATE TABLE "weird;name" (id int);"#);
        assert_eq!(stmts, vec![r#"CREATE TABLE "weird;name" (id int)"#]);
    }

    #[test]
    fn ignores_semicolons_in_line_comments() {
        let stmts = split_statements("-- comment; with a semicolon\nSELECT 1;");
        assert_eq!(stmts, vec!["-- comment; with a semicolon\nSELECT 1"]);
    }

    #[test]
    fn drops_trailing_whitespace_only_fragment() {
        let stmts = split_statements("SELECT 1;   \n\n  ");
        assert_eq!(stmts, vec!["SELECT 1"]);
    }
}
