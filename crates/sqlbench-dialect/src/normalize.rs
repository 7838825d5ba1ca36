/// Canonical form of a statement.
///
/// Trims the text, drops one trailing `;`, collapses whitespace runs to a
/// single space (none before `;`) and upper-cases everything outside
/// single-quoted literals. Literal spans are copied verbatim.
pub fn normalize(statement: &str) -> String {
    let trimmed = statement.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();

    let mut out = String::with_capacity(trimmed.len());
    let mut in_literal = false;
    let mut pending_space = false;

    for ch in trimmed.chars() {
        if in_literal {
            out.push(ch);
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            if ch != ';' {
                out.push(' ');
            }
            pending_space = false;
        }
        if ch == '\'' {
            in_literal = true;
            out.push(ch);
            continue;
        }
        out.extend(ch.to_uppercase());
    }

    out
}

/// Split a script into statements on `;` outside string literals.
///
/// `--` comments are dropped up to the end of their line and blank
/// statements are skipped.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_literal = false;
    let mut chars = script.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_literal {
            current.push(ch);
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }
        match ch {
            '\'' => {
                in_literal = true;
                current.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            ';' => flush_statement(&mut statements, &mut current),
            _ => current.push(ch),
        }
    }
    flush_statement(&mut statements, &mut current);

    statements
}

fn flush_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_uppercases() {
        assert_eq!(
            normalize("  create   table\tt\n(a  char(1)) ;"),
            "CREATE TABLE T (A CHAR(1))"
        );
    }

    #[test]
    fn preserves_literal_content() {
        assert_eq!(
            normalize("insert into t values ('Mixed  Case', 'it''s')"),
            "INSERT INTO T VALUES ('Mixed  Case', 'it''s')"
        );
    }

    #[test]
    fn drops_whitespace_before_semicolon() {
        assert_eq!(normalize("select 1 ; select 2"), "SELECT 1; SELECT 2");
    }

    #[test]
    fn splits_outside_literals_and_skips_comments() {
        let script = "-- header\ncreate domain a as char(1);\ninsert into t values ('x;y');\n\n;";
        assert_eq!(
            split_statements(script),
            ["create domain a as char(1)", "insert into t values ('x;y')"]
        );
    }
}
