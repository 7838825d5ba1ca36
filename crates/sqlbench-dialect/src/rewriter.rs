use std::collections::BTreeMap;

use regex::{NoExpand, Regex};
use tracing::{debug, warn};

use crate::dialect::SqlDialect;
use crate::errors::DialectError;
use crate::normalize::{normalize, split_statements};

const NOT_NULL: &str = " NOT NULL ";

/// Result of translating one statement.
///
/// Empty text without an error means the statement was intentionally
/// suppressed; empty text with an error is a hard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub error: Option<DialectError>,
}

impl RewriteOutcome {
    fn translated(text: String) -> Self {
        Self { text, error: None }
    }

    fn failed(text: String, error: DialectError) -> Self {
        Self {
            text,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_suppressed(&self) -> bool {
        self.text.is_empty() && self.error.is_none()
    }
}

/// One statement of a script with its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRewrite {
    pub statement: String,
    pub outcome: RewriteOutcome,
}

/// Dialect translator holding the domains learned in the current session.
#[derive(Debug, Default)]
pub struct SqlRewriter {
    domains: BTreeMap<String, String>,
    last_error: Option<String>,
}

impl SqlRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message of the most recent failed rewrite, if the last call failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn domain(&self, name: &str) -> Option<&str> {
        self.domains.get(name).map(String::as_str)
    }

    /// Forget every learned domain.
    pub fn reset_domains(&mut self) {
        self.domains.clear();
    }

    /// Translate `text` from the `source` dialect to the `target` dialect.
    pub fn rewrite(&mut self, source: &str, target: &str, text: &str) -> RewriteOutcome {
        let outcome = self.rewrite_inner(source, target, text);
        self.last_error = outcome.error.as_ref().map(ToString::to_string);
        if let Some(error) = &outcome.error {
            warn!(source = %source, target = %target, error = %error, "statement not translated");
        }
        outcome
    }

    /// Translate every statement of a script within one domain session.
    pub fn rewrite_script(
        &mut self,
        source: &str,
        target: &str,
        script: &str,
    ) -> Vec<StatementRewrite> {
        split_statements(script)
            .into_iter()
            .map(|statement| {
                let outcome = self.rewrite(source, target, &statement);
                StatementRewrite { statement, outcome }
            })
            .collect()
    }

    fn rewrite_inner(&mut self, source: &str, target: &str, text: &str) -> RewriteOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            return RewriteOutcome::translated(String::new());
        }
        if source == target {
            return RewriteOutcome::translated(text.to_string());
        }

        let Some(from) = SqlDialect::from_code(source) else {
            return RewriteOutcome::failed(
                String::new(),
                DialectError::UnknownSource(source.to_string()),
            );
        };
        let Some(to) = SqlDialect::from_code(target) else {
            return RewriteOutcome::failed(
                String::new(),
                DialectError::UnknownTarget(target.to_string()),
            );
        };

        match (from, to) {
            (SqlDialect::Sql1999, SqlDialect::Oracle10g) => self.sql1999_to_oracle(text),
            _ => RewriteOutcome::failed(
                String::new(),
                DialectError::NoTranslation {
                    from: source.to_string(),
                    to: target.to_string(),
                },
            ),
        }
    }

    fn sql1999_to_oracle(&mut self, text: &str) -> RewriteOutcome {
        let normalized = normalize(text);
        let tokens = normalized.splitn(3, ' ').collect::<Vec<_>>();
        if tokens.len() < 3 {
            return RewriteOutcome::translated(normalized);
        }

        match (tokens[0], tokens[1]) {
            ("CREATE", "DOMAIN") => self.store_domain(tokens[2], &normalized),
            ("CREATE", "TABLE") => {
                let substituted = self.substitute_domains(&normalized);
                match shift_not_null(&substituted) {
                    Ok(shifted) => RewriteOutcome::translated(shifted),
                    Err(error) => RewriteOutcome::failed(text.to_string(), error),
                }
            }
            ("DROP", "TABLE" | "VIEW") => RewriteOutcome::translated(normalized.replacen(
                "CASCADE",
                "CASCADE CONSTRAINTS",
                1,
            )),
            _ => RewriteOutcome::translated(normalized),
        }
    }

    fn store_domain(&mut self, declaration: &str, normalized: &str) -> RewriteOutcome {
        let Some((name, definition)) = declaration.split_once(" AS ") else {
            return RewriteOutcome::translated(normalized.to_string());
        };

        match self.domains.get(name) {
            Some(stored) if stored == definition => RewriteOutcome::translated(String::new()),
            Some(stored) => RewriteOutcome::failed(
                String::new(),
                DialectError::AmbiguousDomain {
                    name: name.to_string(),
                    stored: stored.clone(),
                    new: definition.to_string(),
                },
            ),
            None => {
                debug!(domain = %name, definition = %definition, "domain stored");
                self.domains
                    .insert(name.to_string(), definition.to_string());
                RewriteOutcome::translated(String::new())
            }
        }
    }

    /// Replace every stored domain name appearing as a whole word, longest
    /// names first.
    fn substitute_domains(&self, statement: &str) -> String {
        let mut names = self.domains.keys().collect::<Vec<_>>();
        names.sort_by(|left, right| right.len().cmp(&left.len()).then(left.cmp(right)));

        let mut result = statement.to_string();
        for name in names {
            let definition = &self.domains[name];
            result = match Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
                Ok(pattern) => pattern
                    .replace_all(&result, NoExpand(definition))
                    .into_owned(),
                Err(_) => result.replace(name.as_str(), definition),
            };
        }
        result
    }
}

/// Move every `NOT NULL` behind the remaining clauses of its column.
///
/// Each segment following ` NOT NULL ` is split at its first comma: the part
/// before the comma belongs to the same column and is placed ahead of the
/// constraint. The last segment closes the column list instead.
fn shift_not_null(statement: &str) -> Result<String, DialectError> {
    let segments = statement.split(NOT_NULL).collect::<Vec<_>>();
    let Some((head, rest)) = segments.split_first() else {
        return Ok(statement.to_string());
    };

    let mut result = head.to_string();
    let last = rest.len().saturating_sub(1);
    for (index, segment) in rest.iter().enumerate() {
        if let Some((clause, tail)) = segment.split_once(',') {
            push_clause(&mut result, clause);
            result.push_str(" NOT NULL,");
            result.push_str(tail);
        } else if index == last {
            let clause = segment
                .strip_suffix(')')
                .ok_or_else(|| DialectError::NotNullSyntax(statement.to_string()))?;
            push_clause(&mut result, clause);
            result.push_str(" NOT NULL)");
        } else {
            return Err(DialectError::NotNullSyntax(statement.to_string()));
        }
    }
    Ok(result)
}

fn push_clause(result: &mut String, clause: &str) {
    let clause = clause.trim();
    if !clause.is_empty() {
        result.push(' ');
        result.push_str(clause);
    }
}
