use thiserror::Error;

/// Translation failures. Returned inside a rewrite outcome, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    #[error("SQL syntax code of source database system is unknown: {0}")]
    UnknownSource(String),
    #[error("SQL syntax code of target database system is unknown: {0}")]
    UnknownTarget(String),
    #[error("no appropriate translation method is implemented: from={from} to={to}")]
    NoTranslation { from: String, to: String },
    #[error("domain definition is not unique: domain={name} stored={stored} new={new}")]
    AmbiguousDomain {
        name: String,
        stored: String,
        new: String,
    },
    #[error("syntax error with NOT NULL: statement={0}")]
    NotNullSyntax(String),
}
