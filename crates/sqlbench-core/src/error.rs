use thiserror::Error;

/// Core error type shared across sqlbench crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// Table metadata could not be read or is incomplete.
    #[error("introspection error: {0}")]
    Introspection(String),
    /// No further distinct primary key exists for the table.
    #[error("range of primary key exceeded: table={table} columns={columns}")]
    KeySpaceExhausted { table: String, columns: String },
    /// Column type outside char/varchar, date and decimal/numeric.
    #[error("SQL type={code} not yet implemented: table={table} column={column}")]
    UnsupportedType {
        table: String,
        column: String,
        code: i32,
    },
    /// A stored key value cannot be advanced by the generator.
    #[error("key value '{value}' cannot be advanced: table={table} column={column}")]
    InvalidKeyValue {
        table: String,
        column: String,
        value: String,
    },
    /// A foreign key has no committed parent rows to draw from.
    #[error("no appropriate foreign key data existing yet: foreign_key={foreign_key} parent={parent}")]
    MissingParentRows { foreign_key: String, parent: String },
    /// Two foreign keys of one table share a child column.
    #[error("several foreign keys including the same column are not supported: table={table} column={column}")]
    OverlappingForeignKeys { table: String, column: String },
    /// The schema model violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl Error {
    /// Stable machine-readable code, used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "database_error",
            Self::Introspection(_) => "introspection_error",
            Self::KeySpaceExhausted { .. } => "key_space_exhausted",
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::InvalidKeyValue { .. } => "invalid_key_value",
            Self::MissingParentRows { .. } => "missing_parent_rows",
            Self::OverlappingForeignKeys { .. } => "overlapping_foreign_keys",
            Self::InvalidSchema(_) => "invalid_schema",
        }
    }
}

/// Convenience alias for results returned by sqlbench crates.
pub type Result<T> = std::result::Result<T, Error>;
