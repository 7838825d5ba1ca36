use thiserror::Error;

/// Errors returned by the generation engine.
///
/// Key space exhaustion and other per-row failures stop the loop but are
/// recorded in the report; only these abort the call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// The schema model is inconsistent with itself.
    #[error(transparent)]
    Core(#[from] sqlbench_core::Error),
    #[error(
        "database failure on table '{table}' after {rows_generated} row(s), {rows_committed} committed: {source}"
    )]
    Database {
        table: String,
        rows_generated: u64,
        rows_committed: u64,
        #[source]
        source: sqlbench_core::Error,
    },
}
