use thiserror::Error;

/// Reasons two query results are not equivalent, or could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("comparison not possible, SELECT statement '{label}' missing")]
    MissingStatement { label: String },
    #[error("comparison not possible, ORDER BY clause '{label}' missing")]
    MissingOrderBy { label: String },
    #[error("comparison not possible, statement '{label}' not translated: {message}")]
    Translation { label: String, message: String },
    #[error("result set '{label}' failed: {message}")]
    Database { label: String, message: String },
    #[error(
        "number of columns is different, result set '{first}' {first_count} column(s) - result set '{second}' {second_count} column(s)"
    )]
    ColumnCount {
        first: String,
        first_count: usize,
        second: String,
        second_count: usize,
    },
    #[error(
        "{property} of column {column} is different, result set '{first}' {first_value} - result set '{second}' {second_value}"
    )]
    ColumnProperty {
        property: &'static str,
        column: usize,
        first: String,
        first_value: String,
        second: String,
        second_value: String,
    },
    #[error(
        "row={row} column={column}: different values in result set '{first}'={first_value} and in result set '{second}'={second_value}"
    )]
    Value {
        row: usize,
        column: usize,
        first: String,
        first_value: String,
        second: String,
        second_value: String,
    },
    #[error("row={row} column={column}: SQL type={type_name} not yet implemented")]
    UnsupportedValue {
        row: usize,
        column: usize,
        type_name: String,
    },
    #[error("result set '{longer}' has more rows than result set '{shorter}' ({matched} row(s))")]
    RowCount {
        longer: String,
        shorter: String,
        matched: usize,
    },
}

impl Mismatch {
    /// Whether the results were compared and found to differ, as opposed to
    /// the comparison not being possible.
    pub fn is_divergence(&self) -> bool {
        !matches!(
            self,
            Self::MissingStatement { .. }
                | Self::MissingOrderBy { .. }
                | Self::Translation { .. }
                | Self::Database { .. }
        )
    }
}
