use serde::{Deserialize, Serialize};

use sqlbench_core::SqlValue;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Rows inserted per transaction before a commit.
    pub transaction_size: u64,
    /// Width of the random date window, in days from the epoch.
    pub date_window_days: u32,
    /// Probability that a nullable non-key column is NULL.
    pub null_probability: f64,
    /// Fixed seed for reproducible runs. A random seed is drawn when unset.
    pub seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            transaction_size: 5000,
            date_window_days: 36501,
            null_probability: 0.5,
            seed: None,
        }
    }
}

/// One generated column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCell {
    pub column: String,
    pub value: SqlValue,
}

/// A synthesized row in column ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRow {
    pub cells: Vec<GeneratedCell>,
}

impl GeneratedRow {
    pub fn value(&self, column: &str) -> Option<&SqlValue> {
        self.cells
            .iter()
            .find(|cell| cell.column.eq_ignore_ascii_case(column))
            .map(|cell| &cell.value)
    }

    /// Render the row as a single INSERT statement.
    pub fn to_insert(&self, table: &str) -> String {
        let columns = self
            .cells
            .iter()
            .map(|cell| cell.column.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let values = self
            .cells
            .iter()
            .map(|cell| cell.value.to_sql_literal())
            .collect::<Vec<_>>()
            .join(",");
        format!("INSERT INTO {table} ({columns}) VALUES ({values})")
    }
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

/// Report for one `generate_rows` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub session_id: String,
    pub table: String,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub rows_committed: u64,
    pub commits: u64,
    pub aborted: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(session_id: String, table: &str, rows_requested: u64) -> Self {
        Self {
            session_id,
            table: table.to_string(),
            rows_requested,
            rows_generated: 0,
            rows_committed: 0,
            commits: 0,
            aborted: false,
            duration_ms: 0,
            failure: None,
        }
    }

    /// True when every requested row was generated.
    pub fn is_ok(&self) -> bool {
        self.failure.is_none() && !self.aborted
    }
}
