use serde::{Deserialize, Serialize};

use crate::errors::Mismatch;

/// Options for result comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Names of the two sides used in every diagnostic.
    pub labels: [String; 2],
    /// Database type names treated as the same type in the shape check.
    pub interchangeable_type_names: Vec<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            labels: ["unapplied".to_string(), "applied".to_string()],
            interchangeable_type_names: vec!["CHAR".to_string(), "VARCHAR2".to_string()],
        }
    }
}

/// Verdict of one comparison. `message` is empty when `equal` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub equal: bool,
    pub message: String,
}

impl ComparisonOutcome {
    pub fn equivalent() -> Self {
        Self {
            equal: true,
            message: String::new(),
        }
    }
}

impl From<Mismatch> for ComparisonOutcome {
    fn from(mismatch: Mismatch) -> Self {
        Self {
            equal: false,
            message: mismatch.to_string(),
        }
    }
}
