use std::fmt;

use serde::{Deserialize, Serialize};

/// Dialect code of generic ANSI SQL.
pub const SQL_1999: &str = "SQL:1999";
/// Dialect code of Oracle 10g.
pub const ORACLE_10G: &str = "ORACLE-10G";

/// Known dialect codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    Sql1999,
    Oracle10g,
}

impl SqlDialect {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            SQL_1999 => Some(Self::Sql1999),
            ORACLE_10G => Some(Self::Oracle10g),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Sql1999 => SQL_1999,
            Self::Oracle10g => ORACLE_10G,
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Source and target dialect codes used when translating scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    pub source: String,
    pub target: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            source: SQL_1999.to_string(),
            target: SQL_1999.to_string(),
        }
    }
}
