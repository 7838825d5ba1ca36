use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// JDBC type code for fixed-length character columns.
pub const TYPE_CHAR: i32 = 1;
/// JDBC type code for NUMERIC columns.
pub const TYPE_NUMERIC: i32 = 2;
/// JDBC type code for DECIMAL columns.
pub const TYPE_DECIMAL: i32 = 3;
/// JDBC type code for variable-length character columns.
pub const TYPE_VARCHAR: i32 = 12;
/// JDBC type code for DATE columns.
pub const TYPE_DATE: i32 = 91;

/// Type category of a table column, derived from its driver type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Char,
    Varchar,
    Date,
    Decimal,
    Numeric,
    /// Any other type code. Generation rejects these.
    Other(i32),
}

impl SqlType {
    pub fn from_code(code: i32) -> Self {
        match code {
            TYPE_CHAR => Self::Char,
            TYPE_VARCHAR => Self::Varchar,
            TYPE_DATE => Self::Date,
            TYPE_DECIMAL => Self::Decimal,
            TYPE_NUMERIC => Self::Numeric,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Char => TYPE_CHAR,
            Self::Varchar => TYPE_VARCHAR,
            Self::Date => TYPE_DATE,
            Self::Decimal => TYPE_DECIMAL,
            Self::Numeric => TYPE_NUMERIC,
            Self::Other(code) => code,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::Char | Self::Varchar)
    }

    pub fn is_decimal(self) -> bool {
        matches!(self, Self::Decimal | Self::Numeric)
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Key value a generator starts from when the table holds no rows: the
    /// empty string, zero, or the day before the epoch.
    pub fn low_seed(self) -> Option<SqlValue> {
        match self {
            Self::Char | Self::Varchar => Some(SqlValue::Text(String::new())),
            Self::Decimal | Self::Numeric => Some(SqlValue::Decimal(Decimal::ZERO)),
            Self::Date => NaiveDate::from_ymd_opt(1969, 12, 31).map(SqlValue::Date),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char => f.write_str("char"),
            Self::Varchar => f.write_str("varchar"),
            Self::Date => f.write_str("date"),
            Self::Decimal => f.write_str("decimal"),
            Self::Numeric => f.write_str("numeric"),
            Self::Other(code) => write!(f, "type={code}"),
        }
    }
}

/// A typed SQL value as produced by the generator or read from a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SqlValue {
    Null,
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
    /// Value of a type outside the supported families, kept as driver text.
    Other(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render the value as a literal usable inside an INSERT statement.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Text(value) | Self::Other(value) => format!("'{}'", value.replace('\'', "''")),
            Self::Decimal(value) => value.to_string(),
            Self::Date(value) => format!(
                "CAST(TO_DATE('{}', 'DD-MM-YYYY') AS DATE)",
                value.format("%d-%m-%Y")
            ),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Text(value) | Self::Other(value) => f.write_str(value),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Decimal(value) => write!(f, "{value}"),
        }
    }
}

/// Value family of a result column, used to pick the comparison rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    Text,
    Date,
    Decimal,
    Other(String),
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::Decimal => f.write_str("decimal"),
            Self::Other(name) => f.write_str(name),
        }
    }
}
