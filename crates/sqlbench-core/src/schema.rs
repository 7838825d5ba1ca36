use serde::{Deserialize, Serialize};

use crate::types::{SqlType, SqlValue};

/// Column metadata for the table under generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// 0-based position in the table.
    pub ordinal: usize,
    pub sql_type: SqlType,
    /// Declared length for character columns, precision for decimals.
    pub column_size: u32,
    /// Declared scale for decimal columns.
    pub decimal_digits: u32,
    pub nullable: bool,
    /// 1-based position in the primary key, 0 when not part of it.
    pub key_seq: u16,
    pub is_foreign_key: bool,
}

impl Column {
    pub fn is_primary_key(&self) -> bool {
        self.key_seq > 0
    }
}

/// Primary key columns in key order with the current value of each slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimaryKeyDescriptor {
    pub columns: Vec<String>,
    /// Last generated value per slot, or the observed maximum after build.
    pub current: Vec<SqlValue>,
}

impl PrimaryKeyDescriptor {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One child/parent column mapping of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub child: String,
    pub parent: String,
}

/// Foreign key imported by the table, with its cached parent key pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub name: String,
    pub child_table: String,
    pub parent_table: String,
    /// Column pairs in key sequence order.
    pub columns: Vec<ColumnPair>,
    /// Ordinals of the child columns, parallel to `columns`.
    pub ordinal_positions: Vec<usize>,
    /// Committed parent key tuples, parallel to `columns`.
    pub pool: Vec<Vec<SqlValue>>,
}

/// In-memory model of one table, built by introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaModel {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub table: String,
    /// Columns ordered by ordinal.
    pub columns: Vec<Column>,
    pub primary_key: PrimaryKeyDescriptor,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl SchemaModel {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Human-readable metadata protocol, one line per column, key column and
    /// foreign key column pair.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for column in &self.columns {
            lines.push(format!(
                "column table={} name={} ordinal={} type={} size={} digits={} nullable={} key_seq={} foreign_key={}",
                self.table,
                column.name,
                column.ordinal,
                column.sql_type,
                column.column_size,
                column.decimal_digits,
                column.nullable,
                column.key_seq,
                column.is_foreign_key
            ));
        }
        for (index, name) in self.primary_key.columns.iter().enumerate() {
            let current = self
                .primary_key
                .current
                .get(index)
                .map(|value| value.to_string())
                .unwrap_or_default();
            lines.push(format!(
                "primary_key table={} key_seq={} column={} current={}",
                self.table,
                index + 1,
                name,
                current
            ));
        }
        for fk in &self.foreign_keys {
            for (index, pair) in fk.columns.iter().enumerate() {
                lines.push(format!(
                    "foreign_key name={} key_seq={} child={}.{} parent={}.{} pool_size={}",
                    fk.name,
                    index + 1,
                    fk.child_table,
                    pair.child,
                    fk.parent_table,
                    pair.parent,
                    fk.pool.len()
                ));
            }
        }
        lines
    }
}
