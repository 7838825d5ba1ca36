use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{SqlValue, ValueClass};

/// Column record as reported by the driver catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// 1-based position in the table.
    pub ordinal_position: i32,
    /// JDBC-style type code.
    pub type_code: i32,
    pub type_name: String,
    pub column_size: i32,
    pub decimal_digits: i32,
    pub nullable: bool,
}

/// Primary key column record with its 1-based key sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKeyColumnInfo {
    pub column_name: String,
    pub key_seq: i16,
}

/// Imported (foreign) key column record. Multi-column keys appear as one
/// record per column sharing `fk_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedKeyInfo {
    pub fk_name: String,
    pub key_seq: i16,
    pub fk_table: String,
    pub fk_column: String,
    pub pk_table: String,
    pub pk_column: String,
}

/// Shape metadata of one result-set column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    pub value_class: ValueClass,
    pub type_name: String,
    pub display_size: Option<u32>,
    pub precision: Option<u32>,
    pub signed: bool,
}

/// Materialized result of a query: column metadata plus rows in cursor order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Catalog capability used to build a schema model.
pub trait SchemaIntrospector {
    /// Columns of `table`, in any order.
    fn columns(
        &mut self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnInfo>>;

    fn primary_key_columns(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyColumnInfo>>;

    /// Foreign keys declared on `table`, one record per column.
    fn imported_keys(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ImportedKeyInfo>>;
}

/// Statement execution capability of one database handle.
pub trait DatabaseAccess {
    /// Dialect code of the statements this handle executes.
    fn dialect(&self) -> &str;

    fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Execute a query keeping at most `max_rows` rows.
    fn execute_query_bounded(&mut self, sql: &str, max_rows: usize) -> Result<QueryResult> {
        let mut result = self.execute_query(sql)?;
        result.rows.truncate(max_rows);
        Ok(result)
    }

    /// Execute a data-modifying statement inside the open transaction.
    fn execute_update(&mut self, sql: &str) -> Result<u64>;

    fn commit(&mut self) -> Result<()>;
}

/// Caller-owned cancellation flag checked between rows.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
