//! Scripted in-memory database for sqlbench integration tests.
//!
//! `ScriptedDatabase` answers catalog calls from registered tables and
//! answers queries from registered responses, matched by substring. Every
//! executed statement and commit is recorded for assertions.

use std::collections::BTreeMap;

use sqlbench_core::{
    ColumnInfo, DatabaseAccess, Error, ImportedKeyInfo, PrimaryKeyColumnInfo, QueryResult,
    Result, ResultColumn, SchemaIntrospector, SqlValue, ValueClass,
};

#[derive(Debug, Clone)]
pub struct ScriptedDatabase {
    dialect: String,
    tables: BTreeMap<String, Vec<ColumnInfo>>,
    primary_keys: BTreeMap<String, Vec<PrimaryKeyColumnInfo>>,
    imported_keys: BTreeMap<String, Vec<ImportedKeyInfo>>,
    responses: Vec<(String, QueryResult)>,
    query_failures: Vec<(String, String)>,
    fail_update_at: Option<usize>,
    pub queries: Vec<String>,
    /// Row bound requested for each bounded query, by statement.
    pub bounded_queries: Vec<(String, usize)>,
    pub updates: Vec<String>,
    pub commits: usize,
    /// Number of updates covered by the last commit.
    pub committed_updates: usize,
}

impl Default for ScriptedDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self {
            dialect: "SQL:1999".to_string(),
            tables: BTreeMap::new(),
            primary_keys: BTreeMap::new(),
            imported_keys: BTreeMap::new(),
            responses: Vec::new(),
            query_failures: Vec::new(),
            fail_update_at: None,
            queries: Vec::new(),
            bounded_queries: Vec::new(),
            updates: Vec::new(),
            commits: 0,
            committed_updates: 0,
        }
    }

    pub fn with_dialect(mut self, dialect: &str) -> Self {
        self.dialect = dialect.to_string();
        self
    }

    pub fn with_table(mut self, table: &str, columns: Vec<ColumnInfo>) -> Self {
        self.tables.insert(table.to_string(), columns);
        self
    }

    pub fn with_primary_key(mut self, table: &str, columns: &[&str]) -> Self {
        let records = columns
            .iter()
            .enumerate()
            .map(|(index, name)| PrimaryKeyColumnInfo {
                column_name: name.to_string(),
                key_seq: index as i16 + 1,
            })
            .collect();
        self.primary_keys.insert(table.to_string(), records);
        self
    }

    /// Register a foreign key of `child` referencing `parent` with
    /// `(child column, parent column)` pairs in key order.
    pub fn with_foreign_key(
        mut self,
        name: &str,
        child: &str,
        parent: &str,
        pairs: &[(&str, &str)],
    ) -> Self {
        let records = self.imported_keys.entry(child.to_string()).or_default();
        for (index, (child_column, parent_column)) in pairs.iter().enumerate() {
            records.push(ImportedKeyInfo {
                fk_name: name.to_string(),
                key_seq: index as i16 + 1,
                fk_table: child.to_string(),
                fk_column: child_column.to_string(),
                pk_table: parent.to_string(),
                pk_column: parent_column.to_string(),
            });
        }
        self
    }

    /// Answer every query containing `pattern` with `result`. Earlier
    /// registrations win.
    pub fn respond(mut self, pattern: &str, result: QueryResult) -> Self {
        self.responses.push((pattern.to_string(), result));
        self
    }

    pub fn fail_query(mut self, pattern: &str, message: &str) -> Self {
        self.query_failures
            .push((pattern.to_string(), message.to_string()));
        self
    }

    /// Fail the update with the given 0-based index.
    pub fn fail_update_at(mut self, index: usize) -> Self {
        self.fail_update_at = Some(index);
        self
    }

    fn require_table(&self, table: &str) -> Result<()> {
        if self.tables.contains_key(table) {
            Ok(())
        } else {
            Err(Error::Db(format!("relation \"{table}\" does not exist")))
        }
    }
}

impl SchemaIntrospector for ScriptedDatabase {
    fn columns(
        &mut self,
        _catalog: Option<&str>,
        _schema_pattern: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnInfo>> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    fn primary_key_columns(
        &mut self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyColumnInfo>> {
        self.require_table(table)?;
        Ok(self.primary_keys.get(table).cloned().unwrap_or_default())
    }

    fn imported_keys(
        &mut self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ImportedKeyInfo>> {
        self.require_table(table)?;
        Ok(self.imported_keys.get(table).cloned().unwrap_or_default())
    }
}

impl DatabaseAccess for ScriptedDatabase {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        self.queries.push(sql.to_string());
        if let Some((_, message)) = self
            .query_failures
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
        {
            return Err(Error::Db(message.clone()));
        }
        Ok(self
            .responses
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default())
    }

    fn execute_query_bounded(&mut self, sql: &str, max_rows: usize) -> Result<QueryResult> {
        self.bounded_queries.push((sql.to_string(), max_rows));
        let mut result = self.execute_query(sql)?;
        result.rows.truncate(max_rows);
        Ok(result)
    }

    fn execute_update(&mut self, sql: &str) -> Result<u64> {
        if self.fail_update_at == Some(self.updates.len()) {
            return Err(Error::Db(format!("scripted failure executing: {sql}")));
        }
        self.updates.push(sql.to_string());
        Ok(1)
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        self.committed_updates = self.updates.len();
        Ok(())
    }
}

/// Catalog record for a column with a JDBC-style type code.
pub fn column_info(
    name: &str,
    ordinal_position: i32,
    type_code: i32,
    column_size: i32,
    decimal_digits: i32,
    nullable: bool,
) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        ordinal_position,
        type_code,
        type_name: format!("type{type_code}"),
        column_size,
        decimal_digits,
        nullable,
    }
}

/// Result column metadata with no size information.
pub fn result_column(name: &str, value_class: ValueClass, type_name: &str) -> ResultColumn {
    ResultColumn {
        name: name.to_string(),
        value_class,
        type_name: type_name.to_string(),
        display_size: None,
        precision: None,
        signed: false,
    }
}

pub fn query_result(columns: Vec<ResultColumn>, rows: Vec<Vec<SqlValue>>) -> QueryResult {
    QueryResult { columns, rows }
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}
