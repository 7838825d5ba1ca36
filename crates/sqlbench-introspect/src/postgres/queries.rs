use sqlx::postgres::PgRow;
use sqlx::{Executor, PgConnection, Row, Statement};

use sqlbench_core::{Error, QueryResult, Result};

use super::mapper;

pub(crate) fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub struct RawColumn {
    pub name: String,
    pub ordinal_position: i32,
    pub data_type: String,
    pub character_max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_nullable: bool,
}

pub async fn list_columns(
    conn: &mut PgConnection,
    schema_pattern: Option<&str>,
    table: &str,
) -> Result<Vec<RawColumn>> {
    let rows = sqlx::query(
        r#"
        select
          c.column_name::text as name,
          c.ordinal_position::int4 as ordinal_position,
          c.data_type::text as data_type,
          c.character_maximum_length::int4 as character_max_length,
          c.numeric_precision::int4 as numeric_precision,
          c.numeric_scale::int4 as numeric_scale,
          (c.is_nullable = 'YES') as is_nullable
        from information_schema.columns c
        where c.table_name::text = $1
          and c.table_schema::text like coalesce($2::text, current_schema()::text)
        order by c.ordinal_position
        "#,
    )
    .bind(table)
    .bind(schema_pattern)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    rows.iter()
        .map(|row| {
            Ok(RawColumn {
                name: row.try_get("name").map_err(db_error)?,
                ordinal_position: row.try_get("ordinal_position").map_err(db_error)?,
                data_type: row.try_get("data_type").map_err(db_error)?,
                character_max_length: row.try_get("character_max_length").map_err(db_error)?,
                numeric_precision: row.try_get("numeric_precision").map_err(db_error)?,
                numeric_scale: row.try_get("numeric_scale").map_err(db_error)?,
                is_nullable: row.try_get("is_nullable").map_err(db_error)?,
            })
        })
        .collect()
}

pub struct RawPrimaryKeyColumn {
    pub column_name: String,
    pub key_seq: i16,
}

pub async fn list_primary_key_columns(
    conn: &mut PgConnection,
    schema_pattern: Option<&str>,
    table: &str,
) -> Result<Vec<RawPrimaryKeyColumn>> {
    let rows = sqlx::query(
        r#"
        select
          att.attname::text as column_name,
          ord.ordinality::int2 as key_seq
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        where rel.relname::text = $1
          and nsp.nspname::text like coalesce($2::text, current_schema()::text)
          and con.contype = 'p'
        order by ord.ordinality
        "#,
    )
    .bind(table)
    .bind(schema_pattern)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    rows.iter()
        .map(|row| {
            Ok(RawPrimaryKeyColumn {
                column_name: row.try_get("column_name").map_err(db_error)?,
                key_seq: row.try_get("key_seq").map_err(db_error)?,
            })
        })
        .collect()
}

pub struct RawImportedKey {
    pub fk_name: String,
    pub key_seq: i16,
    pub fk_table: String,
    pub fk_column: String,
    pub pk_table: String,
    pub pk_column: String,
}

pub async fn list_imported_keys(
    conn: &mut PgConnection,
    schema_pattern: Option<&str>,
    table: &str,
) -> Result<Vec<RawImportedKey>> {
    let rows = sqlx::query(
        r#"
        select
          con.conname::text as fk_name,
          ord.ordinality::int2 as key_seq,
          rel.relname::text as fk_table,
          src_att.attname::text as fk_column,
          parent_rel.relname::text as pk_table,
          parent_att.attname::text as pk_column
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join pg_class parent_rel on parent_rel.oid = con.confrelid
        join unnest(con.conkey, con.confkey) with ordinality as ord(src_attnum, parent_attnum, ordinality) on true
        join pg_attribute src_att on src_att.attrelid = con.conrelid and src_att.attnum = ord.src_attnum
        join pg_attribute parent_att on parent_att.attrelid = con.confrelid and parent_att.attnum = ord.parent_attnum
        where rel.relname::text = $1
          and nsp.nspname::text like coalesce($2::text, current_schema()::text)
          and con.contype = 'f'
        order by con.conname, ord.ordinality
        "#,
    )
    .bind(table)
    .bind(schema_pattern)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    rows.iter()
        .map(|row| {
            Ok(RawImportedKey {
                fk_name: row.try_get("fk_name").map_err(db_error)?,
                key_seq: row.try_get("key_seq").map_err(db_error)?,
                fk_table: row.try_get("fk_table").map_err(db_error)?,
                fk_column: row.try_get("fk_column").map_err(db_error)?,
                pk_table: row.try_get("pk_table").map_err(db_error)?,
                pk_column: row.try_get("pk_column").map_err(db_error)?,
            })
        })
        .collect()
}

/// Run an arbitrary query and type every row by its column family.
///
/// With `max_rows` the statement is wrapped in a `LIMIT` so the server
/// stops producing rows early.
pub async fn fetch_result(
    conn: &mut PgConnection,
    sql: &str,
    max_rows: Option<usize>,
) -> Result<QueryResult> {
    let sql = bounded_sql(sql, max_rows);
    let statement = (&mut *conn).prepare(&sql).await.map_err(db_error)?;
    let columns = statement
        .columns()
        .iter()
        .map(mapper::map_result_column)
        .collect::<Vec<_>>();

    let rows: Vec<PgRow> = sqlx::query(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error)?;

    let rows = rows
        .iter()
        .map(|row| mapper::map_row(row, &columns))
        .collect::<Result<Vec<_>>>()?;

    Ok(QueryResult { columns, rows })
}

fn bounded_sql(sql: &str, max_rows: Option<usize>) -> String {
    let sql = sql.trim_end();
    let sql = sql.strip_suffix(';').unwrap_or(sql).trim_end();
    match max_rows {
        Some(limit) => format!("SELECT * FROM ({sql}) AS bounded LIMIT {limit}"),
        None => sql.to_string(),
    }
}

pub async fn execute_raw(conn: &mut PgConnection, sql: &str) -> Result<u64> {
    let result = sqlx::raw_sql(sql)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_query_limits_on_the_server() {
        assert_eq!(
            bounded_sql("SELECT id FROM orders ORDER BY id DESC;", Some(1)),
            "SELECT * FROM (SELECT id FROM orders ORDER BY id DESC) AS bounded LIMIT 1"
        );
    }

    #[test]
    fn unbounded_query_is_unchanged() {
        assert_eq!(
            bounded_sql("SELECT code FROM customers ORDER BY code", None),
            "SELECT code FROM customers ORDER BY code"
        );
    }
}
