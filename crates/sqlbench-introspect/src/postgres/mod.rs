use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use sqlbench_core::{
    ColumnInfo, DatabaseAccess, Error, ImportedKeyInfo, PrimaryKeyColumnInfo, QueryResult, Result,
    SchemaIntrospector,
};

mod mapper;
mod queries;

use queries::db_error;

/// Blocking PostgreSQL handle for one logical role.
///
/// The async driver runs on a private current-thread runtime. Updates open a
/// transaction lazily; `commit` closes it. Queries issued while a transaction
/// is open run inside it.
pub struct PostgresAccess {
    runtime: Runtime,
    pool: PgPool,
    transaction: Option<Transaction<'static, Postgres>>,
    dialect: String,
}

impl PostgresAccess {
    /// Connect to `url`, tagging executed statements with `dialect`.
    pub fn connect(url: &str, dialect: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::Db(err.to_string()))?;
        let pool = runtime
            .block_on(
                PgPoolOptions::new()
                    .max_connections(1)
                    .acquire_timeout(Duration::from_secs(10))
                    .connect(url),
            )
            .map_err(db_error)?;

        Ok(Self {
            runtime,
            pool,
            transaction: None,
            dialect: dialect.to_string(),
        })
    }

    /// Discard the open transaction, if any.
    pub fn rollback(&mut self) -> Result<()> {
        if let Some(transaction) = self.transaction.take() {
            self.runtime
                .block_on(transaction.rollback())
                .map_err(db_error)?;
        }
        Ok(())
    }

    fn fetch(&mut self, sql: &str, max_rows: Option<usize>) -> Result<QueryResult> {
        let Self {
            runtime,
            pool,
            transaction,
            ..
        } = self;
        runtime.block_on(async {
            match transaction.as_mut() {
                Some(transaction) => queries::fetch_result(&mut **transaction, sql, max_rows).await,
                None => {
                    let mut conn = pool.acquire().await.map_err(db_error)?;
                    queries::fetch_result(&mut conn, sql, max_rows).await
                }
            }
        })
    }
}

impl Drop for PostgresAccess {
    fn drop(&mut self) {
        if let Some(transaction) = self.transaction.take() {
            if let Err(err) = self.runtime.block_on(transaction.rollback()) {
                warn!(error = %err, "rollback on close failed");
            }
        }
        self.runtime.block_on(self.pool.close());
    }
}

impl SchemaIntrospector for PostgresAccess {
    fn columns(
        &mut self,
        _catalog: Option<&str>,
        schema_pattern: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnInfo>> {
        let Self { runtime, pool, .. } = self;
        let raw = runtime.block_on(async {
            let mut conn = pool.acquire().await.map_err(db_error)?;
            queries::list_columns(&mut conn, schema_pattern, table).await
        })?;
        Ok(mapper::map_columns(raw))
    }

    fn primary_key_columns(
        &mut self,
        _catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyColumnInfo>> {
        let Self { runtime, pool, .. } = self;
        let raw = runtime.block_on(async {
            let mut conn = pool.acquire().await.map_err(db_error)?;
            queries::list_primary_key_columns(&mut conn, schema, table).await
        })?;
        Ok(mapper::map_primary_key_columns(raw))
    }

    fn imported_keys(
        &mut self,
        _catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ImportedKeyInfo>> {
        let Self { runtime, pool, .. } = self;
        let raw = runtime.block_on(async {
            let mut conn = pool.acquire().await.map_err(db_error)?;
            queries::list_imported_keys(&mut conn, schema, table).await
        })?;
        Ok(mapper::map_imported_keys(raw))
    }
}

impl DatabaseAccess for PostgresAccess {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        self.fetch(sql, None)
    }

    fn execute_query_bounded(&mut self, sql: &str, max_rows: usize) -> Result<QueryResult> {
        self.fetch(sql, Some(max_rows))
    }

    fn execute_update(&mut self, sql: &str) -> Result<u64> {
        let Self {
            runtime,
            pool,
            transaction,
            ..
        } = self;
        runtime.block_on(async {
            if transaction.is_none() {
                *transaction = Some(pool.begin().await.map_err(db_error)?);
            }
            match transaction.as_mut() {
                Some(transaction) => queries::execute_raw(&mut **transaction, sql).await,
                None => Err(Error::Db("transaction not open".to_string())),
            }
        })
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(transaction) = self.transaction.take() {
            self.runtime
                .block_on(transaction.commit())
                .map_err(db_error)?;
            debug!("transaction committed");
        }
        Ok(())
    }
}
