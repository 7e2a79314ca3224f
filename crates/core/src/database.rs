//! Database Integration - PostgreSQL backend for the migration runner
//!
//! [`PgDatabase`] owns a single-connection pool. It executes migration
//! scripts through the simple query protocol, so a script may hold several
//! statements, and maintains the ledger table with parameterized queries.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Executor, Row};

use crate::config::validate_table_name;
use crate::error::MigrateResult;
use crate::migrations::{LedgerRecord, LedgerSql, MigrationLedger, MigrationName, SqlExecutor};

/// PostgreSQL connection plus the ledger table it maintains
pub struct PgDatabase {
    pool: PgPool,
    sql: LedgerSql,
}

impl PgDatabase {
    /// Open the connection. The table name is validated first.
    pub async fn connect(options: PgConnectOptions, table: &str) -> MigrateResult<Self> {
        validate_table_name(table)?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        tracing::info!("Connected to database");

        Ok(Self {
            pool,
            sql: LedgerSql::new(table),
        })
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the connection, waiting for in-flight work to finish
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Database connection closed");
    }

    async fn execute_with(&self, sql: &str, params: Vec<String>) -> MigrateResult<u64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SqlExecutor for PgDatabase {
    async fn execute_script(&self, sql: &str) -> MigrateResult<()> {
        self.pool.execute(sql).await?;
        Ok(())
    }
}

#[async_trait]
impl MigrationLedger for PgDatabase {
    async fn ensure_table(&self) -> MigrateResult<()> {
        let (exists_sql, params) = self.sql.table_exists_sql();
        let mut query = sqlx::query(&exists_sql);
        for param in params {
            query = query.bind(param);
        }

        if query.fetch_optional(&self.pool).await?.is_none() {
            tracing::info!(
                "Creating table \"{}\" for migration management.",
                self.sql.table()
            );
            sqlx::query(&self.sql.create_table_sql())
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn list_applied(&self) -> MigrateResult<Vec<LedgerRecord>> {
        let rows = sqlx::query(&self.sql.list_applied_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i32 = row.try_get("id")?;
            let name: String = row.try_get("migration")?;
            records.push(LedgerRecord::new(id, name));
        }
        Ok(records)
    }

    async fn record_applied(&self, name: &MigrationName) -> MigrateResult<()> {
        let (sql, params) = self.sql.record_applied_sql(name);
        self.execute_with(&sql, params).await?;
        Ok(())
    }

    async fn record_reverted(&self, name: &MigrationName) -> MigrateResult<()> {
        let (sql, params) = self.sql.record_reverted_sql(name);
        let removed = self.execute_with(&sql, params).await?;
        if removed > 1 {
            tracing::warn!("Removed {} ledger rows for migration {}", removed, name);
        }
        Ok(())
    }
}
