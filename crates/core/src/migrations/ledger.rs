//! Migration Ledger - database-side record of applied migrations
//!
//! The ledger is a table with one row per applied migration. Its `id` column
//! is a serial, so ids grow in application order; listings are always ordered
//! by that column rather than relying on physical row order.

use async_trait::async_trait;

use super::definitions::{LedgerRecord, MigrationName};
use crate::error::MigrateResult;

/// Runs raw SQL scripts against the database
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute a script that may contain several statements
    async fn execute_script(&self, sql: &str) -> MigrateResult<()>;
}

/// Storage of applied migrations
#[async_trait]
pub trait MigrationLedger: Send + Sync {
    /// Create the ledger table unless it already exists
    async fn ensure_table(&self) -> MigrateResult<()>;

    /// Snapshot of every ledger row, ascending by id
    async fn list_applied(&self) -> MigrateResult<Vec<LedgerRecord>>;

    /// Insert one row for `name`
    async fn record_applied(&self, name: &MigrationName) -> MigrateResult<()>;

    /// Delete every row for `name`
    async fn record_reverted(&self, name: &MigrationName) -> MigrateResult<()>;
}

/// SQL statements used to maintain the ledger table.
///
/// The table name must already have passed
/// [`validate_table_name`](crate::config::validate_table_name).
#[derive(Debug, Clone)]
pub struct LedgerSql {
    table: String,
}

impl LedgerSql {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Schema and bare table name, for the existence lookup
    pub fn table_parts(&self) -> (Option<&str>, &str) {
        match self.table.split_once('.') {
            Some((schema, table)) => (Some(schema), table),
            None => (None, self.table.as_str()),
        }
    }

    /// SQL to check whether the ledger table exists.
    ///
    /// Unquoted identifiers fold to lower case, so the lookup does too.
    pub fn table_exists_sql(&self) -> (String, Vec<String>) {
        match self.table_parts() {
            (Some(schema), table) => (
                "SELECT 1 FROM information_schema.tables WHERE table_schema = $1 AND table_name = $2"
                    .to_string(),
                vec![schema.to_ascii_lowercase(), table.to_ascii_lowercase()],
            ),
            (None, table) => (
                "SELECT 1 FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = $1"
                    .to_string(),
                vec![table.to_ascii_lowercase()],
            ),
        }
    }

    /// SQL to create the ledger table
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (\n    \
                \"id\" serial PRIMARY KEY,\n    \
                \"migration\" character varying(255) NOT NULL\n\
            );",
            self.table
        )
    }

    /// SQL to list applied migrations
    pub fn list_applied_sql(&self) -> String {
        format!(
            "SELECT \"id\", \"migration\" FROM {} ORDER BY \"id\" ASC",
            self.table
        )
    }

    /// SQL to record a migration as applied
    pub fn record_applied_sql(&self, name: &MigrationName) -> (String, Vec<String>) {
        (
            format!("INSERT INTO {} (\"migration\") VALUES ($1)", self.table),
            vec![name.to_string()],
        )
    }

    /// SQL to remove a migration record (for rollback)
    pub fn record_reverted_sql(&self, name: &MigrationName) -> (String, Vec<String>) {
        (
            format!("DELETE FROM {} WHERE \"migration\" = $1", self.table),
            vec![name.to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_sql_generation() {
        let sql = LedgerSql::new("migrations");

        let create_sql = sql.create_table_sql();
        assert!(create_sql.starts_with("CREATE TABLE migrations ("));
        assert!(create_sql.contains("\"id\" serial PRIMARY KEY"));
        assert!(create_sql.contains("\"migration\" character varying(255) NOT NULL"));

        assert_eq!(
            sql.list_applied_sql(),
            "SELECT \"id\", \"migration\" FROM migrations ORDER BY \"id\" ASC"
        );

        let name = MigrationName::new("001_users");
        let (insert_sql, params) = sql.record_applied_sql(&name);
        assert_eq!(insert_sql, "INSERT INTO migrations (\"migration\") VALUES ($1)");
        assert_eq!(params, vec!["001_users".to_string()]);

        let (delete_sql, params) = sql.record_reverted_sql(&name);
        assert_eq!(delete_sql, "DELETE FROM migrations WHERE \"migration\" = $1");
        assert_eq!(params, vec!["001_users".to_string()]);
    }

    #[test]
    fn test_table_exists_lookup() {
        let (sql, params) = LedgerSql::new("schema_history").table_exists_sql();
        assert!(sql.contains("table_schema = current_schema()"));
        assert_eq!(params, vec!["schema_history".to_string()]);

        let (sql, params) = LedgerSql::new("ops.schema_history").table_exists_sql();
        assert!(sql.contains("table_schema = $1 AND table_name = $2"));
        assert_eq!(params, vec!["ops".to_string(), "schema_history".to_string()]);

        let (_, params) = LedgerSql::new("Schema_History").table_exists_sql();
        assert_eq!(params, vec!["schema_history".to_string()]);
    }
}
