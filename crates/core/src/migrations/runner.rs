//! Migration Runner - Executes migrations against the database
//!
//! Reconciles the ledger with the repository on every call, then executes
//! the selected scripts one at a time. Each script is followed by its ledger
//! write before the next one starts; the first failure stops the run and
//! leaves earlier migrations applied.

use std::path::Path;
use std::time::Instant;

use super::definitions::{Migration, MigrationRunResult};
use super::ledger::{MigrationLedger, SqlExecutor};
use super::plan::plan_migrate;
use super::reconciler::reconcile;
use super::repository::{read_script, MigrationRepository};
use crate::error::{MigrateError, MigrateResult};

/// Migration runner that executes migrations against a database
pub struct MigrationRunner<D> {
    repository: MigrationRepository,
    database: D,
}

impl<D> MigrationRunner<D>
where
    D: MigrationLedger + SqlExecutor,
{
    /// Create a new migration runner
    pub fn new(repository: MigrationRepository, database: D) -> Self {
        Self {
            repository,
            database,
        }
    }

    /// Get the migration repository
    pub fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    /// Get the database backend
    pub fn database(&self) -> &D {
        &self.database
    }

    /// Give back the database backend, e.g. to close it
    pub fn into_database(self) -> D {
        self.database
    }

    /// Ensure the ledger table exists
    pub async fn initialize(&self) -> MigrateResult<()> {
        self.database.ensure_table().await
    }

    /// Reconciled view of every known migration, ascending by name
    pub async fn migrations(&self) -> MigrateResult<Vec<Migration>> {
        let ledger = self.database.list_applied().await?;
        let scripts = self.repository.list().await?;
        Ok(reconcile(ledger, scripts))
    }

    /// Apply pending migrations among the first `target_count` entries
    pub async fn migrate(&self, target_count: Option<usize>) -> MigrateResult<MigrationRunResult> {
        let start_time = Instant::now();

        let migrations = self.migrations().await?;
        let plan = plan_migrate(&migrations, target_count);

        for skipped in &plan.skipped {
            tracing::warn!("Skipping \"{}\": no {} script", skipped.name, plan.direction);
        }

        if plan.is_empty() {
            tracing::info!("No pending migrations");
        }

        let mut applied_migrations = Vec::with_capacity(plan.steps.len());
        for migration in plan.steps {
            tracing::info!("Migrating \"{}\"", migration.name);

            self.apply_migration(migration)
                .await
                .map_err(|e| MigrateError::apply(migration.name.clone(), e))?;

            applied_migrations.push(migration.name.clone());
        }

        Ok(MigrationRunResult {
            applied_count: applied_migrations.len(),
            applied_migrations,
            skipped_migrations: plan.skipped.iter().map(|m| m.name.clone()).collect(),
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Apply a single migration
    async fn apply_migration(&self, migration: &Migration) -> MigrateResult<()> {
        let path = migration.up_script.as_deref().ok_or_else(|| {
            MigrateError::io(
                self.repository.base_dir().join(migration.name.as_str()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "up script not found"),
            )
        })?;

        self.execute_file(path).await?;

        tracing::debug!("Insert migration info for {}", migration.name);
        self.database.record_applied(&migration.name).await
    }

    /// Read a script from disk and run it
    pub(crate) async fn execute_file(&self, path: &Path) -> MigrateResult<()> {
        let sql = read_script(path).await?;
        tracing::debug!("Execute query: {}", sql);
        self.database.execute_script(&sql).await
    }
}
