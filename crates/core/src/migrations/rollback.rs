//! Migration Rollback - Handles rolling back applied migrations
//!
//! Executes down scripts for applied migrations, most recently applied
//! first, removing each ledger row after its script succeeds.

use std::time::Instant;

use super::definitions::{Migration, RollbackResult};
use super::ledger::{MigrationLedger, SqlExecutor};
use super::plan::plan_rollback;
use super::runner::MigrationRunner;
use crate::error::{MigrateError, MigrateResult};

impl<D> MigrationRunner<D>
where
    D: MigrationLedger + SqlExecutor,
{
    /// Revert applied migrations from `start_index` to the end of the list
    pub async fn rollback(&self, start_index: Option<usize>) -> MigrateResult<RollbackResult> {
        let start_time = Instant::now();

        let migrations = self.migrations().await?;
        let plan = plan_rollback(&migrations, start_index);

        for skipped in &plan.skipped {
            tracing::warn!("Skipping \"{}\": no {} script", skipped.name, plan.direction);
        }

        if plan.is_empty() {
            tracing::info!("Nothing to rollback");
        }

        let mut rolled_back_migrations = Vec::with_capacity(plan.steps.len());
        for migration in plan.steps {
            tracing::info!("Rolling back \"{}\"", migration.name);

            self.revert_migration(migration)
                .await
                .map_err(|e| MigrateError::rollback(migration.name.clone(), e))?;

            rolled_back_migrations.push(migration.name.clone());
        }

        Ok(RollbackResult {
            rolled_back_count: rolled_back_migrations.len(),
            rolled_back_migrations,
            skipped_migrations: plan.skipped.iter().map(|m| m.name.clone()).collect(),
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    async fn revert_migration(&self, migration: &Migration) -> MigrateResult<()> {
        let path = migration.down_script.as_deref().ok_or_else(|| {
            MigrateError::io(
                self.repository().base_dir().join(migration.name.as_str()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "down script not found"),
            )
        })?;

        self.execute_file(path).await?;

        tracing::debug!("Remove migration info for {}", migration.name);
        self.database().record_reverted(&migration.name).await
    }
}
