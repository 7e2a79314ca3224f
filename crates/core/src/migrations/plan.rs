//! Selection of the migrations a run will touch.
//!
//! Both selections work on the reconciled, name-ordered list but interpret
//! their bound differently: `migrate` takes the first `target_count`
//! entries, `rollback` takes every entry from `start_index` to the end.

use super::definitions::{Migration, MigrationDirection};

/// Migrations selected for one run, in execution order
#[derive(Debug)]
pub struct MigrationPlan<'a> {
    pub direction: MigrationDirection,
    /// Migrations to execute, in order
    pub steps: Vec<&'a Migration>,
    /// Selected migrations lacking the script for this direction
    pub skipped: Vec<&'a Migration>,
}

impl<'a> MigrationPlan<'a> {
    fn split(direction: MigrationDirection, selected: Vec<&'a Migration>) -> Self {
        let (steps, skipped): (Vec<&Migration>, Vec<&Migration>) = selected
            .into_iter()
            .partition(|m| m.script(direction).is_some());
        Self {
            direction,
            steps,
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Pending migrations among the first `target_count` entries, ascending by name
pub fn plan_migrate(migrations: &[Migration], target_count: Option<usize>) -> MigrationPlan<'_> {
    let end = target_count.map_or(migrations.len(), |count| count.min(migrations.len()));
    let selected = migrations[..end].iter().filter(|m| m.is_pending()).collect();
    MigrationPlan::split(MigrationDirection::Up, selected)
}

/// Applied migrations from `start_index` onwards, most recently applied first
pub fn plan_rollback(migrations: &[Migration], start_index: Option<usize>) -> MigrationPlan<'_> {
    let start = start_index.unwrap_or(0).min(migrations.len());
    let mut selected: Vec<&Migration> = migrations[start..].iter().filter(|m| m.is_applied()).collect();
    selected.sort_by(|a, b| b.id.cmp(&a.id));
    MigrationPlan::split(MigrationDirection::Down, selected)
}
