//! Migration System
//!
//! Migrations are directories on disk; the ledger table records which of
//! them have been applied. The runner reconciles both and applies or reverts
//! the difference.

pub mod definitions;
pub mod ledger;
pub mod plan;
pub mod reconciler;
pub mod repository;
pub mod rollback;
pub mod runner;

pub use definitions::*;
pub use ledger::{LedgerSql, MigrationLedger, SqlExecutor};
pub use plan::{plan_migrate, plan_rollback, MigrationPlan};
pub use reconciler::reconcile;
pub use repository::{read_script, MigrationRepository};
pub use runner::MigrationRunner;
