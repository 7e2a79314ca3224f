//! Migration Definitions - Core types shared by the migration system
//!
//! Defines the reconciled [`Migration`] entity, the raw records produced by
//! the ledger and the repository, and the summaries returned by runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a migration: the name of its directory on disk and the value
/// stored in the ledger's `migration` column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationName(String);

impl MigrationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MigrationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MigrationName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A migration as seen after merging the ledger with the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// Ledger id, `0` when the migration has never been recorded
    pub id: i32,
    pub name: MigrationName,
    /// A directory with this name exists under the migrations path
    pub defined_on_disk: bool,
    /// A ledger row with this name exists
    pub migrated_in_ledger: bool,
    pub up_script: Option<PathBuf>,
    pub down_script: Option<PathBuf>,
}

impl Migration {
    /// Entity seeded from a ledger row, before the repository is consulted
    pub fn from_ledger(record: LedgerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            defined_on_disk: false,
            migrated_in_ledger: true,
            up_script: None,
            down_script: None,
        }
    }

    /// Entity for a directory that has no ledger row
    pub fn from_scripts(record: ScriptRecord) -> Self {
        Self {
            id: 0,
            name: record.name,
            defined_on_disk: true,
            migrated_in_ledger: false,
            up_script: record.up_script,
            down_script: record.down_script,
        }
    }

    /// Script path for the given direction, if the file exists
    pub fn script(&self, direction: MigrationDirection) -> Option<&Path> {
        match direction {
            MigrationDirection::Up => self.up_script.as_deref(),
            MigrationDirection::Down => self.down_script.as_deref(),
        }
    }

    /// Waiting to be applied: on disk, not yet in the ledger
    pub fn is_pending(&self) -> bool {
        self.defined_on_disk && !self.migrated_in_ledger
    }

    /// Eligible for rollback: on disk and in the ledger
    pub fn is_applied(&self) -> bool {
        self.defined_on_disk && self.migrated_in_ledger
    }
}

/// One row of the ledger table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: i32,
    pub name: MigrationName,
}

impl LedgerRecord {
    pub fn new(id: i32, name: impl Into<MigrationName>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One migration directory found by the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub name: MigrationName,
    pub up_script: Option<PathBuf>,
    pub down_script: Option<PathBuf>,
}

/// Result of running migrations
#[derive(Debug, Default, Serialize)]
pub struct MigrationRunResult {
    /// Number of migrations that were applied
    pub applied_count: usize,
    /// Names of migrations that were applied, in application order
    pub applied_migrations: Vec<MigrationName>,
    /// Pending migrations that have no up script
    pub skipped_migrations: Vec<MigrationName>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Result of rolling back migrations
#[derive(Debug, Default, Serialize)]
pub struct RollbackResult {
    /// Number of migrations that were rolled back
    pub rolled_back_count: usize,
    /// Names of migrations that were rolled back, most recent first
    pub rolled_back_migrations: Vec<MigrationName>,
    /// Migrations selected for rollback that have no down script
    pub skipped_migrations: Vec<MigrationName>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Migration direction for execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Apply the migration (run the up script)
    Up,
    /// Rollback the migration (run the down script)
    Down,
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationDirection::Up => f.write_str("up"),
            MigrationDirection::Down => f.write_str("down"),
        }
    }
}
