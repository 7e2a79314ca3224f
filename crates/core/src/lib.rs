//! # tidemark-core: directory-based SQL migrations
//!
//! Each migration is a directory holding an up script and a down script.
//! A ledger table in the target database records which migrations have been
//! applied. [`MigrationRunner`] reconciles the two sources into one
//! name-ordered view and applies or reverts the difference, one migration at
//! a time.

pub mod config;
pub mod database;
pub mod error;
pub mod migrations;

pub use config::{ConnectionConfig, MigrationConfig};
pub use database::PgDatabase;
pub use error::{MigrateError, MigrateResult};
pub use migrations::*;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
