//! Error types for the migration system
//!
//! Every failure in the library surfaces as a [`MigrateError`]. Failures that
//! happen while a specific migration is being applied or reverted are wrapped
//! in [`MigrateError::Apply`] or [`MigrateError::Rollback`] so the operator
//! can see which script to fix.

use std::path::PathBuf;

use thiserror::Error;

use crate::migrations::MigrationName;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

#[derive(Debug, Error)]
pub enum MigrateError {
    /// Malformed connection parameter or ledger table name
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Migration directory or script file could not be read
    #[error("IO error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection, ledger or script execution failure
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Failed to apply migration \"{name}\"")]
    Apply {
        name: MigrationName,
        #[source]
        source: Box<MigrateError>,
    },

    #[error("Failed to rollback migration \"{name}\"")]
    Rollback {
        name: MigrationName,
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an IO error bound to the path that failed
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure that happened while applying `name`
    pub fn apply(name: MigrationName, source: MigrateError) -> Self {
        Self::Apply {
            name,
            source: Box::new(source),
        }
    }

    /// Wrap a failure that happened while reverting `name`
    pub fn rollback(name: MigrationName, source: MigrateError) -> Self {
        Self::Rollback {
            name,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_apply_error_chain() {
        let cause = MigrateError::io(
            "/tmp/migrations/001_users/up.sql",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let err = MigrateError::apply(MigrationName::new("001_users"), cause);

        assert_eq!(err.to_string(), "Failed to apply migration \"001_users\"");

        let io = err.source().unwrap();
        assert_eq!(io.to_string(), "IO error on /tmp/migrations/001_users/up.sql");
        assert_eq!(io.source().unwrap().to_string(), "no such file");
    }

    #[test]
    fn test_configuration_message() {
        let err = MigrateError::configuration("port must be numeric");
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Configuration error: port must be numeric");
    }
}
