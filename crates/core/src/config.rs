//! Configuration for the migration system
//!
//! [`MigrationConfig`] describes where migrations live and which ledger table
//! records them. [`ConnectionConfig`] describes how to reach the database.
//! Both are validated before any filesystem or database access happens.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{MigrateError, MigrateResult};

pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";
pub const DEFAULT_MIGRATIONS_TABLE: &str = "migrations";
pub const DEFAULT_UP_FILE: &str = "up.sql";
pub const DEFAULT_DOWN_FILE: &str = "down.sql";
pub const DEFAULT_PORT: u16 = 5432;

/// Configuration for the migration system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Directory holding one subdirectory per migration
    pub migrations_dir: PathBuf,
    /// Table name for tracking migrations
    pub migrations_table: String,
    /// File name of the forward script inside each migration directory
    pub up_file: String,
    /// File name of the backward script inside each migration directory
    pub down_file: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            migrations_table: DEFAULT_MIGRATIONS_TABLE.to_string(),
            up_file: DEFAULT_UP_FILE.to_string(),
            down_file: DEFAULT_DOWN_FILE.to_string(),
        }
    }
}

impl MigrationConfig {
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.migrations_table = table.into();
        self
    }

    pub fn with_script_files(mut self, up: impl Into<String>, down: impl Into<String>) -> Self {
        self.up_file = up.into();
        self.down_file = down.into();
        self
    }

    /// Check table and file names
    pub fn validate(&self) -> MigrateResult<()> {
        validate_table_name(&self.migrations_table)?;
        validate_file_name("up", &self.up_file)?;
        validate_file_name("down", &self.down_file)?;
        Ok(())
    }

    /// Migrations directory, resolved against the working directory when relative
    pub fn resolved_migrations_dir(&self) -> MigrateResult<PathBuf> {
        if self.migrations_dir.is_absolute() {
            return Ok(self.migrations_dir.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| MigrateError::io(".", e))?;
        Ok(cwd.join(&self.migrations_dir))
    }
}

/// Accepts `name` or `schema.name`, each part a plain SQL identifier.
///
/// The table name is interpolated into ledger statements, so anything that
/// would need quoting is rejected.
pub fn validate_table_name(table: &str) -> MigrateResult<()> {
    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|part| is_identifier(part)) {
        return Err(MigrateError::configuration(format!(
            "invalid migrations table name '{}': expected [schema.]identifier",
            table
        )));
    }
    Ok(())
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    part.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_file_name(kind: &str, name: &str) -> MigrateResult<()> {
    let path = Path::new(name);
    if name.is_empty() || path.components().count() != 1 || path.file_name().is_none() {
        return Err(MigrateError::configuration(format!(
            "invalid {} script file name '{}': expected a bare file name",
            kind, name
        )));
    }
    Ok(())
}

/// Parse a port number, rejecting anything that is not a valid u16
pub fn parse_port(value: &str) -> MigrateResult<u16> {
    value.trim().parse::<u16>().map_err(|_| {
        MigrateError::configuration(format!("port '{}' is not a valid port number", value))
    })
}

/// Database connection parameters
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Build driver connect options, failing on missing or malformed fields
    pub fn connect_options(&self) -> MigrateResult<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| {
                MigrateError::configuration(format!("invalid database url: {}", e))
            });
        }

        let host = required("host", "DB_HOST", &self.host)?;
        let database = required("database", "DB_DATABASE", &self.database)?;
        let username = required("username", "DB_USERNAME", &self.username)?;

        let mut options = PgConnectOptions::new()
            .host(host)
            .port(self.port.unwrap_or(DEFAULT_PORT))
            .database(database)
            .username(username);
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

fn required<'a>(field: &str, env: &str, value: &'a Option<String>) -> MigrateResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MigrateError::configuration(format!(
            "missing --{} (or {})",
            field, env
        ))),
    }
}
