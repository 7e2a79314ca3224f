//! Connection and migration options shared by every subcommand.
//!
//! Connection fields may also come from `DB_DATABASE`, `DB_HOST`,
//! `DB_PASSWORD`, `DB_PORT` and `DB_USERNAME`; a set variable wins over the
//! corresponding flag. `DATABASE_URL` fills `--url` when the flag is absent.

use clap::Args;
use std::path::PathBuf;

use tidemark_core::config::{
    parse_port, DEFAULT_DOWN_FILE, DEFAULT_MIGRATIONS_DIR, DEFAULT_MIGRATIONS_TABLE,
    DEFAULT_UP_FILE,
};
use tidemark_core::{ConnectionConfig, MigrateResult, MigrationConfig};

#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Database name (env: DB_DATABASE)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Server address (env: DB_HOST)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Password (env: DB_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Port (env: DB_PORT)
    #[arg(long, global = true)]
    pub port: Option<String>,

    /// Username (env: DB_USERNAME)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Full connection URL, used instead of the fields above (env: DATABASE_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,
}

impl ConnectionArgs {
    /// Merge flags with environment values looked up through `env`
    pub fn into_config<F>(self, env: F) -> MigrateResult<ConnectionConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());

        let port = match non_empty("DB_PORT").or(self.port) {
            Some(port) => Some(parse_port(&port)?),
            None => None,
        };

        Ok(ConnectionConfig {
            url: self.url.or_else(|| non_empty("DATABASE_URL")),
            host: non_empty("DB_HOST").or(self.host),
            port,
            database: non_empty("DB_DATABASE").or(self.database),
            username: non_empty("DB_USERNAME").or(self.username),
            password: non_empty("DB_PASSWORD").or(self.password),
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct MigrationArgs {
    /// Path to migration directories
    #[arg(long, global = true, default_value = DEFAULT_MIGRATIONS_DIR)]
    pub path: PathBuf,

    /// Migration management table name
    #[arg(long, global = true, default_value = DEFAULT_MIGRATIONS_TABLE)]
    pub table: String,

    /// File name of up SQL
    #[arg(long, global = true, default_value = DEFAULT_UP_FILE)]
    pub up: String,

    /// File name of down SQL
    #[arg(long, global = true, default_value = DEFAULT_DOWN_FILE)]
    pub down: String,
}

impl MigrationArgs {
    pub fn into_config(self) -> MigrateResult<MigrationConfig> {
        let config = MigrationConfig::default()
            .with_migrations_dir(self.path)
            .with_table(self.table)
            .with_script_files(self.up, self.down);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tidemark_core::MigrateError;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_flags_only() {
        let args = ConnectionArgs {
            database: Some("app".to_string()),
            host: Some("localhost".to_string()),
            port: Some("5433".to_string()),
            username: Some("postgres".to_string()),
            ..ConnectionArgs::default()
        };

        let config = args.into_config(env_from(&[])).unwrap();
        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(5433));
        assert_eq!(config.database.as_deref(), Some("app"));
        assert!(config.password.is_none());
        assert!(config.url.is_none());
    }

    #[test]
    fn test_environment_overrides_flags() {
        let args = ConnectionArgs {
            host: Some("flag-host".to_string()),
            port: Some("5433".to_string()),
            ..ConnectionArgs::default()
        };

        let config = args
            .into_config(env_from(&[("DB_HOST", "env-host"), ("DB_PORT", "6543"), ("DB_USERNAME", "")]))
            .unwrap();
        assert_eq!(config.host.as_deref(), Some("env-host"));
        assert_eq!(config.port, Some(6543));
        assert!(config.username.is_none());
    }

    #[test]
    fn test_non_numeric_port_is_configuration_error() {
        let err = ConnectionArgs::default()
            .into_config(env_from(&[("DB_PORT", "five")]))
            .unwrap_err();
        assert!(matches!(err, MigrateError::Configuration(_)));

        let args = ConnectionArgs {
            port: Some("54x2".to_string()),
            ..ConnectionArgs::default()
        };
        assert!(args.into_config(env_from(&[])).is_err());
    }

    #[test]
    fn test_url_flag_beats_database_url() {
        let args = ConnectionArgs {
            url: Some("postgres://flag/db".to_string()),
            ..ConnectionArgs::default()
        };
        let config = args
            .into_config(env_from(&[("DATABASE_URL", "postgres://env/db")]))
            .unwrap();
        assert_eq!(config.url.as_deref(), Some("postgres://flag/db"));

        let config = ConnectionArgs::default()
            .into_config(env_from(&[("DATABASE_URL", "postgres://env/db")]))
            .unwrap();
        assert_eq!(config.url.as_deref(), Some("postgres://env/db"));
    }

    #[test]
    fn test_migration_args_validate() {
        let args = MigrationArgs {
            path: PathBuf::from("db"),
            table: "schema_history".to_string(),
            up: "forward.sql".to_string(),
            down: "backward.sql".to_string(),
        };
        let config = args.clone().into_config().unwrap();
        assert_eq!(config.migrations_table, "schema_history");
        assert_eq!(config.up_file, "forward.sql");

        let bad = MigrationArgs {
            table: "drop table".to_string(),
            ..args
        };
        assert!(matches!(bad.into_config(), Err(MigrateError::Configuration(_))));
    }
}
