//! Migration Repository - File system discovery of migrations
//!
//! Every immediate subdirectory of the migrations directory is one migration,
//! named after the directory. A migration may hold an up script, a down
//! script, both, or neither.

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::definitions::{MigrationName, ScriptRecord};
use crate::config::MigrationConfig;
use crate::error::{MigrateError, MigrateResult};

/// Scans a base directory for migration directories
#[derive(Debug, Clone)]
pub struct MigrationRepository {
    base_dir: PathBuf,
    up_file: String,
    down_file: String,
}

impl MigrationRepository {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        up_file: impl Into<String>,
        down_file: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            up_file: up_file.into(),
            down_file: down_file.into(),
        }
    }

    /// Repository over the configured directory, resolved against the working directory
    pub fn from_config(config: &MigrationConfig) -> MigrateResult<Self> {
        Ok(Self::new(
            config.resolved_migrations_dir()?,
            config.up_file.clone(),
            config.down_file.clone(),
        ))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// List every migration directory. Order of the result is unspecified.
    pub async fn list(&self) -> MigrateResult<Vec<ScriptRecord>> {
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| MigrateError::io(&self.base_dir, e))?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MigrateError::io(&self.base_dir, e))?
        {
            let path = entry.path();
            // follows symlinks, unlike DirEntry::file_type
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| MigrateError::io(&path, e))?;
            if !metadata.is_dir() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => candidates.push((MigrationName::new(name), path)),
                Err(raw) => {
                    tracing::warn!("Skipping migration directory with non UTF-8 name: {:?}", raw);
                }
            }
        }

        try_join_all(
            candidates
                .into_iter()
                .map(|(name, dir)| self.scan_migration(name, dir)),
        )
        .await
    }

    async fn scan_migration(&self, name: MigrationName, dir: PathBuf) -> MigrateResult<ScriptRecord> {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| MigrateError::io(&dir, e))?;

        let mut up_script = None;
        let mut down_script = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MigrateError::io(&dir, e))?
        {
            let file_name = entry.file_name();
            if file_name == self.up_file.as_str() {
                up_script = Some(dir.join(&self.up_file));
            } else if file_name == self.down_file.as_str() {
                down_script = Some(dir.join(&self.down_file));
            }
        }

        tracing::trace!(
            "Found migration {} (up: {}, down: {})",
            name,
            up_script.is_some(),
            down_script.is_some()
        );

        Ok(ScriptRecord {
            name,
            up_script,
            down_script,
        })
    }
}

/// Read a script file as SQL text
pub async fn read_script(path: &Path) -> MigrateResult<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| MigrateError::io(path, e))
}
