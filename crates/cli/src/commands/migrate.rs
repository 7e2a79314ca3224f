use std::fmt::Write as _;

use serde::Serialize;
use tidemark_core::{Migration, MigrationLedger, MigrationRunner, SqlExecutor};

/// One line of `status` output
#[derive(Debug, Serialize)]
struct StatusRow<'a> {
    id: i32,
    name: &'a str,
    defined: bool,
    migrated: bool,
}

impl<'a> From<&'a Migration> for StatusRow<'a> {
    fn from(migration: &'a Migration) -> Self {
        Self {
            id: migration.id,
            name: migration.name.as_str(),
            defined: migration.defined_on_disk,
            migrated: migration.migrated_in_ledger,
        }
    }
}

pub async fn status<D>(runner: &MigrationRunner<D>, json: bool) -> anyhow::Result<()>
where
    D: MigrationLedger + SqlExecutor,
{
    runner.initialize().await?;
    let migrations = runner.migrations().await?;

    if json {
        let rows: Vec<StatusRow> = migrations.iter().map(StatusRow::from).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_status_table(&migrations));
    }
    Ok(())
}

pub async fn run<D>(runner: &MigrationRunner<D>, target_count: Option<usize>) -> anyhow::Result<()>
where
    D: MigrationLedger + SqlExecutor,
{
    runner.initialize().await?;
    let result = runner.migrate(target_count).await?;

    tracing::info!(
        "Applied {} migration(s) in {}ms{}",
        result.applied_count,
        result.execution_time_ms,
        skipped_suffix(result.skipped_migrations.len())
    );
    Ok(())
}

pub async fn rollback<D>(runner: &MigrationRunner<D>, start_index: Option<usize>) -> anyhow::Result<()>
where
    D: MigrationLedger + SqlExecutor,
{
    runner.initialize().await?;
    let result = runner.rollback(start_index).await?;

    tracing::info!(
        "Rolled back {} migration(s) in {}ms{}",
        result.rolled_back_count,
        result.execution_time_ms,
        skipped_suffix(result.skipped_migrations.len())
    );
    Ok(())
}

fn skipped_suffix(skipped: usize) -> String {
    if skipped == 0 {
        String::new()
    } else {
        format!(", {} skipped", skipped)
    }
}

/// Plain text table with id, name, defined and migrated columns
fn render_status_table(migrations: &[Migration]) -> String {
    const HEADERS: [&str; 4] = ["id", "name", "defined", "migrated"];

    let rows: Vec<[String; 4]> = migrations
        .iter()
        .map(|m| {
            [
                m.id.to_string(),
                m.name.to_string(),
                m.defined_on_disk.to_string(),
                m.migrated_in_ledger.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: [&str; 4]| {
        let line = format!(
            "{:>w0$}  {:<w1$}  {:<w2$}  {:<w3$}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
        let _ = writeln!(out, "{}", line.trim_end());
    };

    push_line(HEADERS);
    for row in &rows {
        push_line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]);
    }

    if rows.is_empty() {
        let _ = writeln!(out, "No migrations found");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_core::{LedgerRecord, ScriptRecord};

    fn applied(id: i32, name: &str) -> Migration {
        let mut migration = Migration::from_ledger(LedgerRecord::new(id, name));
        migration.defined_on_disk = true;
        migration
    }

    #[test]
    fn test_render_status_table() {
        let migrations = vec![
            applied(12, "001_create_users"),
            Migration::from_scripts(ScriptRecord {
                name: "002_posts".into(),
                up_script: None,
                down_script: None,
            }),
        ];

        let table = render_status_table(&migrations);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id  name              defined  migrated");
        assert_eq!(lines[1], "12  001_create_users  true     true");
        assert_eq!(lines[2], " 0  002_posts         true     false");
    }

    #[test]
    fn test_render_empty_status_table() {
        let table = render_status_table(&[]);
        assert_eq!(table, "id  name  defined  migrated\nNo migrations found\n");
    }

    #[test]
    fn test_status_row_json() {
        let migration = applied(3, "003_tags");
        let value = serde_json::to_value(StatusRow::from(&migration)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "name": "003_tags",
                "defined": true,
                "migrated": true,
            })
        );
    }

    #[test]
    fn test_skipped_suffix() {
        assert_eq!(skipped_suffix(0), "");
        assert_eq!(skipped_suffix(2), ", 2 skipped");
    }
}
