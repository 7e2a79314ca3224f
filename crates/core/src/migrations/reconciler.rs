//! Merges ledger rows and migration directories into one ordered view.

use std::collections::BTreeMap;

use super::definitions::{LedgerRecord, Migration, MigrationName, ScriptRecord};

/// Merge ledger and repository records by name.
///
/// The result holds exactly one entity per distinct name, sorted ascending
/// by name. When the ledger holds several rows for one name, the entity
/// keeps the highest id.
pub fn reconcile(ledger: Vec<LedgerRecord>, scripts: Vec<ScriptRecord>) -> Vec<Migration> {
    let mut merged: BTreeMap<MigrationName, Migration> = BTreeMap::new();

    for record in ledger {
        match merged.get_mut(&record.name) {
            Some(existing) => {
                tracing::warn!(
                    "Ledger holds duplicate rows for migration {} (ids {} and {})",
                    record.name,
                    existing.id,
                    record.id
                );
                existing.id = existing.id.max(record.id);
            }
            None => {
                merged.insert(record.name.clone(), Migration::from_ledger(record));
            }
        }
    }

    for record in scripts {
        match merged.get_mut(&record.name) {
            Some(existing) => {
                existing.defined_on_disk = true;
                existing.up_script = record.up_script;
                existing.down_script = record.down_script;
            }
            None => {
                merged.insert(record.name.clone(), Migration::from_scripts(record));
            }
        }
    }

    merged.into_values().collect()
}
