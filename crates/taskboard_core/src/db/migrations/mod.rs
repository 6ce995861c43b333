//! Board schema upgrades.
//!
//! The schema version lives in `PRAGMA user_version`. Each step is an
//! embedded SQL script tagged with the version it produces; a database is
//! brought from its stored version to `latest_version()` in one transaction,
//! so a failed script leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step.
struct SchemaStep {
    version: u32,
    name: &'static str,
    script: &'static str,
}

/// Ordered by `version`, starting at 1 with no gaps.
const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "board_tables",
    script: include_str!("0001_init.sql"),
}];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Upgrades `conn` to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the stored version is ahead of this build.
/// - `Sqlite` when a script fails; nothing from the run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = &STEPS[found as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.script)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(())
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, STEPS};

    #[test]
    fn step_versions_count_up_from_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step `{}`", step.name);
        }
        assert_eq!(latest_version(), STEPS.len() as u32);
    }
}
