//! Board database handles.
//!
//! `open_db` and `open_db_in_memory` are the only ways the rest of the crate
//! gets a `Connection`. Both return it with the board tables (projects,
//! columns, tasks, comments) already at the newest schema version, so stores
//! built on top only check readiness and never create tables themselves.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading a board database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement, pragma or the file itself.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; it is left untouched.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "board schema version {found} is newer than this build supports ({supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
