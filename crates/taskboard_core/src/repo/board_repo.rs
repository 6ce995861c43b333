//! Board store contracts and SQLite bootstrap.
//!
//! # Responsibility
//! - Define the transactional, lockable store consumed by board services.
//! - Keep row-not-found distinguishable from transport failures.
//!
//! # Invariants
//! - Every store call runs inside an explicit transaction handle.
//! - Dropping an uncommitted transaction rolls it back.
//! - Sibling listings are ascending by rank.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::board::{
    Column, ColumnId, Comment, CommentId, Project, ProjectId, SiblingKind, Task, TaskId,
};
use crate::model::rank::{Bound, Rank};
use crate::repo::sqlite_tx::SqliteStoreTx;
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by board store operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from board store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Addressed row does not exist (in the requested scope).
    RowNotFound { entity: &'static str, id: Uuid },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RowNotFound { entity, id } => write!(f, "{entity} row not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "board store requires table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Side of a reference rank to search for a neighbour on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Nearest smaller rank; the last sibling when the reference is open.
    Before,
    /// Nearest larger rank; the first sibling when the reference is open.
    After,
}

/// Transaction factory for the board store.
pub trait BoardStore {
    type Tx<'s>: StoreTx
    where
        Self: 's;

    /// Begins a write transaction that holds the store's write lock.
    fn begin_write(&self) -> RepoResult<Self::Tx<'_>>;
    /// Begins a read transaction giving a consistent snapshot.
    fn begin_read(&self) -> RepoResult<Self::Tx<'_>>;
}

/// Transaction-scoped board store operations.
///
/// `lock_*` calls take the row's write lock for the rest of the transaction
/// and fail with `RepoError::RowNotFound` when the row is absent from scope.
pub trait StoreTx {
    fn create_project(&self, name: &str, description: &str) -> RepoResult<Project>;
    fn get_project(&self, project_id: ProjectId) -> RepoResult<Project>;
    /// Lists projects ordered by name.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn update_project(
        &self,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> RepoResult<()>;
    /// Deletes one project with its columns, tasks and comments.
    fn delete_project(&self, project_id: ProjectId) -> RepoResult<()>;
    fn lock_project(&self, project_id: ProjectId) -> RepoResult<()>;

    fn create_column(&self, project_id: ProjectId, name: &str, rank: &Rank) -> RepoResult<Column>;
    fn get_column(&self, column_id: ColumnId) -> RepoResult<Column>;
    fn find_column_by_name(&self, project_id: ProjectId, name: &str) -> RepoResult<Option<Column>>;
    /// Lists columns of one project ascending by rank.
    fn list_columns(&self, project_id: ProjectId) -> RepoResult<Vec<Column>>;
    fn rename_column(&self, column_id: ColumnId, name: &str) -> RepoResult<()>;
    fn delete_column(&self, column_id: ColumnId) -> RepoResult<()>;

    fn create_task(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        name: &str,
        description: &str,
        rank: &Rank,
    ) -> RepoResult<Task>;
    fn get_task(&self, task_id: TaskId) -> RepoResult<Task>;
    /// Lists tasks of one column ascending by rank.
    fn list_tasks(&self, column_id: ColumnId) -> RepoResult<Vec<Task>>;
    fn update_task(&self, task_id: TaskId, name: &str, description: &str) -> RepoResult<()>;
    /// Writes a task's new parent column and rank together.
    fn update_task_position(
        &self,
        task_id: TaskId,
        column_id: ColumnId,
        rank: &Rank,
    ) -> RepoResult<()>;
    fn delete_task(&self, task_id: TaskId) -> RepoResult<()>;

    fn create_comment(&self, task_id: TaskId, text: &str) -> RepoResult<Comment>;
    fn get_comment(&self, task_id: TaskId, comment_id: CommentId) -> RepoResult<Comment>;
    /// Lists comments of one task in creation order.
    fn list_comments(&self, task_id: TaskId) -> RepoResult<Vec<Comment>>;
    fn update_comment(&self, task_id: TaskId, comment_id: CommentId, text: &str) -> RepoResult<()>;
    fn delete_comment(&self, task_id: TaskId, comment_id: CommentId) -> RepoResult<()>;

    /// Locks one sibling row inside `scope_id` and returns its rank.
    fn lock_and_get_rank(&self, kind: SiblingKind, scope_id: Uuid, id: Uuid) -> RepoResult<Rank>;
    /// Returns the sibling nearest to `reference` on `direction`, skipping `exclude`.
    fn neighbor(
        &self,
        kind: SiblingKind,
        scope_id: Uuid,
        reference: Bound<'_>,
        direction: Direction,
        exclude: Option<Uuid>,
    ) -> RepoResult<Option<(Uuid, Rank)>>;
    /// Locks every sibling row of one scope and returns ids ascending by rank.
    fn lock_ordered_ids(&self, kind: SiblingKind, scope_id: Uuid) -> RepoResult<Vec<Uuid>>;
    fn update_rank(&self, kind: SiblingKind, id: Uuid, rank: &Rank) -> RepoResult<()>;

    fn commit(self) -> RepoResult<()>
    where
        Self: Sized;
}

/// SQLite-backed board store.
///
/// Write transactions begin `IMMEDIATE`, so the database write lock is held
/// from the first statement; row locks are taken by reading rows inside it.
pub struct SqliteBoardStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_board_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BoardStore for SqliteBoardStore<'_> {
    type Tx<'s>
        = SqliteStoreTx<'s>
    where
        Self: 's;

    fn begin_write(&self) -> RepoResult<Self::Tx<'_>> {
        SqliteStoreTx::begin(self.conn, TransactionBehavior::Immediate)
    }

    fn begin_read(&self) -> RepoResult<Self::Tx<'_>> {
        SqliteStoreTx::begin(self.conn, TransactionBehavior::Deferred)
    }
}

fn ensure_board_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["projects", "board_columns", "tasks", "comments"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
