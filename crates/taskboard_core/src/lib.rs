//! Core of the task board: ranked projects, columns and tasks.
//!
//! Columns order inside a project and tasks order inside a column by
//! lexicographic rank strings; moves rewrite one rank, never a sibling range.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BoardConfig, LoggingConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    Column, ColumnBoard, ColumnId, Comment, CommentId, FieldError, Project, ProjectBoard,
    ProjectId, SiblingKind, Task, TaskDetail, TaskId, DEFAULT_COLUMN_NAME,
};
pub use model::rank::{allocate, Bound, Rank, RankError};
pub use repo::board_repo::{BoardStore, Direction, RepoError, RepoResult, SqliteBoardStore, StoreTx};
pub use service::board_service::BoardService;
pub use service::error::BoardError;
pub use service::request::{
    BoardRequest, BoardResponse, CreateRequest, DeleteRequest, ReadCollectionRequest,
    ReadRequest, ReorderRequest, UpdateRequest,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
