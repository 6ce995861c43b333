//! Column deletion with cascading task reassignment.
//!
//! # Responsibility
//! - Delete a column while moving all of its tasks to a surviving neighbour.
//!
//! # Invariants
//! - A project never loses its last column.
//! - Migrated tasks keep their relative order and land after every task the
//!   successor already holds.
//! - Reassignment and deletion commit together or not at all.

use crate::model::board::{ColumnId, SiblingKind};
use crate::model::rank::{allocate, Bound, Rank};
use crate::repo::board_repo::{BoardStore, Direction, StoreTx};
use crate::service::board_service::BoardService;
use crate::service::error::{BoardError, RepoResultExt};
use crate::service::locker::lock_order;
use log::info;
use std::time::Instant;

impl<S: BoardStore> BoardService<S> {
    /// Deletes a column after appending its tasks to the successor column.
    ///
    /// The successor is the nearest column ranked before the deleted one, or
    /// the nearest ranked after it when the deleted column is first.
    ///
    /// # Errors
    /// - `NotFound` when the column does not exist.
    /// - `Conflict` when it is the only column of its project.
    pub fn delete_column(&self, column_id: ColumnId) -> Result<(), BoardError> {
        let started_at = Instant::now();
        let tx = self.begin_write("delete column")?;

        let column = tx
            .get_column(column_id)
            .or_not_found("delete column", "column not found")?;
        let project_id = column.project_id;
        tx.lock_project(project_id)
            .or_not_found("lock column project", "column not found")?;

        let mut successor = tx
            .neighbor(
                SiblingKind::Column,
                project_id,
                Bound::Bounded(&column.rank),
                Direction::Before,
                Some(column_id),
            )
            .or_internal("find preceding column")?;
        if successor.is_none() {
            successor = tx
                .neighbor(
                    SiblingKind::Column,
                    project_id,
                    Bound::Bounded(&column.rank),
                    Direction::After,
                    Some(column_id),
                )
                .or_internal("find following column")?;
        }
        let Some((successor_id, _)) = successor else {
            return Err(BoardError::Conflict("project must retain at least one column".to_string()));
        };

        for id in lock_order(&[Some(column_id), Some(successor_id)]) {
            tx.lock_and_get_rank(SiblingKind::Column, project_id, id)
                .or_not_found("lock columns for delete", "column not found")?;
        }

        let migrated = tx
            .lock_ordered_ids(SiblingKind::Task, column_id)
            .or_internal("lock migrated tasks")?;
        let mut running_max: Option<Rank> = tx
            .neighbor(
                SiblingKind::Task,
                successor_id,
                Bound::Unbounded,
                Direction::Before,
                None,
            )
            .or_internal("read successor max task rank")?
            .map(|(_, rank)| rank);

        for task_id in &migrated {
            let rank = allocate(Bound::from(running_max.as_ref()), Bound::Unbounded);
            tx.update_task_position(*task_id, successor_id, &rank)
                .or_internal("reassign task")?;
            running_max = Some(rank);
        }

        tx.delete_column(column_id)
            .or_not_found("delete column", "column not found")?;
        tx.commit().or_internal("commit delete column")?;

        info!(
            "event=column_delete module=service status=ok column={} project={} successor={} migrated_tasks={} duration_ms={}",
            column_id,
            project_id,
            successor_id,
            migrated.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}
