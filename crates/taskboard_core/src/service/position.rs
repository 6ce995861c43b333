//! Sibling reorder protocol: validate, lock, allocate, persist, commit.
//!
//! # Responsibility
//! - Move a column within its project or a task within/between columns.
//! - Keep every move in one write transaction.
//!
//! # Invariants
//! - Self-reference is rejected before the store is touched.
//! - Locks descend project -> columns -> tasks; within a level by ascending id.
//! - Ranks are read only after the locks covering them are held.

use crate::model::board::{ColumnId, ProjectId, SiblingKind, TaskId};
use crate::model::rank::allocate;
use crate::repo::board_repo::{BoardStore, StoreTx};
use crate::service::board_service::BoardService;
use crate::service::columns::scoped_column;
use crate::service::error::{BoardError, RepoResultExt};
use crate::service::locker::{lock_for_reorder, lock_order, ReorderTarget};
use log::info;
use std::time::Instant;
use uuid::Uuid;

impl<S: BoardStore> BoardService<S> {
    /// Moves a column or task so it directly follows `after_id`.
    ///
    /// `new_scope_id` is the project for columns (defaults to the column's own
    /// project) and the destination column for tasks (defaults to the task's
    /// current column). `after_id = None` moves the row to the start.
    pub fn move_position(
        &self,
        kind: SiblingKind,
        target_id: Uuid,
        new_scope_id: Option<Uuid>,
        after_id: Option<Uuid>,
    ) -> Result<(), BoardError> {
        match kind {
            SiblingKind::Column => self.reorder_column(target_id, new_scope_id, after_id),
            SiblingKind::Task => self.move_task(target_id, new_scope_id, after_id),
        }
    }

    /// Places a column after `after_column_id`, or first when `None`.
    ///
    /// # Errors
    /// - `Unprocessable` when the column is placed after itself.
    /// - `NotFound` when the column is not in `project_id`.
    /// - `Conflict` when `after_column_id` is not in `project_id`.
    pub fn move_column(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        after_column_id: Option<ColumnId>,
    ) -> Result<(), BoardError> {
        self.reorder_column(column_id, Some(project_id), after_column_id)
    }

    /// Places a task after `after_task_id` inside `new_column_id`.
    ///
    /// # Errors
    /// - `Unprocessable` when the task is placed after itself.
    /// - `NotFound` when the task does not exist.
    /// - `Conflict` when the destination column is not in the task's project or
    ///   `after_task_id` is not in the destination column.
    pub fn move_task(
        &self,
        task_id: TaskId,
        new_column_id: Option<ColumnId>,
        after_task_id: Option<TaskId>,
    ) -> Result<(), BoardError> {
        reject_self_reference(SiblingKind::Task, task_id, after_task_id)?;
        let started_at = Instant::now();

        let tx = self.begin_write("move task")?;
        let task = tx
            .get_task(task_id)
            .or_not_found("move task", "task not found")?;
        let destination = new_column_id.unwrap_or(task.column_id);
        if destination != task.column_id {
            let column = tx.get_column(destination).or_conflict(
                "move task",
                "column specified by new column id not found in task project",
            )?;
            if column.project_id != task.project_id {
                return Err(BoardError::Conflict(
                    "column specified by new column id not found in task project".to_string(),
                ));
            }
        }

        for column_id in lock_order(&[Some(task.column_id), Some(destination)]) {
            tx.lock_and_get_rank(SiblingKind::Column, task.project_id, column_id)
                .or_conflict("lock task columns", "column not found in task project")?;
        }

        let target = ReorderTarget {
            kind: SiblingKind::Task,
            id: task_id,
            current_scope: task.column_id,
            new_scope: destination,
            after_id: after_task_id,
        };
        let bounds = lock_for_reorder(&tx, &target)?;
        let rank = allocate(bounds.lower(), bounds.upper());
        tx.update_task_position(task_id, destination, &rank)
            .or_not_found("persist task position", "task not found")?;
        tx.commit().or_internal("commit move task")?;

        info!(
            "event=task_move module=service status=ok task={} from_column={} to_column={} from_rank={} to_rank={} duration_ms={}",
            task_id,
            task.column_id,
            destination,
            bounds.target_rank,
            rank,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn reorder_column(
        &self,
        column_id: ColumnId,
        project_id: Option<ProjectId>,
        after_column_id: Option<ColumnId>,
    ) -> Result<(), BoardError> {
        reject_self_reference(SiblingKind::Column, column_id, after_column_id)?;
        let started_at = Instant::now();

        let tx = self.begin_write("move column")?;
        let project_id = match project_id {
            Some(project_id) => {
                scoped_column(&tx, project_id, column_id)?;
                project_id
            }
            None => {
                let column = tx
                    .get_column(column_id)
                    .or_not_found("move column", "column not found")?;
                column.project_id
            }
        };
        tx.lock_project(project_id)
            .or_not_found("lock column project", "project not found")?;

        let target = ReorderTarget {
            kind: SiblingKind::Column,
            id: column_id,
            current_scope: project_id,
            new_scope: project_id,
            after_id: after_column_id,
        };
        let bounds = lock_for_reorder(&tx, &target)?;
        let rank = allocate(bounds.lower(), bounds.upper());
        tx.update_rank(SiblingKind::Column, column_id, &rank)
            .or_not_found("persist column position", "column not found")?;
        tx.commit().or_internal("commit move column")?;

        info!(
            "event=column_move module=service status=ok column={} project={} from_rank={} to_rank={} duration_ms={}",
            column_id,
            project_id,
            bounds.target_rank,
            rank,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn reject_self_reference(
    kind: SiblingKind,
    target_id: Uuid,
    after_id: Option<Uuid>,
) -> Result<(), BoardError> {
    if after_id == Some(target_id) {
        return Err(BoardError::Unprocessable(format!(
            "{} cannot be placed after itself",
            kind.label()
        )));
    }
    Ok(())
}
