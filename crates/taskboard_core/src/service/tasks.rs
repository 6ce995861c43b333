//! Task create/read/update/delete use cases.
//!
//! New tasks are appended after the last task of their column; the column
//! row is locked first so concurrent appends serialize on it.

use crate::model::board::{task_fields, ColumnId, ProjectId, SiblingKind, Task, TaskDetail, TaskId};
use crate::model::rank::{allocate, Bound};
use crate::repo::board_repo::{BoardStore, Direction, StoreTx};
use crate::service::board_service::BoardService;
use crate::service::columns::scoped_column;
use crate::service::error::{BoardError, RepoResultExt};

impl<S: BoardStore> BoardService<S> {
    /// Appends a new task at the end of a column.
    ///
    /// # Errors
    /// - `NotFound` when the column does not exist in `project_id`.
    pub fn create_task(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        name: &str,
        description: &str,
    ) -> Result<Task, BoardError> {
        let (name, description) = task_fields(name, description)?;
        let tx = self.begin_write("create task")?;
        scoped_column(&tx, project_id, column_id)?;
        tx.lock_and_get_rank(SiblingKind::Column, project_id, column_id)
            .or_not_found("lock task column", "column not found in project")?;

        let last = tx
            .neighbor(
                SiblingKind::Task,
                column_id,
                Bound::Unbounded,
                Direction::Before,
                None,
            )
            .or_internal("read last task rank")?;
        let lower = last.as_ref().map(|(_, rank)| rank);
        let rank = allocate(Bound::from(lower), Bound::Unbounded);
        let task = tx
            .create_task(project_id, column_id, &name, &description, &rank)
            .or_internal("create task")?;
        tx.commit().or_internal("commit create task")?;
        Ok(task)
    }

    pub fn get_task(&self, task_id: TaskId) -> Result<Task, BoardError> {
        let tx = self.begin_read("get task")?;
        tx.get_task(task_id)
            .or_not_found("get task", "task not found")
    }

    /// Loads a task with its comments in creation order.
    pub fn get_task_detail(&self, task_id: TaskId) -> Result<TaskDetail, BoardError> {
        let tx = self.begin_read("get task detail")?;
        let task = tx
            .get_task(task_id)
            .or_not_found("get task detail", "task not found")?;
        let comments = tx.list_comments(task_id).or_internal("list task comments")?;
        Ok(TaskDetail { task, comments })
    }

    /// Lists column tasks in display order.
    pub fn list_tasks(&self, column_id: ColumnId) -> Result<Vec<Task>, BoardError> {
        let tx = self.begin_read("list tasks")?;
        tx.get_column(column_id)
            .or_not_found("list tasks", "column not found")?;
        tx.list_tasks(column_id).or_internal("list tasks")
    }

    pub fn update_task(
        &self,
        task_id: TaskId,
        name: &str,
        description: &str,
    ) -> Result<(), BoardError> {
        let (name, description) = task_fields(name, description)?;
        let tx = self.begin_write("update task")?;
        tx.update_task(task_id, &name, &description)
            .or_not_found("update task", "task not found")?;
        tx.commit().or_internal("commit update task")
    }

    /// Deletes a task and its comments.
    pub fn delete_task(&self, task_id: TaskId) -> Result<(), BoardError> {
        let tx = self.begin_write("delete task")?;
        tx.delete_task(task_id)
            .or_not_found("delete task", "task not found")?;
        tx.commit().or_internal("commit delete task")
    }
}
