//! Board use-case service: projects and comments.
//!
//! # Responsibility
//! - Validate user input before any store interaction.
//! - Run every use case in exactly one store transaction.
//!
//! # Invariants
//! - A new project is always created together with its default column.
//! - Comments keep creation order and are never reordered.

use crate::model::board::{
    comment_text, project_fields, ColumnBoard, Comment, CommentId, Project, ProjectBoard,
    ProjectId, TaskId, DEFAULT_COLUMN_NAME,
};
use crate::model::rank::{allocate, Bound};
use crate::repo::board_repo::{BoardStore, StoreTx};
use crate::service::error::{BoardError, RepoResultExt};
use log::info;
use std::time::Instant;

/// Board use-case facade over one store.
pub struct BoardService<S: BoardStore> {
    pub(crate) store: S,
}

impl<S: BoardStore> BoardService<S> {
    /// Creates service from store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub(crate) fn begin_write(&self, context: &'static str) -> Result<S::Tx<'_>, BoardError> {
        self.store.begin_write().or_internal(context)
    }

    pub(crate) fn begin_read(&self, context: &'static str) -> Result<S::Tx<'_>, BoardError> {
        self.store.begin_read().or_internal(context)
    }

    /// Creates a project seeded with one `default` column.
    pub fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProjectBoard, BoardError> {
        let (name, description) = project_fields(name, description)?;
        let started_at = Instant::now();

        let tx = self.begin_write("create project")?;
        let project = tx
            .create_project(&name, &description)
            .or_internal("create project")?;
        let rank = allocate(Bound::Unbounded, Bound::Unbounded);
        let column = tx
            .create_column(project.id, DEFAULT_COLUMN_NAME, &rank)
            .or_internal("create default column")?;
        tx.commit().or_internal("commit create project")?;

        info!(
            "event=project_create module=service status=ok project={} duration_ms={}",
            project.id,
            started_at.elapsed().as_millis()
        );
        Ok(ProjectBoard {
            project,
            columns: vec![ColumnBoard {
                column,
                tasks: Vec::new(),
            }],
        })
    }

    pub fn get_project(&self, project_id: ProjectId) -> Result<Project, BoardError> {
        let tx = self.begin_read("get project")?;
        tx.get_project(project_id)
            .or_not_found("get project", "project not found")
    }

    /// Loads a project with its columns and tasks in display order.
    pub fn get_project_board(&self, project_id: ProjectId) -> Result<ProjectBoard, BoardError> {
        let tx = self.begin_read("get project board")?;
        let project = tx
            .get_project(project_id)
            .or_not_found("get project board", "project not found")?;
        let columns = tx
            .list_columns(project_id)
            .or_internal("list board columns")?
            .into_iter()
            .map(|column| {
                let tasks = tx.list_tasks(column.id).or_internal("list board tasks")?;
                Ok(ColumnBoard { column, tasks })
            })
            .collect::<Result<Vec<_>, BoardError>>()?;
        Ok(ProjectBoard { project, columns })
    }

    /// Lists projects ordered by name.
    pub fn list_projects(&self) -> Result<Vec<Project>, BoardError> {
        let tx = self.begin_read("list projects")?;
        tx.list_projects().or_internal("list projects")
    }

    pub fn update_project(
        &self,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> Result<(), BoardError> {
        let (name, description) = project_fields(name, description)?;
        let tx = self.begin_write("update project")?;
        tx.update_project(project_id, &name, &description)
            .or_not_found("update project", "project not found")?;
        tx.commit().or_internal("commit update project")
    }

    /// Deletes a project with all of its columns, tasks and comments.
    pub fn delete_project(&self, project_id: ProjectId) -> Result<(), BoardError> {
        let tx = self.begin_write("delete project")?;
        tx.delete_project(project_id)
            .or_not_found("delete project", "project not found")?;
        tx.commit().or_internal("commit delete project")
    }

    pub fn create_comment(&self, task_id: TaskId, text: &str) -> Result<Comment, BoardError> {
        let text = comment_text(text)?;
        let tx = self.begin_write("create comment")?;
        tx.get_task(task_id)
            .or_not_found("create comment", "task not found")?;
        let comment = tx
            .create_comment(task_id, &text)
            .or_internal("create comment")?;
        tx.commit().or_internal("commit create comment")?;
        Ok(comment)
    }

    pub fn get_comment(
        &self,
        task_id: TaskId,
        comment_id: CommentId,
    ) -> Result<Comment, BoardError> {
        let tx = self.begin_read("get comment")?;
        tx.get_comment(task_id, comment_id)
            .or_not_found("get comment", "comment not found")
    }

    /// Lists comments of one task in creation order.
    pub fn list_comments(&self, task_id: TaskId) -> Result<Vec<Comment>, BoardError> {
        let tx = self.begin_read("list comments")?;
        tx.get_task(task_id)
            .or_not_found("list comments", "task not found")?;
        tx.list_comments(task_id).or_internal("list comments")
    }

    pub fn update_comment(
        &self,
        task_id: TaskId,
        comment_id: CommentId,
        text: &str,
    ) -> Result<(), BoardError> {
        let text = comment_text(text)?;
        let tx = self.begin_write("update comment")?;
        tx.update_comment(task_id, comment_id, &text)
            .or_not_found("update comment", "comment not found")?;
        tx.commit().or_internal("commit update comment")
    }

    pub fn delete_comment(&self, task_id: TaskId, comment_id: CommentId) -> Result<(), BoardError> {
        let tx = self.begin_write("delete comment")?;
        tx.delete_comment(task_id, comment_id)
            .or_not_found("delete comment", "comment not found")?;
        tx.commit().or_internal("commit delete comment")
    }
}
