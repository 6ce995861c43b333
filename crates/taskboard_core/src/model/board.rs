//! Board domain model.
//!
//! # Responsibility
//! - Define projects, columns, tasks and comments as read models.
//! - Validate user-settable fields before they reach the store.
//!
//! # Invariants
//! - Column ranks are unique within one project; task ranks within one column.
//! - A project always keeps at least one column.
//! - Comments are ordered by creation time only.

use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProjectId = Uuid;
pub type ColumnId = Uuid;
pub type TaskId = Uuid;
pub type CommentId = Uuid;

/// Name given to the column seeded into every new project.
pub const DEFAULT_COLUMN_NAME: &str = "default";

const PROJECT_NAME_MAX: usize = 500;
const PROJECT_DESCRIPTION_MAX: usize = 1000;
const COLUMN_NAME_MAX: usize = 255;
const TASK_NAME_MAX: usize = 500;
const TASK_DESCRIPTION_MAX: usize = 5000;
const COMMENT_TEXT_MAX: usize = 5000;

/// Entity kinds that keep a ranked sibling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingKind {
    /// Ordered within a project.
    Column,
    /// Ordered within a column.
    Task,
}

impl SiblingKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Task => "task",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub project_id: ProjectId,
    pub name: String,
    pub rank: Rank,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub column_id: ColumnId,
    pub name: String,
    pub description: String,
    /// Scoped to `column_id`.
    pub rank: Rank,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Column with its tasks in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBoard {
    pub column: Column,
    pub tasks: Vec<Task>,
}

/// Project with its columns and tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBoard {
    pub project: Project,
    pub columns: Vec<ColumnBoard>,
}

/// Task with its comments in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetail {
    pub task: Task,
    pub comments: Vec<Comment>,
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Required text is blank after trim.
    Blank(&'static str),
    /// Text exceeds the allowed character count.
    TooLong { field: &'static str, max: usize },
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max } => write!(f, "{field} must be at most {max} characters"),
        }
    }
}

impl Error for FieldError {}

/// Validated project name and description.
pub fn project_fields(name: &str, description: &str) -> Result<(String, String), FieldError> {
    Ok((
        required_text("project name", name, PROJECT_NAME_MAX)?,
        optional_text("project description", description, PROJECT_DESCRIPTION_MAX)?,
    ))
}

pub fn column_name(name: &str) -> Result<String, FieldError> {
    required_text("column name", name, COLUMN_NAME_MAX)
}

/// Validated task name and description.
pub fn task_fields(name: &str, description: &str) -> Result<(String, String), FieldError> {
    Ok((
        required_text("task name", name, TASK_NAME_MAX)?,
        optional_text("task description", description, TASK_DESCRIPTION_MAX)?,
    ))
}

pub fn comment_text(text: &str) -> Result<String, FieldError> {
    required_text("comment text", text, COMMENT_TEXT_MAX)
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Blank(field));
    }
    optional_text(field, trimmed, max)
}

fn optional_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::TooLong { field, max });
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{column_name, comment_text, project_fields, task_fields, FieldError};

    #[test]
    fn names_are_trimmed() {
        assert_eq!(column_name("  Done ").unwrap(), "Done");
        let (name, description) = task_fields(" write docs ", "").unwrap();
        assert_eq!(name, "write docs");
        assert_eq!(description, "");
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert_eq!(column_name("   "), Err(FieldError::Blank("column name")));
        assert_eq!(comment_text(""), Err(FieldError::Blank("comment text")));
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let long = "x".repeat(1001);
        let err = project_fields("ok", &long).unwrap_err();
        assert_eq!(
            err,
            FieldError::TooLong {
                field: "project description",
                max: 1000,
            }
        );
        assert!(column_name(&"y".repeat(256)).is_err());
        assert!(column_name(&"y".repeat(255)).is_ok());
    }
}
