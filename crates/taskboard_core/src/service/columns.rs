//! Column create/read/rename use cases.
//!
//! New columns are appended after the project's last column. Moves live in
//! `position`, deletes in `reassign`.

use crate::model::board::{column_name, Column, ColumnId, ProjectId, SiblingKind};
use crate::model::rank::{allocate, Bound};
use crate::repo::board_repo::{BoardStore, Direction, StoreTx};
use crate::service::board_service::BoardService;
use crate::service::error::{BoardError, RepoResultExt};

impl<S: BoardStore> BoardService<S> {
    /// Appends a new column at the end of a project.
    ///
    /// # Errors
    /// - `NotFound` when the project does not exist.
    /// - `Conflict` when the project already has a column with this name.
    pub fn create_column(&self, project_id: ProjectId, name: &str) -> Result<Column, BoardError> {
        let name = column_name(name)?;
        let tx = self.begin_write("create column")?;
        tx.lock_project(project_id)
            .or_not_found("create column", "project not found")?;
        let existing = tx
            .find_column_by_name(project_id, &name)
            .or_internal("find column by name")?;
        if existing.is_some() {
            return Err(BoardError::Conflict("column with same name exists in project".to_string()));
        }

        let last = tx
            .neighbor(
                SiblingKind::Column,
                project_id,
                Bound::Unbounded,
                Direction::Before,
                None,
            )
            .or_internal("read last column rank")?;
        let lower = last.as_ref().map(|(_, rank)| rank);
        let rank = allocate(Bound::from(lower), Bound::Unbounded);
        let column = tx
            .create_column(project_id, &name, &rank)
            .or_internal("create column")?;
        tx.commit().or_internal("commit create column")?;
        Ok(column)
    }

    pub fn get_column(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
    ) -> Result<Column, BoardError> {
        let tx = self.begin_read("get column")?;
        scoped_column(&tx, project_id, column_id)
    }

    /// Lists project columns in display order.
    pub fn list_columns(&self, project_id: ProjectId) -> Result<Vec<Column>, BoardError> {
        let tx = self.begin_read("list columns")?;
        tx.get_project(project_id)
            .or_not_found("list columns", "project not found")?;
        tx.list_columns(project_id).or_internal("list columns")
    }

    /// Renames a column; the new name must be free within the project.
    pub fn rename_column(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        name: &str,
    ) -> Result<(), BoardError> {
        let name = column_name(name)?;
        let tx = self.begin_write("rename column")?;
        scoped_column(&tx, project_id, column_id)?;
        let holder = tx
            .find_column_by_name(project_id, &name)
            .or_internal("find column by name")?;
        if holder.is_some_and(|column| column.id != column_id) {
            return Err(BoardError::Conflict(
                "column with specified name already exists in project".to_string(),
            ));
        }
        tx.rename_column(column_id, &name)
            .or_not_found("rename column", "column not found")?;
        tx.commit().or_internal("commit rename column")
    }
}

/// Loads a column and checks it belongs to `project_id`.
pub(crate) fn scoped_column<T: StoreTx>(
    tx: &T,
    project_id: ProjectId,
    column_id: ColumnId,
) -> Result<Column, BoardError> {
    let column = tx
        .get_column(column_id)
        .or_not_found("get column", "column not found")?;
    if column.project_id != project_id {
        return Err(BoardError::NotFound("column not found in project".to_string()));
    }
    Ok(column)
}
