//! SQLite implementation of transaction-scoped board store operations.
//!
//! # Invariants
//! - Sibling reads order by `sort_rank ASC` (binary collation equals rank order).
//! - Comment reads order by `created_at ASC, rowid ASC`.
//! - Zero affected rows on update/delete is reported as `RowNotFound`.

use crate::model::board::{
    Column, ColumnId, Comment, CommentId, Project, ProjectId, SiblingKind, Task, TaskId,
};
use crate::model::rank::{Bound, Rank};
use crate::repo::board_repo::{Direction, RepoError, RepoResult, StoreTx};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    project_uuid,
    name,
    description,
    created_at,
    updated_at
FROM projects";

const COLUMN_SELECT_SQL: &str = "SELECT
    column_uuid,
    project_uuid,
    name,
    sort_rank,
    created_at,
    updated_at
FROM board_columns";

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    project_uuid,
    column_uuid,
    name,
    description,
    sort_rank,
    created_at,
    updated_at
FROM tasks";

const COMMENT_SELECT_SQL: &str = "SELECT
    comment_uuid,
    task_uuid,
    body,
    created_at,
    updated_at
FROM comments";

/// Table layout of one ranked sibling kind.
struct SiblingTable {
    table: &'static str,
    id_column: &'static str,
    scope_column: &'static str,
}

fn sibling_table(kind: SiblingKind) -> SiblingTable {
    match kind {
        SiblingKind::Column => SiblingTable {
            table: "board_columns",
            id_column: "column_uuid",
            scope_column: "project_uuid",
        },
        SiblingKind::Task => SiblingTable {
            table: "tasks",
            id_column: "task_uuid",
            scope_column: "column_uuid",
        },
    }
}

/// One open SQLite transaction over the board schema.
pub struct SqliteStoreTx<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteStoreTx<'conn> {
    pub(crate) fn begin(
        conn: &'conn Connection,
        behavior: TransactionBehavior,
    ) -> RepoResult<Self> {
        let tx = Transaction::new_unchecked(conn, behavior)?;
        Ok(Self { tx })
    }

    fn load_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .tx
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE project_uuid = ?1;"))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn query_columns(&self, sql: &str, param: String) -> RepoResult<Vec<Column>> {
        let mut stmt = self.tx.prepare(sql)?;
        let mut rows = stmt.query([param])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_column_row(row)?);
        }
        Ok(items)
    }

    fn expect_changed(changed: usize, entity: &'static str, id: Uuid) -> RepoResult<()> {
        if changed == 0 {
            return Err(RepoError::RowNotFound { entity, id });
        }
        Ok(())
    }
}

impl StoreTx for SqliteStoreTx<'_> {
    fn create_project(&self, name: &str, description: &str) -> RepoResult<Project> {
        let project_id = Uuid::new_v4();
        self.tx.execute(
            "INSERT INTO projects (project_uuid, name, description) VALUES (?1, ?2, ?3);",
            params![project_id.to_string(), name, description],
        )?;
        self.get_project(project_id)
    }

    fn get_project(&self, project_id: ProjectId) -> RepoResult<Project> {
        self.load_project(project_id)?.ok_or(RepoError::RowNotFound {
            entity: "project",
            id: project_id,
        })
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .tx
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY name ASC, project_uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_row(row)?);
        }
        Ok(items)
    }

    fn update_project(
        &self,
        project_id: ProjectId,
        name: &str,
        description: &str,
    ) -> RepoResult<()> {
        let changed = self.tx.execute(
            "UPDATE projects
             SET name = ?2,
                 description = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE project_uuid = ?1;",
            params![project_id.to_string(), name, description],
        )?;
        Self::expect_changed(changed, "project", project_id)
    }

    fn delete_project(&self, project_id: ProjectId) -> RepoResult<()> {
        let changed = self.tx.execute(
            "DELETE FROM projects WHERE project_uuid = ?1;",
            [project_id.to_string()],
        )?;
        Self::expect_changed(changed, "project", project_id)
    }

    fn lock_project(&self, project_id: ProjectId) -> RepoResult<()> {
        let found: Option<i64> = self
            .tx
            .query_row(
                "SELECT 1 FROM projects WHERE project_uuid = ?1;",
                [project_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(_) => Ok(()),
            None => Err(RepoError::RowNotFound {
                entity: "project",
                id: project_id,
            }),
        }
    }

    fn create_column(&self, project_id: ProjectId, name: &str, rank: &Rank) -> RepoResult<Column> {
        let column_id = Uuid::new_v4();
        self.tx.execute(
            "INSERT INTO board_columns (column_uuid, project_uuid, name, sort_rank)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                column_id.to_string(),
                project_id.to_string(),
                name,
                rank.as_str(),
            ],
        )?;
        self.get_column(column_id)
    }

    fn get_column(&self, column_id: ColumnId) -> RepoResult<Column> {
        let sql = format!("{COLUMN_SELECT_SQL} WHERE column_uuid = ?1;");
        let mut columns = self.query_columns(&sql, column_id.to_string())?;
        columns.pop().ok_or(RepoError::RowNotFound {
            entity: "column",
            id: column_id,
        })
    }

    fn find_column_by_name(&self, project_id: ProjectId, name: &str) -> RepoResult<Option<Column>> {
        let sql = format!("{COLUMN_SELECT_SQL} WHERE project_uuid = ?1 AND name = ?2;");
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query(params![project_id.to_string(), name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_column_row(row)?));
        }
        Ok(None)
    }

    fn list_columns(&self, project_id: ProjectId) -> RepoResult<Vec<Column>> {
        let sql = format!("{COLUMN_SELECT_SQL} WHERE project_uuid = ?1 ORDER BY sort_rank ASC;");
        self.query_columns(&sql, project_id.to_string())
    }

    fn rename_column(&self, column_id: ColumnId, name: &str) -> RepoResult<()> {
        let changed = self.tx.execute(
            "UPDATE board_columns
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE column_uuid = ?1;",
            params![column_id.to_string(), name],
        )?;
        Self::expect_changed(changed, "column", column_id)
    }

    fn delete_column(&self, column_id: ColumnId) -> RepoResult<()> {
        let changed = self.tx.execute(
            "DELETE FROM board_columns WHERE column_uuid = ?1;",
            [column_id.to_string()],
        )?;
        Self::expect_changed(changed, "column", column_id)
    }

    fn create_task(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        name: &str,
        description: &str,
        rank: &Rank,
    ) -> RepoResult<Task> {
        let task_id = Uuid::new_v4();
        self.tx.execute(
            "INSERT INTO tasks (task_uuid, project_uuid, column_uuid, name, description, sort_rank)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task_id.to_string(),
                project_id.to_string(),
                column_id.to_string(),
                name,
                description,
                rank.as_str(),
            ],
        )?;
        self.get_task(task_id)
    }

    fn get_task(&self, task_id: TaskId) -> RepoResult<Task> {
        let mut stmt = self
            .tx
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_uuid = ?1;"))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return parse_task_row(row);
        }
        Err(RepoError::RowNotFound {
            entity: "task",
            id: task_id,
        })
    }

    fn list_tasks(&self, column_id: ColumnId) -> RepoResult<Vec<Task>> {
        let sql = format!("{TASK_SELECT_SQL} WHERE column_uuid = ?1 ORDER BY sort_rank ASC;");
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([column_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn update_task(&self, task_id: TaskId, name: &str, description: &str) -> RepoResult<()> {
        let changed = self.tx.execute(
            "UPDATE tasks
             SET name = ?2,
                 description = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1;",
            params![task_id.to_string(), name, description],
        )?;
        Self::expect_changed(changed, "task", task_id)
    }

    fn update_task_position(
        &self,
        task_id: TaskId,
        column_id: ColumnId,
        rank: &Rank,
    ) -> RepoResult<()> {
        let changed = self.tx.execute(
            "UPDATE tasks
             SET column_uuid = ?2,
                 sort_rank = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1;",
            params![task_id.to_string(), column_id.to_string(), rank.as_str()],
        )?;
        Self::expect_changed(changed, "task", task_id)
    }

    fn delete_task(&self, task_id: TaskId) -> RepoResult<()> {
        let changed = self.tx.execute(
            "DELETE FROM tasks WHERE task_uuid = ?1;",
            [task_id.to_string()],
        )?;
        Self::expect_changed(changed, "task", task_id)
    }

    fn create_comment(&self, task_id: TaskId, text: &str) -> RepoResult<Comment> {
        let comment_id = Uuid::new_v4();
        self.tx.execute(
            "INSERT INTO comments (comment_uuid, task_uuid, body) VALUES (?1, ?2, ?3);",
            params![comment_id.to_string(), task_id.to_string(), text],
        )?;
        self.get_comment(task_id, comment_id)
    }

    fn get_comment(&self, task_id: TaskId, comment_id: CommentId) -> RepoResult<Comment> {
        let sql = format!("{COMMENT_SELECT_SQL} WHERE task_uuid = ?1 AND comment_uuid = ?2;");
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([task_id.to_string(), comment_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return parse_comment_row(row);
        }
        Err(RepoError::RowNotFound {
            entity: "comment",
            id: comment_id,
        })
    }

    fn list_comments(&self, task_id: TaskId) -> RepoResult<Vec<Comment>> {
        let sql = format!(
            "{COMMENT_SELECT_SQL} WHERE task_uuid = ?1 ORDER BY created_at ASC, rowid ASC;"
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([task_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_comment_row(row)?);
        }
        Ok(items)
    }

    fn update_comment(&self, task_id: TaskId, comment_id: CommentId, text: &str) -> RepoResult<()> {
        let changed = self.tx.execute(
            "UPDATE comments
             SET body = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1
               AND comment_uuid = ?2;",
            params![task_id.to_string(), comment_id.to_string(), text],
        )?;
        Self::expect_changed(changed, "comment", comment_id)
    }

    fn delete_comment(&self, task_id: TaskId, comment_id: CommentId) -> RepoResult<()> {
        let changed = self.tx.execute(
            "DELETE FROM comments WHERE task_uuid = ?1 AND comment_uuid = ?2;",
            [task_id.to_string(), comment_id.to_string()],
        )?;
        Self::expect_changed(changed, "comment", comment_id)
    }

    fn lock_and_get_rank(&self, kind: SiblingKind, scope_id: Uuid, id: Uuid) -> RepoResult<Rank> {
        let layout = sibling_table(kind);
        let value: Option<String> = self
            .tx
            .query_row(
                &format!(
                    "SELECT sort_rank FROM {} WHERE {} = ?1 AND {} = ?2;",
                    layout.table, layout.scope_column, layout.id_column
                ),
                [scope_id.to_string(), id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(value) => parse_rank(value, layout.table),
            None => Err(RepoError::RowNotFound {
                entity: kind.label(),
                id,
            }),
        }
    }

    fn neighbor(
        &self,
        kind: SiblingKind,
        scope_id: Uuid,
        reference: Bound<'_>,
        direction: Direction,
        exclude: Option<Uuid>,
    ) -> RepoResult<Option<(Uuid, Rank)>> {
        let layout = sibling_table(kind);
        let (comparison, order) = match direction {
            Direction::Before => ("<", "DESC"),
            Direction::After => (">", "ASC"),
        };
        let reference = match reference {
            Bound::Bounded(rank) => Some(rank.as_str()),
            Bound::Unbounded => None,
        };
        let sql = format!(
            "SELECT {id}, sort_rank
             FROM {table}
             WHERE {scope} = ?1
               AND (?2 IS NULL OR sort_rank {comparison} ?2)
               AND (?3 IS NULL OR {id} <> ?3)
             ORDER BY sort_rank {order}
             LIMIT 1;",
            id = layout.id_column,
            table = layout.table,
            scope = layout.scope_column,
        );
        let found: Option<(String, String)> = self
            .tx
            .query_row(
                &sql,
                params![
                    scope_id.to_string(),
                    reference,
                    exclude.map(|value| value.to_string()),
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        found
            .map(|(id, rank)| {
                Ok((
                    parse_uuid(&id, layout.id_column)?,
                    parse_rank(rank, layout.table)?,
                ))
            })
            .transpose()
    }

    fn lock_ordered_ids(&self, kind: SiblingKind, scope_id: Uuid) -> RepoResult<Vec<Uuid>> {
        let layout = sibling_table(kind);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY sort_rank ASC;",
            layout.id_column, layout.table, layout.scope_column
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([scope_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, layout.id_column)?);
        }
        Ok(ids)
    }

    fn update_rank(&self, kind: SiblingKind, id: Uuid, rank: &Rank) -> RepoResult<()> {
        let layout = sibling_table(kind);
        let changed = self.tx.execute(
            &format!(
                "UPDATE {}
                 SET sort_rank = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE {} = ?1;",
                layout.table, layout.id_column
            ),
            params![id.to_string(), rank.as_str()],
        )?;
        Self::expect_changed(changed, kind.label(), id)
    }

    fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("project_uuid")?;
    Ok(Project {
        id: parse_uuid(&id_text, "projects.project_uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_column_row(row: &Row<'_>) -> RepoResult<Column> {
    let id_text: String = row.get("column_uuid")?;
    let project_text: String = row.get("project_uuid")?;
    Ok(Column {
        id: parse_uuid(&id_text, "board_columns.column_uuid")?,
        project_id: parse_uuid(&project_text, "board_columns.project_uuid")?,
        name: row.get("name")?,
        rank: parse_rank(row.get("sort_rank")?, "board_columns")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("task_uuid")?;
    let project_text: String = row.get("project_uuid")?;
    let column_text: String = row.get("column_uuid")?;
    Ok(Task {
        id: parse_uuid(&id_text, "tasks.task_uuid")?,
        project_id: parse_uuid(&project_text, "tasks.project_uuid")?,
        column_id: parse_uuid(&column_text, "tasks.column_uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        rank: parse_rank(row.get("sort_rank")?, "tasks")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id_text: String = row.get("comment_uuid")?;
    let task_text: String = row.get("task_uuid")?;
    Ok(Comment {
        id: parse_uuid(&id_text, "comments.comment_uuid")?,
        task_id: parse_uuid(&task_text, "comments.task_uuid")?,
        text: row.get("body")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_rank(value: String, table: &'static str) -> RepoResult<Rank> {
    Rank::parse(value)
        .map_err(|err| RepoError::InvalidData(format!("{err} in {table}.sort_rank")))
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
