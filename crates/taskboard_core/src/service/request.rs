//! Closed request/response set for the board.
//!
//! Every operation a request layer can issue is one tagged variant, and
//! `BoardService::handle` dispatches it with a single `match`.

use crate::model::board::{
    Column, ColumnId, Comment, CommentId, Project, ProjectBoard, ProjectId, SiblingKind, Task,
    TaskDetail, TaskId,
};
use crate::repo::board_repo::BoardStore;
use crate::service::board_service::BoardService;
use crate::service::error::BoardError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateRequest {
    Project {
        name: String,
        #[serde(default)]
        description: String,
    },
    Column { project_id: ProjectId, name: String },
    Task {
        project_id: ProjectId,
        column_id: ColumnId,
        name: String,
        #[serde(default)]
        description: String,
    },
    Comment { task_id: TaskId, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadRequest {
    Project {
        project_id: ProjectId,
        #[serde(default)]
        expanded: bool,
    },
    Column {
        project_id: ProjectId,
        column_id: ColumnId,
    },
    Task {
        task_id: TaskId,
        #[serde(default)]
        expanded: bool,
    },
    Comment {
        task_id: TaskId,
        comment_id: CommentId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadCollectionRequest {
    Projects,
    Columns { project_id: ProjectId },
    Tasks { column_id: ColumnId },
    Comments { task_id: TaskId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRequest {
    Project {
        project_id: ProjectId,
        name: String,
        #[serde(default)]
        description: String,
    },
    Column {
        project_id: ProjectId,
        column_id: ColumnId,
        name: String,
    },
    Task {
        task_id: TaskId,
        name: String,
        #[serde(default)]
        description: String,
    },
    Comment {
        task_id: TaskId,
        comment_id: CommentId,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRequest {
    Project { project_id: ProjectId },
    Column { column_id: ColumnId },
    Task { task_id: TaskId },
    Comment {
        task_id: TaskId,
        comment_id: CommentId,
    },
}

/// Reorder of one ranked sibling. Comments are not reorderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub kind: SiblingKind,
    pub target_id: uuid::Uuid,
    /// Project for columns, destination column for tasks.
    #[serde(default)]
    pub new_scope_id: Option<uuid::Uuid>,
    /// Sibling to follow; `None` moves to the start.
    #[serde(default)]
    pub after_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardRequest {
    Create(CreateRequest),
    Read(ReadRequest),
    ReadCollection(ReadCollectionRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
    Reorder(ReorderRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardResponse {
    Board(ProjectBoard),
    Project(Project),
    Projects(Vec<Project>),
    Column(Column),
    Columns(Vec<Column>),
    Task(Task),
    TaskDetail(TaskDetail),
    Tasks(Vec<Task>),
    Comment(Comment),
    Comments(Vec<Comment>),
    /// Mutation applied; nothing to return.
    Done,
}

impl<S: BoardStore> BoardService<S> {
    /// Executes one board request.
    pub fn handle(&self, request: BoardRequest) -> Result<BoardResponse, BoardError> {
        match request {
            BoardRequest::Create(request) => self.handle_create(request),
            BoardRequest::Read(request) => self.handle_read(request),
            BoardRequest::ReadCollection(request) => self.handle_read_collection(request),
            BoardRequest::Update(request) => self.handle_update(request),
            BoardRequest::Delete(request) => self.handle_delete(request),
            BoardRequest::Reorder(request) => self
                .move_position(
                    request.kind,
                    request.target_id,
                    request.new_scope_id,
                    request.after_id,
                )
                .map(|()| BoardResponse::Done),
        }
    }

    fn handle_create(&self, request: CreateRequest) -> Result<BoardResponse, BoardError> {
        match request {
            CreateRequest::Project { name, description } => self
                .create_project(&name, &description)
                .map(BoardResponse::Board),
            CreateRequest::Column { project_id, name } => self
                .create_column(project_id, &name)
                .map(BoardResponse::Column),
            CreateRequest::Task {
                project_id,
                column_id,
                name,
                description,
            } => self
                .create_task(project_id, column_id, &name, &description)
                .map(BoardResponse::Task),
            CreateRequest::Comment { task_id, text } => self
                .create_comment(task_id, &text)
                .map(BoardResponse::Comment),
        }
    }

    fn handle_read(&self, request: ReadRequest) -> Result<BoardResponse, BoardError> {
        match request {
            ReadRequest::Project {
                project_id,
                expanded: true,
            } => self.get_project_board(project_id).map(BoardResponse::Board),
            ReadRequest::Project { project_id, .. } => {
                self.get_project(project_id).map(BoardResponse::Project)
            }
            ReadRequest::Column {
                project_id,
                column_id,
            } => self
                .get_column(project_id, column_id)
                .map(BoardResponse::Column),
            ReadRequest::Task {
                task_id,
                expanded: true,
            } => self.get_task_detail(task_id).map(BoardResponse::TaskDetail),
            ReadRequest::Task { task_id, .. } => self.get_task(task_id).map(BoardResponse::Task),
            ReadRequest::Comment {
                task_id,
                comment_id,
            } => self
                .get_comment(task_id, comment_id)
                .map(BoardResponse::Comment),
        }
    }

    fn handle_read_collection(
        &self,
        request: ReadCollectionRequest,
    ) -> Result<BoardResponse, BoardError> {
        match request {
            ReadCollectionRequest::Projects => self.list_projects().map(BoardResponse::Projects),
            ReadCollectionRequest::Columns { project_id } => {
                self.list_columns(project_id).map(BoardResponse::Columns)
            }
            ReadCollectionRequest::Tasks { column_id } => {
                self.list_tasks(column_id).map(BoardResponse::Tasks)
            }
            ReadCollectionRequest::Comments { task_id } => {
                self.list_comments(task_id).map(BoardResponse::Comments)
            }
        }
    }

    fn handle_update(&self, request: UpdateRequest) -> Result<BoardResponse, BoardError> {
        match request {
            UpdateRequest::Project {
                project_id,
                name,
                description,
            } => self.update_project(project_id, &name, &description),
            UpdateRequest::Column {
                project_id,
                column_id,
                name,
            } => self.rename_column(project_id, column_id, &name),
            UpdateRequest::Task {
                task_id,
                name,
                description,
            } => self.update_task(task_id, &name, &description),
            UpdateRequest::Comment {
                task_id,
                comment_id,
                text,
            } => self.update_comment(task_id, comment_id, &text),
        }
        .map(|()| BoardResponse::Done)
    }

    fn handle_delete(&self, request: DeleteRequest) -> Result<BoardResponse, BoardError> {
        match request {
            DeleteRequest::Project { project_id } => self.delete_project(project_id),
            DeleteRequest::Column { column_id } => self.delete_column(column_id),
            DeleteRequest::Task { task_id } => self.delete_task(task_id),
            DeleteRequest::Comment {
                task_id,
                comment_id,
            } => self.delete_comment(task_id, comment_id),
        }
        .map(|()| BoardResponse::Done)
    }
}
