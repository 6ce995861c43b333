use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    BoardError, BoardRequest, BoardResponse, BoardService, CreateRequest, DeleteRequest,
    ReadCollectionRequest, ReadRequest, SqliteBoardStore, DEFAULT_COLUMN_NAME,
};
use uuid::Uuid;

fn service(conn: &Connection) -> BoardService<SqliteBoardStore<'_>> {
    BoardService::new(SqliteBoardStore::try_new(conn).unwrap())
}

#[test]
fn new_project_is_seeded_with_default_column() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let board = service.create_project("  Launch  ", "ship it").unwrap();
    assert_eq!(board.project.name, "Launch");
    assert_eq!(board.columns.len(), 1);
    assert_eq!(board.columns[0].column.name, DEFAULT_COLUMN_NAME);
    assert_eq!(board.columns[0].column.rank.as_str(), "n");
    assert!(board.columns[0].tasks.is_empty());

    let loaded = service.get_project_board(board.project.id).unwrap();
    assert_eq!(loaded, board);
}

#[test]
fn columns_append_and_reject_duplicate_names() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let project = service.create_project("Board", "").unwrap().project;

    let doing = service.create_column(project.id, "doing").unwrap();
    let done = service.create_column(project.id, "done").unwrap();
    let names: Vec<String> = service
        .list_columns(project.id)
        .unwrap()
        .into_iter()
        .map(|column| column.name)
        .collect();
    assert_eq!(names, vec![DEFAULT_COLUMN_NAME, "doing", "done"]);
    assert!(doing.rank < done.rank);

    let err = service.create_column(project.id, "doing").unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    let err = service
        .rename_column(project.id, done.id, "doing")
        .unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    for _ in 0..2 {
        service
            .rename_column(project.id, done.id, "shipped")
            .unwrap();
    }
    let renamed = service.get_column(project.id, done.id).unwrap();
    assert_eq!(renamed.name, "shipped");
}

#[test]
fn column_lookup_is_scoped_to_project() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let first = service.create_project("First", "").unwrap();
    let second = service.create_project("Second", "").unwrap();
    let foreign_column = second.columns[0].column.id;

    let err = service
        .get_column(first.project.id, foreign_column)
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));

    let err = service
        .create_task(first.project.id, foreign_column, "misplaced", "")
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
}

#[test]
fn tasks_append_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let board = service.create_project("Board", "").unwrap();
    let project_id = board.project.id;
    let column_id = board.columns[0].column.id;

    for name in ["one", "two", "three", "four"] {
        service
            .create_task(project_id, column_id, name, "")
            .unwrap();
    }

    let tasks = service.list_tasks(column_id).unwrap();
    let names: Vec<&str> = tasks.iter().map(|task| task.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three", "four"]);
    assert!(tasks.windows(2).all(|pair| pair[0].rank < pair[1].rank));
}

#[test]
fn task_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let board = service.create_project("Board", "").unwrap();
    let task = service
        .create_task(board.project.id, board.columns[0].column.id, "draft", "")
        .unwrap();

    service.update_task(task.id, "final", "with notes").unwrap();
    let loaded = service.get_task(task.id).unwrap();
    assert_eq!(loaded.name, "final");
    assert_eq!(loaded.description, "with notes");
    assert_eq!(loaded.rank, task.rank);

    service.delete_task(task.id).unwrap();
    assert!(matches!(
        service.get_task(task.id).unwrap_err(),
        BoardError::NotFound(_)
    ));
    assert!(matches!(
        service.delete_task(task.id).unwrap_err(),
        BoardError::NotFound(_)
    ));
}

#[test]
fn comments_keep_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let board = service.create_project("Board", "").unwrap();
    let task = service
        .create_task(board.project.id, board.columns[0].column.id, "task", "")
        .unwrap();

    let first = service.create_comment(task.id, "first").unwrap();
    let second = service.create_comment(task.id, "second").unwrap();
    service.create_comment(task.id, "third").unwrap();
    service
        .update_comment(task.id, first.id, "first, edited")
        .unwrap();
    service.delete_comment(task.id, second.id).unwrap();

    let detail = service.get_task_detail(task.id).unwrap();
    let texts: Vec<&str> = detail
        .comments
        .iter()
        .map(|comment| comment.text.as_str())
        .collect();
    assert_eq!(texts, vec!["first, edited", "third"]);

    let err = service
        .create_comment(Uuid::new_v4(), "orphan")
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
    let err = service.get_comment(task.id, second.id).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
}

#[test]
fn invalid_fields_are_unprocessable() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create_project("   ", "").unwrap_err();
    assert_eq!(err.code(), "unprocessable");

    let board = service.create_project("Board", "").unwrap();
    let err = service
        .create_column(board.project.id, &"x".repeat(256))
        .unwrap_err();
    assert_eq!(err.code(), "unprocessable");

    let err = service
        .create_task(board.project.id, board.columns[0].column.id, "", "")
        .unwrap_err();
    assert_eq!(err.code(), "unprocessable");
    let tasks = service.list_tasks(board.columns[0].column.id).unwrap();
    assert!(tasks.is_empty());
}

#[test]
fn deleting_project_removes_its_board() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let board = service.create_project("Doomed", "").unwrap();
    let kept = service.create_project("Kept", "").unwrap();
    let task = service
        .create_task(board.project.id, board.columns[0].column.id, "task", "")
        .unwrap();
    service.create_comment(task.id, "note").unwrap();

    service.delete_project(board.project.id).unwrap();

    assert!(matches!(
        service.get_project(board.project.id).unwrap_err(),
        BoardError::NotFound(_)
    ));
    assert!(matches!(
        service.get_task(task.id).unwrap_err(),
        BoardError::NotFound(_)
    ));
    let projects = service.list_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, kept.project.id);

    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn requests_dispatch_to_use_cases() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .handle(BoardRequest::Create(CreateRequest::Project {
            name: "Via request".to_string(),
            description: String::new(),
        }))
        .unwrap();
    let board = match created {
        BoardResponse::Board(board) => board,
        other => panic!("project creation returns the board, got {other:?}"),
    };

    let listed = service
        .handle(BoardRequest::ReadCollection(ReadCollectionRequest::Projects))
        .unwrap();
    assert_eq!(listed, BoardResponse::Projects(vec![board.project.clone()]));

    let read = service
        .handle(BoardRequest::Read(ReadRequest::Project {
            project_id: board.project.id,
            expanded: false,
        }))
        .unwrap();
    assert_eq!(read, BoardResponse::Project(board.project.clone()));

    let deleted = service
        .handle(BoardRequest::Delete(DeleteRequest::Column {
            column_id: board.columns[0].column.id,
        }))
        .unwrap_err();
    assert_eq!(deleted.code(), "conflict");
}

#[test]
fn request_json_round_trips_through_handle() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let json = r#"{"create":{"project":{"name":"From json"}}}"#;
    let request: BoardRequest = serde_json::from_str(json).unwrap();
    let response = service.handle(request).unwrap();
    let encoded = serde_json::to_value(&response).unwrap();
    assert_eq!(encoded["board"]["project"]["name"], "From json");
    assert_eq!(encoded["board"]["columns"][0]["column"]["rank"], "n");
}
