use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    BoardError, BoardRequest, BoardService, ColumnId, ProjectId, ReorderRequest, SiblingKind,
    SqliteBoardStore, TaskId,
};
use uuid::Uuid;

fn service(conn: &Connection) -> BoardService<SqliteBoardStore<'_>> {
    BoardService::new(SqliteBoardStore::try_new(conn).unwrap())
}

/// Project with columns `C1, C2, C3` in that order.
fn three_columns(service: &BoardService<SqliteBoardStore<'_>>) -> (ProjectId, [ColumnId; 3]) {
    let board = service.create_project("Board", "").unwrap();
    let project_id = board.project.id;
    let c1 = board.columns[0].column.id;
    service.rename_column(project_id, c1, "C1").unwrap();
    let c2 = service.create_column(project_id, "C2").unwrap().id;
    let c3 = service.create_column(project_id, "C3").unwrap().id;
    (project_id, [c1, c2, c3])
}

fn column_names(
    service: &BoardService<SqliteBoardStore<'_>>,
    project_id: ProjectId,
) -> Vec<String> {
    service
        .list_columns(project_id)
        .unwrap()
        .into_iter()
        .map(|column| column.name)
        .collect()
}

fn task_names(service: &BoardService<SqliteBoardStore<'_>>, column_id: ColumnId) -> Vec<String> {
    service
        .list_tasks(column_id)
        .unwrap()
        .into_iter()
        .map(|task| task.name)
        .collect()
}

fn seed_tasks(
    service: &BoardService<SqliteBoardStore<'_>>,
    project_id: ProjectId,
    column_id: ColumnId,
    names: &[&str],
) -> Vec<TaskId> {
    names
        .iter()
        .map(|name| service.create_task(project_id, column_id, name, ""))
        .map(|created| created.unwrap().id)
        .collect()
}

#[test]
fn column_moves_after_reference_or_to_start() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, c2, c3]) = three_columns(&service);

    service.move_column(project_id, c3, Some(c1)).unwrap();
    assert_eq!(column_names(&service, project_id), vec!["C1", "C3", "C2"]);

    service.move_column(project_id, c2, None).unwrap();
    assert_eq!(column_names(&service, project_id), vec!["C2", "C1", "C3"]);

    service.move_column(project_id, c2, Some(c3)).unwrap();
    assert_eq!(column_names(&service, project_id), vec!["C1", "C3", "C2"]);
}

#[test]
fn moving_column_after_its_predecessor_keeps_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, c2, _]) = three_columns(&service);

    service.move_column(project_id, c2, Some(c1)).unwrap();
    assert_eq!(column_names(&service, project_id), vec!["C1", "C2", "C3"]);
}

#[test]
fn self_reference_is_unprocessable_and_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [_, c2, _]) = three_columns(&service);
    let before = service.list_columns(project_id).unwrap();

    let err = service.move_column(project_id, c2, Some(c2)).unwrap_err();
    assert!(matches!(err, BoardError::Unprocessable(_)));
    assert_eq!(service.list_columns(project_id).unwrap(), before);

    let task = seed_tasks(&service, project_id, c2, &["solo"])[0];
    let tasks_before = service.list_tasks(c2).unwrap();
    let err = service.move_task(task, None, Some(task)).unwrap_err();
    assert!(matches!(err, BoardError::Unprocessable(_)));
    assert_eq!(service.list_tasks(c2).unwrap(), tasks_before);

    let err = service.move_task(task, Some(c2), Some(task)).unwrap_err();
    assert!(matches!(err, BoardError::Unprocessable(_)));
    assert_eq!(service.list_tasks(c2).unwrap(), tasks_before);
}

#[test]
fn after_reference_from_other_project_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, _, _]) = three_columns(&service);
    let other = service.create_project("Other", "").unwrap();
    let foreign = other.columns[0].column.id;
    let before = service.list_columns(project_id).unwrap();

    let err = service
        .move_column(project_id, c1, Some(foreign))
        .unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));
    assert_eq!(service.list_columns(project_id).unwrap(), before);
}

#[test]
fn unknown_move_target_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, _) = three_columns(&service);

    let err = service
        .move_column(project_id, Uuid::new_v4(), None)
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));

    let err = service.move_task(Uuid::new_v4(), None, None).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
}

#[test]
fn task_moves_within_column() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, _, _]) = three_columns(&service);
    let ids = seed_tasks(&service, project_id, c1, &["a", "b", "c", "d"]);

    service.move_task(ids[3], None, None).unwrap();
    assert_eq!(task_names(&service, c1), vec!["d", "a", "b", "c"]);

    service.move_task(ids[0], Some(c1), Some(ids[2])).unwrap();
    assert_eq!(task_names(&service, c1), vec!["d", "b", "c", "a"]);

    service.move_task(ids[3], None, Some(ids[0])).unwrap();
    assert_eq!(task_names(&service, c1), vec!["b", "c", "a", "d"]);
}

#[test]
fn task_moves_between_columns() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, c2, c3]) = three_columns(&service);
    let left = seed_tasks(&service, project_id, c1, &["l1", "l2"]);
    let right = seed_tasks(&service, project_id, c2, &["r1", "r2"]);

    service
        .move_task(left[0], Some(c2), Some(right[0]))
        .unwrap();
    assert_eq!(task_names(&service, c1), vec!["l2"]);
    assert_eq!(task_names(&service, c2), vec!["r1", "l1", "r2"]);
    assert_eq!(service.get_task(left[0]).unwrap().column_id, c2);

    service.move_task(left[1], Some(c3), None).unwrap();
    assert!(task_names(&service, c1).is_empty());
    assert_eq!(task_names(&service, c3), vec!["l2"]);
}

#[test]
fn task_move_rejects_foreign_destination_and_stale_after() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, c2, _]) = three_columns(&service);
    let other = service.create_project("Other", "").unwrap();
    let task = seed_tasks(&service, project_id, c1, &["moving"])[0];
    let elsewhere = seed_tasks(&service, project_id, c2, &["elsewhere"])[0];

    let err = service
        .move_task(task, Some(other.columns[0].column.id), None)
        .unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    let err = service
        .move_task(task, Some(c1), Some(elsewhere))
        .unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    let unchanged = service.get_task(task).unwrap();
    assert_eq!(unchanged.column_id, c1);
    assert_eq!(task_names(&service, c1), vec!["moving"]);
}

#[test]
fn repeated_moves_to_front_keep_ranks_valid() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, _, _]) = three_columns(&service);
    seed_tasks(&service, project_id, c1, &["a", "b", "c"]);

    for _ in 0..30 {
        let tasks = service.list_tasks(c1).unwrap();
        let last = tasks.last().unwrap().id;
        service.move_task(last, None, None).unwrap();
    }

    let tasks = service.list_tasks(c1).unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(tasks.windows(2).all(|pair| pair[0].rank < pair[1].rank));
    assert_eq!(task_names(&service, c1), vec!["a", "b", "c"]);
}

#[test]
fn generic_reorder_uses_current_scope_when_omitted() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (project_id, [c1, c2, c3]) = three_columns(&service);

    service
        .move_position(SiblingKind::Column, c1, None, Some(c3))
        .unwrap();
    assert_eq!(column_names(&service, project_id), vec!["C2", "C3", "C1"]);

    let ids = seed_tasks(&service, project_id, c2, &["x", "y"]);
    service
        .handle(BoardRequest::Reorder(ReorderRequest {
            kind: SiblingKind::Task,
            target_id: ids[1],
            new_scope_id: None,
            after_id: None,
        }))
        .unwrap();
    assert_eq!(task_names(&service, c2), vec!["y", "x"]);
}
