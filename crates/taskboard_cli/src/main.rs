//! Board inspection CLI.
//!
//! Usage: `taskboard_cli [DB_PATH]`. Prints the core version, then every
//! project with its columns and tasks in display order. Falls back to
//! `TASKBOARD_DB` for the path.

use log::info;
use std::process::ExitCode;
use taskboard_core::{
    core_version, init_logging, open_db, BoardConfig, BoardService, ProjectBoard, SqliteBoardStore,
};

fn main() -> ExitCode {
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskboard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), String> {
    let config = BoardConfig::from_args_or_env(db_path)?;
    if let Some(logging) = &config.logging {
        init_logging(logging)?;
    }

    let conn = open_db(&config.db_path)
        .map_err(|err| format!("cannot open `{}`: {err}", config.db_path.display()))?;
    let store = SqliteBoardStore::try_new(&conn).map_err(|err| err.to_string())?;
    let service = BoardService::new(store);

    let projects = service.list_projects().map_err(|err| err.to_string())?;
    info!(
        "event=cli_dump module=cli status=start version={} projects={}",
        core_version(),
        projects.len()
    );
    println!("taskboard_core version={}", core_version());
    for project in projects {
        let board = service
            .get_project_board(project.id)
            .map_err(|err| err.to_string())?;
        print!("{}", render_board(&board));
    }
    Ok(())
}

fn render_board(board: &ProjectBoard) -> String {
    let mut out = format!("{} [{}]\n", board.project.name, board.project.id);
    for entry in &board.columns {
        out.push_str(&format!(
            "  {} ({}) rank={}\n",
            entry.column.name,
            entry.tasks.len(),
            entry.column.rank
        ));
        for task in &entry.tasks {
            out.push_str(&format!("    - {} rank={}\n", task.name, task.rank));
        }
    }
    out
}
