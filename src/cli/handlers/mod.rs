mod init;
pub use init::{cmd_init, cmd_seed};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io;
use crate::io::config_io;
use crate::io::json_store::JsonStore;
use crate::io::state::{self, UiState};
use crate::io::store::EntityStore;
use crate::model::config::BoardConfig;
use crate::model::label::Label;
use crate::model::task::{ColumnId, NewTask, SubtaskDraft, TaskPatch};
use crate::ops::board::{Board, BoardError, BulkOutcome};
use crate::ops::filter::{FilterSpec, PriorityFilter};
use crate::ops::labels::find_label;
use crate::ops::selection::Selection;
use crate::ops::{order, todo_ops};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Shortest partial id accepted on the command line
const MIN_ID_KEY_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = resolve_start(cli.board_dir.as_deref())?;

    // Init runs before board discovery
    let command = match cli.command {
        Commands::Init(args) => return cmd_init(args, &start),
        other => other,
    };

    let board_dir = board_io::discover_board(&start)?;
    match command {
        Commands::Init(_) => Ok(()),
        Commands::Seed => cmd_seed(&board_dir, json),

        // Read commands
        Commands::Board(args) => cmd_board(&board_dir, args, json),
        Commands::List(args) => cmd_list(&board_dir, args, json),
        Commands::Show(args) => cmd_show(&board_dir, args, json),

        // Task writes
        Commands::Add(args) => cmd_add(&board_dir, args, json),
        Commands::Edit(args) => cmd_edit(&board_dir, args, json),
        Commands::Mv(args) => cmd_mv(&board_dir, args),
        Commands::Archive(args) => cmd_archive(&board_dir, args),
        Commands::Restore(args) => cmd_restore(&board_dir, args),
        Commands::Rm(args) => cmd_rm(&board_dir, args),
        Commands::Sub(args) => cmd_sub(&board_dir, args, json),

        // Selection
        Commands::Select(args) => cmd_select(&board_dir, args, json),
        Commands::Bulk(args) => cmd_bulk(&board_dir, args, json),

        // Other entities
        Commands::Label(args) => cmd_label(&board_dir, args, json),
        Commands::Todo(args) => cmd_todo(&board_dir, args, json),
        Commands::Note(args) => cmd_note(&board_dir, args, json),
        Commands::Config(args) => cmd_config(&board_dir, args),
    }
}

/// Directory board discovery starts from: `-C` if given, else the cwd
pub fn resolve_start(board_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match board_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One command's view of the board: config, store and persisted selection
struct Session {
    board_dir: PathBuf,
    config: BoardConfig,
    board: Board<JsonStore>,
}

impl Session {
    /// Open the board. Commands that write take the board lock.
    fn open(board_dir: &Path, write: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let config = board_io::load_config(board_dir)?;
        let store = if write {
            JsonStore::open(board_dir)?
        } else {
            JsonStore::open_unlocked(board_dir)?
        };
        let selection = state::read_ui_state(board_dir)
            .map(|s| Selection::from_ids(s.selection))
            .unwrap_or_default();
        let board = Board::load(store, selection)?;
        Ok(Session {
            board_dir: board_dir.to_path_buf(),
            config,
            board,
        })
    }

    fn save_selection(&self) -> CmdResult {
        let ui = UiState {
            selection: self.board.selection().ids(),
        };
        state::write_ui_state(&self.board_dir, &ui)?;
        Ok(())
    }

    fn task_id(&self, key: &str) -> Result<String, BoardError> {
        resolve_id(self.board.tasks().iter().map(|t| t.id.as_str()), key, "task")
    }
}

/// Match a full id, or a unique prefix or suffix of at least
/// `MIN_ID_KEY_LEN` characters.
fn resolve_id<'a>(
    ids: impl Iterator<Item = &'a str> + Clone,
    key: &str,
    kind: &'static str,
) -> Result<String, BoardError> {
    let key = key.trim();
    if let Some(exact) = ids.clone().find(|id| *id == key) {
        return Ok(exact.to_string());
    }
    if key.len() < MIN_ID_KEY_LEN {
        return Err(BoardError::not_found(kind, key));
    }
    let matches: Vec<&str> = ids
        .filter(|id| id.starts_with(key) || id.ends_with(key))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(BoardError::not_found(kind, key)),
        _ => Err(BoardError::Validation(format!(
            "{} id '{}' is ambiguous ({} matches)",
            kind,
            key,
            matches.len()
        ))),
    }
}

/// Label ids for keys that must name existing labels
fn existing_label_ids(labels: &[Label], keys: &[String]) -> Result<Vec<String>, BoardError> {
    keys.iter()
        .map(|key| {
            find_label(labels, key)
                .map(|l| l.id.clone())
                .ok_or_else(|| BoardError::not_found("label", key))
        })
        .collect()
}

/// Filter spec from command-line flags. Label keys that match no label are
/// kept as raw ids so tasks holding a deleted label can still be found.
fn filter_spec(args: &FilterArgs, labels: &[Label]) -> FilterSpec {
    FilterSpec {
        search: args.search.clone().unwrap_or_default(),
        priority: args
            .priority
            .map(PriorityFilter::Only)
            .unwrap_or_default(),
        labels: args
            .label
            .iter()
            .map(|key| {
                find_label(labels, key)
                    .map(|l| l.id.clone())
                    .unwrap_or_else(|| key.clone())
            })
            .collect(),
    }
}

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_board(board_dir: &Path, args: BoardArgs, json: bool) -> CmdResult {
    let session = Session::open(board_dir, false)?;
    let board = &session.board;
    let today = order::today();
    let spec = filter_spec(&args.filter, board.labels());
    let columns: &[ColumnId] = if args.archive {
        &[ColumnId::Archive]
    } else {
        &ColumnId::BOARD
    };

    if json {
        let out: Vec<ColumnJson> = columns
            .iter()
            .map(|&column| ColumnJson {
                column,
                tasks: board
                    .column_view(column, &spec, today)
                    .into_iter()
                    .map(|t| task_to_json(t, board.labels(), today))
                    .collect(),
            })
            .collect();
        return print_json(&out);
    }

    println!("{}", session.config.board.name);
    for &column in columns {
        println!();
        let view = board.column_view(column, &spec, today);
        print_lines(&format_column(column, &view, board.labels(), today));
    }
    Ok(())
}

fn cmd_list(board_dir: &Path, args: ListArgs, json: bool) -> CmdResult {
    let session = Session::open(board_dir, false)?;
    let board = &session.board;
    let today = order::today();
    let spec = filter_spec(&args.filter, board.labels());
    let view = board.column_view(args.column, &spec, today);

    if json {
        let tasks: Vec<TaskJson> = view
            .iter()
            .map(|t| task_to_json(t, board.labels(), today))
            .collect();
        return print_json(&tasks);
    }
    for task in view {
        println!("{}", format_task_line(task, board.labels(), today));
    }
    Ok(())
}

fn cmd_show(board_dir: &Path, args: IdArg, json: bool) -> CmdResult {
    let session = Session::open(board_dir, false)?;
    let id = session.task_id(&args.id)?;
    let board = &session.board;
    let task = board
        .task(&id)
        .ok_or_else(|| BoardError::not_found("task", &id))?;
    let today = order::today();

    if json {
        return print_json(&task_to_json(task, board.labels(), today));
    }
    print_lines(&format_task_detail(task, board.labels(), today));
    Ok(())
}

// ---------------------------------------------------------------------------
// Task writes
// ---------------------------------------------------------------------------

fn cmd_add(board_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let labels = existing_label_ids(session.board.labels(), &args.label)?;
    let new = NewTask {
        title: args.title,
        description: args.description,
        column: args.column,
        priority: args.priority,
        labels,
        due_date: args.due,
        subtasks: args
            .subtasks
            .into_iter()
            .map(|text| SubtaskDraft {
                text,
                completed: false,
            })
            .collect(),
    };
    let task = session.board.create_task(new)?;

    if json {
        return print_json(&task_to_json(&task, session.board.labels(), order::today()));
    }
    println!("{}", task.id);
    Ok(())
}

fn cmd_edit(board_dir: &Path, args: EditArgs, json: bool) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let id = session.task_id(&args.id)?;

    let labels = if args.clear_labels {
        Some(Vec::new())
    } else if args.label.is_empty() {
        None
    } else {
        Some(existing_label_ids(session.board.labels(), &args.label)?)
    };
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description
            .map(|d| Some(d.trim().to_string()).filter(|d| !d.is_empty()))
    };
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.map(Some)
    };
    let patch = TaskPatch {
        title: args.title,
        description,
        column: None,
        priority: args.priority,
        labels,
        due_date,
        subtasks: None,
    };
    if patch.is_empty() {
        return Err("nothing to change (see `vb edit --help`)".into());
    }

    let task = session.board.update_task(&id, patch)?;
    if json {
        return print_json(&task_to_json(&task, session.board.labels(), order::today()));
    }
    println!("{}", format_task_line(&task, session.board.labels(), order::today()));
    Ok(())
}

fn cmd_mv(board_dir: &Path, args: MvArgs) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let id = session.task_id(&args.id)?;
    let task = session.board.move_task(&id, args.column)?;
    println!("{} -> {}", short_id(&task.id), task.column);
    Ok(())
}

fn cmd_archive(board_dir: &Path, args: IdArg) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let id = session.task_id(&args.id)?;
    let task = session.board.archive_task(&id)?;
    session.save_selection()?;
    println!("archived {}", short_id(&task.id));
    Ok(())
}

fn cmd_restore(board_dir: &Path, args: IdArg) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let id = session.task_id(&args.id)?;
    let task = session.board.restore_task(&id)?;
    println!("{} -> {}", short_id(&task.id), task.column);
    Ok(())
}

fn cmd_rm(board_dir: &Path, args: IdArg) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let id = session.task_id(&args.id)?;
    session.board.delete_task(&id)?;
    session.save_selection()?;
    println!("deleted {}", short_id(&id));
    Ok(())
}

/// Convert a 1-based subtask number to an index
fn subtask_index(number: usize) -> Result<usize, BoardError> {
    number
        .checked_sub(1)
        .ok_or_else(|| BoardError::Validation("subtask numbers start at 1".to_string()))
}

fn cmd_sub(board_dir: &Path, args: SubCmd, json: bool) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    let task = match args.action {
        SubAction::Add(a) => {
            let id = session.task_id(&a.id)?;
            session.board.add_subtask(&id, &a.text)?
        }
        SubAction::Toggle(a) => {
            let id = session.task_id(&a.id)?;
            session.board.toggle_subtask(&id, subtask_index(a.number)?)?
        }
        SubAction::Rm(a) => {
            let id = session.task_id(&a.id)?;
            session.board.remove_subtask(&id, subtask_index(a.number)?)?
        }
    };

    let today = order::today();
    if json {
        return print_json(&task_to_json(&task, session.board.labels(), today));
    }
    print_lines(&format_task_detail(&task, session.board.labels(), today));
    Ok(())
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

fn cmd_select(board_dir: &Path, args: SelectArgs, json: bool) -> CmdResult {
    let mut session = Session::open(board_dir, !args.ids.is_empty() || args.clear)?;
    if args.clear {
        session.board.selection_mut().clear();
    }
    for key in &args.ids {
        let id = session.task_id(key)?;
        session.board.selection_mut().toggle(&id);
    }
    if args.clear || !args.ids.is_empty() {
        session.save_selection()?;
    }

    let board = &session.board;
    let selected = board.selection().ids();
    if json {
        return print_json(&SelectionJson { selected });
    }
    if selected.is_empty() {
        println!("nothing selected");
        return Ok(());
    }
    let today = order::today();
    for id in &selected {
        if let Some(task) = board.task(id) {
            println!("{}", format_task_line(task, board.labels(), today));
        }
    }
    Ok(())
}

fn cmd_bulk(board_dir: &Path, args: BulkCmd, json: bool) -> CmdResult {
    let mut session = Session::open(board_dir, true)?;
    if session.board.selection().is_empty() {
        return Err("nothing selected (use `vb select <id>...`)".into());
    }

    let (verb, outcome): (&str, BulkOutcome) = match args.action {
        BulkAction::Mv(a) => ("moved", session.board.bulk_move(a.column)),
        BulkAction::Archive => {
            let policy = session.config.lifecycle.bulk_archive;
            ("archived", session.board.bulk_archive(policy))
        }
        BulkAction::Rm => ("deleted", session.board.bulk_delete()),
    };
    session.save_selection()?;

    if json {
        print_json(&bulk_to_json(&outcome))?;
    } else {
        print_lines(&format_bulk_outcome(verb, &outcome));
    }

    if outcome.is_complete() {
        Ok(())
    } else {
        let attempted = outcome.applied.len() + outcome.failures.len();
        Err(format!("{} of {} tasks failed", outcome.failures.len(), attempted).into())
    }
}

// ---------------------------------------------------------------------------
// Labels, todos, note
// ---------------------------------------------------------------------------

fn cmd_label(board_dir: &Path, args: LabelCmd, json: bool) -> CmdResult {
    let Some(action) = args.action else {
        let session = Session::open(board_dir, false)?;
        let labels = session.board.labels();
        if json {
            let out: Vec<LabelJson> = labels.iter().map(label_to_json).collect();
            return print_json(&out);
        }
        for label in labels {
            println!("{}", format_label_line(label));
        }
        return Ok(());
    };

    let mut session = Session::open(board_dir, true)?;
    match action {
        LabelAction::Add(a) => {
            let label = session.board.create_label(&a.name, a.color)?;
            if json {
                return print_json(&label_to_json(&label));
            }
            println!("{}", label.id);
        }
        LabelAction::Rm(a) => {
            let id = find_label(session.board.labels(), &a.label)
                .map(|l| l.id.clone())
                .ok_or_else(|| BoardError::not_found("label", &a.label))?;
            session.board.delete_label(&id)?;
            println!("deleted label {}", id);
        }
    }
    Ok(())
}

fn todo_id(store: &JsonStore, key: &str) -> Result<String, Box<dyn std::error::Error>> {
    let todos = store.list_todos()?;
    Ok(resolve_id(todos.iter().map(|t| t.id.as_str()), key, "todo")?)
}

fn cmd_todo(board_dir: &Path, args: TodoCmd, json: bool) -> CmdResult {
    let Some(action) = args.action else {
        let store = JsonStore::open_unlocked(board_dir)?;
        let todos = todo_ops::order_todos(store.list_todos()?);
        if json {
            let out: Vec<TodoJson> = todos.iter().map(todo_to_json).collect();
            return print_json(&out);
        }
        for todo in &todos {
            println!("{}", format_todo_line(todo));
        }
        return Ok(());
    };

    let mut store = JsonStore::open(board_dir)?;
    let todo = match action {
        TodoAction::Add(a) => todo_ops::add_todo(&mut store, &a.text)?,
        TodoAction::Done(a) => {
            let id = todo_id(&store, &a.id)?;
            todo_ops::toggle_todo(&mut store, &id)?
        }
        TodoAction::Edit(a) => {
            let id = todo_id(&store, &a.id)?;
            todo_ops::edit_todo(&mut store, &id, &a.text)?
        }
        TodoAction::Rm(a) => {
            let id = todo_id(&store, &a.id)?;
            store.delete_todo(&id).map_err(BoardError::from)?;
            println!("deleted todo {}", short_id(&id));
            return Ok(());
        }
    };

    if json {
        return print_json(&todo_to_json(&todo));
    }
    println!("{}", format_todo_line(&todo));
    Ok(())
}

fn cmd_note(board_dir: &Path, args: NoteCmd, json: bool) -> CmdResult {
    let mut store = JsonStore::open(board_dir)?;
    let note = match args.action {
        None => store.get_note()?,
        Some(NoteAction::Set(a)) => store.save_note(&a.content)?,
    };

    if json {
        return print_json(&note_to_json(&note));
    }
    if !note.content.is_empty() {
        println!("{}", note.content);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(board_dir: &Path, args: ConfigCmd) -> CmdResult {
    match args.action {
        ConfigAction::BulkArchive(a) => {
            let (_config, mut doc) = config_io::read_config(board_dir)?;
            config_io::set_bulk_archive(&mut doc, a.policy);
            config_io::write_config(board_dir, &doc)?;
            println!("bulk_archive = \"{}\"", a.policy.as_str());
        }
    }
    Ok(())
}
