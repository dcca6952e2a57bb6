use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::model::config::ArchivePolicy;
use crate::model::label::LabelColor;
use crate::model::task::{ColumnId, Priority};

#[derive(Parser)]
#[command(name = "vb", about = concat!("vibe v", env!("CARGO_PKG_VERSION"), " - a kanban board for one"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against the board found from this directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a board in the current directory
    Init(InitArgs),
    /// Create default labels and the notes pad if missing
    Seed,
    /// Show the board, one section per column
    Board(BoardArgs),
    /// List one column in board order
    List(ListArgs),
    /// Show task details
    Show(IdArg),
    /// Add a task
    Add(AddArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Move a task to another column
    Mv(MvArgs),
    /// Archive a completed task
    Archive(IdArg),
    /// Restore an archived task to complete
    Restore(IdArg),
    /// Delete a task
    Rm(IdArg),
    /// Manage a task's subtasks
    Sub(SubCmd),
    /// Show the selection, or toggle task ids in it
    Select(SelectArgs),
    /// Apply an action to every selected task
    Bulk(BulkCmd),
    /// List labels, or add and remove them
    Label(LabelCmd),
    /// List quick todos, or manage them
    Todo(TodoCmd),
    /// Show the notes pad, or replace its content
    Note(NoteCmd),
    /// Change board settings
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Do not create the default labels
    #[arg(long)]
    pub no_seed: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

/// Filters shared by `board` and `list`
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Only tasks whose title or description contains this text
    #[arg(long, short)]
    pub search: Option<String>,
    /// Only tasks with this priority (low, medium, high)
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// Only tasks carrying any of these labels, by id or name (repeatable)
    #[arg(long, short)]
    pub label: Vec<String>,
}

#[derive(Args)]
pub struct BoardArgs {
    /// Show the archive instead of the three board columns
    #[arg(long)]
    pub archive: bool,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct ListArgs {
    /// Column to list (todo, in-progress, complete, archive)
    pub column: ColumnId,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct IdArg {
    /// Task id (full, or a unique prefix or suffix)
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Starting column (default: todo)
    #[arg(long, short)]
    pub column: Option<ColumnId>,
    /// Priority (default: medium)
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// Label by id or name (repeatable)
    #[arg(long, short)]
    pub label: Vec<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long, short)]
    pub due: Option<NaiveDate>,
    /// Longer description
    #[arg(long)]
    pub description: Option<String>,
    /// Subtask text (repeatable)
    #[arg(long = "sub")]
    pub subtasks: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
    /// New priority
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// Replace the labels with these, by id or name (repeatable)
    #[arg(long, short, conflicts_with = "clear_labels")]
    pub label: Vec<String>,
    /// Remove all labels
    #[arg(long)]
    pub clear_labels: bool,
    /// New due date (YYYY-MM-DD)
    #[arg(long, short, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task id
    pub id: String,
    /// Target column (todo, in-progress, complete)
    pub column: ColumnId,
}

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Append a subtask
    Add(SubAddArgs),
    /// Check or uncheck a subtask
    Toggle(SubIndexArgs),
    /// Remove a subtask
    Rm(SubIndexArgs),
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Parent task id
    pub id: String,
    /// Subtask text
    pub text: String,
}

#[derive(Args)]
pub struct SubIndexArgs {
    /// Parent task id
    pub id: String,
    /// Subtask number as shown by `vb show` (1-based)
    pub number: usize,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SelectArgs {
    /// Task ids to toggle in the selection
    pub ids: Vec<String>,
    /// Empty the selection first
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct BulkCmd {
    #[command(subcommand)]
    pub action: BulkAction,
}

#[derive(Subcommand)]
pub enum BulkAction {
    /// Move every selected task
    Mv(BulkMvArgs),
    /// Archive every selected task (see `config bulk-archive`)
    Archive,
    /// Delete every selected task
    Rm,
}

#[derive(Args)]
pub struct BulkMvArgs {
    /// Target column (todo, in-progress, complete)
    pub column: ColumnId,
}

// ---------------------------------------------------------------------------
// Labels, todos, note
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LabelCmd {
    #[command(subcommand)]
    pub action: Option<LabelAction>,
}

#[derive(Subcommand)]
pub enum LabelAction {
    /// Create a label
    Add(LabelAddArgs),
    /// Delete a label (tasks keep the reference)
    Rm(LabelRmArgs),
}

#[derive(Args)]
pub struct LabelAddArgs {
    /// Label name
    pub name: String,
    /// Color (red, orange, yellow, green, blue, purple, pink)
    #[arg(long, short, default_value = "blue")]
    pub color: LabelColor,
}

#[derive(Args)]
pub struct LabelRmArgs {
    /// Label id or name
    pub label: String,
}

#[derive(Args)]
pub struct TodoCmd {
    #[command(subcommand)]
    pub action: Option<TodoAction>,
}

#[derive(Subcommand)]
pub enum TodoAction {
    /// Add a todo
    Add(TodoTextArgs),
    /// Toggle a todo's completed flag
    Done(TodoIdArgs),
    /// Change a todo's text
    Edit(TodoEditArgs),
    /// Delete a todo
    Rm(TodoIdArgs),
}

#[derive(Args)]
pub struct TodoTextArgs {
    /// Todo text
    pub text: String,
}

#[derive(Args)]
pub struct TodoIdArgs {
    /// Todo id (full, or a unique prefix or suffix)
    pub id: String,
}

#[derive(Args)]
pub struct TodoEditArgs {
    /// Todo id
    pub id: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct NoteCmd {
    #[command(subcommand)]
    pub action: Option<NoteAction>,
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// Replace the notes pad content
    Set(NoteSetArgs),
}

#[derive(Args)]
pub struct NoteSetArgs {
    /// New content (empty clears the pad)
    pub content: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set which columns `bulk archive` may archive from (any, complete)
    BulkArchive(BulkArchiveArgs),
}

#[derive(Args)]
pub struct BulkArchiveArgs {
    pub policy: ArchivePolicy,
}
