use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{self, BOARD_DIR};
use crate::io::json_store::JsonStore;
use crate::ops::seed;

pub fn cmd_init(args: InitArgs, start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Note a board further up; the new one will shadow it from here down
    if let Some(parent) = start.parent()
        && let Ok(parent_board) = board_io::discover_board(parent)
    {
        eprintln!("Note: parent board found at {}", parent_board.display());
        eprintln!("Creating new board in ./{}/", BOARD_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        start
            .file_name()
            .and_then(|n| n.to_str())
            .map(board_io::infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "My Board".to_string())
    });

    let board_dir = board_io::init_board(start, &name)?;
    let mut store = JsonStore::open(&board_dir)?;
    let report = seed::bootstrap(&mut store, !args.no_seed)?;
    store.flush()?;

    println!("Initialized board: {}", name);
    if !report.labels_created.is_empty() {
        println!("  labels: {}", report.labels_created.join(", "));
    }
    Ok(())
}

pub fn cmd_seed(board_dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = board_io::load_config(board_dir)?;
    let mut store = JsonStore::open(board_dir)?;
    let report = seed::bootstrap(&mut store, config.labels.seed_defaults)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.labels_created)?);
    } else if report.labels_created.is_empty() {
        println!("nothing to seed");
    } else {
        println!("created labels: {}", report.labels_created.join(", "));
    }
    Ok(())
}
