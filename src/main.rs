use clap::Parser;
use vibe::cli::commands::Cli;
use vibe::cli::{handlers, logging};

fn main() {
    let cli = Cli::parse();

    match handlers::resolve_start(cli.board_dir.as_deref()) {
        Ok(start) => logging::init_logging(&start),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
