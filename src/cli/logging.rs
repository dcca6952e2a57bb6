use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::io::board_io;

/// Environment variable holding a tracing filter, e.g. `VIBE_LOG=debug`
pub const LOG_ENV: &str = "VIBE_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Install the stderr subscriber. The filter comes from `VIBE_LOG`, then the
/// board's `[log] level`, then `warn`.
pub fn init_logging(start: &Path) {
    let level = board_io::discover_board(start)
        .ok()
        .and_then(|dir| board_io::load_config(&dir).ok())
        .map(|config| config.log.level)
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    // No-op if a subscriber is already installed
    let _ = subscriber.try_init();
}
