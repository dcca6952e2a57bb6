use serde::{Deserialize, Serialize};

/// Configuration from board.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardInfo,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    #[serde(default = "default_board_name")]
    pub name: String,
}

impl Default for BoardInfo {
    fn default() -> Self {
        BoardInfo {
            name: default_board_name(),
        }
    }
}

/// Which columns an archive may start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArchivePolicy {
    /// Only tasks in `complete`
    #[serde(rename = "complete")]
    CompleteOnly,
    /// Any column except `archive` itself
    #[default]
    #[serde(rename = "any")]
    AnyColumn,
}

impl ArchivePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchivePolicy::CompleteOnly => "complete",
            ArchivePolicy::AnyColumn => "any",
        }
    }
}

impl std::str::FromStr for ArchivePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "complete" => Ok(ArchivePolicy::CompleteOnly),
            "any" => Ok(ArchivePolicy::AnyColumn),
            other => Err(format!(
                "unknown archive policy '{}' (expected: any, complete)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LifecycleConfig {
    /// Policy for `bulk archive`. Single-card archive always requires `complete`.
    #[serde(default)]
    pub bulk_archive: ArchivePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Create the default labels when the board has none
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            seed_defaults: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing filter directive, overridden by VIBE_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_board_name() -> String {
    "My Board".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: BoardConfig = toml::from_str("").unwrap();
        assert_eq!(config.board.name, "My Board");
        assert_eq!(config.lifecycle.bulk_archive, ArchivePolicy::AnyColumn);
        assert!(config.labels.seed_defaults);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn bulk_archive_parses_complete() {
        let config: BoardConfig =
            toml::from_str("[lifecycle]\nbulk_archive = \"complete\"\n").unwrap();
        assert_eq!(config.lifecycle.bulk_archive, ArchivePolicy::CompleteOnly);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result: Result<BoardConfig, _> =
            toml::from_str("[lifecycle]\nbulk_archive = \"sometimes\"\n");
        assert!(result.is_err());
    }
}
