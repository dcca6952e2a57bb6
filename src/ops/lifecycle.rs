use std::fmt;

use crate::model::config::ArchivePolicy;
use crate::model::task::ColumnId;

/// A requested change to a task's place in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to one of the three board columns
    Move(ColumnId),
    Archive,
    /// Archive → complete
    Restore,
    Delete,
}

/// Error type for lifecycle checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {transition} a task in {from}")]
    IllegalTransition { from: ColumnId, transition: Transition },
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Move(to) => write!(f, "move to {}", to),
            Transition::Archive => f.write_str("archive"),
            Transition::Restore => f.write_str("restore"),
            Transition::Delete => f.write_str("delete"),
        }
    }
}

impl Transition {
    /// Column the task ends up in; `None` for delete
    pub fn target(self) -> Option<ColumnId> {
        match self {
            Transition::Move(to) => Some(to),
            Transition::Archive => Some(ColumnId::Archive),
            Transition::Restore => Some(ColumnId::Complete),
            Transition::Delete => None,
        }
    }

    /// Whether a task currently in `from` may take this transition.
    /// `policy` only affects `Archive`.
    pub fn check(self, from: ColumnId, policy: ArchivePolicy) -> Result<(), LifecycleError> {
        let allowed = match self {
            Transition::Move(to) => to.is_move_target() && from != ColumnId::Archive,
            Transition::Archive => match policy {
                ArchivePolicy::CompleteOnly => from == ColumnId::Complete,
                ArchivePolicy::AnyColumn => from != ColumnId::Archive,
            },
            Transition::Restore => from == ColumnId::Archive,
            Transition::Delete => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(LifecycleError::IllegalTransition {
                from,
                transition: self,
            })
        }
    }
}
