//! Run lifecycle state machine.
//!
//! ```text
//! Created --start--> InProgress
//! InProgress --poll, unchanged--> InProgress
//! InProgress --poll, requires_action--> RequiresAction
//! RequiresAction --outputs submitted--> InProgress
//! InProgress --poll, completed--> Completed
//! any non-terminal --poll, failed/cancelled/expired--> Failed
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Local view of a remote run's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
}

impl RunState {
    /// Maps a verbatim remote status onto the local state it implies.
    ///
    /// Returns `None` for statuses this crate does not know about.
    pub fn from_remote_status(status: &str) -> Option<RunState> {
        match status {
            "queued" | "in_progress" | "cancelling" => Some(RunState::InProgress),
            "requires_action" => Some(RunState::RequiresAction),
            "completed" => Some(RunState::Completed),
            "failed" | "cancelled" | "expired" | "incomplete" => Some(RunState::Failed),
            _ => None,
        }
    }
}

impl StateMachine for RunState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RunState::*;
        matches!(
            (self, target),
            (Created, InProgress)
                | (Created, Failed)
                | (InProgress, InProgress)
                | (InProgress, RequiresAction)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (RequiresAction, InProgress)
                | (RequiresAction, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RunState::*;
        match self {
            Created => vec![InProgress, Failed],
            InProgress => vec![InProgress, RequiresAction, Completed, Failed],
            RequiresAction => vec![InProgress, Failed],
            Completed | Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RunState; 5] = [
        RunState::Created,
        RunState::InProgress,
        RunState::RequiresAction,
        RunState::Completed,
        RunState::Failed,
    ];

    #[test]
    fn remote_statuses_are_recognised_verbatim() {
        assert_eq!(RunState::from_remote_status("requires_action"), Some(RunState::RequiresAction));
        assert_eq!(RunState::from_remote_status("completed"), Some(RunState::Completed));
        assert_eq!(RunState::from_remote_status("failed"), Some(RunState::Failed));
        assert_eq!(RunState::from_remote_status("cancelled"), Some(RunState::Failed));
        assert_eq!(RunState::from_remote_status("queued"), Some(RunState::InProgress));
        assert_eq!(RunState::from_remote_status("Completed"), None);
        assert_eq!(RunState::from_remote_status("paused"), None);
    }

    #[test]
    fn completed_and_failed_are_terminal() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::RequiresAction.is_terminal());
    }

    #[test]
    fn requires_action_cannot_complete_without_submission() {
        assert!(RunState::RequiresAction
            .transition_to(RunState::Completed)
            .is_err());
    }

    #[test]
    fn created_cannot_jump_to_requires_action() {
        assert!(!RunState::Created.can_transition_to(&RunState::RequiresAction));
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }
}
