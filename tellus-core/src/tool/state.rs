//! Run lifecycle states

use serde::{Deserialize, Serialize};

/// State machine of one tool run
///
/// `Created → Configuring → Validating → Running → {Succeeded | Failed |
/// Cancelled}`. Terminal states are final: a finished run handle cannot be
/// reused, the engine creates a fresh run per execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    Configuring,
    Validating,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunState {
    /// Whether the run has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::Failed | RunState::Cancelled
        )
    }

    /// Legal forward transitions only; terminal states accept nothing
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Created, Configuring) => true,
            (Configuring, Validating) => true,
            (Validating, Running) | (Validating, Failed) => true,
            (Running, Succeeded) | (Running, Failed) | (Running, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Created => "created",
            RunState::Configuring => "configuring",
            RunState::Validating => "validating",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_accept_no_transitions() {
        for terminal in [RunState::Succeeded, RunState::Failed, RunState::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(RunState::Running));
            assert!(!terminal.can_transition_to(RunState::Created));
        }
    }

    #[test]
    fn happy_path_is_legal() {
        assert!(RunState::Created.can_transition_to(RunState::Configuring));
        assert!(RunState::Configuring.can_transition_to(RunState::Validating));
        assert!(RunState::Validating.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::Succeeded));
    }

    #[test]
    fn validation_failure_short_circuits() {
        assert!(RunState::Validating.can_transition_to(RunState::Failed));
        assert!(!RunState::Validating.can_transition_to(RunState::Succeeded));
    }
}
