use serde::{Deserialize, Serialize};

/// Lifecycle of every periodic component (render scheduler, monitor,
/// generation task, dashboard)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
}

impl SchedulerState {
    /// Only real changes count as transitions; start-while-running and
    /// stop-while-stopped are no-ops for the caller to skip
    pub fn can_transition_to(&self, target: SchedulerState) -> bool {
        use SchedulerState::*;

        matches!((self, target), (Stopped, Running) | (Running, Stopped))
    }

    pub fn is_running(&self) -> bool {
        *self == SchedulerState::Running
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Stopped => "Stopped",
            Self::Running => "Running",
        }
    }
}
