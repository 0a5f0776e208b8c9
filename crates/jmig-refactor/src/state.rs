//! Migration run state machine
//!
//! Linear chain `NOT_STARTED → IN_PROGRESS → PHASE_1..4_COMPLETE → VERIFIED →
//! COMPLETE`; `FAILED` and `ROLLED_BACK` branch off `IN_PROGRESS` and every
//! phase state.

use crate::error::StateError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// State of one migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationState {
    #[default]
    NotStarted,
    InProgress,
    #[serde(rename = "PHASE_1_COMPLETE")]
    Phase1Complete,
    #[serde(rename = "PHASE_2_COMPLETE")]
    Phase2Complete,
    #[serde(rename = "PHASE_3_COMPLETE")]
    Phase3Complete,
    #[serde(rename = "PHASE_4_COMPLETE")]
    Phase4Complete,
    Verified,
    Complete,
    Failed,
    RolledBack,
}

impl MigrationState {
    /// Every state, in chain order
    pub const ALL: [Self; 10] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Phase1Complete,
        Self::Phase2Complete,
        Self::Phase3Complete,
        Self::Phase4Complete,
        Self::Verified,
        Self::Complete,
        Self::Failed,
        Self::RolledBack,
    ];

    /// No further transitions possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::RolledBack)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Phase1Complete => "PHASE_1_COMPLETE",
            Self::Phase2Complete => "PHASE_2_COMPLETE",
            Self::Phase3Complete => "PHASE_3_COMPLETE",
            Self::Phase4Complete => "PHASE_4_COMPLETE",
            Self::Verified => "VERIFIED",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::RolledBack => "ROLLED_BACK",
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: MigrationState) -> Vec<MigrationState> {
    use MigrationState::*;
    match from {
        NotStarted => vec![InProgress],
        InProgress => vec![Phase1Complete, Failed, RolledBack],
        Phase1Complete => vec![Phase2Complete, Failed, RolledBack],
        Phase2Complete => vec![Phase3Complete, Failed, RolledBack],
        Phase3Complete => vec![Phase4Complete, Failed, RolledBack],
        Phase4Complete => vec![Verified, Failed, RolledBack],
        Verified => vec![Complete],
        Complete | Failed | RolledBack => vec![],
    }
}

/// Validates a state transition
///
/// # Errors
/// Returns `StateError::IllegalTransition` if `to` is not reachable from `from`.
pub fn validate_transition(from: MigrationState, to: MigrationState) -> Result<(), StateError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateError::IllegalTransition { from, to })
    }
}

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: MigrationState,
    pub to: MigrationState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RunInner {
    current: MigrationState,
    history: Vec<StateTransition>,
}

/// Guarded current state plus transition history of one run
#[derive(Debug, Default)]
pub struct RunState {
    inner: Mutex<RunInner>,
}

impl RunState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously recorded state and history
    #[must_use]
    pub fn resume(current: MigrationState, history: Vec<StateTransition>) -> Self {
        Self {
            inner: Mutex::new(RunInner { current, history }),
        }
    }

    #[must_use]
    pub fn current(&self) -> MigrationState {
        self.inner.lock().current
    }

    #[must_use]
    pub fn history(&self) -> Vec<StateTransition> {
        self.inner.lock().history.clone()
    }

    /// Move to `to` if the table allows it
    ///
    /// # Errors
    /// Returns `StateError::IllegalTransition` and leaves the state unchanged.
    pub fn transition(&self, to: MigrationState) -> Result<(), StateError> {
        let mut inner = self.inner.lock();
        let from = inner.current;
        validate_transition(from, to)?;
        inner.current = to;
        inner.history.push(StateTransition {
            from,
            to,
            at: Utc::now(),
        });
        debug!("Migration state {from} -> {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_chain() {
        let run = RunState::new();
        for to in [
            MigrationState::InProgress,
            MigrationState::Phase1Complete,
            MigrationState::Phase2Complete,
            MigrationState::Phase3Complete,
            MigrationState::Phase4Complete,
            MigrationState::Verified,
            MigrationState::Complete,
        ] {
            run.transition(to).unwrap();
        }
        assert_eq!(run.current(), MigrationState::Complete);
        assert_eq!(run.history().len(), 7);
    }

    #[test]
    fn illegal_transition_leaves_state() {
        let run = RunState::new();
        assert!(run.transition(MigrationState::Phase2Complete).is_err());
        assert_eq!(run.current(), MigrationState::NotStarted);
        assert!(run.history().is_empty());
    }

    #[test]
    fn not_started_cannot_fail_directly() {
        assert!(validate_transition(MigrationState::NotStarted, MigrationState::Failed).is_err());
        assert!(validate_transition(MigrationState::Verified, MigrationState::RolledBack).is_err());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&MigrationState::Phase3Complete).unwrap();
        assert_eq!(json, "\"PHASE_3_COMPLETE\"");
        let back: MigrationState = serde_json::from_str("\"ROLLED_BACK\"").unwrap();
        assert_eq!(back, MigrationState::RolledBack);
    }
}
