//! Timer lifecycle states and the transition table
//!
//! Every precondition/postcondition pair lives in [`plan`] and [`require`].
//! The service resolves an operation here before it touches any field, so a
//! rejected operation is a complete no-op.

use std::fmt;

use crate::error::TimerError;

/// Lifecycle state of a timer. Subtimers only use `Reset`, `Running` and `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerState {
    Reset,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Reset => "reset",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Public operations that are guarded by the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerOp {
    Reset,
    Start,
    Pause,
    Resume,
    Stop,
    SetUpdateInterval,
    AddSubTimer,
}

impl fmt::Display for TimerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerOp::Reset => "reset",
            TimerOp::Start => "start",
            TimerOp::Pause => "pause",
            TimerOp::Resume => "resume",
            TimerOp::Stop => "stop",
            TimerOp::SetUpdateInterval => "set update interval",
            TimerOp::AddSubTimer => "add subtimer",
        };
        f.write_str(name)
    }
}

/// A legal lifecycle transition, carrying enough context to apply its side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stopped → Reset
    Reset,
    /// Reset → Running
    Start,
    /// Running → Paused
    Pause,
    /// Paused → Running
    ResumeFromPause,
    /// Stopped → Running (policy-gated)
    ResumeFromStop,
    /// Running | Paused → Stopped
    Stop { from: TimerState },
}

impl Transition {
    pub fn target(&self) -> TimerState {
        match self {
            Transition::Reset => TimerState::Reset,
            Transition::Start | Transition::ResumeFromPause | Transition::ResumeFromStop => {
                TimerState::Running
            }
            Transition::Pause => TimerState::Paused,
            Transition::Stop { .. } => TimerState::Stopped,
        }
    }
}

/// Resolve a lifecycle operation against the transition table.
///
/// `resume_after_stop` is true only when the policy allows it and the timer
/// has a run to resume; a timer that was never started cannot resume.
pub fn plan(
    state: TimerState,
    op: TimerOp,
    resume_after_stop: bool,
) -> Result<Transition, TimerError> {
    use TimerState::*;

    let transition = match (op, state) {
        (TimerOp::Reset, Stopped) => Transition::Reset,
        (TimerOp::Start, Reset) => Transition::Start,
        (TimerOp::Pause, Running) => Transition::Pause,
        (TimerOp::Resume, Paused) => Transition::ResumeFromPause,
        (TimerOp::Resume, Stopped) if resume_after_stop => Transition::ResumeFromStop,
        (TimerOp::Stop, Running | Paused) => Transition::Stop { from: state },
        _ => return Err(TimerError::InvalidStateTransition { operation: op, state }),
    };

    Ok(transition)
}

/// Check the state guard of an operation that does not change the lifecycle state.
pub fn require(state: TimerState, op: TimerOp) -> Result<(), TimerError> {
    match (op, state) {
        (TimerOp::SetUpdateInterval, TimerState::Stopped) => Ok(()),
        (TimerOp::AddSubTimer, TimerState::Reset) => Ok(()),
        _ => Err(TimerError::InvalidStateTransition { operation: op, state }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [TimerState; 4] = [
        TimerState::Reset,
        TimerState::Running,
        TimerState::Paused,
        TimerState::Stopped,
    ];

    fn legal_states(op: TimerOp, allow_resume_after_stop: bool) -> Vec<TimerState> {
        STATES
            .into_iter()
            .filter(|state| plan(*state, op, allow_resume_after_stop).is_ok())
            .collect()
    }

    #[test]
    fn lifecycle_preconditions() {
        assert_eq!(legal_states(TimerOp::Reset, false), vec![TimerState::Stopped]);
        assert_eq!(legal_states(TimerOp::Start, false), vec![TimerState::Reset]);
        assert_eq!(legal_states(TimerOp::Pause, false), vec![TimerState::Running]);
        assert_eq!(legal_states(TimerOp::Resume, false), vec![TimerState::Paused]);
        assert_eq!(
            legal_states(TimerOp::Stop, false),
            vec![TimerState::Running, TimerState::Paused]
        );
    }

    #[test]
    fn resume_after_stop_is_policy_gated() {
        assert_eq!(
            plan(TimerState::Stopped, TimerOp::Resume, true),
            Ok(Transition::ResumeFromStop)
        );
        assert_eq!(
            plan(TimerState::Stopped, TimerOp::Resume, false),
            Err(TimerError::InvalidStateTransition {
                operation: TimerOp::Resume,
                state: TimerState::Stopped,
            })
        );
    }

    #[test]
    fn transitions_land_in_documented_state() {
        let cases = [
            (TimerState::Stopped, TimerOp::Reset, TimerState::Reset),
            (TimerState::Reset, TimerOp::Start, TimerState::Running),
            (TimerState::Running, TimerOp::Pause, TimerState::Paused),
            (TimerState::Paused, TimerOp::Resume, TimerState::Running),
            (TimerState::Stopped, TimerOp::Resume, TimerState::Running),
            (TimerState::Running, TimerOp::Stop, TimerState::Stopped),
            (TimerState::Paused, TimerOp::Stop, TimerState::Stopped),
        ];
        for (from, op, to) in cases {
            let transition = plan(from, op, true).unwrap();
            assert_eq!(transition.target(), to, "{op} from {from}");
        }
    }

    #[test]
    fn non_lifecycle_ops_never_plan() {
        for state in STATES {
            assert!(plan(state, TimerOp::SetUpdateInterval, true).is_err());
            assert!(plan(state, TimerOp::AddSubTimer, true).is_err());
        }
    }

    #[test]
    fn guards_for_configuration_and_registry() {
        for state in STATES {
            assert_eq!(
                require(state, TimerOp::SetUpdateInterval).is_ok(),
                state == TimerState::Stopped
            );
            assert_eq!(
                require(state, TimerOp::AddSubTimer).is_ok(),
                state == TimerState::Reset
            );
        }
    }

    #[test]
    fn error_message_names_operation_and_state() {
        let err = plan(TimerState::Reset, TimerOp::Pause, false).unwrap_err();
        assert_eq!(err.to_string(), "cannot pause while timer is reset");
    }
}
