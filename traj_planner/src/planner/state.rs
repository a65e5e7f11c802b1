//! Planner lifecycle transitions.
//!
//! Idle → Running on append, Running → PausePending → Paused for a
//! cooperative pause, and AbortPending until every active segment is at
//! rest. The scan reports what it observed (`SettledAtRest`, `Drained`,
//! `AbortComplete`); user requests arrive as `Pause`, `Resume`, `Abort`.

use traj_common::motion::PlannerState;

/// Events that drive the planner state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerEvent {
    /// A segment was accepted into the queue.
    Append,
    /// Pause requested.
    Pause,
    /// Resume requested.
    Resume,
    /// Abort requested.
    Abort,
    /// Every active segment observed at rest.
    SettledAtRest,
    /// The queue ran empty.
    Drained,
    /// Aborted queue discarded after motion ceased.
    AbortComplete,
    /// Queue cleared by the caller.
    Clear,
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerTransition {
    /// State changed (or was confirmed).
    Ok(PlannerState),
    /// Transition rejected; state unchanged.
    Rejected(&'static str),
}

/// Explicit planner lifecycle.
#[derive(Debug, Clone)]
pub struct PlannerStateMachine {
    state: PlannerState,
}

impl Default for PlannerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerStateMachine {
    pub const fn new() -> Self {
        Self {
            state: PlannerState::Idle,
        }
    }

    #[inline]
    pub const fn state(&self) -> PlannerState {
        self.state
    }

    #[inline]
    pub const fn is_pausing(&self) -> bool {
        self.state.is_pausing()
    }

    #[inline]
    pub const fn is_aborting(&self) -> bool {
        self.state.is_aborting()
    }

    /// Handle a planner event.
    pub fn handle_event(&mut self, event: PlannerEvent) -> PlannerTransition {
        use PlannerEvent as E;
        use PlannerState as S;

        let next = match (self.state, event) {
            // Clear → Idle from anywhere
            (_, E::Clear) => S::Idle,

            // Appends
            (S::Idle, E::Append) => S::Running,
            (S::Running | S::PausePending | S::Paused, E::Append) => self.state,
            (S::AbortPending, E::Append) => {
                return PlannerTransition::Rejected("append while aborting");
            }

            // Pause; nothing in motion when idle
            (S::Idle, E::Pause) => S::Paused,
            (S::Running, E::Pause) => S::PausePending,
            (S::PausePending | S::Paused | S::AbortPending, E::Pause) => {
                return PlannerTransition::Rejected("already pausing");
            }

            // PausePending → Paused once observed at rest
            (S::PausePending, E::SettledAtRest) => S::Paused,

            // Resume
            (S::PausePending | S::Paused, E::Resume) => S::Running,

            // Abort from any non-aborting state
            (S::Idle | S::Running | S::PausePending | S::Paused, E::Abort) => S::AbortPending,

            // Drain
            (S::Running, E::Drained) => S::Idle,
            (S::PausePending, E::Drained) => S::Paused,

            // AbortPending → Idle
            (S::AbortPending, E::AbortComplete) => S::Idle,

            _ => return PlannerTransition::Rejected("invalid planner transition"),
        };

        self.state = next;
        PlannerTransition::Ok(next)
    }
}
