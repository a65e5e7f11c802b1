//! Motion state enums shared by the planner and its consumers.
//!
//! All enums use `#[repr(u8)]` so they can be published in compact
//! telemetry records, and provide `from_u8` for raw conversion.

use serde::{Deserialize, Serialize};

/// Segment identifier. Wraps as a signed integer.
pub type SegmentId = i32;

/// Termination policy of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TermCond {
    /// Come to a full stop before the next segment starts.
    Stop = 0,
    /// Start the next segment while this one decelerates.
    #[default]
    Blend = 1,
}

impl TermCond {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stop),
            1 => Some(Self::Blend),
            _ => None,
        }
    }
}

/// Progress status of a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SegmentStatus {
    /// Velocity increasing.
    Accel = 0,
    /// Velocity holding (including holding at rest while paused).
    Const = 1,
    /// Velocity decreasing.
    Decel = 2,
    /// Reached its end; awaiting removal.
    #[default]
    Done = 3,
}

impl SegmentStatus {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Accel),
            1 => Some(Self::Const),
            2 => Some(Self::Decel),
            3 => Some(Self::Done),
            _ => None,
        }
    }
}

/// Lifecycle state of the trajectory planner.
///
/// `PausePending` and `AbortPending` are the cooperative states: the request
/// has been made but segments are still decelerating under their own profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PlannerState {
    /// Queue empty, nothing in motion.
    #[default]
    Idle = 0,
    /// Segments queued and executing.
    Running = 1,
    /// Pause requested, active segments still decelerating.
    PausePending = 2,
    /// Every active segment at rest with scale held at zero.
    Paused = 3,
    /// Abort requested; the queue is discarded once motion has ceased.
    AbortPending = 4,
}

impl PlannerState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Running),
            2 => Some(Self::PausePending),
            3 => Some(Self::Paused),
            4 => Some(Self::AbortPending),
            _ => None,
        }
    }

    /// Whether the feed scale is being held at zero.
    #[inline]
    pub const fn is_pausing(self) -> bool {
        matches!(self, Self::PausePending | Self::Paused | Self::AbortPending)
    }

    #[inline]
    pub const fn is_aborting(self) -> bool {
        matches!(self, Self::AbortPending)
    }
}
