//! Planner error type.
//!
//! Every variant is a synchronous precondition failure: the operation that
//! returned it has left the planner untouched. None of them is fatal, the
//! caller decides whether to retry or drop the request.

use thiserror::Error;

/// Errors reported by planner configuration, submission and queue operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    /// No backing storage was supplied for the segment queue.
    #[error("segment queue storage is missing")]
    NoStorage,

    /// Cycle time must be strictly positive.
    #[error("invalid cycle time {0} s (must be > 0)")]
    InvalidCycleTime(f64),

    /// Requested and machine velocity must both be strictly positive.
    #[error("invalid velocity: v_max={v_max}, ini_max_vel={ini_max_vel} (both must be > 0)")]
    InvalidVelocity { v_max: f64, ini_max_vel: f64 },

    /// Absolute velocity ceiling must be strictly positive.
    #[error("invalid velocity limit {0} (must be > 0)")]
    InvalidVelocityLimit(f64),

    /// Acceleration ceiling must be strictly positive.
    #[error("invalid acceleration {0} (must be > 0)")]
    InvalidAcceleration(f64),

    /// Angular velocity/acceleration ceilings must be strictly positive.
    #[error("invalid angular limit {0} (must be > 0)")]
    InvalidAngularLimit(f64),

    /// Raw termination condition outside {STOP, BLEND}.
    #[error("invalid termination condition {0}")]
    InvalidTermCond(i32),

    /// Queue is at capacity; flow control belongs to the caller.
    #[error("segment queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// Appends are refused until a pending abort has completed.
    #[error("planner is aborting")]
    Aborting,

    /// Arc parameters do not describe a circle (zero normal or radius).
    #[error("invalid arc geometry: {0}")]
    InvalidGeometry(&'static str),
}
