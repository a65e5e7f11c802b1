//! Cycle-domain trapezoidal velocity profile.
//!
//! One call advances a segment by exactly one tick. The step never plans
//! further ahead than "can I still stop in the remaining distance", so
//! feed-scale changes and blend credits take effect on the very next tick.

use traj_common::consts::{ACCEL_EPSILON, POS_EPSILON};
use traj_common::motion::SegmentStatus;

/// Per-tick limits after feed scale and blend credits are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileLimits {
    /// Target speed for this tick (already scaled, credited and capped).
    pub req_vel: f64,
    /// Full deceleration capability of the segment.
    pub max_accel: f64,
    /// Acceleration still available for speeding up.
    pub accel_budget: f64,
    /// Tick length [s].
    pub cycle_time: f64,
}

/// Result of one profile step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileStep {
    pub progress: f64,
    pub vel: f64,
    pub accel: f64,
    pub status: SegmentStatus,
}

/// Advance `progress` toward `target` by one tick.
pub fn step(progress: f64, target: f64, current_vel: f64, limits: &ProfileLimits) -> ProfileStep {
    let remaining = target - progress;
    if remaining <= POS_EPSILON {
        return ProfileStep {
            progress: target,
            vel: 0.0,
            accel: 0.0,
            status: SegmentStatus::Done,
        };
    }

    let dt = limits.cycle_time;
    let a = limits.max_accel;
    if dt <= 0.0 || a <= 0.0 {
        // Unconfigured segment: hold position.
        return ProfileStep {
            progress,
            vel: 0.0,
            accel: 0.0,
            status: SegmentStatus::Const,
        };
    }

    // Highest speed from which the remaining distance, less what the
    // current speed covers this tick, can still be covered with a
    // full-deceleration ramp.
    let discr = (0.25 * dt * dt + (2.0 * remaining - current_vel * dt) / a).max(0.0);
    let max_new_vel = a * (discr.sqrt() - 0.5 * dt);

    let mut new_vel = max_new_vel.min(limits.req_vel.max(0.0));
    let mut new_accel = (new_vel - current_vel) / dt;
    let budget = limits.accel_budget.clamp(0.0, a);
    if new_accel > budget {
        new_accel = budget;
        new_vel = current_vel + new_accel * dt;
    } else if new_accel < -a {
        new_accel = -a;
        new_vel = current_vel + new_accel * dt;
    }
    if new_vel < 0.0 {
        new_vel = 0.0;
        new_accel = -current_vel / dt;
    }

    let new_progress = progress + 0.5 * (new_vel + current_vel) * dt;
    if new_progress >= target - POS_EPSILON {
        return ProfileStep {
            progress: target,
            vel: 0.0,
            accel: new_accel,
            status: SegmentStatus::Done,
        };
    }

    let status = if new_accel > ACCEL_EPSILON {
        SegmentStatus::Accel
    } else if new_accel < -ACCEL_EPSILON {
        SegmentStatus::Decel
    } else {
        SegmentStatus::Const
    };

    ProfileStep {
        progress: new_progress,
        vel: new_vel,
        accel: new_accel,
        status,
    }
}
