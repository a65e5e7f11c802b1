//! Prelude module for common re-exports.
//!
//! ```rust
//! use traj_common::prelude::*;
//! ```

// ─── Geometry ───────────────────────────────────────────────────────
pub use crate::pose::{Cartesian, Pose};

// ─── Motion State ───────────────────────────────────────────────────
pub use crate::motion::{PlannerState, SegmentId, SegmentStatus, TermCond};

// ─── Errors & Configuration ─────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, PlannerConfig, SharedConfig};
pub use crate::error::PlannerError;

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, DEFAULT_QUEUE_SIZE, TELEMETRY_CHANNELS};
