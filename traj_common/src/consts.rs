//! System-wide constants for the trajectory planner workspace.
//!
//! Single source of truth for numeric limits, tolerances and defaults.

use static_assertions::const_assert;

/// Queue capacity used when a planner is created with capacity 0.
pub const DEFAULT_QUEUE_SIZE: usize = 32;

/// Number of diagnostic output channels segments rotate through.
pub const TELEMETRY_CHANNELS: usize = 4;

/// Maximum number of segment ids reported per cycle in the telemetry output.
pub const MAX_REPORTED_SEGMENTS: usize = 8;

/// Translational magnitude below which a segment is a pure rotation.
pub const PURE_ROTATION_EPSILON: f64 = 1e-6;

/// Velocity magnitude treated as "at rest" by the blend credit logic.
pub const VEL_EPSILON: f64 = 1e-6;

/// Acceleration magnitude treated as zero by the blend credit logic.
pub const ACCEL_EPSILON: f64 = 1e-6;

/// Remaining path length at which a segment counts as finished.
pub const POS_EPSILON: f64 = 1e-9;

/// Angular tolerance below which start and end radii coincide (full circle).
pub const CIRCLE_FUZZ: f64 = 1e-6;

/// Default cycle time in microseconds (1 kHz).
pub const CYCLE_TIME_US: u32 = 1000;

/// Lower bound for a configured cycle time [µs].
pub const CYCLE_TIME_US_MIN: u32 = 50;

/// Upper bound for a configured cycle time [µs].
pub const CYCLE_TIME_US_MAX: u32 = 100_000;

/// Upper bound for a configured queue capacity.
pub const QUEUE_SIZE_MAX: usize = 4096;

const_assert!(DEFAULT_QUEUE_SIZE > 0);
const_assert!(DEFAULT_QUEUE_SIZE <= QUEUE_SIZE_MAX);
const_assert!(TELEMETRY_CHANNELS > 0 && TELEMETRY_CHANNELS <= u8::MAX as usize);
const_assert!(CYCLE_TIME_US_MIN <= CYCLE_TIME_US && CYCLE_TIME_US <= CYCLE_TIME_US_MAX);
