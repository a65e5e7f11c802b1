//! # Trajectory Planner
//!
//! Real-time trajectory planner for motor-controlled machines. Converts a
//! stream of line and circular-arc segments into incremental position
//! updates, one per fixed control cycle, while enforcing velocity and
//! acceleration ceilings and blending consecutive segments.
//!
//! ## Layers
//!
//! 1. **SegmentQueue**: fixed-capacity arena, FIFO execution order
//! 2. **Segment**: one line/arc move with its own per-tick velocity profile
//! 3. **TrajectoryPlanner**: configuration, pose state, explicit
//!    pause/abort state machine and the per-tick blending scan
//! 4. **CycleRunner**: paced loop that feeds a move program and publishes
//!    [`telemetry::CycleOutput`]
//!
//! ## Zero-Allocation RT Loop
//!
//! The queue arena and the telemetry output are allocated once when the
//! planner is created. `run_cycle` performs no heap allocation, no I/O and
//! no logging; its cost is bounded by the queue depth.

pub mod config;
pub mod planner;
pub mod program;
pub mod queue;
pub mod runner;
pub mod segment;
pub mod telemetry;

pub use planner::TrajectoryPlanner;
pub use queue::SegmentQueue;
pub use segment::Segment;
