//! Trajectory Planner Common Library
//!
//! Shared value types, constants, error types and configuration loading for
//! the trajectory planner workspace.
//!
//! # Module Structure
//!
//! - [`pose`] - Cartesian vectors and six-DOF poses
//! - [`motion`] - Segment and planner state enums
//! - [`consts`] - Numeric limits, epsilons and defaults
//! - [`error`] - Planner error type
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use traj_common::prelude::*;
//!
//! let end = Pose::new(Cartesian::new(10.0, 0.0, 0.0), 0.0, 0.0, 0.0);
//! assert_eq!(end.tran.x, 10.0);
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod motion;
pub mod pose;
pub mod prelude;
