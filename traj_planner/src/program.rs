//! Move programs: a start pose followed by a list of planner commands.
//!
//! ```toml
//! [start]
//! tran = { x = 0.0, y = 0.0, z = 0.0 }
//!
//! [[moves]]
//! kind = "term_cond"
//! cond = "blend"
//!
//! [[moves]]
//! kind = "line"
//! end = { tran = { x = 10.0 } }
//!
//! [[moves]]
//! kind = "circle"
//! end = { tran = { x = 10.0, y = 10.0 } }
//! center = { x = 10.0, y = 5.0 }
//! normal = { z = 1.0 }
//! ```

use std::path::Path;

use serde::Deserialize;

use traj_common::config::{ConfigError, ConfigLoader};
use traj_common::error::PlannerError;
use traj_common::motion::{SegmentId, TermCond};
use traj_common::pose::{Cartesian, Pose};

use crate::planner::TrajectoryPlanner;

/// One program step, applied to the planner in order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveCommand {
    /// Straight move to `end`.
    Line { end: Pose },
    /// Arc to `end` about `center`; negative `turn` reverses direction.
    Circle {
        end: Pose,
        center: Cartesian,
        normal: Cartesian,
        #[serde(default)]
        turn: i32,
    },
    /// Feed override.
    Feed { scale: f64 },
    /// Termination policy for subsequent moves.
    TermCond { cond: TermCond },
    /// Requested and machine velocity (`ini_max_vel` defaults to `v_max`).
    Velocity {
        v_max: f64,
        #[serde(default)]
        ini_max_vel: Option<f64>,
    },
    Acceleration { a_max: f64 },
    /// Seed the id of the next segment.
    Id { id: SegmentId },
}

impl MoveCommand {
    /// Whether this command appends a segment (and can hit a full queue).
    #[inline]
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::Line { .. } | Self::Circle { .. })
    }

    pub fn apply(&self, planner: &mut TrajectoryPlanner) -> Result<(), PlannerError> {
        match *self {
            Self::Line { end } => planner.add_line(end),
            Self::Circle {
                end,
                center,
                normal,
                turn,
            } => planner.add_circle(end, center, normal, turn),
            Self::Feed { scale } => {
                planner.set_vscale(scale);
                Ok(())
            }
            Self::TermCond { cond } => {
                planner.set_term_cond(cond);
                Ok(())
            }
            Self::Velocity { v_max, ini_max_vel } => {
                planner.set_vmax(v_max, ini_max_vel.unwrap_or(v_max))
            }
            Self::Acceleration { a_max } => planner.set_amax(a_max),
            Self::Id { id } => {
                planner.set_id(id);
                Ok(())
            }
        }
    }
}

/// Start pose plus ordered commands.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub start: Pose,
    #[serde(default)]
    pub moves: Vec<MoveCommand>,
}

impl Program {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        <Self as ConfigLoader>::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        <Self as ConfigLoader>::from_toml(content)
    }

    /// Number of segment-producing commands.
    pub fn motion_count(&self) -> usize {
        self.moves.iter().filter(|m| m.is_motion()).count()
    }
}
