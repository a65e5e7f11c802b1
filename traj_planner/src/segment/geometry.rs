//! Line and arc paths, parametrized by path fraction in `[0, 1]`.
//!
//! Both paths are plain `Copy` data so a segment can be stored in the queue
//! arena by value. Evaluation never allocates.

use std::f64::consts::TAU;

use traj_common::consts::{CIRCLE_FUZZ, PURE_ROTATION_EPSILON};
use traj_common::error::PlannerError;
use traj_common::pose::Cartesian;

/// Smallest vector magnitude accepted as a direction or radius.
const GEOMETRY_EPSILON: f64 = 1e-12;

// ─── Line ───────────────────────────────────────────────────────────

/// Straight path from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinePath {
    pub start: Cartesian,
    pub end: Cartesian,
    /// Unit direction (zero for a degenerate line).
    pub uvec: Cartesian,
    /// Path length.
    pub tmag: f64,
}

impl LinePath {
    pub fn new(start: Cartesian, end: Cartesian) -> Self {
        let delta = end - start;
        let tmag = delta.mag();
        let uvec = delta.unit(GEOMETRY_EPSILON).unwrap_or(Cartesian::ZERO);
        Self {
            start,
            end,
            uvec,
            tmag,
        }
    }

    /// Point at `fraction` of the path. `fraction >= 1` yields `end` exactly.
    #[inline]
    pub fn point(&self, fraction: f64) -> Cartesian {
        if fraction >= 1.0 {
            self.end
        } else {
            self.start + (self.end - self.start) * fraction
        }
    }
}

// ─── Circle ─────────────────────────────────────────────────────────

/// Circular arc about `center` in the plane normal to `normal`.
///
/// Radius changes linearly from start to end (spiral) and the offset of the
/// end point along the normal is covered linearly (helix).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CirclePath {
    /// Center projected into the plane of the start point.
    pub center: Cartesian,
    /// Unit normal, already flipped for negative turn counts.
    pub normal: Cartesian,
    /// In-plane unit vector from center to start.
    pub u: Cartesian,
    /// In-plane unit vector 90° ahead of `u` about `normal`.
    pub v: Cartesian,
    /// Start radius.
    pub radius: f64,
    /// Total swept angle [rad], including extra full turns.
    pub angle: f64,
    /// End radius minus start radius.
    pub spiral: f64,
    /// End offset along the normal.
    pub helix: Cartesian,
    /// Approximate path length.
    pub tmag: f64,
}

impl CirclePath {
    /// Build an arc from `start` to `end`.
    ///
    /// A negative `turn` reverses the direction of travel (normal flipped)
    /// and adds `-1 - turn` extra revolutions; a positive `turn` adds `turn`
    /// revolutions.
    pub fn new(
        start: Cartesian,
        end: Cartesian,
        center: Cartesian,
        normal: Cartesian,
        turn: i32,
    ) -> Result<Self, PlannerError> {
        let mut normal = normal
            .unit(GEOMETRY_EPSILON)
            .ok_or(PlannerError::InvalidGeometry("zero-length normal"))?;
        let mut turns = turn;
        if turns < 0 {
            turns = -1 - turns;
            normal = -normal;
        }

        // Move the center into the plane that contains the start point.
        let center = center + normal * (start - center).dot(normal);
        let r_start = start - center;
        let r_end_full = end - center;
        let helix = normal * r_end_full.dot(normal);
        let r_end = r_end_full - helix;

        let radius = r_start.mag();
        let u = r_start
            .unit(PURE_ROTATION_EPSILON)
            .ok_or(PlannerError::InvalidGeometry("start point on the center"))?;
        let end_dir = r_end
            .unit(PURE_ROTATION_EPSILON)
            .ok_or(PlannerError::InvalidGeometry("end point on the center"))?;
        let v = normal.cross(u);

        let mut angle = u.dot(end_dir).clamp(-1.0, 1.0).acos();
        if u.cross(end_dir).dot(normal) < 0.0 {
            angle = TAU - angle;
        }
        if angle < CIRCLE_FUZZ || angle > TAU - CIRCLE_FUZZ {
            angle = TAU;
        }
        angle += turns as f64 * TAU;

        let spiral = r_end.mag() - radius;
        let planar = angle * (radius + 0.5 * spiral);
        let tmag = (planar * planar + helix.dot(helix)).sqrt();

        Ok(Self {
            center,
            normal,
            u,
            v,
            radius,
            angle,
            spiral,
            helix,
            tmag,
        })
    }

    /// Point at `fraction` of the arc.
    #[inline]
    pub fn point(&self, fraction: f64) -> Cartesian {
        let f = fraction.clamp(0.0, 1.0);
        let theta = f * self.angle;
        let r = self.radius + self.spiral * f;
        let (sin, cos) = theta.sin_cos();
        self.center + (self.u * cos + self.v * sin) * r + self.helix * f
    }

    /// Unit tangent at `fraction` of the arc.
    pub fn tangent(&self, fraction: f64) -> Cartesian {
        let f = fraction.clamp(0.0, 1.0);
        let theta = f * self.angle;
        let r = self.radius + self.spiral * f;
        let (sin, cos) = theta.sin_cos();
        let radial = self.u * cos + self.v * sin;
        let along = self.v * cos - self.u * sin;
        // d(point)/d(theta)
        let d = along * r + (radial * self.spiral + self.helix) * (1.0 / self.angle);
        d.unit(GEOMETRY_EPSILON).unwrap_or(Cartesian::ZERO)
    }
}

// ─── Tagged Geometry ────────────────────────────────────────────────

/// Translational geometry of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Line(LinePath),
    Circle(CirclePath),
}

impl Default for Geometry {
    fn default() -> Self {
        Self::Line(LinePath::default())
    }
}

impl Geometry {
    /// Translational path length.
    #[inline]
    pub fn tmag(&self) -> f64 {
        match self {
            Self::Line(line) => line.tmag,
            Self::Circle(circle) => circle.tmag,
        }
    }

    #[inline]
    pub fn point(&self, fraction: f64) -> Cartesian {
        match self {
            Self::Line(line) => line.point(fraction),
            Self::Circle(circle) => circle.point(fraction),
        }
    }

    #[inline]
    pub fn tangent(&self, fraction: f64) -> Cartesian {
        match self {
            Self::Line(line) => line.uvec,
            Self::Circle(circle) => circle.tangent(fraction),
        }
    }
}
