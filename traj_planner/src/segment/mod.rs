//! Planned motion segments.
//!
//! A [`Segment`] is one line or arc move with its own velocity state. It is
//! stored by value in the queue arena, stamped with the planner limits at
//! append time and advanced in place once per tick by the planner scan.

pub mod geometry;
pub mod profile;

use static_assertions::assert_impl_all;
use traj_common::consts::PURE_ROTATION_EPSILON;
use traj_common::motion::{SegmentId, SegmentStatus, TermCond};
use traj_common::pose::{Cartesian, Pose};

pub use geometry::{CirclePath, Geometry, LinePath};
use profile::ProfileLimits;

/// Planner settings copied into a segment when it is appended.
///
/// Later planner changes do not reach already-queued segments, except the
/// feed scale which the planner re-applies explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    pub id: SegmentId,
    pub cycle_time: f64,
    pub v_max: f64,
    pub ini_max_vel: f64,
    pub a_max: f64,
    /// Angular velocity ceiling (0 = use `v_max`).
    pub w_max: f64,
    /// Angular acceleration ceiling (0 = use `a_max`).
    pub w_dot_max: f64,
    pub v_scale: f64,
    /// Absolute tool-tip ceiling (0 = unlimited).
    pub v_limit: f64,
    pub term_cond: TermCond,
    pub output_chan: u8,
}

/// One planned line or arc move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    id: SegmentId,
    geometry: Geometry,
    abc: LinePath,

    cycle_time: f64,
    tv_max: f64,
    ini_max_vel: f64,
    ta_max: f64,
    abc_v_max: f64,
    abc_a_max: f64,
    v_scale: f64,
    v_limit: f64,
    term_cond: TermCond,
    output_chan: u8,

    // Effective ceilings once the geometry is bound.
    v_max: f64,
    vel_cap: f64,
    a_max: f64,

    target: f64,
    progress: f64,
    current_vel: f64,
    current_accel: f64,
    status: SegmentStatus,
}

// Stored by value in the queue arena and moved across the RT thread boundary.
assert_impl_all!(Segment: Copy, Send, Sync);

impl Default for Segment {
    fn default() -> Self {
        Self {
            id: 0,
            geometry: Geometry::default(),
            abc: LinePath::default(),
            cycle_time: 0.0,
            tv_max: 0.0,
            ini_max_vel: 0.0,
            ta_max: 0.0,
            abc_v_max: 0.0,
            abc_a_max: 0.0,
            v_scale: 1.0,
            v_limit: 0.0,
            term_cond: TermCond::Blend,
            output_chan: 0,
            v_max: 0.0,
            vel_cap: 0.0,
            a_max: 0.0,
            target: 0.0,
            progress: 0.0,
            current_vel: 0.0,
            current_accel: 0.0,
            status: SegmentStatus::Done,
        }
    }
}

impl Segment {
    /// Reset to the empty, finished state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Copy planner limits, scale, id and policy into this segment.
    pub fn stamp(&mut self, params: &SegmentParams) {
        self.id = params.id;
        self.cycle_time = params.cycle_time;
        self.tv_max = params.v_max;
        self.ini_max_vel = params.ini_max_vel;
        self.ta_max = params.a_max;
        self.abc_v_max = if params.w_max > 0.0 { params.w_max } else { params.v_max };
        self.abc_a_max = if params.w_dot_max > 0.0 { params.w_dot_max } else { params.a_max };
        self.v_scale = params.v_scale;
        self.v_limit = params.v_limit;
        self.term_cond = params.term_cond;
        self.output_chan = params.output_chan;
    }

    /// Bind a straight-line path; aux axes follow `abc` linearly.
    pub fn set_line(&mut self, line: LinePath, abc: LinePath) {
        self.bind(Geometry::Line(line), abc);
    }

    /// Bind an arc path; aux axes follow `abc` linearly.
    pub fn set_circle(&mut self, circle: CirclePath, abc: LinePath) {
        self.bind(Geometry::Circle(circle), abc);
    }

    fn bind(&mut self, geometry: Geometry, abc: LinePath) {
        self.geometry = geometry;
        self.abc = abc;
        if geometry.tmag() < PURE_ROTATION_EPSILON {
            // Pure rotation: the aux path drives progress under angular limits.
            self.target = abc.tmag;
            self.v_max = self.abc_v_max;
            self.vel_cap = self.abc_v_max;
            self.a_max = self.abc_a_max;
        } else {
            self.target = geometry.tmag();
            self.v_max = self.tv_max;
            self.vel_cap = self.ini_max_vel;
            self.a_max = self.ta_max;
        }
        self.progress = 0.0;
        self.current_vel = 0.0;
        self.current_accel = 0.0;
        self.status = SegmentStatus::Const;
    }

    /// Advance by exactly one tick.
    ///
    /// `pre_vmax` / `pre_amax` are the blend credits: the share of this
    /// segment's velocity and acceleration budget already committed by the
    /// decelerating segments ahead of it.
    pub fn run_cycle(&mut self, pre_vmax: f64, pre_amax: f64) {
        if self.status == SegmentStatus::Done {
            return;
        }

        let mut req = (self.v_max * self.v_scale).min(self.vel_cap);
        if self.v_limit > 0.0 && !self.is_pure_rotation() {
            req = req.min(self.v_limit);
        }
        let limits = ProfileLimits {
            req_vel: (req - pre_vmax).max(0.0),
            max_accel: self.a_max,
            accel_budget: self.a_max - pre_amax,
            cycle_time: self.cycle_time,
        };

        let step = profile::step(self.progress, self.target, self.current_vel, &limits);
        self.progress = step.progress;
        self.current_vel = step.vel;
        self.current_accel = step.accel;
        self.status = step.status;
    }

    #[inline]
    fn fraction(&self) -> f64 {
        if self.status == SegmentStatus::Done || self.target <= 0.0 {
            1.0
        } else {
            (self.progress / self.target).clamp(0.0, 1.0)
        }
    }

    /// Pose at the current progress.
    pub fn pos(&self) -> Pose {
        let f = self.fraction();
        Pose::from_parts(self.geometry.point(f), self.abc.point(f))
    }

    /// Unit translational direction at the current progress.
    pub fn unit_cart(&self) -> Cartesian {
        self.geometry.tangent(self.fraction())
    }

    /// Whether this segment's velocity contribution is at rest.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.current_vel == 0.0
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.status == SegmentStatus::Done
    }

    /// Negligible translational displacement; cannot blend with translation.
    #[inline]
    pub fn is_pure_rotation(&self) -> bool {
        self.geometry.tmag() < PURE_ROTATION_EPSILON
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn status(&self) -> SegmentStatus {
        self.status
    }

    #[inline]
    pub fn term_cond(&self) -> TermCond {
        self.term_cond
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn current_vel(&self) -> f64 {
        self.current_vel
    }

    #[inline]
    pub fn current_accel(&self) -> f64 {
        self.current_accel
    }

    /// Effective velocity ceiling (translational or angular).
    #[inline]
    pub fn v_max(&self) -> f64 {
        self.v_max
    }

    /// Effective acceleration ceiling (translational or angular).
    #[inline]
    pub fn a_max(&self) -> f64 {
        self.a_max
    }

    #[inline]
    pub fn v_scale(&self) -> f64 {
        self.v_scale
    }

    /// Live feed override; takes effect on the next tick.
    #[inline]
    pub fn set_v_scale(&mut self, scale: f64) {
        self.v_scale = scale;
    }

    #[inline]
    pub fn output_chan(&self) -> u8 {
        self.output_chan
    }
}
