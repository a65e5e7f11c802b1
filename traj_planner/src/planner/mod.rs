//! Trajectory planner: configuration, pose state and submission.
//!
//! The per-tick scan lives in [`cycle`]; the lifecycle transitions in
//! [`state`]. Every fallible operation here checks its preconditions before
//! touching any state, so an `Err` always leaves the planner unchanged.

mod cycle;
pub mod state;

use tracing::{debug, info, warn};

use traj_common::config::PlannerConfig;
use traj_common::consts::TELEMETRY_CHANNELS;
use traj_common::error::PlannerError;
use traj_common::motion::{PlannerState, SegmentId, TermCond};
use traj_common::pose::{Cartesian, Pose};

use crate::queue::SegmentQueue;
use crate::segment::{CirclePath, LinePath, Segment, SegmentParams};
use crate::telemetry::CycleOutput;
use state::{PlannerEvent, PlannerStateMachine};

/// Blending trajectory planner over a bounded segment queue.
#[derive(Debug)]
pub struct TrajectoryPlanner {
    queue: SegmentQueue,

    // Limits stamped into each appended segment.
    cycle_time: f64,
    v_max: f64,
    ini_max_vel: f64,
    v_limit: f64,
    a_max: f64,
    w_max: f64,
    w_dot_max: f64,

    v_scale: f64,
    v_restore: f64,

    current_pos: Pose,
    goal_pos: Pose,

    next_id: SegmentId,
    exec_id: SegmentId,
    depth: usize,
    active_depth: usize,
    term_cond: TermCond,
    done: bool,
    sm: PlannerStateMachine,

    output_chan: u8,
    cycle_count: u64,
    output: CycleOutput,
}

impl TrajectoryPlanner {
    /// Planner over caller-provided queue storage.
    ///
    /// Capacity 0 selects the default queue size. Configuration starts
    /// zeroed: set cycle time and limits before appending.
    pub fn create(capacity: usize, storage: Option<Vec<Segment>>) -> Result<Self, PlannerError> {
        let queue = SegmentQueue::create(capacity, storage)?;
        Ok(Self::with_queue(queue))
    }

    /// Planner with freshly allocated queue storage.
    pub fn new(capacity: usize) -> Self {
        Self::with_queue(SegmentQueue::with_capacity(capacity))
    }

    /// Planner configured from a validated [`PlannerConfig`].
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        let mut tp = Self::new(config.queue_size);
        tp.set_cycle_time(config.cycle_time_secs())?;
        tp.set_vmax(config.max_velocity, config.ini_max_velocity)?;
        tp.set_amax(config.max_acceleration)?;
        if config.velocity_limit > 0.0 {
            tp.set_vlimit(config.velocity_limit)?;
        }
        if config.max_angular_velocity > 0.0 {
            tp.set_wmax(config.max_angular_velocity)?;
        }
        if config.max_angular_acceleration > 0.0 {
            tp.set_wdot_max(config.max_angular_acceleration)?;
        }
        tp.set_vscale(config.feed_scale);
        tp.set_term_cond(config.term_cond);
        info!(
            "Planner configured: queue={}, cycle={} µs, v_max={}, a_max={}",
            tp.queue.capacity(),
            config.cycle_time_us,
            config.max_velocity,
            config.max_acceleration
        );
        Ok(tp)
    }

    fn with_queue(queue: SegmentQueue) -> Self {
        let mut tp = Self {
            queue,
            cycle_time: 0.0,
            v_max: 0.0,
            ini_max_vel: 0.0,
            v_limit: 0.0,
            a_max: 0.0,
            w_max: 0.0,
            w_dot_max: 0.0,
            v_scale: 1.0,
            v_restore: 1.0,
            current_pos: Pose::ZERO,
            goal_pos: Pose::ZERO,
            next_id: 0,
            exec_id: 0,
            depth: 0,
            active_depth: 0,
            term_cond: TermCond::Blend,
            done: true,
            sm: PlannerStateMachine::new(),
            output_chan: 0,
            cycle_count: 0,
            output: CycleOutput::default(),
        };
        tp.init();
        tp
    }

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Zero configuration and pose, unit scale, then [`clear`](Self::clear).
    pub fn init(&mut self) {
        self.cycle_time = 0.0;
        self.v_max = 0.0;
        self.ini_max_vel = 0.0;
        self.v_limit = 0.0;
        self.a_max = 0.0;
        self.w_max = 0.0;
        self.w_dot_max = 0.0;
        self.v_scale = 1.0;
        self.v_restore = 1.0;
        self.current_pos = Pose::ZERO;
        self.clear();
    }

    /// Discard every queued segment as if all had finished where the
    /// machine is now. Limits and cycle time are kept.
    pub fn clear(&mut self) {
        self.queue.init();
        self.goal_pos = self.current_pos;
        self.next_id = 0;
        self.exec_id = 0;
        self.term_cond = TermCond::Blend;
        self.done = true;
        self.depth = 0;
        self.active_depth = 0;
        self.sm.handle_event(PlannerEvent::Clear);
        self.v_scale = self.v_restore;
    }

    // ─── Configuration ──────────────────────────────────────────────

    /// Tick length [s] for subsequently appended segments.
    pub fn set_cycle_time(&mut self, secs: f64) -> Result<(), PlannerError> {
        if secs.is_nan() || secs <= 0.0 {
            warn!("Rejected cycle time {secs}");
            return Err(PlannerError::InvalidCycleTime(secs));
        }
        self.cycle_time = secs;
        Ok(())
    }

    /// Requested velocity (feed word) and the machine velocity reachable
    /// with feed override above 100%.
    pub fn set_vmax(&mut self, v_max: f64, ini_max_vel: f64) -> Result<(), PlannerError> {
        if v_max.is_nan() || v_max <= 0.0 || ini_max_vel.is_nan() || ini_max_vel <= 0.0 {
            warn!("Rejected velocity v_max={v_max}, ini_max_vel={ini_max_vel}");
            return Err(PlannerError::InvalidVelocity { v_max, ini_max_vel });
        }
        self.v_max = v_max;
        self.ini_max_vel = ini_max_vel;
        Ok(())
    }

    /// Absolute tool-tip ceiling, independent of feed scale.
    pub fn set_vlimit(&mut self, v_limit: f64) -> Result<(), PlannerError> {
        if v_limit.is_nan() || v_limit <= 0.0 {
            warn!("Rejected velocity limit {v_limit}");
            return Err(PlannerError::InvalidVelocityLimit(v_limit));
        }
        self.v_limit = v_limit;
        Ok(())
    }

    pub fn set_amax(&mut self, a_max: f64) -> Result<(), PlannerError> {
        if a_max.is_nan() || a_max <= 0.0 {
            warn!("Rejected acceleration {a_max}");
            return Err(PlannerError::InvalidAcceleration(a_max));
        }
        self.a_max = a_max;
        Ok(())
    }

    /// Angular velocity ceiling for pure-rotation segments.
    pub fn set_wmax(&mut self, w_max: f64) -> Result<(), PlannerError> {
        if w_max.is_nan() || w_max <= 0.0 {
            warn!("Rejected angular velocity {w_max}");
            return Err(PlannerError::InvalidAngularLimit(w_max));
        }
        self.w_max = w_max;
        Ok(())
    }

    /// Angular acceleration ceiling for pure-rotation segments.
    pub fn set_wdot_max(&mut self, w_dot_max: f64) -> Result<(), PlannerError> {
        if w_dot_max.is_nan() || w_dot_max <= 0.0 {
            warn!("Rejected angular acceleration {w_dot_max}");
            return Err(PlannerError::InvalidAngularLimit(w_dot_max));
        }
        self.w_dot_max = w_dot_max;
        Ok(())
    }

    /// Live feed override. Negative or NaN input clamps to 0.
    ///
    /// While pausing the value is only remembered for the resume; otherwise
    /// it applies to every queued segment, including the executing ones.
    pub fn set_vscale(&mut self, scale: f64) {
        let scale = if scale.is_nan() || scale < 0.0 { 0.0 } else { scale };
        if self.sm.is_pausing() {
            self.v_restore = scale;
        } else {
            self.apply_vscale(scale);
        }
    }

    fn apply_vscale(&mut self, scale: f64) {
        self.v_scale = scale;
        self.queue.for_each_mut(|seg| seg.set_v_scale(scale));
    }

    /// Seed the id of the next appended segment.
    pub fn set_id(&mut self, id: SegmentId) {
        self.next_id = id;
    }

    /// Termination policy for subsequent appends.
    pub fn set_term_cond(&mut self, cond: TermCond) {
        self.term_cond = cond;
    }

    /// Raw form of [`set_term_cond`](Self::set_term_cond): 0 = stop, 1 = blend.
    pub fn set_term_cond_raw(&mut self, raw: i32) -> Result<(), PlannerError> {
        let cond = u8::try_from(raw)
            .ok()
            .and_then(TermCond::from_u8)
            .ok_or(PlannerError::InvalidTermCond(raw))?;
        self.term_cond = cond;
        Ok(())
    }

    /// Overwrite the current and goal pose, bypassing the queue.
    pub fn set_pos(&mut self, pos: Pose) {
        self.current_pos = pos;
        self.goal_pos = pos;
    }

    // ─── Submission ─────────────────────────────────────────────────

    /// Append a straight move from the goal pose to `end`. Aux axes move
    /// linearly within the same segment.
    pub fn add_line(&mut self, end: Pose) -> Result<(), PlannerError> {
        self.check_not_aborting()?;
        let line = LinePath::new(self.goal_pos.tran, end.tran);
        let abc = LinePath::new(self.goal_pos.abc(), end.abc());

        let mut seg = Segment::default();
        seg.stamp(&self.segment_params());
        seg.set_line(line, abc);
        self.enqueue(seg, end)
    }

    /// Append an arc from the goal pose to `end` about `center` in the
    /// plane normal to `normal`. A negative `turn` reverses direction.
    pub fn add_circle(
        &mut self,
        end: Pose,
        center: Cartesian,
        normal: Cartesian,
        turn: i32,
    ) -> Result<(), PlannerError> {
        self.check_not_aborting()?;
        let circle = CirclePath::new(self.goal_pos.tran, end.tran, center, normal, turn)
            .inspect_err(|e| warn!("Rejected arc to {:?}: {e}", end.tran))?;
        let abc = LinePath::new(self.goal_pos.abc(), end.abc());

        let mut seg = Segment::default();
        seg.stamp(&self.segment_params());
        seg.set_circle(circle, abc);
        self.enqueue(seg, end)
    }

    fn check_not_aborting(&self) -> Result<(), PlannerError> {
        if self.sm.is_aborting() {
            debug!("Append refused while aborting");
            return Err(PlannerError::Aborting);
        }
        Ok(())
    }

    fn segment_params(&self) -> SegmentParams {
        SegmentParams {
            id: self.next_id,
            cycle_time: self.cycle_time,
            v_max: self.v_max,
            ini_max_vel: self.ini_max_vel,
            a_max: self.a_max,
            w_max: self.w_max,
            w_dot_max: self.w_dot_max,
            v_scale: self.v_scale,
            v_limit: self.v_limit,
            term_cond: self.term_cond,
            output_chan: self.output_chan,
        }
    }

    fn enqueue(&mut self, seg: Segment, end: Pose) -> Result<(), PlannerError> {
        let id = seg.id();
        self.queue
            .put(seg)
            .inspect_err(|e| debug!("Append of segment {id} refused: {e}"))?;

        self.goal_pos = end;
        self.done = false;
        self.depth = self.queue.len();
        self.next_id = self.next_id.wrapping_add(1);
        self.output_chan = (self.output_chan + 1) % TELEMETRY_CHANNELS as u8;
        self.sm.handle_event(PlannerEvent::Append);
        Ok(())
    }

    // ─── Motion Control ─────────────────────────────────────────────

    /// Hold feed at zero; moving segments decelerate under their own profile.
    pub fn pause(&mut self) {
        if self.sm.is_pausing() {
            return;
        }
        self.v_restore = self.v_scale;
        self.apply_vscale(0.0);
        self.sm.handle_event(PlannerEvent::Pause);
        debug!("Pause requested (restore scale {})", self.v_restore);
    }

    /// Restore the pre-pause feed scale on every queued segment.
    ///
    /// Ignored while an abort is pending: the abort restores the scale
    /// itself once motion has ceased.
    pub fn resume(&mut self) {
        if !self.sm.is_pausing() {
            return;
        }
        if self.sm.is_aborting() {
            debug!("Resume ignored while aborting");
            return;
        }
        self.sm.handle_event(PlannerEvent::Resume);
        self.apply_vscale(self.v_restore);
        if self.queue.is_empty() {
            self.sm.handle_event(PlannerEvent::Drained);
        }
        debug!("Resumed at scale {}", self.v_scale);
    }

    /// Pause, then discard the queue once every active segment is at rest.
    pub fn abort(&mut self) {
        if self.sm.is_aborting() {
            return;
        }
        self.pause();
        self.sm.handle_event(PlannerEvent::Abort);
        info!("Abort requested with {} segment(s) queued", self.queue.len());
    }

    /// Discard the queue after an abort; scale comes back like on resume.
    fn complete_abort(&mut self) {
        self.queue.init();
        self.goal_pos = self.current_pos;
        self.done = true;
        self.depth = 0;
        self.active_depth = 0;
        self.exec_id = 0;
        self.sm.handle_event(PlannerEvent::AbortComplete);
        self.apply_vscale(self.v_restore);
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub fn pos(&self) -> Pose {
        self.current_pos
    }

    #[inline]
    pub fn goal_pos(&self) -> Pose {
        self.goal_pos
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether every active segment is at rest.
    ///
    /// With an empty queue this is the pausing flag itself.
    pub fn is_paused(&self) -> bool {
        if self.depth == 0 {
            return self.sm.is_pausing();
        }
        self.queue
            .iter()
            .take(self.active_depth)
            .all(Segment::is_paused)
    }

    #[inline]
    pub fn is_pausing(&self) -> bool {
        self.sm.is_pausing()
    }

    #[inline]
    pub fn is_aborting(&self) -> bool {
        self.sm.is_aborting()
    }

    #[inline]
    pub fn state(&self) -> PlannerState {
        self.sm.state()
    }

    #[inline]
    pub fn queue_depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn active_depth(&self) -> usize {
        self.active_depth
    }

    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Id of the oldest unfinished segment, 0 when idle.
    #[inline]
    pub fn exec_id(&self) -> SegmentId {
        self.exec_id
    }

    #[inline]
    pub fn term_cond(&self) -> TermCond {
        self.term_cond
    }

    #[inline]
    pub fn v_scale(&self) -> f64 {
        self.v_scale
    }

    #[inline]
    pub fn cycle_time(&self) -> f64 {
        self.cycle_time
    }

    /// Queued segments, front to back.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.queue.iter()
    }

    /// Output of the most recent [`run_cycle`](Self::run_cycle).
    #[inline]
    pub fn last_output(&self) -> &CycleOutput {
        &self.output
    }
}
