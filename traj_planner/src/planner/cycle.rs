//! Per-tick blending scan.
//!
//! ## Scan
//! Front to back over the queue, advancing each segment once:
//! 1. Finished entries at the front are counted for removal and skipped.
//! 2. While pausing, segments that have not started yet stay frozen.
//! 3. A segment that is decelerating with a blend policy lets the scan
//!    continue, so the next segment starts in the same tick with credit for
//!    the tail's deceleration.
//! 4. Any other still-active segment ends the scan.
//!
//! Segments involving pure rotation never share a credit with translation:
//! the blend vectors reset and the next segment only gets budget once the
//! rotating tail has stopped.
//!
//! Bounded by queue depth. No allocation, no logging.

use traj_common::consts::{ACCEL_EPSILON, VEL_EPSILON};
use traj_common::motion::{PlannerState, SegmentStatus, TermCond};
use traj_common::pose::{Cartesian, Pose};

use super::TrajectoryPlanner;
use super::state::PlannerEvent;
use crate::segment::Segment;
use crate::telemetry::{CycleEvents, CycleOutput};

// ─── Blend Credits ──────────────────────────────────────────────────

/// Motion carried forward from decelerating blend tails within one scan.
#[derive(Debug, Default)]
struct BlendAccumulator {
    /// Sum of tail accelerations along their directions.
    accel: Cartesian,
    tail_vel: f64,
    tail_accel: f64,
    /// Acceleration already committed by the tail (`a_max + accel`).
    pre_amax: f64,
}

impl BlendAccumulator {
    /// Credits `(pre_vmax, pre_amax)` for the next segment to advance.
    ///
    /// `isolate` is set when this or the previous entry is a pure
    /// rotation. The segment then gets no budget while the tail still moves
    /// or accelerates.
    fn credits(&mut self, seg: &Segment, isolate: bool) -> (f64, f64) {
        if isolate {
            self.accel = Cartesian::ZERO;
            let pre_vmax = if self.tail_vel > VEL_EPSILON {
                seg.v_max()
            } else {
                0.0
            };
            let pre_amax = if self.tail_accel.abs() > ACCEL_EPSILON {
                seg.a_max()
            } else {
                0.0
            };
            (pre_vmax, pre_amax)
        } else {
            let pre_amax = if self.accel.mag() >= ACCEL_EPSILON {
                self.pre_amax
            } else {
                0.0
            };
            (0.0, pre_amax)
        }
    }

    /// Add a decelerating blend tail.
    fn carry(&mut self, seg: &Segment) {
        let unit = seg.unit_cart();
        self.tail_vel = seg.current_vel();
        self.tail_accel = seg.current_accel();
        self.pre_amax = seg.a_max() + seg.current_accel();
        self.accel += unit * self.tail_accel;
    }
}

// ─── Cycle ──────────────────────────────────────────────────────────

impl TrajectoryPlanner {
    /// Advance the planner by exactly one tick.
    ///
    /// Returns the output of this tick; it stays available through
    /// [`last_output`](Self::last_output) until the next call.
    pub fn run_cycle(&mut self) -> &CycleOutput {
        self.cycle_count += 1;
        self.output.begin(self.cycle_count);

        let pausing = self.sm.is_pausing();
        let mut blend = BlendAccumulator::default();
        let mut delta = Pose::ZERO;
        let mut to_remove = 0usize;
        let mut finished = false;
        let mut this_pure = false;
        self.active_depth = 0;

        for t in 0..self.queue.len() {
            let last_pure = this_pure;
            let Some(seg) = self.queue.item_mut(t) else {
                break;
            };
            if seg.is_done() {
                if t == to_remove {
                    to_remove += 1;
                }
                continue;
            }
            this_pure = seg.is_pure_rotation();

            if pausing && seg.progress() <= 0.0 {
                continue;
            }

            let (pre_vmax, pre_amax) = blend.credits(seg, last_pure || this_pure);
            let before = seg.pos();
            seg.run_cycle(pre_vmax, pre_amax);
            let after = seg.pos();

            if self.active_depth == 0 {
                self.exec_id = seg.id();
            }
            delta += after - before;
            self.output.record(seg);

            if seg.is_done() {
                finished = true;
                if t == to_remove {
                    to_remove += 1;
                }
                continue;
            }

            self.active_depth += 1;
            if seg.status() == SegmentStatus::Decel && seg.term_cond() == TermCond::Blend {
                blend.carry(seg);
                continue;
            }
            break;
        }

        let mut events = CycleEvents::empty();
        if finished {
            events |= CycleEvents::SEGMENT_FINISHED;
        }
        if self.active_depth > 1 {
            events |= CycleEvents::BLENDING;
        }

        if to_remove > 0 {
            self.queue.remove_front(to_remove);
            self.depth = self.queue.len();
            if self.depth == 0 {
                self.done = true;
                self.active_depth = 0;
                self.exec_id = 0;
                events |= CycleEvents::QUEUE_DRAINED;
            }
        }

        self.current_pos += delta;

        if self.sm.is_aborting() {
            if self.is_paused() || self.done {
                self.complete_abort();
                events |= CycleEvents::ABORT_COMPLETED;
            }
        } else {
            self.observe_state(&mut events);
        }

        self.publish(delta, events);
        &self.output
    }

    /// Record transitions the scan made visible.
    fn observe_state(&mut self, events: &mut CycleEvents) {
        match self.sm.state() {
            PlannerState::Running if self.queue.is_empty() => {
                self.sm.handle_event(PlannerEvent::Drained);
            }
            PlannerState::PausePending if self.queue.is_empty() => {
                self.sm.handle_event(PlannerEvent::Drained);
                *events |= CycleEvents::PAUSED;
            }
            PlannerState::PausePending if self.is_paused() => {
                self.sm.handle_event(PlannerEvent::SettledAtRest);
                *events |= CycleEvents::PAUSED;
            }
            _ => {}
        }
    }

    fn publish(&mut self, delta: Pose, events: CycleEvents) {
        let out = &mut self.output;
        out.position = self.current_pos;
        out.delta = delta;
        out.velocity = if self.cycle_time > 0.0 {
            delta.tran * (1.0 / self.cycle_time)
        } else {
            Cartesian::ZERO
        };
        out.active_depth = self.active_depth;
        out.queue_depth = self.queue.len();
        out.exec_id = self.exec_id;
        out.state = self.sm.state();
        out.events = events;
    }
}
