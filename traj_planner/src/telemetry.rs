//! Per-cycle planner output.
//!
//! [`CycleOutput`] is filled by every `run_cycle` and read by whatever
//! publishes telemetry. The planner never writes to an external status
//! block itself. [`JsonLinesSink`] is the publisher used by the runner.

use std::io::{self, Write};

use bitflags::bitflags;
use serde::{Serialize, Serializer};

use traj_common::consts::{MAX_REPORTED_SEGMENTS, TELEMETRY_CHANNELS};
use traj_common::motion::{PlannerState, SegmentId};
use traj_common::pose::{Cartesian, Pose};

use crate::segment::Segment;

bitflags! {
    /// Events observed during one cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CycleEvents: u8 {
        /// At least one segment reached its end.
        const SEGMENT_FINISHED = 0x01;
        /// The queue became empty this cycle.
        const QUEUE_DRAINED    = 0x02;
        /// More than one segment contributed motion.
        const BLENDING         = 0x04;
        /// A pending pause was observed at rest.
        const PAUSED           = 0x08;
        /// A pending abort discarded the queue.
        const ABORT_COMPLETED  = 0x10;
    }
}

impl Default for CycleEvents {
    fn default() -> Self {
        Self::empty()
    }
}

fn serialize_events<S: Serializer>(events: &CycleEvents, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(events.bits())
}

/// Diagnostic sample of the segment that owns an output channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelSample {
    pub id: SegmentId,
    /// Arc-length progress along the segment.
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
}

/// Everything a publisher needs after one tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleOutput {
    /// Tick counter since planner creation.
    pub cycle: u64,
    /// Commanded pose after this tick.
    pub position: Pose,
    /// Pose change applied this tick.
    pub delta: Pose,
    /// Translational velocity of this tick (`delta / cycle_time`).
    pub velocity: Cartesian,
    pub active_depth: usize,
    pub queue_depth: usize,
    pub exec_id: SegmentId,
    pub state: PlannerState,
    #[serde(serialize_with = "serialize_events")]
    pub events: CycleEvents,
    /// Samples indexed by segment output channel; zeroed every cycle.
    pub channels: [ChannelSample; TELEMETRY_CHANNELS],
    /// Ids of the segments advanced this tick, front to back.
    pub advanced: heapless::Vec<SegmentId, MAX_REPORTED_SEGMENTS>,
}

impl CycleOutput {
    /// Reset the per-cycle fields before a new scan.
    pub(crate) fn begin(&mut self, cycle: u64) {
        self.cycle = cycle;
        self.delta = Pose::ZERO;
        self.velocity = Cartesian::ZERO;
        self.events = CycleEvents::empty();
        self.channels = [ChannelSample::default(); TELEMETRY_CHANNELS];
        self.advanced.clear();
    }

    /// Record a segment that was advanced this tick.
    pub(crate) fn record(&mut self, segment: &Segment) {
        if let Some(chan) = self.channels.get_mut(segment.output_chan() as usize) {
            *chan = ChannelSample {
                id: segment.id(),
                pos: segment.progress(),
                vel: segment.current_vel(),
                acc: segment.current_accel(),
            };
        }
        // Deep blends past the report limit are still advanced, just not listed.
        let _ = self.advanced.push(segment.id());
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, output: &CycleOutput) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, output)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
