//! Paced cycle loop: feed program → run_cycle → publish.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to the configured CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! Without the `rt` feature every step is a no-op and pacing uses
//! `std::thread::sleep`.
//!
//! ## Flow Control
//! Program commands are fed before each tick until the queue is full; a
//! `QueueFull` is retried on the next tick. Invalid commands are logged and
//! dropped. An abort (requested by `--abort-after` or Ctrl-C) stops feeding
//! and the loop exits once the planner has discarded its queue.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info, warn};

use traj_common::config::ConfigError;
use traj_common::error::PlannerError;
use traj_common::motion::PlannerState;
use traj_common::pose::Pose;

use crate::config::{LoadedConfig, RunnerConfig};
use crate::planner::TrajectoryPlanner;
use crate::program::Program;
use crate::telemetry::{CycleEvents, JsonLinesSink};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    pub min_cycle_ns: i64,
    pub max_cycle_ns: i64,
    sum_cycle_ns: i64,
    /// Cycles whose body exceeded the cycle budget.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record one cycle. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64, budget_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
        if duration_ns > budget_ns {
            self.overruns += 1;
        }
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Fatal runner errors. Planner rejections of single commands are not
/// fatal and never surface here.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("telemetry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RT setup error: {0}")]
    RtSetup(String),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Perform the RT setup sequence. No-op without the `rt` feature.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), RunnerError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), RunnerError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| RunnerError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), RunnerError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop does not fault pages in.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), RunnerError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| RunnerError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| RunnerError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), RunnerError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), RunnerError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(RunnerError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), RunnerError> {
    Ok(())
}

// ─── Run Summary ────────────────────────────────────────────────────

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cycles: u64,
    pub final_pos: Pose,
    pub segments_finished: u64,
    /// Program commands the planner refused (other than a full queue).
    pub rejected: usize,
    /// Program commands never submitted (abort or cycle limit).
    pub unsent: usize,
    pub aborted: bool,
    pub telemetry_records: u64,
    pub stats: CycleStats,
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Drives a [`TrajectoryPlanner`] through a [`Program`] one tick at a time.
pub struct CycleRunner {
    planner: TrajectoryPlanner,
    program: Program,
    next_move: usize,
    config: RunnerConfig,
    cycle_time_ns: i64,
    abort_after: Option<u64>,
    abort_requested: bool,
    cycles: u64,
    segments_finished: u64,
    rejected: usize,
    stats: CycleStats,
    telemetry: Option<JsonLinesSink<Box<dyn Write + Send>>>,
}

impl CycleRunner {
    /// Build the planner from config and position it at the program start.
    pub fn new(config: &LoadedConfig, program: Program) -> Result<Self, RunnerError> {
        let mut planner = TrajectoryPlanner::from_config(&config.planner)?;
        planner.set_pos(program.start);
        Ok(Self {
            planner,
            program,
            next_move: 0,
            config: config.runner.clone(),
            cycle_time_ns: config.planner.cycle_time_us as i64 * 1000,
            abort_after: None,
            abort_requested: false,
            cycles: 0,
            segments_finished: 0,
            rejected: 0,
            stats: CycleStats::new(),
            telemetry: None,
        })
    }

    /// Publish telemetry records to `out` as JSON lines.
    pub fn with_telemetry(mut self, out: Box<dyn Write + Send>) -> Self {
        self.telemetry = Some(JsonLinesSink::new(out));
        self
    }

    /// Request an abort once `cycles` ticks have run.
    pub fn with_abort_after(mut self, cycles: Option<u64>) -> Self {
        self.abort_after = cycles;
        self
    }

    pub fn planner(&self) -> &TrajectoryPlanner {
        &self.planner
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Run until the program completes, the cycle limit is hit, or an
    /// abort has finished. Clearing `running` requests an abort.
    pub fn run(&mut self, running: &AtomicBool) -> Result<RunSummary, RunnerError> {
        info!(
            "Running {} command(s), {} motion segment(s)",
            self.program.moves.len(),
            self.program.motion_count()
        );

        if !self.config.pacing {
            self.run_unpaced(running)?;
        } else {
            #[cfg(feature = "rt")]
            self.run_rt_loop(running)?;

            #[cfg(not(feature = "rt"))]
            self.run_sim_loop(running)?;
        }

        if let Some(sink) = self.telemetry.as_mut() {
            sink.flush()?;
        }
        Ok(self.summary())
    }

    fn run_unpaced(&mut self, running: &AtomicBool) -> Result<(), RunnerError> {
        use std::time::Instant;

        loop {
            let start = Instant::now();
            let more = self.step(running)?;
            self.stats
                .record(start.elapsed().as_nanos() as i64, 0, self.cycle_time_ns);
            if !more {
                return Ok(());
            }
        }
    }

    /// Simulation loop using `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool) -> Result<(), RunnerError> {
        use std::time::{Duration, Instant};

        let cycle_duration = Duration::from_nanos(self.cycle_time_ns as u64);
        loop {
            let start = Instant::now();
            let more = self.step(running)?;
            let elapsed = start.elapsed();
            self.stats
                .record(elapsed.as_nanos() as i64, 0, self.cycle_time_ns);
            if !more {
                return Ok(());
            }
            if let Some(remaining) = cycle_duration.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
    }

    /// RT loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool) -> Result<(), RunnerError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || {
            clock_gettime(clock).map_err(|e| RunnerError::RtSetup(format!("clock_gettime: {e}")))
        };
        let mut next_wake = now()?;

        loop {
            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);
            let start = now()?;
            let more = self.step(running)?;
            let end = now()?;
            self.stats.record(
                timespec_diff_ns(&end, &start),
                0,
                self.cycle_time_ns,
            );
            if !more {
                return Ok(());
            }
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
            let woke = now()?;
            self.stats.max_latency_ns = self
                .stats
                .max_latency_ns
                .max(timespec_diff_ns(&woke, &next_wake).abs());
        }
    }

    /// One tick. Returns `false` once the run is complete.
    pub fn step(&mut self, running: &AtomicBool) -> Result<bool, RunnerError> {
        if !self.abort_requested {
            let limit_hit = self.abort_after.is_some_and(|n| self.cycles >= n);
            if limit_hit || !running.load(Ordering::Relaxed) {
                info!("Aborting motion at cycle {}", self.cycles);
                self.planner.abort();
                self.abort_requested = true;
            } else {
                self.feed();
            }
        }

        self.planner.run_cycle();
        self.cycles += 1;
        self.publish()?;
        Ok(!self.is_complete())
    }

    /// Submit program commands until the queue fills.
    fn feed(&mut self) {
        while let Some(cmd) = self.program.moves.get(self.next_move) {
            match cmd.apply(&mut self.planner) {
                Ok(()) => {}
                Err(PlannerError::QueueFull { .. }) => return,
                Err(e) => {
                    warn!("Dropping command #{}: {e}", self.next_move);
                    self.rejected += 1;
                }
            }
            self.next_move += 1;
        }
    }

    fn publish(&mut self) -> Result<(), RunnerError> {
        let out = self.planner.last_output();
        if out.events.contains(CycleEvents::SEGMENT_FINISHED) {
            self.segments_finished += 1;
            debug!("cycle {}: segment finished, exec_id={}", out.cycle, out.exec_id);
        }
        if out.events.contains(CycleEvents::PAUSED) {
            info!("cycle {}: motion paused", out.cycle);
        }
        if out.events.contains(CycleEvents::ABORT_COMPLETED) {
            info!("cycle {}: abort complete at {:?}", out.cycle, out.position.tran);
        }
        if let Some(sink) = self.telemetry.as_mut() {
            if out.cycle % self.config.telemetry_interval == 0 || !out.events.is_empty() {
                sink.write(out)?;
            }
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        if self.config.max_cycles > 0 && self.cycles >= self.config.max_cycles {
            return true;
        }
        if self.abort_requested {
            return self.planner.state() == PlannerState::Idle;
        }
        self.next_move >= self.program.moves.len() && self.planner.is_done()
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycles,
            final_pos: self.planner.pos(),
            segments_finished: self.segments_finished,
            rejected: self.rejected,
            unsent: self.program.moves.len() - self.next_move,
            aborted: self.abort_requested,
            telemetry_records: self.telemetry.as_ref().map_or(0, JsonLinesSink::written),
            stats: self.stats.clone(),
        }
    }
}

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    const NS_PER_SEC: i64 = 1_000_000_000;
    let total = ts.tv_nsec() + ns;
    nix::sys::time::TimeSpec::new(ts.tv_sec() + total.div_euclid(NS_PER_SEC), total.rem_euclid(NS_PER_SEC))
}

/// Difference `a - b` in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}
