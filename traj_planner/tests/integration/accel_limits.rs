//! Acceleration ceiling seen at the planner output, final tick included.

use traj_common::motion::TermCond;
use traj_common::pose::Pose;
use traj_planner::TrajectoryPlanner;
use traj_planner::telemetry::CycleEvents;

use super::reference_planner;

/// `a_max * dt` of the reference planner.
const MAX_STEP: f64 = 100.0 * 0.001;
const TOL: f64 = 1e-6;

/// Tick until `stop` holds, returning the largest tick-to-tick change of the
/// commanded x velocity and the tick it happened on.
fn largest_velocity_step(
    tp: &mut TrajectoryPlanner,
    limit: usize,
    mut before_tick: impl FnMut(usize, &mut TrajectoryPlanner),
    stop: impl Fn(&TrajectoryPlanner) -> bool,
) -> (f64, usize) {
    let mut prev = 0.0;
    let mut worst = (0.0, 0);
    for tick in 1..=limit {
        before_tick(tick, &mut *tp);
        let vel = tp.run_cycle().velocity.x;
        let jump = (vel - prev).abs();
        if jump > worst.0 {
            worst = (jump, tick);
        }
        prev = vel;
        if stop(&*tp) {
            return worst;
        }
    }
    panic!("scenario did not finish within {limit} ticks");
}

#[test]
fn exact_stop_line_ends_without_velocity_jump() {
    let mut tp = reference_planner(10);
    tp.set_term_cond(TermCond::Stop);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();

    let (jump, tick) = largest_velocity_step(&mut tp, 5_000, |_, _| {}, TrajectoryPlanner::is_done);
    assert!(jump <= MAX_STEP + TOL, "jump {jump} at tick {tick}");
    assert!((tp.pos().tran.x - 1.0).abs() < 1e-9);
}

#[test]
fn blended_pair_respects_acceleration_ceiling() {
    let mut tp = reference_planner(10);
    tp.set_term_cond(TermCond::Blend);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(2.0, 0.0, 0.0)).unwrap();

    let (jump, tick) = largest_velocity_step(&mut tp, 5_000, |_, _| {}, TrajectoryPlanner::is_done);
    assert!(jump <= MAX_STEP + TOL, "jump {jump} at tick {tick}");
    assert!((tp.pos().tran.x - 2.0).abs() < 1e-9);
}

#[test]
fn abort_decelerates_within_ceiling() {
    let mut tp = reference_planner(10);
    tp.add_line(Pose::xyz(10.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(20.0, 0.0, 0.0)).unwrap();

    let (jump, tick) = largest_velocity_step(
        &mut tp,
        5_000,
        |tick, tp| {
            if tick == 300 {
                tp.abort();
            }
        },
        |tp| tp.last_output().events.contains(CycleEvents::ABORT_COMPLETED),
    );
    assert!(jump <= MAX_STEP + TOL, "jump {jump} at tick {tick}");
    assert!(tp.is_done());
    assert!(tp.pos().tran.x < 10.0);
}
