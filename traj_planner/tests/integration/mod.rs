mod abort;
mod accel_limits;
mod arcs;
mod blending;
mod pause_resume;
mod queue_limits;

use traj_planner::TrajectoryPlanner;

/// Planner with the reference limits used across scenarios:
/// 1 ms cycle, 10 units/s, 100 units/s².
pub fn reference_planner(capacity: usize) -> TrajectoryPlanner {
    let mut tp = TrajectoryPlanner::new(capacity);
    tp.set_cycle_time(0.001).unwrap();
    tp.set_vmax(10.0, 10.0).unwrap();
    tp.set_amax(100.0).unwrap();
    tp
}

/// Run until `is_done`, checking the depth invariant every tick.
/// Returns the number of ticks taken.
pub fn run_to_completion(tp: &mut TrajectoryPlanner, limit: usize) -> usize {
    for tick in 1..=limit {
        tp.run_cycle();
        assert!(tp.active_depth() <= tp.queue_depth());
        assert!(tp.queue_depth() <= tp.queue_capacity());
        if tp.is_done() {
            return tick;
        }
    }
    panic!("planner still busy after {limit} ticks");
}
