//! Cooperative abort: decelerate to rest, then discard the queue.

use traj_common::error::PlannerError;
use traj_common::motion::PlannerState;
use traj_common::pose::{Cartesian, Pose};
use traj_planner::telemetry::CycleEvents;

use super::{reference_planner, run_to_completion};

#[test]
fn abort_stops_where_motion_ceased() {
    let mut tp = reference_planner(10);
    tp.add_line(Pose::xyz(10.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(10.0, 10.0, 0.0)).unwrap();
    for _ in 0..300 {
        tp.run_cycle();
    }
    let x_at_request = tp.pos().tran.x;
    assert!(x_at_request > 0.0);

    tp.abort();
    assert!(tp.is_aborting());
    assert_eq!(tp.state(), PlannerState::AbortPending);

    let mut completed = false;
    let mut ticks = 0;
    for _ in 0..1_000 {
        let out = tp.run_cycle();
        ticks += 1;
        if out.events.contains(CycleEvents::ABORT_COMPLETED) {
            completed = true;
            break;
        }
    }
    assert!(completed);
    // Deceleration from cruise takes several ticks.
    assert!(ticks > 1);

    assert!(tp.is_done());
    assert_eq!(tp.queue_depth(), 0);
    assert_eq!(tp.active_depth(), 0);
    assert!(!tp.is_aborting());
    assert!(!tp.is_pausing());
    assert_eq!(tp.state(), PlannerState::Idle);
    assert_eq!(tp.goal_pos(), tp.pos());
    assert!(tp.pos().tran.x > x_at_request);
    assert!(tp.pos().tran.x < 10.0);
    assert_eq!(tp.pos().tran.y, 0.0);
}

#[test]
fn appends_refused_while_aborting() {
    let mut tp = reference_planner(10);
    tp.set_id(7);
    tp.add_line(Pose::xyz(5.0, 0.0, 0.0)).unwrap();
    for _ in 0..100 {
        tp.run_cycle();
    }
    tp.abort();

    let goal = tp.goal_pos();
    let depth = tp.queue_depth();
    assert_eq!(
        tp.add_line(Pose::xyz(6.0, 0.0, 0.0)),
        Err(PlannerError::Aborting)
    );
    assert_eq!(
        tp.add_circle(
            Pose::xyz(5.0, 1.0, 0.0),
            Cartesian::new(5.0, 0.5, 0.0),
            Cartesian::new(0.0, 0.0, 1.0),
            0,
        ),
        Err(PlannerError::Aborting)
    );
    assert_eq!(tp.goal_pos(), goal);
    assert_eq!(tp.queue_depth(), depth);

    run_to_completion(&mut tp, 1_000);
    assert_eq!(tp.state(), PlannerState::Idle);

    // Accepting again, and the id sequence did not skip.
    tp.add_line(Pose::xyz(6.0, 0.0, 0.0)).unwrap();
    assert_eq!(tp.segments().next().map(|s| s.id()), Some(8));
}

#[test]
fn abort_restores_feed_scale() {
    let mut tp = reference_planner(10);
    tp.set_vscale(0.7);
    tp.add_line(Pose::xyz(5.0, 0.0, 0.0)).unwrap();
    for _ in 0..50 {
        tp.run_cycle();
    }
    tp.abort();
    assert_eq!(tp.v_scale(), 0.0);
    run_to_completion(&mut tp, 1_000);
    assert_eq!(tp.v_scale(), 0.7);
}

#[test]
fn abort_while_idle_completes_next_tick() {
    let mut tp = reference_planner(10);
    tp.set_pos(Pose::xyz(1.0, 1.0, 1.0));
    tp.abort();
    let out = tp.run_cycle();
    assert!(out.events.contains(CycleEvents::ABORT_COMPLETED));
    assert_eq!(tp.state(), PlannerState::Idle);
    assert_eq!(tp.pos(), Pose::xyz(1.0, 1.0, 1.0));
}

#[test]
fn abort_before_motion_discards_everything() {
    let mut tp = reference_planner(10);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(2.0, 0.0, 0.0)).unwrap();
    tp.abort();
    let out = tp.run_cycle();
    assert!(out.events.contains(CycleEvents::ABORT_COMPLETED));
    assert_eq!(tp.pos(), Pose::ZERO);
    assert_eq!(tp.goal_pos(), Pose::ZERO);
    assert_eq!(tp.queue_depth(), 0);
}
