//! Feed hold and resume mid-motion.

use traj_common::motion::PlannerState;
use traj_common::pose::Pose;
use traj_planner::telemetry::CycleEvents;

use super::{reference_planner, run_to_completion};

#[test]
fn pause_decelerates_holds_and_resumes_to_goal() {
    let mut tp = reference_planner(10);
    tp.set_vscale(0.9);
    tp.add_line(Pose::xyz(10.0, 0.0, 0.0)).unwrap();
    for _ in 0..500 {
        tp.run_cycle();
    }

    tp.pause();
    tp.pause();
    assert_eq!(tp.v_scale(), 0.0);
    assert_eq!(tp.state(), PlannerState::PausePending);
    assert!(!tp.is_paused());

    let mut settle_ticks = 0;
    loop {
        let out = tp.run_cycle();
        settle_ticks += 1;
        if out.events.contains(CycleEvents::PAUSED) {
            break;
        }
        assert!(settle_ticks < 1_000, "pause never settled");
    }
    // 9 units/s at 100 units/s² needs about 90 ticks to stop.
    assert!(settle_ticks > 50);
    assert!(tp.is_paused());
    assert_eq!(tp.state(), PlannerState::Paused);
    assert!(!tp.is_done());

    let held = tp.pos();
    for _ in 0..100 {
        let out = tp.run_cycle();
        assert_eq!(out.delta, Pose::ZERO);
    }
    assert_eq!(tp.pos(), held);

    tp.resume();
    assert_eq!(tp.v_scale(), 0.9);
    assert_eq!(tp.state(), PlannerState::Running);
    run_to_completion(&mut tp, 5_000);
    assert!((tp.pos().tran.x - 10.0).abs() < 1e-9);
}

#[test]
fn appends_during_pause_wait_for_resume() {
    let mut tp = reference_planner(10);
    tp.pause();
    assert_eq!(tp.state(), PlannerState::Paused);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(2.0, 0.0, 0.0)).unwrap();

    for _ in 0..100 {
        let out = tp.run_cycle();
        assert!(out.advanced.is_empty());
        assert_eq!(out.active_depth, 0);
    }
    assert_eq!(tp.pos(), Pose::ZERO);
    assert_eq!(tp.queue_depth(), 2);

    tp.resume();
    run_to_completion(&mut tp, 5_000);
    assert!((tp.pos().tran.x - 2.0).abs() < 1e-9);
}

#[test]
fn feed_scale_change_takes_effect_next_tick() {
    let mut tp = reference_planner(10);
    tp.add_line(Pose::xyz(10.0, 0.0, 0.0)).unwrap();
    for _ in 0..300 {
        tp.run_cycle();
    }
    let cruise = tp.last_output().velocity.x;
    assert!((cruise - 10.0).abs() < 1e-6);

    tp.set_vscale(0.5);
    let out = tp.run_cycle();
    // Slowing down at full deceleration: one tick removes 0.1 units/s.
    assert!(out.velocity.x < cruise);
    for _ in 0..200 {
        tp.run_cycle();
    }
    assert!((tp.last_output().velocity.x - 5.0).abs() < 1e-6);
}
