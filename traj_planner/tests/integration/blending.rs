//! Blended chains of segments.

use traj_common::motion::TermCond;
use traj_common::pose::Pose;
use traj_planner::TrajectoryPlanner;
use traj_planner::telemetry::CycleEvents;

use super::{reference_planner, run_to_completion};

fn two_lines(cond: TermCond) -> TrajectoryPlanner {
    let mut tp = reference_planner(10);
    tp.set_term_cond(cond);
    tp.set_id(1);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(2.0, 0.0, 0.0)).unwrap();
    tp
}

#[test]
fn next_segment_moves_during_decel_of_the_first() {
    let mut tp = two_lines(TermCond::Blend);
    let mut overlap_ticks = 0;

    for _ in 0..5_000 {
        let out = tp.run_cycle();
        if out.active_depth == 2 {
            overlap_ticks += 1;
            assert!(out.events.contains(CycleEvents::BLENDING));
            assert_eq!(out.advanced.as_slice(), &[1, 2]);
            assert_eq!(out.exec_id, 1);
            // Second segment owns channel 1 and is already under way.
            assert_eq!(out.channels[1].id, 2);
            assert!(out.channels[1].vel > 0.0);
            assert!(out.channels[0].acc < 0.0);
        }
        if tp.is_done() {
            break;
        }
    }

    assert!(overlap_ticks > 0);
    assert!(tp.is_done());
    assert!((tp.pos().tran.x - 2.0).abs() < 1e-9);
}

#[test]
fn blending_is_faster_than_exact_stop() {
    let mut blended = two_lines(TermCond::Blend);
    let mut stopped = two_lines(TermCond::Stop);
    let t_blend = run_to_completion(&mut blended, 10_000);
    let t_stop = run_to_completion(&mut stopped, 10_000);
    assert!(t_blend < t_stop, "blend {t_blend} ticks vs stop {t_stop} ticks");
    let gap = blended.pos().tran - stopped.pos().tran;
    assert!(gap.mag() < 1e-9);
}

#[test]
fn blended_corner_ends_on_goal() {
    let mut tp = reference_planner(10);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(1.0, 2.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(0.0, 2.0, 0.0)).unwrap();

    let mut max_depth = 0;
    for _ in 0..10_000 {
        let out = tp.run_cycle();
        max_depth = max_depth.max(out.active_depth);
        if tp.is_done() {
            break;
        }
    }

    assert!(tp.is_done());
    assert_eq!(max_depth, 2);
    assert!((tp.pos().tran.x - 0.0).abs() < 1e-9);
    assert!((tp.pos().tran.y - 2.0).abs() < 1e-9);
}

#[test]
fn exec_id_follows_the_front_segment() {
    let mut tp = two_lines(TermCond::Stop);
    let mut seen = Vec::new();
    loop {
        let out = tp.run_cycle();
        if out.exec_id != 0 && seen.last() != Some(&out.exec_id) {
            seen.push(out.exec_id);
        }
        if tp.is_done() {
            break;
        }
    }
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(tp.exec_id(), 0);
}
