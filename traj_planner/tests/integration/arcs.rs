//! Circular arcs, helices and rotary-only moves.

use std::f64::consts::PI;

use traj_common::error::PlannerError;
use traj_common::motion::TermCond;
use traj_common::pose::{Cartesian, Pose};
use traj_planner::segment::Geometry;
use traj_planner::telemetry::CycleEvents;

use super::{reference_planner, run_to_completion};

const Z: Cartesian = Cartesian::new(0.0, 0.0, 1.0);

#[test]
fn quarter_arc_stays_on_radius() {
    let mut tp = reference_planner(10);
    tp.set_term_cond(TermCond::Stop);
    tp.set_pos(Pose::xyz(1.0, 0.0, 0.0));
    tp.add_circle(Pose::xyz(0.0, 1.0, 0.0), Cartesian::ZERO, Z, 0)
        .unwrap();

    let seg = tp.segments().next().unwrap();
    match seg.geometry() {
        Geometry::Circle(arc) => {
            assert!((arc.angle - PI / 2.0).abs() < 1e-9);
            assert!((seg.target() - PI / 2.0).abs() < 1e-9);
        }
        other => panic!("expected an arc, got {other:?}"),
    }

    loop {
        tp.run_cycle();
        let r = tp.pos().tran.mag();
        assert!((r - 1.0).abs() < 1e-6, "left the circle: r={r}");
        if tp.is_done() {
            break;
        }
    }
    assert!(tp.pos().tran.x.abs() < 1e-9);
    assert!((tp.pos().tran.y - 1.0).abs() < 1e-9);
}

#[test]
fn negative_turn_goes_the_long_way() {
    let mut tp = reference_planner(10);
    tp.set_pos(Pose::xyz(1.0, 0.0, 0.0));
    tp.add_circle(Pose::xyz(0.0, 1.0, 0.0), Cartesian::ZERO, Z, -1)
        .unwrap();

    let mut min_y: f64 = 0.0;
    loop {
        tp.run_cycle();
        min_y = min_y.min(tp.pos().tran.y);
        if tp.is_done() {
            break;
        }
    }
    // Clockwise from +x to +y passes through -y.
    assert!(min_y < -0.99);
    assert!((tp.pos().tran.y - 1.0).abs() < 1e-9);
}

#[test]
fn helix_covers_the_normal_offset() {
    let mut tp = reference_planner(10);
    tp.set_pos(Pose::xyz(1.0, 0.0, 0.0));
    tp.add_circle(Pose::xyz(-1.0, 0.0, 2.0), Cartesian::ZERO, Z, 0)
        .unwrap();
    run_to_completion(&mut tp, 10_000);
    let end = tp.pos().tran;
    assert!((end.x + 1.0).abs() < 1e-9);
    assert!(end.y.abs() < 1e-9);
    assert!((end.z - 2.0).abs() < 1e-9);
}

#[test]
fn degenerate_arcs_rejected() {
    let mut tp = reference_planner(10);
    tp.set_pos(Pose::xyz(1.0, 0.0, 0.0));
    let before = tp.goal_pos();

    let zero_normal = tp.add_circle(Pose::xyz(0.0, 1.0, 0.0), Cartesian::ZERO, Cartesian::ZERO, 0);
    assert!(matches!(zero_normal, Err(PlannerError::InvalidGeometry(_))));

    let start_on_center = tp.add_circle(
        Pose::xyz(0.0, 1.0, 0.0),
        Cartesian::new(1.0, 0.0, 0.0),
        Z,
        0,
    );
    assert!(matches!(start_on_center, Err(PlannerError::InvalidGeometry(_))));

    assert_eq!(tp.goal_pos(), before);
    assert_eq!(tp.queue_depth(), 0);
}

#[test]
fn rotary_only_move_uses_angular_limits() {
    let mut tp = reference_planner(10);
    tp.set_wmax(30.0).unwrap();
    tp.set_wdot_max(300.0).unwrap();
    tp.add_line(Pose::new(Cartesian::ZERO, 90.0, 0.0, 0.0))
        .unwrap();
    assert!(tp.segments().next().unwrap().is_pure_rotation());

    let mut peak_rate: f64 = 0.0;
    loop {
        let out = tp.run_cycle();
        assert_eq!(out.delta.tran, Cartesian::ZERO);
        peak_rate = peak_rate.max(out.delta.a / 0.001);
        if tp.is_done() {
            break;
        }
    }
    assert!(peak_rate <= 30.0 + 1e-5);
    assert!(peak_rate > 29.0);
    assert!((tp.pos().a - 90.0).abs() < 1e-9);
}

#[test]
fn rotation_waits_for_translation_to_stop() {
    let mut tp = reference_planner(10);
    tp.add_line(Pose::xyz(1.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::new(Cartesian::new(1.0, 0.0, 0.0), 10.0, 0.0, 0.0))
        .unwrap();

    loop {
        let out = tp.run_cycle();
        let moving_tran = out.delta.tran.mag() > 0.0;
        let moving_rot = out.delta.a.abs() > 0.0;
        // Both only on the tick the line reaches its end.
        if moving_tran && moving_rot {
            assert!(out.events.contains(CycleEvents::SEGMENT_FINISHED));
            assert_eq!(out.active_depth, 1);
        }
        if tp.is_done() {
            break;
        }
    }
    assert!((tp.pos().a - 10.0).abs() < 1e-9);
    assert!((tp.pos().tran.x - 1.0).abs() < 1e-9);
}
