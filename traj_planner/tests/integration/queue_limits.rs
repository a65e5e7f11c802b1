//! Queue capacity, flow control and clear.

use traj_common::consts::DEFAULT_QUEUE_SIZE;
use traj_common::error::PlannerError;
use traj_common::motion::PlannerState;
use traj_common::pose::Pose;
use traj_planner::TrajectoryPlanner;
use traj_planner::segment::Segment;

use super::{reference_planner, run_to_completion};

#[test]
fn depth_saturates_at_capacity() {
    const CAPACITY: usize = 3;
    let mut tp = reference_planner(CAPACITY);

    for n in 1..=CAPACITY + 2 {
        let result = tp.add_line(Pose::xyz(n as f64, 0.0, 0.0));
        if n <= CAPACITY {
            assert!(result.is_ok());
        } else {
            assert_eq!(result, Err(PlannerError::QueueFull { capacity: CAPACITY }));
        }
        assert_eq!(tp.queue_depth(), n.min(CAPACITY));
    }
    // Refused appends leave the goal on the last accepted segment.
    assert_eq!(tp.goal_pos(), Pose::xyz(CAPACITY as f64, 0.0, 0.0));
}

#[test]
fn full_queue_accepts_again_after_a_segment_finishes() {
    let mut tp = reference_planner(2);
    tp.set_id(10);
    tp.add_line(Pose::xyz(0.1, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(0.2, 0.0, 0.0)).unwrap();
    assert!(tp.add_line(Pose::xyz(0.3, 0.0, 0.0)).is_err());

    while tp.queue_depth() == 2 {
        tp.run_cycle();
    }
    tp.add_line(Pose::xyz(0.3, 0.0, 0.0)).unwrap();
    let ids: Vec<_> = tp.segments().map(Segment::id).collect();
    assert_eq!(ids.last(), Some(&12));

    run_to_completion(&mut tp, 5_000);
    assert!((tp.pos().tran.x - 0.3).abs() < 1e-9);
}

#[test]
fn clear_discards_queue_in_place() {
    let mut tp = reference_planner(4);
    tp.add_line(Pose::xyz(5.0, 0.0, 0.0)).unwrap();
    tp.add_line(Pose::xyz(5.0, 5.0, 0.0)).unwrap();
    for _ in 0..200 {
        tp.run_cycle();
    }
    let here = tp.pos();
    tp.clear();

    assert_eq!(tp.queue_depth(), 0);
    assert!(tp.is_done());
    assert_eq!(tp.exec_id(), 0);
    assert_eq!(tp.goal_pos(), tp.pos());
    assert_eq!(tp.pos(), here);
    assert_eq!(tp.state(), PlannerState::Idle);

    // Next move starts from where the machine is.
    tp.add_line(Pose::xyz(0.0, 0.0, 0.0)).unwrap();
    run_to_completion(&mut tp, 5_000);
    assert!(tp.pos().tran.mag() < 1e-9);
}

#[test]
fn create_requires_storage() {
    assert_eq!(
        TrajectoryPlanner::create(8, None).err(),
        Some(PlannerError::NoStorage)
    );
    let tp = TrajectoryPlanner::create(0, Some(Vec::new())).unwrap();
    assert_eq!(tp.queue_capacity(), DEFAULT_QUEUE_SIZE);
    let tp = TrajectoryPlanner::create(5, Some(Vec::with_capacity(5))).unwrap();
    assert_eq!(tp.queue_capacity(), 5);
}

#[test]
fn depth_invariant_holds_through_a_long_program() {
    let mut tp = reference_planner(4);
    let corners = [(1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)];
    let mut next = 0;
    let mut submitted = 0;

    for _ in 0..50_000 {
        while submitted < 12 {
            let (x, y) = corners[next % corners.len()];
            if tp.add_line(Pose::xyz(x, y, 0.0)).is_err() {
                break;
            }
            next += 1;
            submitted += 1;
        }
        tp.run_cycle();
        assert!(tp.active_depth() <= tp.queue_depth());
        assert!(tp.queue_depth() <= 4);
        if submitted == 12 && tp.is_done() {
            break;
        }
    }
    assert!(tp.is_done());
    assert!(tp.pos().tran.mag() < 1e-9);
}
