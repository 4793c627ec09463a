//! Tests that drive the decision controller against the two-lane road.

use lane_change::{
    run_scenario, Controller, ControllerConfig, Lane, Road, Settings, TrafficEngine,
};

fn follow(gap: f64) -> (Road, lane_change::VehicleId, lane_change::VehicleId) {
    let mut road = Road::new();
    let subject = road.add_vehicle(Lane::First, 0.0, 5.0);
    let leader = road.add_vehicle(Lane::First, gap, 5.0);
    (road, subject, leader)
}

/// Test that a gap exactly equal to the safe distance never triggers a lane change.
#[test]
fn gap_at_safe_distance_keeps_lane() {
    let (mut road, subject, leader) = follow(9.0);
    let mut controller = Controller::new(ControllerConfig::default()).unwrap();
    for _ in 0..10 {
        controller.tick(&mut road);
        road.step(1.0);
    }

    assert!(controller.telemetry().lane_changes().is_empty());
    assert_eq!(road.snapshot(subject).unwrap().vel, 5.0);
    assert_eq!(road.snapshot(leader).unwrap().vel, 5.0);
    assert_eq!(road.snapshot(subject).unwrap().lane, Lane::First);
}

/// Test that a short gap starts one lane change, which is closed when the road finishes it.
#[test]
fn short_gap_changes_lane() {
    let (mut road, subject, _) = follow(5.0);
    let mut controller = Controller::new(ControllerConfig::default()).unwrap();

    controller.tick(&mut road);
    let record = *controller.record(subject).unwrap();
    assert_eq!(record.target, Lane::Second);
    assert_eq!(record.start_tick, 0);
    assert!(road.lane_change_pending(subject));
    let vel = road.snapshot(subject).unwrap().vel;
    assert!((2.0..=8.5).contains(&vel));

    for _ in 0..20 {
        road.step(1.0);
        controller.tick(&mut road);
    }

    let first = controller
        .telemetry()
        .lane_changes()
        .iter()
        .find(|e| e.vehicle == subject)
        .copied()
        .unwrap();
    assert_eq!(first.start_tick, 0);
    assert_eq!(first.target, Lane::Second);
    assert_eq!(first.end_tick, Some(10));
}

/// Test that lane changes of the same vehicle never overlap.
#[test]
fn lane_changes_do_not_overlap() {
    let mut settings = Settings::default();
    settings.scenario.vehicles = 10;
    settings.scenario.spacing = 6.0;
    settings.scenario.ticks = 80;
    let telemetry = run_scenario(&settings).unwrap();

    let events = telemetry.lane_changes();
    assert!(!events.is_empty());
    for (idx, event) in events.iter().enumerate() {
        let later = events[idx + 1..].iter().find(|e| e.vehicle == event.vehicle);
        if let Some(later) = later {
            let end = event.end_tick.expect("lane change closed before the next one");
            assert!(later.start_tick >= end);
            assert!(end > event.start_tick);
        }
    }
}

/// Test that the default scenario samples every vehicle once per tick.
#[test]
fn default_scenario_report() {
    let settings = Settings::default();
    let telemetry = run_scenario(&settings).unwrap();
    let report = telemetry.report(std::time::Instant::now());

    assert_eq!(report.trajectories.len(), settings.scenario.vehicles);
    for trajectory in &report.trajectories {
        assert_eq!(trajectory.samples.len(), settings.scenario.ticks);
        assert!(trajectory.samples.windows(2).all(|w| w[1].1 >= w[0].1));
    }
    assert!(serde_json::to_string(&report).is_ok());
}

/// Test that a vehicle leaving the road mid lane change does not keep its record.
#[test]
fn records_dropped_when_vehicles_leave() {
    let mut road = Road::with_length(15.0);
    let subject = road.add_vehicle(Lane::First, 0.0, 5.0);
    road.add_vehicle(Lane::First, 5.0, 5.0);
    let mut controller = Controller::new(ControllerConfig::default()).unwrap();

    controller.tick(&mut road);
    assert!(controller.record(subject).is_some());

    for _ in 0..10 {
        road.step(1.0);
        controller.tick(&mut road);
    }
    assert!(road.vehicle_ids().is_empty());
    assert_eq!(controller.records().count(), 0);
}
