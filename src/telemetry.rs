//! Time series collected by the decision controller.
//!
//! Simulation time is counted in ticks and is deterministic. Scheduling and
//! controller latency are wall-clock measurements and are kept apart from it.

use crate::engine::Lane;
use crate::VehicleId;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A lane change, as scheduled by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LaneChangeEvent {
    pub vehicle: VehicleId,
    /// The tick the lane change was requested.
    pub start_tick: usize,
    /// The lane being moved into.
    pub target: Lane,
    /// The tick the engine was first seen to have finished the lane change.
    pub end_tick: Option<usize>,
}

/// Collected per-tick samples and lane change timings.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    positions: BTreeMap<VehicleId, Vec<(usize, f64)>>,
    lane_changes: Vec<LaneChangeEvent>,
    scheduling_started: BTreeMap<VehicleId, Instant>,
    tick_latency: Vec<Duration>,
}

/// A serializable summary of a run.
#[derive(Clone, Debug, Serialize)]
pub struct TelemetryReport {
    /// The `(tick, position)` samples of each vehicle.
    pub trajectories: Vec<Trajectory>,
    pub lane_changes: Vec<LaneChangeEvent>,
    /// Wall-clock time since each vehicle first needed a lane change, in ms.
    pub scheduling_ms: Vec<(VehicleId, f64)>,
    /// The sum of `scheduling_ms`.
    pub total_scheduling_ms: f64,
    /// The mean wall-clock time spent deciding a tick, in µs.
    pub mean_tick_latency_us: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Trajectory {
    pub vehicle: VehicleId,
    pub samples: Vec<(usize, f64)>,
}

impl Telemetry {
    /// Records a vehicle's position at a tick.
    pub(crate) fn record_position(&mut self, vehicle: VehicleId, tick: usize, pos: f64) {
        self.positions.entry(vehicle).or_default().push((tick, pos));
    }

    pub(crate) fn lane_change_started(&mut self, vehicle: VehicleId, tick: usize, target: Lane) {
        self.lane_changes.push(LaneChangeEvent {
            vehicle,
            start_tick: tick,
            target,
            end_tick: None,
        });
    }

    /// Marks the vehicle's open lane change as finished.
    pub(crate) fn lane_change_completed(&mut self, vehicle: VehicleId, tick: usize) {
        if let Some(event) = self
            .lane_changes
            .iter_mut()
            .rev()
            .find(|e| e.vehicle == vehicle && e.end_tick.is_none())
        {
            event.end_tick = Some(tick);
        }
    }

    /// Starts the scheduling clock for a vehicle. Later calls for the same vehicle are ignored.
    pub(crate) fn scheduling_started(&mut self, vehicle: VehicleId, at: Instant) {
        self.scheduling_started.entry(vehicle).or_insert(at);
    }

    pub(crate) fn record_tick_latency(&mut self, latency: Duration) {
        self.tick_latency.push(latency);
    }

    /// The position samples of a vehicle.
    pub fn positions(&self, vehicle: VehicleId) -> &[(usize, f64)] {
        self.positions
            .get(&vehicle)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every lane change requested, in order.
    pub fn lane_changes(&self) -> &[LaneChangeEvent] {
        &self.lane_changes
    }

    /// The durations in ticks of the lane changes which have finished.
    pub fn completed_durations(&self) -> Vec<(VehicleId, usize)> {
        self.lane_changes
            .iter()
            .filter_map(|e| e.end_tick.map(|end| (e.vehicle, end - e.start_tick)))
            .collect_vec()
    }

    /// The wall-clock time from each vehicle's first lane change need until `now`.
    pub fn scheduling_times(&self, now: Instant) -> BTreeMap<VehicleId, Duration> {
        self.scheduling_started
            .iter()
            .map(|(vehicle, start)| (*vehicle, now.saturating_duration_since(*start)))
            .collect()
    }

    /// The sum of [Self::scheduling_times].
    pub fn total_scheduling_time(&self, now: Instant) -> Duration {
        self.scheduling_times(now).values().sum()
    }

    /// The wall-clock time the controller spent on each tick.
    pub fn tick_latencies(&self) -> &[Duration] {
        &self.tick_latency
    }

    /// Summarises the run, measuring scheduling times up to `now`.
    pub fn report(&self, now: Instant) -> TelemetryReport {
        let scheduling_ms = self
            .scheduling_times(now)
            .into_iter()
            .map(|(vehicle, time)| (vehicle, 1000.0 * time.as_secs_f64()))
            .collect_vec();
        let mean_tick_latency_us = if self.tick_latency.is_empty() {
            0.0
        } else {
            let total: Duration = self.tick_latency.iter().sum();
            1e6 * total.as_secs_f64() / self.tick_latency.len() as f64
        };

        TelemetryReport {
            trajectories: self
                .positions
                .iter()
                .map(|(vehicle, samples)| Trajectory {
                    vehicle: *vehicle,
                    samples: samples.clone(),
                })
                .collect(),
            lane_changes: self.lane_changes.clone(),
            total_scheduling_ms: scheduling_ms.iter().map(|(_, ms)| ms).sum(),
            scheduling_ms,
            mean_tick_latency_us,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn lane_change_lifecycle() {
        let mut ids = SlotMap::<VehicleId, ()>::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));

        let mut telemetry = Telemetry::default();
        telemetry.lane_change_started(a, 2, Lane::Second);
        telemetry.lane_change_started(b, 3, Lane::First);
        telemetry.lane_change_completed(a, 9);
        telemetry.lane_change_started(a, 9, Lane::First);

        assert_eq!(telemetry.completed_durations(), vec![(a, 7)]);
        assert_eq!(telemetry.lane_changes()[2].end_tick, None);
    }

    #[test]
    fn scheduling_clock_starts_once() {
        let mut ids = SlotMap::<VehicleId, ()>::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));
        let start = Instant::now();

        let mut telemetry = Telemetry::default();
        telemetry.scheduling_started(a, start);
        telemetry.scheduling_started(b, start + Duration::from_millis(5));
        telemetry.scheduling_started(a, start + Duration::from_millis(8));

        let now = start + Duration::from_millis(10);
        let times = telemetry.scheduling_times(now);
        assert_eq!(times[&a], Duration::from_millis(10));
        assert_eq!(times[&b], Duration::from_millis(5));
        assert_eq!(telemetry.total_scheduling_time(now), Duration::from_millis(15));
    }

    #[test]
    fn report_serializes() {
        let mut ids = SlotMap::<VehicleId, ()>::with_key();
        let a = ids.insert(());

        let mut telemetry = Telemetry::default();
        telemetry.record_position(a, 0, 10.0);
        telemetry.record_position(a, 1, 15.0);
        telemetry.record_tick_latency(Duration::from_micros(4));
        let report = telemetry.report(Instant::now());

        assert_eq!(report.trajectories[0].samples, vec![(0, 10.0), (1, 15.0)]);
        assert_eq!(report.mean_tick_latency_us.round(), 4.0);
        assert!(serde_json::to_string(&report).is_ok());
    }
}
