use crate::config::ControllerConfig;
use crate::engine::{Lane, TickSnapshot, TrafficEngine, VehicleSnapshot};
use crate::kinematics::{min_predecessor, plan_lane_change, LaneChangeInputs, Phase};
use crate::telemetry::Telemetry;
use crate::util::Interval;
use crate::{Result, VehicleId};
use slotmap::SecondaryMap;
use std::time::Instant;

/// Decides, each tick, which vehicles must slow down or change lanes
/// to keep a safe distance from their leader.
pub struct Controller {
    /// The controller's parameters.
    config: ControllerConfig,
    /// The current tick.
    tick: usize,
    /// The lane changes which have been requested but not yet completed.
    records: SecondaryMap<VehicleId, LaneChangeRecord>,
    /// The samples collected so far.
    telemetry: Telemetry,
}

/// A lane change which has been requested from the engine and is still in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneChangeRecord {
    pub vehicle: VehicleId,
    /// The tick the lane change was requested.
    pub start_tick: usize,
    /// The lane being moved into.
    pub target: Lane,
}

impl Controller {
    /// Creates a new controller.
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tick: 0,
            records: SecondaryMap::new(),
            telemetry: Telemetry::default(),
        })
    }

    /// The controller's parameters.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The number of ticks decided so far.
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    /// The open lane change record of a vehicle.
    pub fn record(&self, vehicle: VehicleId) -> Option<&LaneChangeRecord> {
        self.records.get(vehicle)
    }

    /// Returns an iterator over all open lane change records.
    pub fn records(&self) -> impl Iterator<Item = &LaneChangeRecord> {
        self.records.values()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn into_telemetry(self) -> Telemetry {
        self.telemetry
    }

    /// Decides one tick: reads every vehicle's state from the engine
    /// and issues the resulting speed and lane change commands.
    pub fn tick(&mut self, engine: &mut impl TrafficEngine) {
        let started = Instant::now();
        let snapshot = TickSnapshot::capture(&*engine);
        self.drop_departed_records(&snapshot);
        for vehicle in snapshot.iter() {
            self.decide(&mut *engine, &snapshot, vehicle);
        }
        self.telemetry.record_tick_latency(started.elapsed());
        self.tick += 1;
    }

    /// Applies the safe distance and lane change logic to a single vehicle.
    fn decide(
        &mut self,
        engine: &mut impl TrafficEngine,
        snapshot: &TickSnapshot,
        vehicle: &VehicleSnapshot,
    ) {
        let id = vehicle.id;
        let current = Phase::new(vehicle.pos, f64::max(vehicle.vel, self.config.minimum_speed));

        self.telemetry.record_position(id, self.tick, vehicle.pos);
        self.close_finished_record(&*engine, id);

        let (leader, gap) = match engine.leader(id, self.config.lookahead) {
            Some(neighbour) => match snapshot.get(neighbour.id) {
                Some(leader) => (leader.phase(), neighbour.gap),
                None => return,
            },
            None => return,
        };

        let envelope = min_predecessor(current, leader, &self.config.solver);
        if !envelope.converged() {
            log::debug!(
                "Vehicle {:?} min predecessor {:?} not converged ({:?} after {} projections)",
                id,
                envelope.phase,
                envelope.outcome,
                envelope.iterations
            );
        }

        if gap >= self.config.safe_distance {
            return;
        }

        self.telemetry.scheduling_started(id, Instant::now());

        let target = vehicle.lane.opposite();
        let follower = engine
            .follower(id, target, self.config.lookahead)
            .and_then(|neighbour| snapshot.get(neighbour.id))
            .map(VehicleSnapshot::phase);

        let inputs = LaneChangeInputs {
            reference: current,
            subject: current,
            follower,
            now: self.tick as f64,
        };
        let plan = plan_lane_change(&inputs, self.config.safe_distance, &self.config.maneuver);
        log::debug!(
            "Vehicle {:?} gap {:.2} m to leader {:?}, plan {:?}",
            id,
            gap,
            leader,
            plan
        );

        let speed = self.clamp_speed(current.vel, plan.phase.vel);
        engine.set_speed(id, speed);

        if !self.records.contains_key(id) {
            let budget = f64::max(plan.duration, self.config.min_lane_change_duration);
            engine.change_lane(id, target, budget);
            self.open_record(id, vehicle.lane, target);
        }
    }

    /// Limits a proposed speed to what the vehicle can reach in one tick, and to the minimum speed.
    fn clamp_speed(&self, current: f64, proposed: f64) -> f64 {
        let reachable = Interval::around(
            current,
            self.config.min_deceleration,
            self.config.max_acceleration,
        );
        f64::max(reachable.clamp(proposed), self.config.minimum_speed)
    }

    fn open_record(&mut self, vehicle: VehicleId, from: Lane, target: Lane) {
        log::info!(
            "Vehicle {:?} started lane change from lane {} to lane {} at tick {}",
            vehicle,
            from.index(),
            target.index(),
            self.tick
        );
        let record = LaneChangeRecord {
            vehicle,
            start_tick: self.tick,
            target,
        };
        let previous = self.records.insert(vehicle, record);
        debug_assert!(previous.is_none(), "vehicle already changing lanes");
        self.telemetry.lane_change_started(vehicle, self.tick, target);
    }

    /// Drops the records of vehicles which have left the engine.
    fn drop_departed_records(&mut self, snapshot: &TickSnapshot) {
        self.records.retain(|vehicle, record| {
            let active = snapshot.contains(vehicle);
            if !active {
                log::info!(
                    "Vehicle {:?} left before completing its lane change to lane {}",
                    vehicle,
                    record.target.index()
                );
            }
            active
        });
    }

    /// Closes the vehicle's record once the engine no longer reports its lane change as pending.
    fn close_finished_record(&mut self, engine: &impl TrafficEngine, vehicle: VehicleId) {
        if !self.records.contains_key(vehicle) || engine.lane_change_pending(vehicle) {
            return;
        }
        if let Some(record) = self.records.remove(vehicle) {
            log::info!(
                "Vehicle {:?} completed lane change in {} ticks",
                vehicle,
                self.tick - record.start_tick
            );
            self.telemetry.lane_change_completed(vehicle, self.tick);
        }
    }
}
