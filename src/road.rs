use crate::engine::{Lane, Neighbour, TrafficEngine, VehicleSnapshot};
use crate::{Error, Result, VehicleId};
use rand::Rng;
use rand_distr::Distribution;
use slotmap::SlotMap;

pub use vehicle::Vehicle;

mod vehicle;

type VehicleSet = SlotMap<VehicleId, Vehicle>;

/// A straight two-lane road of point-mass vehicles.
///
/// Vehicles hold whatever speed they were last commanded and
/// are never checked for collisions.
#[derive(Default)]
pub struct Road {
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The current frame of simulation.
    frame: usize,
    /// Vehicles which travel past this position leave the road.
    length: Option<f64>,
}

impl Road {
    /// Creates an empty road.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty road which vehicles leave once they pass `length`.
    pub fn with_length(length: f64) -> Self {
        Self {
            length: Some(length),
            ..Default::default()
        }
    }

    /// Adds a vehicle to the road.
    pub fn add_vehicle(&mut self, lane: Lane, pos: f64, vel: f64) -> VehicleId {
        self.vehicles
            .insert_with_key(|id| Vehicle::new(id, lane, pos, f64::max(vel, 0.0)))
    }

    /// Removes a vehicle from the road.
    pub fn remove_vehicle(&mut self, id: VehicleId) {
        self.vehicles.remove(id);
    }

    /// Multiplies each vehicle's speed by a factor sampled from a normal distribution
    /// with a mean of 1 (no adjustment) and standard deviation of `stddev`.
    pub fn randomise_speeds(&mut self, stddev: f64, rng: &mut impl Rng) -> Result<()> {
        if !(stddev >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "speed deviation {} must not be negative",
                stddev
            )));
        }
        let distr = rand_distr::Normal::new(1.0, stddev)
            .map_err(|err| Error::InvalidConfig(format!("speed deviation {}: {}", stddev, err)))?;
        for (_, vehicle) in &mut self.vehicles {
            let factor = distr.sample(rng).clamp(0.75, 1.25);
            let vel = vehicle.vel() * factor;
            vehicle.set_vel(vel);
        }
        Ok(())
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        for (_, vehicle) in &mut self.vehicles {
            vehicle.integrate(dt);
        }
        self.remove_exited_vehicles();
        self.frame += 1;
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Returns an iterator over all the vehicles on the road.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Removes the vehicles which have travelled past the end of the road.
    fn remove_exited_vehicles(&mut self) {
        if let Some(length) = self.length {
            let exited = self
                .vehicles
                .values()
                .filter(|vehicle| vehicle.pos() > length)
                .map(Vehicle::id)
                .collect::<Vec<_>>();
            for vehicle_id in exited {
                self.remove_vehicle(vehicle_id);
            }
        }
    }

    /// Finds the vehicle in `lane` with the smallest `gap` no greater than `range`.
    /// Vehicles for which `gap` returns `None` are skipped.
    fn nearest(
        &self,
        lane: Lane,
        exclude: VehicleId,
        range: f64,
        gap: impl Fn(&Vehicle) -> Option<f64>,
    ) -> Option<Neighbour> {
        self.vehicles
            .values()
            .filter(|other| other.id() != exclude && other.lane() == lane)
            .filter_map(|other| gap(other).map(|gap| Neighbour { id: other.id(), gap }))
            .filter(|n| n.gap <= range)
            .min_by(|a, b| a.gap.total_cmp(&b.gap))
    }
}

impl TrafficEngine for Road {
    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().collect()
    }

    fn snapshot(&self, id: VehicleId) -> Option<VehicleSnapshot> {
        self.vehicles.get(id).map(Vehicle::snapshot)
    }

    fn leader(&self, id: VehicleId, lookahead: f64) -> Option<Neighbour> {
        let vehicle = self.vehicles.get(id)?;
        let pos = vehicle.pos();
        self.nearest(vehicle.lane(), id, lookahead, |other| {
            (other.pos() > pos).then(|| other.pos() - pos)
        })
    }

    fn follower(&self, id: VehicleId, lane: Lane, lookback: f64) -> Option<Neighbour> {
        let pos = self.vehicles.get(id)?.pos();
        self.nearest(lane, id, lookback, |other| {
            (other.pos() <= pos).then(|| pos - other.pos())
        })
    }

    fn lane_change_pending(&self, id: VehicleId) -> bool {
        self.vehicles.get(id).map_or(false, Vehicle::is_changing_lane)
    }

    fn set_speed(&mut self, id: VehicleId, speed: f64) {
        if let Some(vehicle) = self.vehicles.get_mut(id) {
            vehicle.set_vel(speed);
        }
    }

    fn change_lane(&mut self, id: VehicleId, lane: Lane, duration: f64) {
        if let Some(vehicle) = self.vehicles.get_mut(id) {
            vehicle.start_lane_change(lane, duration);
        }
    }
}
