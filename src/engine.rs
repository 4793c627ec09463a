//! The interface between the decision controller and the traffic simulation engine.

use crate::kinematics::Phase;
use crate::VehicleId;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

/// One of the two lanes of the carriageway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    First,
    Second,
}

/// The state of a vehicle at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    /// The vehicle's ID.
    pub id: VehicleId,
    /// The longitudinal position in m.
    pub pos: f64,
    /// The speed in m/s.
    pub vel: f64,
    /// The lane the vehicle is travelling in.
    pub lane: Lane,
}

/// A nearby vehicle and the distance to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// The neighbouring vehicle.
    pub id: VehicleId,
    /// The longitudinal distance between the two vehicles in m.
    pub gap: f64,
}

/// A traffic simulation engine which owns the vehicles' physics and lane geometry.
pub trait TrafficEngine {
    /// The IDs of all active vehicles.
    fn vehicle_ids(&self) -> Vec<VehicleId>;

    /// The current state of a vehicle, if it is active.
    fn snapshot(&self, id: VehicleId) -> Option<VehicleSnapshot>;

    /// The nearest vehicle ahead in the same lane, no further than `lookahead` m away.
    fn leader(&self, id: VehicleId, lookahead: f64) -> Option<Neighbour>;

    /// The nearest vehicle in `lane` which is not ahead of the given vehicle,
    /// no further than `lookback` m behind it.
    fn follower(&self, id: VehicleId, lane: Lane, lookback: f64) -> Option<Neighbour>;

    /// Whether a lane change requested for the vehicle is still in progress.
    fn lane_change_pending(&self, id: VehicleId) -> bool;

    /// Commands the vehicle to travel at the given speed in m/s.
    fn set_speed(&mut self, id: VehicleId, speed: f64);

    /// Requests that the vehicle move into `lane` within `duration` seconds.
    fn change_lane(&mut self, id: VehicleId, lane: Lane, duration: f64);
}

/// The state of every active vehicle, captured once at the start of a tick.
#[derive(Clone, Debug, Default)]
pub struct TickSnapshot {
    order: Vec<VehicleId>,
    vehicles: SecondaryMap<VehicleId, VehicleSnapshot>,
}

impl Lane {
    /// The lane's index, counting from zero.
    pub fn index(self) -> usize {
        match self {
            Lane::First => 0,
            Lane::Second => 1,
        }
    }

    /// The other lane.
    pub fn opposite(self) -> Lane {
        match self {
            Lane::First => Lane::Second,
            Lane::Second => Lane::First,
        }
    }
}

impl VehicleSnapshot {
    /// The vehicle's position and speed.
    pub fn phase(&self) -> Phase {
        Phase::new(self.pos, self.vel)
    }
}

impl TickSnapshot {
    /// Reads the state of every active vehicle from the engine.
    pub fn capture(engine: &impl TrafficEngine) -> Self {
        let mut snapshot = Self::default();
        for id in engine.vehicle_ids() {
            if let Some(vehicle) = engine.snapshot(id) {
                snapshot.order.push(id);
                snapshot.vehicles.insert(id, vehicle);
            }
        }
        snapshot
    }

    /// Gets the snapshot of a vehicle.
    pub fn get(&self, id: VehicleId) -> Option<&VehicleSnapshot> {
        self.vehicles.get(id)
    }

    /// Iterates over the vehicles in the order the engine listed them.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleSnapshot> {
        self.order.iter().map(|id| &self.vehicles[*id])
    }

    /// Whether the vehicle was active when the snapshot was captured.
    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains_key(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opposite_lane() {
        assert_eq!(Lane::First.opposite(), Lane::Second);
        assert_eq!(Lane::Second.opposite(), Lane::First);
        assert_eq!(Lane::First.opposite().opposite(), Lane::First);
        assert_eq!(Lane::Second.index(), 1);
    }
}
