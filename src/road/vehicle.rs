use crate::engine::{Lane, VehicleSnapshot};
use crate::VehicleId;

/// A point-mass vehicle on a two-lane road.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The longitudinal position along the road, in m.
    pos: f64,
    /// The velocity in m/s.
    vel: f64,
    /// The lane the vehicle currently occupies.
    lane: Lane,
    /// The in-progress lane change, if there is one.
    lane_change: Option<LaneChange>,
}

/// Represents an in-progress lane change.
#[derive(Clone, Copy, Debug)]
struct LaneChange {
    /// The lane being moved into.
    target: Lane,
    /// The simulated time left until the vehicle is in the target lane, in s.
    remaining: f64,
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(id: VehicleId, lane: Lane, pos: f64, vel: f64) -> Self {
        Self {
            id,
            pos,
            vel,
            lane,
            lane_change: None,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The longitudinal position of the vehicle in m.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The vehicle's velocity in m/s.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The lane the vehicle occupies.
    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// Whether the vehicle is part way through a lane change.
    pub fn is_changing_lane(&self) -> bool {
        self.lane_change.is_some()
    }

    /// The vehicle's state as seen by the decision controller.
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id,
            pos: self.pos,
            vel: self.vel,
            lane: self.lane,
        }
    }

    /// Sets the vehicle's velocity. Negative velocities are treated as stopped.
    pub(crate) fn set_vel(&mut self, vel: f64) {
        self.vel = f64::max(vel, 0.0);
    }

    /// Starts a lane change, unless one is already in progress.
    pub(crate) fn start_lane_change(&mut self, target: Lane, duration: f64) {
        if self.lane_change.is_none() && target != self.lane {
            self.lane_change = Some(LaneChange {
                target,
                remaining: duration,
            });
        }
    }

    /// Integrates the vehicle's position and advances any lane change.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    pub(crate) fn integrate(&mut self, dt: f64) {
        self.pos += self.vel * dt;

        // Check for lane change completion
        if let Some(lc) = self.lane_change.as_mut() {
            lc.remaining -= dt;
            if lc.remaining <= 0.0 {
                self.lane = lc.target;
                self.lane_change = None;
            }
        }
    }
}
