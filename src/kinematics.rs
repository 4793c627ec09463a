//! Constant acceleration projections used to keep a safe gap and time lane changes.

use serde::{Deserialize, Serialize};

pub use lane_change::{plan_lane_change, LaneChangeInputs, LaneChangePlan, ManeuverParams};
pub use predecessor::{min_predecessor, MinPredecessor, SolverOutcome, SolverParams};
pub use projection::project_forward;

mod lane_change;
mod predecessor;
mod projection;

/// The position and speed of an object along a lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// The longitudinal position in m.
    pub pos: f64,
    /// The speed in m/s.
    pub vel: f64,
}

/// A [Phase] anchored at an instant of (local) time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// The longitudinal position in m.
    pub pos: f64,
    /// The speed in m/s.
    pub vel: f64,
    /// The time at which the object has this position and speed, in s.
    pub time: f64,
}

impl Phase {
    /// Creates a new phase.
    pub const fn new(pos: f64, vel: f64) -> Self {
        Self { pos, vel }
    }
}

impl KinematicState {
    /// Drops the timestamp.
    pub fn phase(&self) -> Phase {
        Phase::new(self.pos, self.vel)
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.time.is_finite()
    }
}
