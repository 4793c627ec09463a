pub use config::{ControllerConfig, Settings};
pub use controller::{Controller, LaneChangeRecord};
pub use engine::{Lane, Neighbour, TickSnapshot, TrafficEngine, VehicleSnapshot};
pub use error::{Error, Result};
pub use road::{Road, Vehicle};
pub use scenario::{run_scenario, ScenarioConfig};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData};
pub use telemetry::{LaneChangeEvent, Telemetry, TelemetryReport, Trajectory};
pub use util::Interval;

mod config;
mod controller;
mod engine;
mod error;
pub mod kinematics;
mod road;
mod scenario;
mod telemetry;
mod util;

new_key_type! {
    /// Unique ID of a vehicle known to the simulation engine.
    pub struct VehicleId;
}
