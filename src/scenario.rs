//! A reproducible two-lane run of the decision controller.

use crate::config::Settings;
use crate::controller::Controller;
use crate::engine::Lane;
use crate::road::Road;
use crate::telemetry::Telemetry;
use crate::{Error, Result, VehicleId};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// How the road is populated and how long it is simulated for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// The number of ticks to simulate.
    pub ticks: usize,
    /// The simulated time per tick, in s.
    pub dt: f64,
    /// The number of vehicles, placed alternately in the first and second lane.
    pub vehicles: usize,
    /// The speed every vehicle starts at, in m/s.
    pub initial_speed: f64,
    /// The position of the rearmost vehicle in the first lane, in m.
    pub first_lane_start: f64,
    /// The position of the rearmost vehicle in the second lane, in m.
    pub second_lane_start: f64,
    /// The distance between consecutive vehicles in a lane, in m.
    pub spacing: f64,
    /// The deviation of the random factor applied to initial speeds; zero disables it.
    pub speed_stddev: f64,
    pub seed: u64,
    /// Vehicles leave the road once they pass this position, in m.
    pub road_length: Option<f64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticks: 50,
            dt: 1.0,
            vehicles: 6,
            initial_speed: 5.0,
            first_lane_start: 10.0,
            second_lane_start: 20.0,
            spacing: 10.0,
            speed_stddev: 0.0,
            seed: 0,
            road_length: None,
        }
    }
}

impl ScenarioConfig {
    /// Checks that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0) {
            return Err(Error::InvalidConfig("scenario.dt must be positive".into()));
        }
        if !(self.spacing >= 0.0) {
            return Err(Error::InvalidConfig(
                "scenario.spacing must not be negative".into(),
            ));
        }
        if !(self.speed_stddev >= 0.0) {
            return Err(Error::InvalidConfig(
                "scenario.speed_stddev must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Places the scenario's vehicles on the road.
    pub fn populate(&self, road: &mut Road) -> Result<Vec<VehicleId>> {
        let mut next = [self.first_lane_start, self.second_lane_start];
        let ids = (0..self.vehicles)
            .map(|idx| {
                let lane = if idx % 2 == 0 { Lane::First } else { Lane::Second };
                let pos = next[lane.index()];
                next[lane.index()] += self.spacing;
                road.add_vehicle(lane, pos, self.initial_speed)
            })
            .collect();

        if self.speed_stddev > 0.0 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
            road.randomise_speeds(self.speed_stddev, &mut rng)?;
        }
        Ok(ids)
    }
}

/// Runs a scenario to completion, stepping the road before each controller tick.
pub fn run_scenario(settings: &Settings) -> Result<Telemetry> {
    settings.validate()?;
    let scenario = &settings.scenario;

    let mut road = match scenario.road_length {
        Some(length) => Road::with_length(length),
        None => Road::new(),
    };
    scenario.populate(&mut road)?;
    let mut controller = Controller::new(settings.controller.clone())?;

    for _ in 0..scenario.ticks {
        road.step(scenario.dt);
        controller.tick(&mut road);
    }

    log::info!(
        "Simulated {} ticks, {} lane changes requested",
        controller.tick_count(),
        controller.telemetry().lane_changes().len()
    );
    Ok(controller.into_telemetry())
}
