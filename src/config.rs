use crate::kinematics::{ManeuverParams, SolverParams};
use crate::scenario::ScenarioConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The tunable parameters of the decision controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// The minimum gap to the leader, and to the target lane follower, in m.
    pub safe_distance: f64,
    /// The largest speed increase applied in one tick, in m/s.
    pub max_acceleration: f64,
    /// The largest speed decrease applied in one tick, a negative number in m/s.
    pub min_deceleration: f64,
    /// Commanded speeds never drop below this, in m/s.
    pub minimum_speed: f64,
    /// How far ahead to look for a leader, and behind for a target lane follower, in m.
    pub lookahead: f64,
    /// The shortest time budget given to the engine for a lane change, in s.
    pub min_lane_change_duration: f64,
    /// The minimum predecessor search.
    pub solver: SolverParams,
    /// The lane change planner.
    pub maneuver: ManeuverParams,
}

/// Everything needed to run a scenario, as read from a settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controller: ControllerConfig,
    pub scenario: ScenarioConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            safe_distance: 9.0,
            max_acceleration: 3.5,
            min_deceleration: -2.5,
            minimum_speed: 2.0,
            lookahead: 20.0,
            min_lane_change_duration: 10.0,
            solver: SolverParams::default(),
            maneuver: ManeuverParams::default(),
        }
    }
}

impl ControllerConfig {
    /// Checks that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, msg: &str| {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidConfig(msg.to_string()))
            }
        };
        check(self.safe_distance > 0.0, "safe_distance must be positive")?;
        check(self.max_acceleration >= 0.0, "max_acceleration must not be negative")?;
        check(self.min_deceleration <= 0.0, "min_deceleration must not be positive")?;
        check(self.minimum_speed >= 0.0, "minimum_speed must not be negative")?;
        check(self.lookahead > 0.0, "lookahead must be positive")?;
        check(
            self.min_lane_change_duration >= 0.0,
            "min_lane_change_duration must not be negative",
        )?;
        check(self.solver.step > 0.0, "solver.step must be positive")?;
        check(self.solver.max_iterations > 0, "solver.max_iterations must be positive")?;
        check(
            self.solver.tolerance.map_or(true, |tol| tol >= 0.0),
            "solver.tolerance must not be negative",
        )
    }
}

impl Settings {
    /// Parses and validates settings from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        self.scenario.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn partial_json() {
        let settings = Settings::from_json(
            r#"{ "controller": { "safe_distance": 12.0, "solver": { "tolerance": 0.001 } } }"#,
        )
        .unwrap();
        assert_eq!(settings.controller.safe_distance, 12.0);
        assert_eq!(settings.controller.max_acceleration, 3.5);
        assert_eq!(settings.controller.solver.tolerance, Some(0.001));
        assert_eq!(settings.controller.solver.max_iterations, 1000);
        assert_eq!(settings.scenario, ScenarioConfig::default());
    }

    #[test]
    fn rejects_out_of_range() {
        let err = Settings::from_json(r#"{ "controller": { "safe_distance": -1.0 } }"#);
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Settings::from_json("{ nope"), Err(Error::Json(_))));
    }
}
