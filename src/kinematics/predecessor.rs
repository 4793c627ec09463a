use super::{project_forward, Phase};
use serde::{Deserialize, Serialize};

/// Parameters of the minimum predecessor search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// The local time step between projections, in s.
    pub step: f64,
    /// The deceleration applied in every projection, a negative number in m/s^2.
    pub deceleration: f64,
    /// The search stops once the next projection would start after this time, in s.
    pub horizon: f64,
    /// The maximum number of projections performed in a single search.
    pub max_iterations: usize,
    /// When set, the search stops once a projection moves the phase by no more than this.
    pub tolerance: Option<f64>,
}

/// Why a minimum predecessor search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverOutcome {
    /// The local time passed the horizon.
    HorizonReached,
    /// The iteration limit was hit before the horizon.
    IterationLimit,
    /// Successive projections moved less than the tolerance.
    Converged,
    /// A projection produced a non-finite state; the last finite estimate was kept.
    Diverged,
}

/// The result of a minimum predecessor search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MinPredecessor {
    /// The position and speed the vehicle must not exceed.
    pub phase: Phase,
    /// The local time of the final estimate, in s.
    pub time: f64,
    /// The number of projections performed.
    pub iterations: usize,
    /// Why the search stopped.
    pub outcome: SolverOutcome,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            step: 1.0,
            deceleration: -1.0,
            horizon: 1000.0,
            max_iterations: 1000,
            tolerance: None,
        }
    }
}

impl MinPredecessor {
    /// Whether the search settled on its estimate.
    pub fn converged(&self) -> bool {
        self.outcome == SolverOutcome::Converged
    }
}

/// Finds the minimum predecessor phase of a vehicle following `leader`.
///
/// Starting from `current` at local time zero, the vehicle is repeatedly
/// projected to line up with the leader, decelerating over each interval,
/// until the next projection would begin beyond the horizon.
pub fn min_predecessor(current: Phase, leader: Phase, params: &SolverParams) -> MinPredecessor {
    let mut phase = current;
    let mut time = 0.0;
    let mut iterations = 0;

    let outcome = loop {
        let deadline = time + params.step;
        if deadline > params.horizon {
            break SolverOutcome::HorizonReached;
        }
        if iterations >= params.max_iterations {
            break SolverOutcome::IterationLimit;
        }

        let next = project_forward(time, phase, leader, deadline, params.deceleration);
        iterations += 1;
        if !next.is_finite() {
            break SolverOutcome::Diverged;
        }

        let moved = f64::max((next.pos - phase.pos).abs(), (next.vel - phase.vel).abs());
        phase = next.phase();
        time = next.time;

        if params.tolerance.map_or(false, |tol| moved <= tol) {
            break SolverOutcome::Converged;
        }
    };

    log::trace!(
        "min predecessor {:?} after {} projections ({:?})",
        phase,
        iterations,
        outcome
    );

    MinPredecessor {
        phase,
        time,
        iterations,
        outcome,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn bounded_iterations() {
        let params = SolverParams::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let current = Phase::new(rng.gen_range(-50.0..50.0), rng.gen_range(0.0..20.0));
            let leader = Phase::new(rng.gen_range(-50.0..50.0), rng.gen_range(0.0..20.0));
            let result = min_predecessor(current, leader, &params);
            assert!(result.iterations <= params.max_iterations);
        }
    }

    #[test]
    fn stationary_leader_hits_iteration_limit() {
        let params = SolverParams::default();
        let result = min_predecessor(Phase::new(0.0, 5.0), Phase::new(9.0, 0.0), &params);
        assert_eq!(result.outcome, SolverOutcome::IterationLimit);
        assert_eq!(result.iterations, 1000);
        assert_eq!(result.phase, Phase::new(0.0, 5.0));
        assert_eq!(result.time, 0.0);
    }

    #[test]
    fn stationary_leader_converges_with_tolerance() {
        let params = SolverParams {
            tolerance: Some(1e-9),
            ..Default::default()
        };
        let result = min_predecessor(Phase::new(0.0, 5.0), Phase::new(9.0, 0.0), &params);
        assert!(result.converged());
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn stops_at_horizon() {
        let params = SolverParams {
            horizon: 10.5,
            ..Default::default()
        };
        let result = min_predecessor(Phase::new(0.0, 5.0), Phase::new(0.0, 1e9), &params);
        assert_eq!(result.outcome, SolverOutcome::HorizonReached);
        assert_eq!(result.iterations, 10);
        assert_approx_eq!(result.time, 10.0, 1e-3);
    }

    #[test]
    fn non_finite_projection_keeps_last_estimate() {
        let current = Phase::new(0.0, 5.0);
        let leader = Phase::new(1e200, 1e-200);
        let result = min_predecessor(current, leader, &SolverParams::default());
        assert_eq!(result.outcome, SolverOutcome::Diverged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.phase, current);
    }
}
