use super::{project_forward, Phase};
use serde::{Deserialize, Serialize};

/// The fixed accelerations and timing buffer of a single lane change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManeuverParams {
    /// Acceleration used to close up to the safe gap, in m/s^2.
    pub approach_acceleration: f64,
    /// Acceleration used to drop back to the safe gap, a negative number in m/s^2.
    pub retreat_acceleration: f64,
    /// Acceleration assumed of the target lane follower when it must yield, in m/s^2.
    pub follower_acceleration: f64,
    /// Time added to the binding constraint to get the maneuver duration, in s.
    pub duration_buffer: f64,
}

/// Everything the lane change planner needs to know about the surrounding traffic.
#[derive(Clone, Copy, Debug)]
pub struct LaneChangeInputs {
    /// The reference the subject keeps the safe distance behind.
    pub reference: Phase,
    /// The subject vehicle.
    pub subject: Phase,
    /// The nearest vehicle behind the subject in the target lane, if any.
    pub follower: Option<Phase>,
    /// The current simulation time.
    pub now: f64,
}

/// A planned lane change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LaneChangePlan {
    /// The subject's adjusted position and speed.
    pub phase: Phase,
    /// When the subject reaches the safe gap.
    pub subject_time: f64,
    /// When the target lane follower has dropped back far enough, or zero if it needn't.
    pub follower_time: f64,
    /// The estimated duration of the whole maneuver.
    pub duration: f64,
}

impl Default for ManeuverParams {
    fn default() -> Self {
        Self {
            approach_acceleration: 1.0,
            retreat_acceleration: -1.0,
            follower_acceleration: -1.0,
            duration_buffer: 2.0,
        }
    }
}

/// Plans a lane change which leaves `safe_distance` behind the reference
/// and in front of the target lane follower.
pub fn plan_lane_change(
    inputs: &LaneChangeInputs,
    safe_distance: f64,
    params: &ManeuverParams,
) -> LaneChangePlan {
    let LaneChangeInputs {
        reference,
        subject,
        follower,
        now,
    } = *inputs;

    // Close up to or drop back to the safe gap
    let gap_target = Phase::new(reference.pos - safe_distance, reference.vel);
    let acc = if subject.pos < gap_target.pos {
        params.approach_acceleration
    } else {
        params.retreat_acceleration
    };
    let adjusted = project_forward(0.0, subject, gap_target, now, acc);

    // The follower only constrains the maneuver if it is within the safe gap
    let follower_time = match follower {
        Some(follower) if follower.pos + safe_distance > subject.pos => {
            let yield_target = Phase::new(subject.pos - safe_distance, follower.vel);
            project_forward(0.0, follower, yield_target, now, params.follower_acceleration).time
        }
        _ => 0.0,
    };

    let duration = f64::max(adjusted.time, follower_time) + params.duration_buffer;
    log::trace!("lane change plan {:?} in {:.2}s", adjusted, duration);

    LaneChangePlan {
        phase: adjusted.phase(),
        subject_time: adjusted.time,
        follower_time,
        duration,
    }
}
