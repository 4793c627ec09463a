use super::{KinematicState, Phase};

/// Projects an object forward under a constant acceleration until it lines up
/// with a target travelling at constant speed.
///
/// The alignment time is `target_time + (target.pos - from.pos) / target.vel`.
/// The returned state is the object's own position and speed at that time,
/// having accelerated at `acc` since `t0`.
///
/// A target with zero speed never lines up, so the object's state is
/// returned unchanged at `t0`.
///
/// # Parameters
/// * `t0` - The time at which the object is in the `from` phase
/// * `from` - The object's current position and speed
/// * `target` - The target's position and (constant) speed
/// * `target_time` - The time at which the target is in the `target` phase
/// * `acc` - The object's acceleration in m/s^2
pub fn project_forward(
    t0: f64,
    from: Phase,
    target: Phase,
    target_time: f64,
    acc: f64,
) -> KinematicState {
    if target.vel == 0.0 {
        return KinematicState {
            pos: from.pos,
            vel: from.vel,
            time: t0,
        };
    }

    let time = target_time + (target.pos - from.pos) / target.vel;
    let dt = time - t0;
    KinematicState {
        pos: from.pos + from.vel * dt + 0.5 * acc * dt * dt,
        vel: from.vel + acc * dt,
        time,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn decelerating_follower() {
        let state = project_forward(0.0, Phase::new(0.0, 5.0), Phase::new(9.0, 5.0), 0.0, -1.0);
        assert_approx_eq!(state.time, 1.8);
        assert_approx_eq!(state.pos, 7.38);
        assert_approx_eq!(state.vel, 3.2);
    }

    #[test]
    fn stationary_target() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let from = Phase::new(rng.gen_range(-100.0..100.0), rng.gen_range(0.0..30.0));
            let target = Phase::new(rng.gen_range(-100.0..100.0), 0.0);
            let t0 = rng.gen_range(0.0..50.0);
            let state = project_forward(t0, from, target, rng.gen_range(0.0..50.0), 1.0);
            assert_eq!(state.pos, from.pos);
            assert_eq!(state.vel, from.vel);
            assert_eq!(state.time, t0);
        }
    }

    #[test]
    fn constant_velocity() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let from = Phase::new(rng.gen_range(-100.0..100.0), rng.gen_range(0.0..30.0));
            let target = Phase::new(rng.gen_range(-100.0..100.0), rng.gen_range(1.0..30.0));
            let t0 = rng.gen_range(0.0..10.0);
            let state = project_forward(t0, from, target, rng.gen_range(0.0..10.0), 0.0);
            assert_approx_eq!(state.pos, from.pos + from.vel * (state.time - t0), 1e-6);
            assert_eq!(state.vel, from.vel);
        }
    }

    #[test]
    fn deterministic() {
        let a = project_forward(2.0, Phase::new(3.0, 4.0), Phase::new(20.0, 6.0), 5.0, 1.0);
        let b = project_forward(2.0, Phase::new(3.0, 4.0), Phase::new(20.0, 6.0), 5.0, 1.0);
        assert_eq!(a, b);
    }
}
