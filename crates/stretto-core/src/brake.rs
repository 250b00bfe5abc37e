//! Pre-trajectory for states outside the limits.
//!
//! When the current velocity or acceleration already violates the limits,
//! or is heading for an unavoidable violation, up to two constant-jerk
//! segments are prepended to bring the state back into the envelope the
//! seven-segment solver can handle.
//!
//! The key quantity is the recoverable velocity `v + a*|a|/(2*j_max)`: the
//! velocity the axis ends up at when its acceleration is ramped to zero at
//! full jerk. Along a segment that jerks the acceleration toward zero this
//! quantity is invariant, so once it sits beyond `v_max` the acceleration
//! has to be driven through zero to the opposite side.

use crate::profile::integrate;

// Guard against negative zero durations out of the floating arithmetic.
const EPS: f64 = 2e-15;

/// Up to two braking segments: durations and jerks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrakeProfile {
    pub t: [f64; 2],
    pub j: [f64; 2],
}

impl BrakeProfile {
    /// Total braking duration.
    pub fn duration(&self) -> f64 {
        self.t[0] + self.t[1]
    }
}

/// Compute the brake pre-trajectory for the given state and limits. Both
/// durations are zero when the state is already recoverable.
pub fn brake_trajectory(v0: f64, a0: f64, v_max: f64, a_max: f64, j_max: f64) -> BrakeProfile {
    let mut brake = BrakeProfile::default();

    if a0 > a_max {
        acceleration_brake(v0, a0, v_max, a_max, j_max, &mut brake);
    } else if a0 < -a_max {
        acceleration_brake(-v0, -a0, v_max, a_max, j_max, &mut brake);
        brake.j[0] = -brake.j[0];
        brake.j[1] = -brake.j[1];
    } else if v0 + a0 * a0.abs() / (2.0 * j_max) > v_max {
        velocity_brake(v0, a0, v_max, a_max, j_max, &mut brake);
    } else if v0 + a0 * a0.abs() / (2.0 * j_max) < -v_max {
        velocity_brake(-v0, -a0, v_max, a_max, j_max, &mut brake);
        brake.j[0] = -brake.j[0];
        brake.j[1] = -brake.j[1];
    }

    brake
}

/// `a0 > a_max`: ramp the acceleration back down to the limit. When even
/// ramping it to zero would leave the velocity beyond `v_max`, the
/// acceleration has to go negative, which is the velocity brake's job.
fn acceleration_brake(
    v0: f64,
    a0: f64,
    v_max: f64,
    a_max: f64,
    j_max: f64,
    brake: &mut BrakeProfile,
) {
    if v0 + a0 * a0 / (2.0 * j_max) > v_max {
        velocity_brake(v0, a0, v_max, a_max, j_max, brake);
        return;
    }

    brake.j[0] = -j_max;
    brake.t[0] = ((a0 - a_max) / j_max - EPS).max(0.0);

    // The velocity may still sit below the opposite limit; coast at the
    // acceleration limit until it recovers.
    let (_, v1, a1) = integrate(brake.t[0], 0.0, v0, a0, brake.j[0]);
    if v1 < -v_max {
        brake.j[1] = 0.0;
        brake.t[1] = ((-v_max - v1) / a1 - EPS).max(0.0);
    }
}

/// The velocity is, or will become, too large: jerk the acceleration down
/// until the recoverable velocity meets the limit, the acceleration
/// saturates, or the velocity would cross the opposite limit.
fn velocity_brake(v0: f64, a0: f64, v_max: f64, a_max: f64, j_max: f64, brake: &mut BrakeProfile) {
    brake.j[0] = -j_max;

    let t_to_a_min = (a0 + a_max) / j_max;
    let t_to_recoverable =
        (a0 + (a0 * a0 / 2.0 + j_max * (v0 - v_max)).max(0.0).sqrt()) / j_max;
    let t_to_opposite = (a0 + (a0 * a0 + 2.0 * j_max * (v0 + v_max)).max(0.0).sqrt()) / j_max;

    brake.t[0] = (t_to_a_min.min(t_to_recoverable).min(t_to_opposite) - EPS).max(0.0);

    if t_to_a_min < t_to_recoverable && t_to_a_min < t_to_opposite {
        // The acceleration limit bites first: hold it there until the
        // recoverable velocity reaches the limit, without overshooting the
        // opposite side.
        let (_, v1, a1) = integrate(brake.t[0], 0.0, v0, a0, brake.j[0]);
        let t_recover_const = (v1 - a1 * a1 / (2.0 * j_max) - v_max) / -a1;
        let t_opposite_const = (v1 + v_max) / -a1;
        brake.j[1] = 0.0;
        brake.t[1] = (t_recover_const.min(t_opposite_const) - EPS).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(brake: &BrakeProfile, v0: f64, a0: f64) -> (f64, f64) {
        let (_, v1, a1) = integrate(brake.t[0], 0.0, v0, a0, brake.j[0]);
        let (_, v2, a2) = integrate(brake.t[1], 0.0, v1, a1, brake.j[1]);
        (v2, a2)
    }

    #[test]
    fn no_brake_inside_envelope() {
        let brake = brake_trajectory(0.5, 0.5, 1.0, 1.0, 1.0);
        assert_eq!(brake.t, [0.0, 0.0]);
    }

    #[test]
    fn velocity_over_limit_brakes_down() {
        let brake = brake_trajectory(1.5, 0.0, 1.0, 2.0, 4.0);
        assert!(brake.t[0] > 0.0);
        assert_eq!(brake.j[0], -4.0);
        let (v, a) = sample(&brake, 1.5, 0.0);
        // After the prefix the state is recoverable: ramping the
        // acceleration back to zero lands the velocity at the limit.
        assert!(v < 1.5);
        assert!(v - a * a / (2.0 * 4.0) <= 1.0 + 1e-9);
    }

    #[test]
    fn velocity_brake_is_mirrored() {
        let pos = brake_trajectory(1.5, 0.0, 1.0, 2.0, 4.0);
        let neg = brake_trajectory(-1.5, 0.0, 1.0, 2.0, 4.0);
        assert_eq!(pos.t, neg.t);
        assert_eq!(pos.j[0], -neg.j[0]);
    }

    #[test]
    fn acceleration_over_limit_ramps_back() {
        let brake = brake_trajectory(0.0, 3.0, 10.0, 1.0, 2.0);
        assert_eq!(brake.j[0], -2.0);
        let (_, a) = sample(&brake, 0.0, 3.0);
        assert!(a <= 1.0 + 1e-9);
        assert_eq!(brake.t[1], 0.0);
    }

    #[test]
    fn acceleration_brake_defers_to_velocity_brake() {
        // Ramping a to zero would already put v past the limit, so the
        // acceleration must be driven through zero.
        let brake = brake_trajectory(0.9, 3.0, 1.0, 1.0, 2.0);
        assert!(brake.t[0] > 0.0);
        let (v, a) = sample(&brake, 0.9, 3.0);
        let recoverable = v + a * a.abs() / (2.0 * 2.0);
        assert!(recoverable <= 1.0 + 1e-6);
    }

    #[test]
    fn long_brake_saturates_acceleration() {
        // Far over the velocity limit with a weak jerk: the acceleration
        // saturates and a second constant segment appears.
        let brake = brake_trajectory(10.0, 0.0, 1.0, 1.0, 1.0);
        assert!(brake.t[0] > 0.0);
        assert!(brake.t[1] > 0.0);
        assert_eq!(brake.j[1], 0.0);
        let (v, a) = sample(&brake, 10.0, 0.0);
        assert!((a + 1.0).abs() < 1e-6);
        assert!(v - a * a / 2.0 <= 1.0 + 1e-6);
        assert!(v >= -1.0);
    }

    #[test]
    fn durations_never_negative() {
        for &(v0, a0) in &[(1.0 + 1e-14, 0.0), (0.0, 1.0 + 1e-14), (-2.0, 2.0), (3.0, -5.0)] {
            let brake = brake_trajectory(v0, a0, 1.0, 1.0, 1.0);
            assert!(brake.t[0] >= 0.0);
            assert!(brake.t[1] >= 0.0);
        }
    }
}
