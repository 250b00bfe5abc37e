//! Seven-segment jerk-limited motion profile.
//!
//! A profile is seven maximal constant-jerk segments. The jerk signs follow
//! one of two patterns ("teeth"), scaled by a (possibly reduced) jerk
//! magnitude. Boundary states at segment ends are produced by closed-form
//! integration and validated against the axis limits and the target state.

use std::fmt;

// Feasibility tolerance on velocity and acceleration samples.
pub const LIMIT_EPS: f64 = 1e-9;
// Tolerance on terminal state match and total duration match.
pub const BOUNDARY_EPS: f64 = 1e-8;
// Tolerance on jerk magnitude when a case solves for a reduced jerk.
pub const JERK_EPS: f64 = 1e-12;

/// Closed-form integration of a constant-jerk segment.
///
/// Returns the position, velocity, and acceleration after time `t` starting
/// from `(p0, v0, a0)` under constant jerk `j`.
#[inline]
pub fn integrate(t: f64, p0: f64, v0: f64, a0: f64, j: f64) -> (f64, f64, f64) {
    (
        p0 + t * (v0 + t * (a0 / 2.0 + t * j / 6.0)),
        v0 + t * (a0 + t * j / 2.0),
        a0 + t * j,
    )
}

/// Jerk sign pattern across the seven segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Teeth {
    /// `+ 0 - 0 - 0 +`
    #[default]
    Uddu,
    /// `+ 0 - 0 + 0 -`
    Udud,
}

/// Sign family of the dominant jerk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Up,
    Down,
}

/// Which of the three physical bounds are saturated in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limits {
    Acc0Acc1Vel,
    Vel,
    Acc0,
    Acc1,
    Acc0Acc1,
    Acc0Vel,
    Acc1Vel,
    #[default]
    None,
}

/// One axis' seven-segment trajectory, with an optional braking prefix of
/// up to two extra constant-jerk segments preceding segment 0.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// Segment durations.
    pub t: [f64; 7],
    /// Prefix sums of `t`; `t_sum[6]` is the total duration.
    pub t_sum: [f64; 7],
    /// Jerk in each segment.
    pub j: [f64; 7],
    /// Acceleration at segment boundaries.
    pub a: [f64; 8],
    /// Velocity at segment boundaries.
    pub v: [f64; 8],
    /// Position at segment boundaries.
    pub p: [f64; 8],

    pub limits: Limits,
    pub direction: Direction,
    pub teeth: Teeth,

    /// Total braking time, when a brake prefix is present.
    pub t_brake: Option<f64>,
    pub t_brakes: [f64; 2],
    pub j_brakes: [f64; 2],
    pub a_brakes: [f64; 2],
    pub v_brakes: [f64; 2],
    pub p_brakes: [f64; 2],
}

impl Profile {
    /// Fill the jerk array from the teeth pattern, forward-integrate all
    /// seven segments from `(p[0], v[0], a[0])`, and report whether the
    /// result is feasible: non-negative durations, velocity and
    /// acceleration inside the limits (the first segments may exceed them
    /// only before the limits can act, see the index ranges), and terminal
    /// state on target.
    pub fn check(
        &mut self,
        teeth: Teeth,
        pf: f64,
        vf: f64,
        af: f64,
        jf: f64,
        v_max: f64,
        a_max: f64,
    ) -> bool {
        self.teeth = teeth;
        self.j = match teeth {
            Teeth::Uddu => [jf, 0.0, -jf, 0.0, -jf, 0.0, jf],
            Teeth::Udud => [jf, 0.0, -jf, 0.0, jf, 0.0, -jf],
        };

        if self.t[0] < 0.0 {
            return false;
        }
        self.t_sum[0] = self.t[0];
        for i in 0..6 {
            if self.t[i + 1] < 0.0 {
                return false;
            }
            self.t_sum[i + 1] = self.t_sum[i] + self.t[i + 1];
        }

        for i in 0..7 {
            let (p, v, a) = integrate(self.t[i], self.p[i], self.v[i], self.a[i], self.j[i]);
            self.p[i + 1] = p;
            self.v[i + 1] = v;
            self.a[i + 1] = a;
        }

        // The initial velocity and acceleration may sit outside the limits
        // (the brake prefix exists for exactly that situation), so only the
        // boundaries the profile can still influence are constrained.
        self.v[3..].iter().all(|&v| v.abs() < v_max.abs() + LIMIT_EPS)
            && self.a[2..].iter().all(|&a| a.abs() < a_max.abs() + LIMIT_EPS)
            && (self.p[7] - pf).abs() < BOUNDARY_EPS
            && (self.v[7] - vf).abs() < BOUNDARY_EPS
            && (self.a[7] - af).abs() < BOUNDARY_EPS
    }

    /// `check`, additionally requiring the total duration to equal `tf`.
    #[allow(clippy::too_many_arguments)]
    pub fn check_with_duration(
        &mut self,
        tf: f64,
        teeth: Teeth,
        pf: f64,
        vf: f64,
        af: f64,
        jf: f64,
        v_max: f64,
        a_max: f64,
    ) -> bool {
        self.check(teeth, pf, vf, af, jf, v_max, a_max) && (self.t_sum[6] - tf).abs() < BOUNDARY_EPS
    }

    /// `check_with_duration`, additionally bounding a solved jerk magnitude
    /// by `j_max`. Used by the fixed-duration solver for cases that trade
    /// jerk for time.
    #[allow(clippy::too_many_arguments)]
    pub fn check_with_jerk(
        &mut self,
        tf: f64,
        teeth: Teeth,
        pf: f64,
        vf: f64,
        af: f64,
        jf: f64,
        v_max: f64,
        a_max: f64,
        j_max: f64,
    ) -> bool {
        jf.abs() < j_max.abs() + JERK_EPS
            && self.check_with_duration(tf, teeth, pf, vf, af, jf, v_max, a_max)
    }

    /// Total duration of the seven segments (excluding any brake prefix).
    #[inline]
    pub fn duration(&self) -> f64 {
        self.t_sum[6]
    }

    /// Mirror the profile through the origin. A profile solved for the
    /// sign-flipped boundary problem becomes, after this transform, the
    /// `Down`-direction solution of the original problem.
    pub fn flip_sign(&mut self) {
        for x in self.j.iter_mut() {
            *x = -*x;
        }
        for i in 0..8 {
            self.a[i] = -self.a[i];
            self.v[i] = -self.v[i];
            self.p[i] = -self.p[i];
        }
        self.direction = Direction::Down;
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}/{:?} t=[{:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}] T={:.6}",
            self.direction,
            self.limits,
            self.teeth,
            self.t[0],
            self.t[1],
            self.t[2],
            self.t[3],
            self.t[4],
            self.t[5],
            self.t[6],
            self.t_sum[6],
        )
    }
}
