//! Per-axis time-optimal profile solver.
//!
//! Enumerates the closed-form seven-segment candidates over the limit
//! subsets, validates each against the profile check, and finalizes the
//! feasible-duration block. Only the `Up` jerk family is solved directly;
//! the `Down` family is the `Up` solution of the sign-flipped boundary
//! problem, mirrored back afterwards.
//!
//! Case naming: `acc0` means the first acceleration plateau saturates at
//! `+a_max`, `acc1` the second at `-a_max`, `vel` a cruise segment at
//! `+v_max`. Each case reduces the boundary-value problem to one unknown
//! segment duration; the comments in each case give the reduction.

use crate::block::{Block, Interval};
use crate::profile::{integrate, Direction, Limits, Profile, Teeth, BOUNDARY_EPS};
use crate::roots::{solve_cubic, solve_quadratic, solve_quart_monic};

// Durations that come out negative by floating error only are snapped to
// zero before the feasibility check.
const T_SNAP: f64 = 1e-9;

/// Boundary conditions of one axis' scalar problem, possibly sign-flipped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Boundary {
    pub(crate) p0: f64,
    pub(crate) v0: f64,
    pub(crate) a0: f64,
    pub(crate) pf: f64,
    pub(crate) vf: f64,
    pub(crate) af: f64,
    pub(crate) pd: f64,
}

impl Boundary {
    pub(crate) fn new(p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) -> Self {
        Self {
            p0,
            v0,
            a0,
            pf,
            vf,
            af,
            pd: pf - p0,
        }
    }

    pub(crate) fn flipped(&self) -> Self {
        Self::new(-self.p0, -self.v0, -self.a0, -self.pf, -self.vf, -self.af)
    }
}

pub struct Step1 {
    bounds: Boundary,
    v_max: f64,
    a_max: f64,
    j_max: f64,
    valid_profiles: Vec<Profile>,
}

impl Step1 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        p0: f64,
        v0: f64,
        a0: f64,
        pf: f64,
        vf: f64,
        af: f64,
        v_max: f64,
        a_max: f64,
        j_max: f64,
    ) -> Self {
        Self {
            bounds: Boundary::new(p0, v0, a0, pf, vf, af),
            v_max,
            a_max,
            j_max,
            valid_profiles: Vec::with_capacity(8),
        }
    }

    /// Enumerate all candidates and build the block of feasible durations.
    /// `template` carries the brake prefix of the axis, which every
    /// candidate inherits. Returns `None` when no candidate survives the
    /// feasibility check.
    pub fn block(&mut self, template: &Profile) -> Option<Block> {
        self.valid_profiles.clear();
        for flip in [false, true] {
            let b = if flip {
                self.bounds.flipped()
            } else {
                self.bounds
            };
            self.time_acc0_acc1_vel(&b, flip, template);
            self.time_acc1_vel(&b, flip, template);
            self.time_acc0_vel(&b, flip, template);
            self.time_vel(&b, flip, template);
            self.time_acc0_acc1(&b, flip, template);
            self.time_acc1(&b, flip, template);
            self.time_acc0(&b, flip, template);
            self.time_none(&b, flip, template);
        }
        self.finalize()
    }

    fn try_push(&mut self, mut t: [f64; 7], limits: Limits, b: &Boundary, flip: bool, template: &Profile) {
        for x in t.iter_mut() {
            if *x < 0.0 && *x > -T_SNAP {
                *x = 0.0;
            }
        }
        let mut profile = template.clone();
        profile.t = t;
        profile.p[0] = b.p0;
        profile.v[0] = b.v0;
        profile.a[0] = b.a0;
        if profile.check(
            Teeth::Uddu,
            b.pf,
            b.vf,
            b.af,
            self.j_max,
            self.v_max,
            self.a_max,
        ) {
            profile.limits = limits;
            profile.direction = Direction::Up;
            if flip {
                profile.flip_sign();
            }
            self.valid_profiles.push(profile);
        }
    }

    /// Duration of the cruise segment that closes the position gap once
    /// the six ramp segments are fixed.
    fn cruise(&self, t: &[f64; 7], b: &Boundary) -> f64 {
        let j = self.j_max;
        let pattern = [j, 0.0, -j, 0.0, -j, 0.0, j];
        let (mut p, mut v, mut a) = (b.p0, b.v0, b.a0);
        for i in 0..7 {
            if i == 3 {
                continue;
            }
            (p, v, a) = integrate(t[i], p, v, a, pattern[i]);
        }
        (b.pf - p) / self.v_max
    }

    /// Both acceleration plateaus and the cruise saturate. All ramp times
    /// follow from the limits, the plateau lengths from the velocity gaps,
    /// and the cruise closes the position.
    fn time_acc0_acc1_vel(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (v, a, j) = (self.v_max, self.a_max, self.j_max);
        let mut t = [0.0; 7];
        t[0] = (a - b.a0) / j;
        t[1] = (v - b.v0) / a + (b.a0 * b.a0 / 2.0 - a * a) / (a * j);
        t[2] = a / j;
        t[4] = a / j;
        t[5] = (v - b.vf) / a + (b.af * b.af / 2.0 - a * a) / (a * j);
        t[6] = (a + b.af) / j;
        t[3] = self.cruise(&t, b);
        self.try_push(t, Limits::Acc0Acc1Vel, b, flip, template);
    }

    /// Cruise and second plateau saturate; the first acceleration peak
    /// stays below the limit, so the up ramp is symmetric around its peak:
    /// `v_max - v0 = 2 a0 t0 + j t0^2 + a0^2/(2j)`.
    fn time_acc1_vel(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (v, a, j) = (self.v_max, self.a_max, self.j_max);
        let arg = b.a0 * b.a0 / 2.0 + j * (v - b.v0);
        if arg < 0.0 {
            return;
        }
        let u = arg.sqrt() / j;
        let mut t = [0.0; 7];
        t[0] = u - b.a0 / j;
        t[2] = u;
        t[4] = a / j;
        t[5] = (v - b.vf) / a + (b.af * b.af / 2.0 - a * a) / (a * j);
        t[6] = (a + b.af) / j;
        t[3] = self.cruise(&t, b);
        self.try_push(t, Limits::Acc1Vel, b, flip, template);
    }

    /// Cruise and first plateau saturate; the deceleration peak stays
    /// below the limit.
    fn time_acc0_vel(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (v, a, j) = (self.v_max, self.a_max, self.j_max);
        let arg = b.af * b.af / 2.0 + j * (v - b.vf);
        if arg < 0.0 {
            return;
        }
        let y = arg.sqrt() / j;
        let mut t = [0.0; 7];
        t[0] = (a - b.a0) / j;
        t[1] = (v - b.v0) / a + (b.a0 * b.a0 / 2.0 - a * a) / (a * j);
        t[2] = a / j;
        t[4] = y;
        t[6] = y + b.af / j;
        t[3] = self.cruise(&t, b);
        self.try_push(t, Limits::Acc0Vel, b, flip, template);
    }

    /// Only the cruise saturates; both acceleration peaks stay inside.
    fn time_vel(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (v, j) = (self.v_max, self.j_max);
        let arg0 = b.a0 * b.a0 / 2.0 + j * (v - b.v0);
        let arg_f = b.af * b.af / 2.0 + j * (v - b.vf);
        if arg0 < 0.0 || arg_f < 0.0 {
            return;
        }
        let u = arg0.sqrt() / j;
        let y = arg_f.sqrt() / j;
        let mut t = [0.0; 7];
        t[0] = u - b.a0 / j;
        t[2] = u;
        t[4] = y;
        t[6] = y + b.af / j;
        t[3] = self.cruise(&t, b);
        self.try_push(t, Limits::Vel, b, flip, template);
    }

    /// Both plateaus saturate but there is no cruise. The velocity balance
    /// ties the plateau lengths together (`t1 - t5` fixed) and the
    /// position becomes a quadratic in `t1`.
    fn time_acc0_acc1(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let t4 = a / j;
        let t6 = (a + b.af) / j;

        let h0 = (b.vf - b.v0 - (b.af * b.af - b.a0 * b.a0) / (2.0 * j)) / a;
        let d0 = b.v0 * t0 + b.a0 * t0 * t0 / 2.0 + j * t0 * t0 * t0 / 6.0;
        let v1 = b.v0 + b.a0 * t0 + j * t0 * t0 / 2.0;
        let big_d0 = d0 + v1 * t2 + a * t2 * t2 / 2.0 - j * t2 * t2 * t2 / 6.0;
        let big_d1 = v1 + a * t2;
        let c1v = b.v0 + (2.0 * a * a - b.a0 * b.a0) / (2.0 * j);
        let w = a * a / (2.0 * j) + a * t6;
        let k0 = -j * t4 * t4 * t4 / 6.0 - (a * a / (2.0 * j)) * t6 - a * t6 * t6 / 2.0
            + j * t6 * t6 * t6 / 6.0;

        let qb = big_d1 + c1v + a * t4 - a * a / (2.0 * j);
        let qc = big_d0 + c1v * (t4 + t6 - h0) - a * h0 * h0 / 2.0 + w * h0 + k0 - b.pd;

        if let Some((r0, r1)) = solve_quadratic(qb / a, qc / a) {
            for t1 in [r0, r1] {
                let t = [t0, t1, t2, 0.0, t4, t1 - h0, t6];
                self.try_push(t, Limits::Acc0Acc1, b, flip, template);
            }
        }
    }

    /// Only the second plateau saturates. With `u` the duration of the
    /// falling edge of the first hill (`vp = v0 - a0^2/(2j) + j u^2`), the
    /// position is a quartic in `u`.
    fn time_acc1(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (a, j) = (self.a_max, self.j_max);
        let t4 = a / j;
        let t6 = (a + b.af) / j;
        let g = b.v0 - b.a0 * b.a0 / (2.0 * j);

        let q1 = j / a;
        let q0 = (g - b.vf) / a - a / j + b.af * b.af / (2.0 * a * j);
        let s = t4 + t6 + q0;
        let w = a * a / (2.0 * j) + a * t6;
        let k0 = -j * t4 * t4 * t4 / 6.0 - (a * a / (2.0 * j)) * t6 - a * t6 * t6 / 2.0
            + j * t6 * t6 * t6 / 6.0;

        let c2 = j * s + q1 * (g - a * q0 - w);
        let c1 = 2.0 * b.v0 - b.a0 * b.a0 / j;
        let c0 = g * s - (a / 2.0) * q0 * q0 - w * q0 + k0 + b.a0 * b.a0 * b.a0 / (3.0 * j * j)
            - b.v0 * b.a0 / j;

        let scale = 2.0 * a / (j * j);
        let (roots, n) = solve_quart_monic(
            2.0 * a / j,
            scale * c2,
            scale * c1,
            scale * (c0 - b.pd),
        );
        for &u in roots.iter().take(n) {
            if u < 0.0 {
                continue;
            }
            let t = [u - b.a0 / j, 0.0, u, 0.0, t4, q0 + q1 * u * u, t6];
            self.try_push(t, Limits::Acc1, b, flip, template);
        }
    }

    /// Only the first plateau saturates; mirror image of `time_acc1` with
    /// the deceleration edge `y` as the unknown.
    fn time_acc0(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let h = b.vf - b.af * b.af / (2.0 * j);

        let d0 = b.v0 * t0 + b.a0 * t0 * t0 / 2.0 + j * t0 * t0 * t0 / 6.0;
        let v1 = b.v0 + b.a0 * t0 + j * t0 * t0 / 2.0;
        let big_d0 = d0 + v1 * t2 + a * t2 * t2 / 2.0 - j * t2 * t2 * t2 / 6.0;
        let big_d1 = v1 + a * t2;
        let c1v = b.v0 + (2.0 * a * a - b.a0 * b.a0) / (2.0 * j);

        let r1 = j / a;
        let r0 = (h - c1v) / a;
        let y2 = r1 * (big_d1 + a * r0);
        let y0 = big_d0 + big_d1 * r0 + (a / 2.0) * r0 * r0 + h * b.af / j
            + b.af * b.af * b.af / (6.0 * j * j);

        let scale = 2.0 * a / (j * j);
        let (roots, n) = solve_quart_monic(
            2.0 * a / j,
            scale * y2,
            scale * 2.0 * h,
            scale * (y0 - b.pd),
        );
        for &y in roots.iter().take(n) {
            if y < 0.0 {
                continue;
            }
            let t = [t0, r0 + r1 * y * y, t2, 0.0, y, 0.0, y + b.af / j];
            self.try_push(t, Limits::Acc0, b, flip, template);
        }
    }

    /// No limit saturates. With `u` the falling edge of the first hill and
    /// `y` the rising edge of the second, the velocity balance gives
    /// `y^2 = u^2 + K` and eliminating `y` from the position equation
    /// leaves a quartic in `u` (a cubic when `K` vanishes).
    fn time_none(&mut self, b: &Boundary, flip: bool, template: &Profile) {
        let j = self.j_max;
        let g = b.v0 - b.a0 * b.a0 / (2.0 * j);
        let k = (b.v0 - b.vf + (b.af * b.af - b.a0 * b.a0) / (2.0 * j)) / j;
        let beta = b.pd + b.v0 * b.a0 / j - b.a0 * b.a0 * b.a0 / (3.0 * j * j)
            - b.af * (g / j - k)
            - b.af * b.af * b.af / (6.0 * j * j);

        let mut roots = [0.0; 4];
        let mut n = 0;
        if k.abs() > 1e-12 {
            let m = 2.0 * g - j * k;
            let div = -j * j * k;
            (roots, n) = solve_quart_monic(
                2.0 * j * beta / div,
                -j * j * k * k / div,
                4.0 * g * beta / div,
                (m * m * k - beta * beta) / div,
            );
        } else if beta.abs() > 1e-12 {
            let div = 2.0 * j * beta;
            let (cubic_roots, cubic_n) = solve_cubic(
                -j * j * k * k / div,
                4.0 * g * beta / div,
                ((2.0 * g - j * k) * (2.0 * g - j * k) * k - beta * beta) / div,
            );
            roots[..cubic_n].copy_from_slice(&cubic_roots[..cubic_n]);
            n = cubic_n;
        } else {
            // Target already reached up to tolerance; the empty profile is
            // the candidate.
            roots[0] = 0.0;
            n = 1;
        }

        for &u in roots.iter().take(n) {
            if u < 0.0 {
                continue;
            }
            let ysq = u * u + k;
            if ysq < 0.0 {
                continue;
            }
            let y = ysq.sqrt();
            let t = [u - b.a0 / j, 0.0, u, 0.0, y, 0.0, y + b.af / j];
            self.try_push(t, Limits::None, b, flip, template);
        }
    }

    /// Sort the surviving candidates by duration and derive the block:
    /// minimum plus up to two gaps between adjacent extremal durations,
    /// each gap owned by the profile at its right endpoint. Durations are
    /// brake-inclusive so the synchronizer compares total times.
    fn finalize(&mut self) -> Option<Block> {
        if self.valid_profiles.is_empty() {
            return None;
        }
        self.valid_profiles
            .sort_by(|x, y| x.duration().total_cmp(&y.duration()));
        self.valid_profiles
            .dedup_by(|x, y| (x.duration() - y.duration()).abs() < BOUNDARY_EPS);

        let t_brake = self.valid_profiles[0].t_brake.unwrap_or(0.0);
        let mut block = Block {
            t_min: self.valid_profiles[0].duration() + t_brake,
            p_min: self.valid_profiles[0].clone(),
            ..Block::default()
        };
        if self.valid_profiles.len() >= 3 {
            block.a = Some(Interval {
                left: self.valid_profiles[1].duration() + t_brake,
                right: self.valid_profiles[2].duration() + t_brake,
            });
            block.p_a = Some(self.valid_profiles[2].clone());
        }
        if self.valid_profiles.len() >= 5 {
            block.b = Some(Interval {
                left: self.valid_profiles[3].duration() + t_brake,
                right: self.valid_profiles[4].duration() + t_brake,
            });
            block.p_b = Some(self.valid_profiles[4].clone());
        }
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64, v: f64, a: f64, j: f64) -> Block {
        let mut step1 = Step1::new(p0, v0, a0, pf, vf, af, v, a, j);
        step1.block(&Profile::default()).expect("no feasible profile")
    }

    #[test]
    fn rest_to_rest_short_move() {
        // Pure S-curve, no limit reached: T = (32 d / j)^(1/3).
        let block = solve(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert!((block.t_min - 32.0f64.cbrt()).abs() < 1e-9);
        assert_eq!(block.p_min.limits, Limits::None);
        assert_eq!(block.p_min.direction, Direction::Up);
    }

    #[test]
    fn rest_to_rest_with_cruise() {
        // Long move: ramps take v_max/a_max + a_max/j_max on each side.
        let block = solve(0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert!((block.t_min - 12.0).abs() < 1e-9);
        assert_eq!(block.p_min.limits, Limits::Acc0Acc1Vel);
        assert!(block.p_min.t[3] > 0.0);
    }

    #[test]
    fn rest_to_rest_acceleration_limited() {
        // Velocity limit far away: trapezoid acceleration with plateaus.
        let block = solve(0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 100.0, 1.0, 1.0);
        let s = (-3.0 + 41.0f64.sqrt()) / 2.0;
        assert!((block.t_min - (4.0 + 2.0 * s)).abs() < 1e-9);
        assert_eq!(block.p_min.limits, Limits::Acc0Acc1);
    }

    #[test]
    fn negative_move_uses_down_family() {
        let block = solve(0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert!((block.t_min - 32.0f64.cbrt()).abs() < 1e-9);
        assert_eq!(block.p_min.direction, Direction::Down);
        assert!((block.p_min.p[7] + 1.0).abs() < 1e-8);
    }

    #[test]
    fn nonzero_target_velocity() {
        let block = solve(0.0, 0.0, 0.0, 2.0, 0.5, 0.0, 1.0, 2.0, 3.0);
        let p = &block.p_min;
        assert!((p.v[7] - 0.5).abs() < 1e-8);
        assert!((p.p[7] - 2.0).abs() < 1e-8);
        // Cruise at the velocity limit, both ramps inside the
        // acceleration limit.
        assert_eq!(p.limits, Limits::Vel);
        let expected = (1.0f64 / 3.0).sqrt() * 2.0 + (0.5f64 / 3.0).sqrt() * 2.0;
        let ramp_distance: f64 = 0.5 * (1.0f64 / 3.0).sqrt() * 2.0 + 0.75 * (0.5f64 / 3.0).sqrt() * 2.0;
        let cruise = (2.0 - ramp_distance) / 1.0;
        assert!((block.t_min - (expected + cruise)).abs() < 1e-9);
    }

    #[test]
    fn nonzero_initial_acceleration() {
        let block = solve(0.0, 0.2, 0.5, 3.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let p = &block.p_min;
        assert!((p.p[7] - 3.0).abs() < 1e-8);
        assert!(p.v[7].abs() < 1e-8);
        assert!(p.a[7].abs() < 1e-8);
        for i in 2..8 {
            assert!(p.a[i].abs() <= 1.0 + 1e-9);
        }
        for i in 3..8 {
            assert!(p.v[i].abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn short_move_against_initial_velocity() {
        // Moving target behind the current motion direction: the axis has
        // to overshoot and come back, which the down family covers.
        let block = solve(0.0, 0.5, 0.0, -0.5, 0.0, 0.0, 1.0, 1.0, 1.0);
        let p = &block.p_min;
        assert!((p.p[7] + 0.5).abs() < 1e-8);
        assert!(p.v[7].abs() < 1e-8);
        assert_eq!(p.direction, Direction::Down);
    }

    #[test]
    fn blocked_interval_appears_for_reversal() {
        // Overtaking start: moving at 0.5 toward a target 0.4 away that
        // must be crossed at 0.3. Three extremal profiles exist: arrive
        // directly, dip shallowly below the target velocity, or dip deep
        // through a reversal. The durations between the two dips have no
        // profile, so they form a forbidden interval.
        let block = solve(0.0, 0.5, 0.0, 0.4, 0.3, 0.0, 1.0, 1.0, 1.0);
        assert!((block.t_min - 0.978).abs() < 2e-2);

        let interval = block.a.expect("expected a forbidden interval");
        assert!(interval.left > block.t_min);
        assert!(interval.right > interval.left);
        assert!((interval.left - 1.041).abs() < 2e-2);
        assert!((interval.right - 2.912).abs() < 2e-2);

        let p_a = block.p_a.as_ref().expect("right-endpoint profile");
        assert!((p_a.duration() - interval.right).abs() < 1e-9);
        assert!(block.is_blocked(0.5 * (interval.left + interval.right)));
        assert!(!block.is_blocked(interval.right));
    }
}
