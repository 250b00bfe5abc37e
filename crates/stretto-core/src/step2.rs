//! Per-axis fixed-duration profile solver.
//!
//! Reconstructs a seven-segment profile whose total duration is exactly
//! the synchronized time. The sweep mirrors the time-optimal solver, but
//! the residual freedom differs per shape: cruise-bearing profiles solve
//! for the plateau velocity, no-cruise profiles trade jerk for time (the
//! jerk-bounded check validates the solved magnitude). The two shapes
//! whose elimination is not polynomial fall back to a bracketed secant on
//! their scalar unknown.

use crate::profile::{integrate, Direction, Limits, Profile, Teeth};
use crate::roots::{secant_bracketed, solve_quadratic, solve_quart_monic};
use crate::step1::Boundary;

const T_SNAP: f64 = 1e-9;
// Near-zero boundary kinematics select the degenerate closed forms.
const ZERO_EPS: f64 = 1e-12;

pub struct Step2 {
    tf: f64,
    bounds: Boundary,
    v_max: f64,
    a_max: f64,
    j_max: f64,
}

impl Step2 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tf: f64,
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
            tf,
            bounds: Boundary::new(p0, v0, a0, pf, vf, af),
            v_max,
            a_max,
            j_max,
        }
    }

    /// Find a feasible profile of duration `tf`, trying the `Up` family
    /// and then the mirrored `Down` family. Returns the first match.
    pub fn profile(&self, template: &Profile) -> Option<Profile> {
        for flip in [false, true] {
            let b = if flip {
                self.bounds.flipped()
            } else {
                self.bounds
            };
            let found = self
                .time_acc0_acc1_vel(&b, flip, template)
                .or_else(|| self.time_acc1_vel(&b, flip, template))
                .or_else(|| self.time_acc0_vel(&b, flip, template))
                .or_else(|| self.time_vel(&b, flip, template))
                .or_else(|| self.time_none(&b, flip, template))
                .or_else(|| self.time_acc0_acc1(&b, flip, template))
                .or_else(|| self.time_double_hump(&b, flip, template))
                .or_else(|| self.time_acc1(&b, flip, template))
                .or_else(|| self.time_acc0(&b, flip, template));
            if found.is_some() {
                return found;
            }
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn try_profile(
        &self,
        mut t: [f64; 7],
        jf: f64,
        teeth: Teeth,
        limits: Limits,
        b: &Boundary,
        flip: bool,
        template: &Profile,
    ) -> Option<Profile> {
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
        if profile.check_with_jerk(
            self.tf, teeth, b.pf, b.vf, b.af, jf, self.v_max, self.a_max, self.j_max,
        ) {
            profile.limits = limits;
            profile.direction = Direction::Up;
            if flip {
                profile.flip_sign();
            }
            return Some(profile);
        }
        None
    }

    /// Both plateaus plus a cruise. The plateau velocity `vp` is the
    /// unknown; plateau lengths are linear in `vp`, the cruise absorbs the
    /// remaining time, and the position closes a quadratic in `vp`.
    fn time_acc0_acc1_vel(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let t4 = a / j;
        let t6 = (a + b.af) / j;
        let t_fixed = t0 + t2 + t4 + t6;

        let c1v = b.v0 + (2.0 * a * a - b.a0 * b.a0) / (2.0 * j);
        let c5v = b.vf + (2.0 * a * a - b.af * b.af) / (2.0 * j);
        let d0 = b.v0 * t0 + b.a0 * t0 * t0 / 2.0 + j * t0 * t0 * t0 / 6.0;
        let v1 = b.v0 + b.a0 * t0 + j * t0 * t0 / 2.0;
        let big_d0 = d0 + v1 * t2 + a * t2 * t2 / 2.0 - j * t2 * t2 * t2 / 6.0;
        let big_d1 = v1 + a * t2;
        let w = a * a / (2.0 * j) + a * t6;
        let k0 = -j * t4 * t4 * t4 / 6.0 - (a * a / (2.0 * j)) * t6 - a * t6 * t6 / 2.0
            + j * t6 * t6 * t6 / 6.0;

        let big_t0 = self.tf - t_fixed + (c1v + c5v) / a;
        let b1 = big_d1 / a - c1v / a + big_t0 + t4 + t6 - w / a;
        let b0 = big_d0 - big_d1 * c1v / a + c1v * c1v / (2.0 * a) - c5v * c5v / (2.0 * a)
            + w * c5v / a
            + k0;

        let (r0, r1) = solve_quadratic(-a * b1, a * (b.pd - b0))?;
        for vp in [r0, r1] {
            let t1 = (vp - c1v) / a;
            let t5 = (vp - c5v) / a;
            let t3 = self.tf - t_fixed - t1 - t5;
            let t = [t0, t1, t2, t3, t4, t5, t6];
            if let Some(p) = self.try_profile(t, j, Teeth::Uddu, Limits::Acc0Acc1Vel, b, flip, template)
            {
                return Some(p);
            }
        }
        None
    }

    /// Second plateau plus cruise, first acceleration peak free. With `u`
    /// the falling edge of the first hill, the position is a quartic in
    /// `u` whose linear term cancels.
    fn time_acc1_vel(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let t4 = a / j;
        let t6 = (a + b.af) / j;
        let g = b.v0 - b.a0 * b.a0 / (2.0 * j);
        let c5v = b.vf + (2.0 * a * a - b.af * b.af) / (2.0 * j);
        let e0 = g - c5v;
        let w = a * a / (2.0 * j) + a * t6;
        let k0 = -j * t4 * t4 * t4 / 6.0 - (a * a / (2.0 * j)) * t6 - a * t6 * t6 / 2.0
            + j * t6 * t6 * t6 / 6.0;

        let big_t = self.tf + b.a0 / j - t4 - t6 - e0 / a;
        let c2 = j * big_t - g * j / a + j * (t4 + t6) + (c5v - w) * j / a + e0 * j / a;
        let c0 = -b.v0 * b.a0 / j + b.a0 * b.a0 * b.a0 / (3.0 * j * j) + g * big_t
            + g * (t4 + t6)
            + (c5v - w) * e0 / a
            + e0 * e0 / (2.0 * a)
            + k0;

        let scale = 2.0 * a / (j * j);
        let (roots, n) =
            solve_quart_monic(2.0 * a / j, -scale * c2, 0.0, scale * (b.pd - c0));
        for &u in roots.iter().take(n) {
            if u < 0.0 {
                continue;
            }
            let t0 = u - b.a0 / j;
            let t5 = (g + j * u * u - c5v) / a;
            let t3 = self.tf - (t0 + u + t4 + t5 + t6);
            let t = [t0, 0.0, u, t3, t4, t5, t6];
            if let Some(p) = self.try_profile(t, j, Teeth::Uddu, Limits::Acc1Vel, b, flip, template) {
                return Some(p);
            }
        }
        None
    }

    /// First plateau plus cruise, deceleration peak free; mirror of
    /// `time_acc1_vel` in the deceleration edge `y`.
    fn time_acc0_vel(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let h = b.vf - b.af * b.af / (2.0 * j);
        let c1v = b.v0 + (2.0 * a * a - b.a0 * b.a0) / (2.0 * j);
        let f0 = h - c1v;
        let d0 = b.v0 * t0 + b.a0 * t0 * t0 / 2.0 + j * t0 * t0 * t0 / 6.0;
        let v1 = b.v0 + b.a0 * t0 + j * t0 * t0 / 2.0;
        let big_d0 = d0 + v1 * t2 + a * t2 * t2 / 2.0 - j * t2 * t2 * t2 / 6.0;
        let big_d1 = v1 + a * t2;

        let big_t = self.tf - t0 - t2 - b.af / j - f0 / a;
        let c2 = j * (big_d1 / a + f0 / a - h / a + big_t);
        let c0 = big_d0 + big_d1 * f0 / a + f0 * f0 / (2.0 * a) + h * big_t + h * b.af / j
            + b.af * b.af * b.af / (6.0 * j * j);

        let scale = 2.0 * a / (j * j);
        let (roots, n) =
            solve_quart_monic(2.0 * a / j, -scale * c2, 0.0, scale * (b.pd - c0));
        for &y in roots.iter().take(n) {
            if y < 0.0 {
                continue;
            }
            let t1 = (f0 + j * y * y) / a;
            let t6 = y + b.af / j;
            let t3 = self.tf - (t0 + t1 + t2 + 2.0 * y + b.af / j);
            let t = [t0, t1, t2, t3, y, 0.0, t6];
            if let Some(p) = self.try_profile(t, j, Teeth::Uddu, Limits::Acc0Vel, b, flip, template) {
                return Some(p);
            }
        }
        None
    }

    /// Cruise with both acceleration peaks free. The position equation in
    /// the plateau velocity is not polynomial, so bracket it between the
    /// entry velocities and the velocity limit and run the secant.
    fn time_vel(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let j = self.j_max;
        let g = b.v0 - b.a0 * b.a0 / (2.0 * j);
        let h = b.vf - b.af * b.af / (2.0 * j);
        let lo = g.max(h) + 1e-14;
        let hi = self.v_max;
        if lo >= hi {
            return None;
        }

        let shape = |vp: f64| -> ([f64; 7], f64) {
            let u = ((vp - b.v0) / j + b.a0 * b.a0 / (2.0 * j * j)).max(0.0).sqrt();
            let y = ((vp - b.vf) / j + b.af * b.af / (2.0 * j * j)).max(0.0).sqrt();
            let t0 = u - b.a0 / j;
            let t6 = y + b.af / j;
            let t3 = self.tf - (t0 + u + y + t6);
            ([t0, 0.0, u, t3, y, 0.0, t6], vp)
        };
        let residual = |vp: f64| -> f64 {
            let (t, _) = shape(vp);
            let pattern = [j, 0.0, -j, 0.0, -j, 0.0, j];
            let (mut p, mut v, mut a) = (b.p0, b.v0, b.a0);
            for i in 0..7 {
                (p, v, a) = integrate(t[i], p, v, a, pattern[i]);
            }
            p - b.pf
        };

        let vp = secant_bracketed(residual, lo, hi, 1e-12)?;
        let (t, _) = shape(vp);
        self.try_profile(t, j, Teeth::Uddu, Limits::Vel, b, flip, template)
    }

    /// No saturated limit: four ramps whose jerk magnitude is the
    /// remaining freedom. Zero-boundary cases close in closed form, the
    /// general case via a bracketed secant on the jerk.
    fn time_none(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let tf = self.tf;

        if b.v0.abs() < ZERO_EPS
            && b.a0.abs() < ZERO_EPS
            && b.vf.abs() < ZERO_EPS
            && b.af.abs() < ZERO_EPS
        {
            // Rest to rest: four quarters, jerk from the distance.
            let jf = 32.0 * b.pd / (tf * tf * tf);
            let q = tf / 4.0;
            let t = [q, 0.0, q, 0.0, q, 0.0, q];
            return self.try_profile(t, jf, Teeth::Uddu, Limits::None, b, flip, template);
        }

        if b.a0.abs() < ZERO_EPS && b.af.abs() < ZERO_EPS {
            // Zero boundary accelerations: the position reduces to
            // pd - tf*(v0+vf)/2 = jf*tf^3/32 - (v0-vf)^2/(2*jf*tf),
            // a quadratic in the jerk.
            let vd = b.v0 - b.vf;
            let h = b.pd - tf * (b.v0 + b.vf) / 2.0;
            if let Some((n0, n1)) =
                solve_quadratic(-32.0 * h / (tf * tf * tf), -16.0 * vd * vd / (tf * tf * tf * tf))
            {
                for jf in [n0, n1] {
                    if jf.abs() < ZERO_EPS {
                        continue;
                    }
                    let w = vd / (jf * tf);
                    let u = tf / 4.0 - w;
                    let y = tf / 4.0 + w;
                    let t = [u, 0.0, u, 0.0, y, 0.0, y];
                    if let Some(p) =
                        self.try_profile(t, jf, Teeth::Uddu, Limits::None, b, flip, template)
                    {
                        return Some(p);
                    }
                }
            }
            return None;
        }

        // General boundary state. The time and velocity balances fix both
        // edges for a given jerk: u + y = S and y^2 - u^2 = K, so the
        // position residual is a scalar function of the jerk alone.
        let shape = |n: f64| -> [f64; 7] {
            let s = (tf * n + b.a0 - b.af) / (2.0 * n);
            let k = ((b.v0 - b.vf) * n + (b.af * b.af - b.a0 * b.a0) / 2.0) / (n * n);
            let ratio = if s.abs() > 1e-300 { k / s } else { 0.0 };
            let u = ((s - ratio) / 2.0).max(0.0);
            let y = ((s + ratio) / 2.0).max(0.0);
            [u - b.a0 / n, 0.0, u, 0.0, y, 0.0, y + b.af / n]
        };
        let mut residual = |n: f64| -> f64 {
            let t = shape(n);
            let pattern = [n, 0.0, -n, 0.0, -n, 0.0, n];
            let (mut p, mut v, mut a) = (b.p0, b.v0, b.a0);
            for i in 0..7 {
                (p, v, a) = integrate(t[i].max(0.0), p, v, a, pattern[i]);
            }
            p - b.pf
        };

        // Log-spaced scan for a sign change, finest jerk first.
        let mut prev: Option<(f64, f64)> = None;
        for k in 0..16 {
            let n = self.j_max * 10f64.powf(-6.0 * (15 - k) as f64 / 15.0);
            let r = residual(n);
            if let Some((n_prev, r_prev)) = prev {
                if r_prev.signum() != r.signum() {
                    if let Some(jf) = secant_bracketed(&mut residual, n_prev, n, 1e-14) {
                        let t = shape(jf);
                        if let Some(p) =
                            self.try_profile(t, jf, Teeth::Uddu, Limits::None, b, flip, template)
                        {
                            return Some(p);
                        }
                    }
                }
            }
            prev = Some((n, r));
        }
        None
    }

    /// Both plateaus, no cruise. The plateau lengths are fixed by the
    /// time and velocity balances; the candidate only survives when the
    /// position happens to close, which is exactly the situation at a
    /// blocked interval's endpoint.
    fn time_acc0_acc1(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let t4 = a / j;
        let t6 = (a + b.af) / j;
        let r = self.tf - (t0 + t2 + t4 + t6);
        let h0 = (b.vf - b.v0 - (b.af * b.af - b.a0 * b.a0) / (2.0 * j)) / a;
        let t1 = (r + h0) / 2.0;
        let t5 = (r - h0) / 2.0;
        let t = [t0, t1, t2, 0.0, t4, t5, t6];
        self.try_profile(t, j, Teeth::Uddu, Limits::Acc0Acc1, b, flip, template)
    }

    /// Two rising hills (UDUD teeth), both plateaus at `+a_max`. Shifting
    /// plateau time between the hills moves the position linearly, so the
    /// split closes in closed form.
    fn time_double_hump(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let t4 = a / j;
        let t6 = (a - b.af) / j;
        let r = self.tf - (t0 + t2 + t4 + t6);
        if r < 0.0 {
            return None;
        }

        let pattern = [j, 0.0, -j, 0.0, j, 0.0, -j];
        let base = [t0, 0.0, t2, 0.0, t4, r, t6];
        let (mut p, mut v, mut acc) = (b.p0, b.v0, b.a0);
        for i in 0..7 {
            (p, v, acc) = integrate(base[i], p, v, acc, pattern[i]);
        }
        let sigma = (b.pf - p) * j / (a * a);
        let t = [t0, sigma, t2, 0.0, t4, r - sigma, t6];
        self.try_profile(t, j, Teeth::Udud, Limits::Acc0Acc1, b, flip, template)
    }

    /// Second plateau only, no cruise: the first hill's edge comes from a
    /// quadratic once the plateau absorbs the remaining time.
    fn time_acc1(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let g = b.v0 - b.a0 * b.a0 / (2.0 * j);
        let tau = self.tf + b.a0 / j - (2.0 * a + b.af) / j;
        let c = g - (2.0 * a * a - b.af * b.af) / (2.0 * j) - a * tau - b.vf;
        let (r0, r1) = solve_quadratic(2.0 * a / j, c / j)?;
        for u in [r0, r1] {
            if u < 0.0 {
                continue;
            }
            let t5 = tau - 2.0 * u;
            let t = [u - b.a0 / j, 0.0, u, 0.0, a / j, t5, (a + b.af) / j];
            if let Some(p) = self.try_profile(t, j, Teeth::Uddu, Limits::Acc1, b, flip, template) {
                return Some(p);
            }
        }
        None
    }

    /// First plateau only, no cruise; mirror of `time_acc1`.
    fn time_acc0(&self, b: &Boundary, flip: bool, template: &Profile) -> Option<Profile> {
        let (a, j) = (self.a_max, self.j_max);
        let t0 = (a - b.a0) / j;
        let t2 = a / j;
        let c1v = b.v0 + (2.0 * a * a - b.a0 * b.a0) / (2.0 * j);
        let tau = self.tf - t0 - t2 - b.af / j;
        let c = c1v + a * tau + b.af * b.af / (2.0 * j) - b.vf;
        let (r0, r1) = solve_quadratic(2.0 * a / j, -c / j)?;
        for y in [r0, r1] {
            if y < 0.0 {
                continue;
            }
            let t1 = tau - 2.0 * y;
            let t = [t0, t1, t2, 0.0, y, 0.0, y + b.af / j];
            if let Some(p) = self.try_profile(t, j, Teeth::Uddu, Limits::Acc0, b, flip, template) {
                return Some(p);
            }
        }
        None
    }
}
