//! Real roots of the low-degree polynomials the profile solvers produce,
//! plus a bracketed secant for the two cases whose elimination is not
//! polynomial.
//!
//! Everything here is deterministic: fixed algorithms, fixed iteration
//! caps, no randomized pivoting.

/// Real roots of the monic quadratic `x^2 + b x + c`, smaller root first.
pub fn solve_quadratic(b: f64, c: f64) -> Option<(f64, f64)> {
    let disc = b * b - 4.0 * c;
    if disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    // Evaluate the well-conditioned root first and derive the other from
    // the product, avoiding cancellation.
    let q = -0.5 * (b + b.signum() * s);
    let (r0, r1) = if q == 0.0 { (0.0, 0.0) } else { (q, c / q) };
    Some(if r0 <= r1 { (r0, r1) } else { (r1, r0) })
}

/// Real roots of the monic cubic `x^3 + a x^2 + b x + c`.
pub fn solve_cubic(a: f64, b: f64, c: f64) -> ([f64; 3], usize) {
    // Depressed form t^3 + p t + q with x = t - a/3.
    let p = b - a * a / 3.0;
    let q = 2.0 * a * a * a / 27.0 - a * b / 3.0 + c;
    let shift = a / 3.0;

    let mut roots = [0.0; 3];
    let half_q = q / 2.0;
    let third_p = p / 3.0;
    let disc = half_q * half_q + third_p * third_p * third_p;

    let n = if disc > 0.0 {
        // One real root (Cardano).
        let s = disc.sqrt();
        let u = (-half_q + s).cbrt();
        let v = (-half_q - s).cbrt();
        roots[0] = u + v - shift;
        1
    } else if disc == 0.0 && q == 0.0 && p == 0.0 {
        roots[0] = -shift;
        1
    } else {
        // Three real roots (trigonometric form).
        let m = (-third_p).sqrt();
        let theta = (-half_q / (m * m * m)).clamp(-1.0, 1.0).acos() / 3.0;
        for (k, root) in roots.iter_mut().enumerate() {
            let angle = theta - 2.0 * std::f64::consts::PI * k as f64 / 3.0;
            *root = 2.0 * m * angle.cos() - shift;
        }
        3
    };
    (roots, n)
}

/// Real roots of the monic quartic `x^4 + a x^3 + b x^2 + c x + d`,
/// polished with a couple of Newton steps.
pub fn solve_quart_monic(a: f64, b: f64, c: f64, d: f64) -> ([f64; 4], usize) {
    let mut roots = [0.0; 4];
    let mut n = 0;

    // Depressed form y^4 + p y^2 + q y + r with x = y - a/4.
    let a2 = a * a;
    let p = b - 3.0 * a2 / 8.0;
    let q = c - a * b / 2.0 + a2 * a / 8.0;
    let r = d - a * c / 4.0 + a2 * b / 16.0 - 3.0 * a2 * a2 / 256.0;
    let shift = a / 4.0;

    let mut push = |roots: &mut [f64; 4], n: &mut usize, y: f64| {
        roots[*n] = y - shift;
        *n += 1;
    };

    if q.abs() < 1e-12 {
        // Biquadratic.
        if let Some((z0, z1)) = solve_quadratic(p, r) {
            for z in [z0, z1] {
                if z >= 0.0 {
                    let s = z.sqrt();
                    push(&mut roots, &mut n, s);
                    push(&mut roots, &mut n, -s);
                }
            }
        }
    } else {
        // Ferrari: factor into two quadratics via a positive root m of the
        // resolvent cubic.
        let (res, res_n) = solve_cubic(p, p * p / 4.0 - r, -q * q / 8.0);
        let mut m = f64::NAN;
        for &candidate in res.iter().take(res_n) {
            if candidate > 0.0 && (m.is_nan() || candidate > m) {
                m = candidate;
            }
        }
        if !m.is_nan() {
            let s = (2.0 * m).sqrt();
            let base = p / 2.0 + m;
            let offset = q / (2.0 * s);
            if let Some((y0, y1)) = solve_quadratic(s, base - offset) {
                push(&mut roots, &mut n, y0);
                push(&mut roots, &mut n, y1);
            }
            if let Some((y0, y1)) = solve_quadratic(-s, base + offset) {
                push(&mut roots, &mut n, y0);
                push(&mut roots, &mut n, y1);
            }
        }
    }

    // Newton polish against the original quartic.
    for root in roots.iter_mut().take(n) {
        let mut x = *root;
        for _ in 0..2 {
            let f = (((x + a) * x + b) * x + c) * x + d;
            let df = ((4.0 * x + 3.0 * a) * x + 2.0 * b) * x + c;
            if df != 0.0 {
                x -= f / df;
            }
        }
        *root = x;
    }

    (roots, n)
}

/// Find a root of `f` inside `[lo, hi]`, which must bracket a sign change.
/// Secant steps with a bisection fallback when the guess leaves the
/// bracket, after the same scheme the step generator uses for its position
/// equation.
pub fn secant_bracketed(mut f: impl FnMut(f64) -> f64, lo: f64, hi: f64, tol: f64) -> Option<f64> {
    let mut a = lo;
    let mut b = hi;
    let mut fa = f(a);
    let mut fb = f(b);
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa.signum() == fb.signum() {
        return None;
    }

    for _ in 0..64 {
        if (b - a).abs() < tol {
            break;
        }
        let mut x = (a * fb - b * fa) / (fb - fa);
        if !(x > a.min(b) && x < a.max(b)) {
            // A poor guess - fall back to bisection
            x = 0.5 * (a + b);
        }
        let fx = f(x);
        if fx == 0.0 {
            return Some(x);
        }
        if fx.signum() == fa.signum() {
            a = x;
            fa = fx;
        } else {
            b = x;
            fb = fx;
        }
    }
    Some(0.5 * (a + b))
}
