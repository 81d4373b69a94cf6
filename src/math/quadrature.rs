//! Numeric integration and monotone root finding.

/// Composite Simpson's rule over `[a, b]` with `intervals` sub-intervals.
///
/// `intervals` is rounded up to the next even number (minimum 2).
#[must_use]
pub fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, intervals: usize) -> f64 {
    let n = intervals.max(2);
    let n = if n % 2 == 0 { n } else { n + 1 };
    #[allow(clippy::cast_precision_loss)]
    let h = (b - a) / n as f64;
    if h.abs() < f64::MIN_POSITIVE {
        return 0.0;
    }
    let mut sum = f(a) + f(b);
    for i in 1..n {
        #[allow(clippy::cast_precision_loss)]
        let x = a + h * i as f64;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

/// Solves `f(x) = target` for a nondecreasing `f` on `[lo, hi]`.
///
/// Newton steps use the derivative `df`; whenever a step leaves the current
/// bracket or the derivative vanishes, the solver falls back to bisection.
/// The bracket shrinks on every iteration, so the solver always terminates.
#[must_use]
pub fn solve_monotone<F, D>(f: F, df: D, target: f64, lo: f64, hi: f64, tolerance: f64) -> f64
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = (lo.min(hi), lo.max(hi));
    if f(lo) >= target {
        return lo;
    }
    if f(hi) <= target {
        return hi;
    }
    let mut x = 0.5 * (lo + hi);
    for _ in 0..100 {
        let fx = f(x) - target;
        if fx.abs() <= tolerance {
            return x;
        }
        if fx < 0.0 {
            lo = x;
        } else {
            hi = x;
        }
        if hi - lo <= tolerance * 1e-3 {
            break;
        }
        let d = df(x);
        let newton = if d.abs() > f64::EPSILON { x - fx / d } else { f64::NAN };
        x = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }
    x
}

/// Binary search for the smallest `x` in `[lo, hi]` with `f(x) >= target`.
///
/// `f` must be nondecreasing on the interval. Returns `None` when even
/// `f(hi)` stays below `target`. The returned value always satisfies
/// `f(x) >= target`.
#[must_use]
pub fn smallest_reaching<F: Fn(f64) -> f64>(
    f: F,
    target: f64,
    lo: f64,
    hi: f64,
    iterations: usize,
) -> Option<f64> {
    if f(lo) >= target {
        return Some(lo);
    }
    if f(hi) < target {
        return None;
    }
    let (mut lo, mut hi) = (lo, hi);
    for _ in 0..iterations {
        let mid = 0.5 * (lo + hi);
        if f(mid) >= target {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(hi)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn simpson_is_exact_for_cubics() {
        let v = simpson(|x| x * x * x - 2.0 * x, 0.0, 2.0, 2);
        assert!((v - 0.0).abs() < 1e-12);
    }

    #[test]
    fn simpson_integrates_sine() {
        let v = simpson(f64::sin, 0.0, PI, 64);
        assert!((v - 2.0).abs() < 1e-6);
    }

    #[test]
    fn simpson_rounds_odd_intervals_up() {
        let v = simpson(|x| x * x, 0.0, 3.0, 3);
        assert!((v - 9.0).abs() < 1e-12);
    }

    #[test]
    fn solve_square_root() {
        let x = solve_monotone(|x| x * x, |x| 2.0 * x, 2.0, 0.0, 2.0, 1e-12);
        assert!((x - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn solve_with_flat_derivative_falls_back() {
        // Derivative claims zero everywhere; bisection alone must converge.
        let x = solve_monotone(|x| x, |_| 0.0, 0.3, 0.0, 1.0, 1e-10);
        assert!((x - 0.3).abs() < 1e-8);
    }

    #[test]
    fn solve_clamps_outside_range() {
        assert!((solve_monotone(|x| x, |_| 1.0, -1.0, 0.0, 1.0, 1e-9)).abs() < 1e-12);
        assert!((solve_monotone(|x| x, |_| 1.0, 5.0, 0.0, 1.0, 1e-9) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn smallest_reaching_is_tight() {
        let x = smallest_reaching(|x| x * 10.0, 3.0, 0.0, 1.0, 60).unwrap();
        assert!(x * 10.0 >= 3.0);
        assert!((x - 0.3).abs() < 1e-12);
        assert!(smallest_reaching(|x| x, 5.0, 0.0, 1.0, 60).is_none());
    }
}
