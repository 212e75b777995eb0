// src/integration/integrator.rs

//! Adaptive Gauss-Kronrod integrator.
//!
//! Intervals are bisected breadth-first until each piece either meets the
//! error density target or becomes smaller than the minimum size. Both
//! thresholds are derived once from the original interval:
//!
//! - `min_interval_size = 1.5 * L * 2^(-max_depth)`
//! - `target_error_density = tolerance / L`
//!
//! Infinite bounds are mapped onto finite ones:
//!
//! - `(-inf, inf)`: `x = t / (1 - t^2)` on `(-1, 1)`
//! - `(-inf, b)`: `x = b - (1 - t) / t` on `(0, 1)`
//! - `(a, inf)`: `x = a + t / (1 - t)` on `(0, 1)`

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::gauss_kronrod::gauss_kronrod_15;
use super::interval::Interval;

/// Intervals shorter than this integrate to zero.
const DEGENERATE_LENGTH: f64 = 1e-15;

/// Settings for adaptive quadrature. Cheap to copy; carries no state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Integrator {
    /// Absolute error tolerance over the whole interval.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Maximum number of bisection levels.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_depth() -> u32 {
    10
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_depth: default_max_depth(),
        }
    }
}

impl Integrator {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Integrates `f` over `(a, b)`.
    ///
    /// Inverted bounds flip the sign, near-equal bounds give `0.0`, and
    /// infinite bounds are handled through a change of variable.
    pub fn integrate<F>(&self, f: F, a: f64, b: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        if a > b {
            return -self.integrate(f, b, a);
        }
        // Equal infinite bounds included: their difference is NaN.
        if a == b || (b - a).abs() < DEGENERATE_LENGTH {
            return 0.0;
        }

        match (a == f64::NEG_INFINITY, b == f64::INFINITY) {
            (true, true) => self.adaptive(
                &|t: f64| {
                    let v = 1.0 - t * t;
                    f(t / v) * (1.0 + t * t) / (v * v)
                },
                Interval::new(-1.0, 1.0),
            ),
            (true, false) => self.adaptive(
                &|t: f64| f(b - (1.0 - t) / t) / (t * t),
                Interval::new(0.0, 1.0),
            ),
            (false, true) => self.adaptive(
                &|t: f64| {
                    let v = 1.0 - t;
                    f(a + t / v) / (v * v)
                },
                Interval::new(0.0, 1.0),
            ),
            (false, false) => self.adaptive(&f, Interval::new(a, b)),
        }
    }

    fn adaptive<F>(&self, f: &F, original: Interval) -> f64
    where
        F: Fn(f64) -> f64 + ?Sized,
    {
        let total_length = original.length();
        let criterion = ConvergenceCriterion {
            min_interval_size: 1.5 * total_length * 2f64.powi(-i32::try_from(self.max_depth).unwrap_or(i32::MAX)),
            target_error_density: self.tolerance / total_length,
        };

        let whole = gauss_kronrod_15(f, original);
        if criterion.is_met(total_length, whole.error) {
            return whole.value;
        }

        let (left, right) = original.halve();
        let mut pending = VecDeque::from([left, right]);
        let mut integral = 0.0;

        while let Some(interval) = pending.pop_front() {
            let estimate = gauss_kronrod_15(f, interval);
            if criterion.is_met(interval.length(), estimate.error) {
                integral += estimate.value;
                continue;
            }
            let (left, right) = interval.halve();
            pending.push_back(left);
            pending.push_back(right);
        }

        integral
    }
}

#[derive(Debug, Clone, Copy)]
struct ConvergenceCriterion {
    min_interval_size: f64,
    target_error_density: f64,
}

impl ConvergenceCriterion {
    fn is_met(&self, size: f64, error: f64) -> bool {
        size < self.min_interval_size || error < self.target_error_density * size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn integrator() -> Integrator {
        Integrator::default()
    }

    #[test]
    fn test_defaults() {
        let integrator = Integrator::default();
        assert_eq!(integrator.tolerance, 1e-10);
        assert_eq!(integrator.max_depth, 10);

        let custom = Integrator::default().with_tolerance(1e-6).with_max_depth(4);
        assert_eq!(custom.tolerance, 1e-6);
        assert_eq!(custom.max_depth, 4);
    }

    #[test]
    fn test_polynomials_on_unit_interval() {
        let quadratic = integrator().integrate(|x| x * x, 0.0, 1.0);
        assert_relative_eq!(quadratic, 1.0 / 3.0, max_relative = 1e-14);

        let polynomial = integrator().integrate(
            |x: f64| 5.0 * x.powi(5) - 3.0 * x.powi(4) + 2.0 * x.powi(16) - x.powi(9),
            0.0,
            1.0,
        );
        let expected = 5.0 / 6.0 - 0.6 + 2.0 / 17.0 - 0.1;
        assert_relative_eq!(polynomial, expected, max_relative = 1e-14);
    }

    #[test]
    fn test_exponential_decay() {
        let value = integrator().integrate(|x: f64| (-2.0 * x).exp(), 0.0, 1.0);
        let expected = 0.5 * (1.0 - (-2.0f64).exp());
        assert_relative_eq!(value, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_inverted_bounds() {
        let linear = integrator().integrate(|x| x, 1.0, 0.0);
        assert!((linear + 0.5).abs() < 1e-14, "got {}", linear);

        let odd = integrator().integrate(|x: f64| x.powi(5) - x.powi(3), 3.0, -2.0);
        assert_relative_eq!(odd, -1135.0 / 12.0, max_relative = 1e-12);

        let reciprocal = integrator().integrate(|x| 1.0 / x, -1.0, -2.0);
        assert_relative_eq!(reciprocal, 2f64.ln(), max_relative = 1e-10);
    }

    /// Randomized bounds: swapping them must flip the sign exactly.
    #[test]
    fn test_antisymmetry() {
        let mut rng = StdRng::seed_from_u64(7);
        let f = |x: f64| (0.3 * x).sin() + x * x * (-0.1 * x * x).exp();
        for _ in 0..20 {
            let a: f64 = rng.gen_range(-5.0..5.0);
            let b: f64 = rng.gen_range(-5.0..5.0);
            let forward = integrator().integrate(f, a, b);
            let backward = integrator().integrate(f, b, a);
            assert!(
                (forward + backward).abs() < 1e-12,
                "a={} b={} forward={} backward={}",
                a,
                b,
                forward,
                backward
            );
        }
    }

    #[test]
    fn test_equal_bounds_are_zero() {
        assert_eq!(integrator().integrate(|x: f64| x.exp(), 2.5, 2.5), 0.0);
        let tiny = integrator().integrate(|_| 1.0e6, 1.0, 1.0 + 1e-16);
        assert!(tiny.abs() < 1e-15);

        for bound in [f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(integrator().integrate(|x: f64| (-x * x).exp(), bound, bound), 0.0);
        }
    }

    /// The square root is singular at 0: one G7/K15 pass is not enough.
    #[test]
    fn test_unbounded_depth_keeps_refining() {
        let deep = Integrator::default().with_max_depth(u32::MAX);
        let value = deep.integrate(|x: f64| x.sqrt(), 0.0, 1.0);
        assert!((value - 2.0 / 3.0).abs() < 1e-9, "got {}", value);
    }

    #[test]
    fn test_infinite_bounds() {
        let gaussian = integrator().integrate(|x: f64| (-0.5 * x * x).exp(), f64::NEG_INFINITY, f64::INFINITY);
        assert!((gaussian - (2.0 * PI).sqrt()).abs() < 1e-8, "got {}", gaussian);

        let lorentz = integrator().integrate(|x| 1.0 / (1.0 + x * x), f64::NEG_INFINITY, 0.0);
        assert!((lorentz - 0.5 * PI).abs() < 1e-8, "got {}", lorentz);

        let gamma = integrator().integrate(|x: f64| 10.0 * x * (-10.0 * x).exp(), 0.0, f64::INFINITY);
        assert!((gamma - 0.1).abs() < 1e-8, "got {}", gamma);
    }

    #[test]
    fn test_infinite_bounds_inverted() {
        let value = integrator().integrate(|x: f64| (-x).exp(), f64::INFINITY, 0.0);
        assert!((value + 1.0).abs() < 1e-8, "got {}", value);
    }

    /// Sharply peaked integrands need several levels of bisection.
    #[test]
    fn test_stiff_exponentials() {
        let coarse = Integrator::default().with_tolerance(1e-6).with_max_depth(10);

        let mild = coarse.integrate(|x: f64| 10.0 * (-11.0 * x).exp(), 0.0, 1.0);
        let expected = 10.0 / 11.0 * (1.0 - (-11.0f64).exp());
        assert!((mild - expected).abs() < 1e-6, "got {} expected {}", mild, expected);

        let steep = coarse.integrate(|x: f64| 1000.0 * (-1001.0 * x).exp(), 0.0, 1.0);
        let expected = 1000.0 / 1001.0 * (1.0 - (-1001.0f64).exp());
        assert!((steep - expected).abs() < 1e-6, "got {} expected {}", steep, expected);

        let moment = coarse.integrate(|x: f64| 1000.0 * x * (-1001.0 * x).exp(), 0.0, 1.0);
        // 1000 * [1 - e^{-1001}(1 + 1001)] / 1001^2
        let expected = 1000.0 * (1.0 - (-1001.0f64).exp() * 1002.0) / (1001.0 * 1001.0);
        assert!((moment - expected).abs() < 1e-6, "got {} expected {}", moment, expected);
    }
}
