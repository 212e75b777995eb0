// src/models/long_short.rs

//! Long-short Nelson-Siegel style hazard term structure.
//!
//! `h(t) = s * g(t / T) + l * (1 - g(t / T))` with `g(x) = (1 - e^{-x}) / x`
//! and `g(0) = 1`. The short rate `s` dominates near zero, the long rate `l`
//! far beyond the transition time `T`.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::term_structure::{check_dimension, ParametrizedTermStructure, TermStructure};

pub const DEFAULT_TRANSITION_TIME: f64 = 12.0;

/// Below this `x`, `g'` uses its Taylor expansion to avoid cancellation.
const DERIVATIVE_SERIES_THRESHOLD: f64 = 1e-2;

fn blend(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        -(-x).exp_m1() / x
    }
}

fn blend_derivative(x: f64) -> f64 {
    if x.abs() < DERIVATIVE_SERIES_THRESHOLD {
        -0.5 + x / 3.0 - x * x / 8.0 + x * x * x / 30.0
    } else {
        ((-x).exp() * (1.0 + x) - 1.0) / (x * x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongShortNs {
    pub short_rate: f64,
    pub long_rate: f64,
    pub transition_time: f64,
}

impl TermStructure for LongShortNs {
    fn value(&self, t: f64) -> f64 {
        let g = blend(t / self.transition_time);
        self.short_rate * g + self.long_rate * (1.0 - g)
    }

    fn derivative(&self, t: f64) -> f64 {
        (self.short_rate - self.long_rate) * blend_derivative(t / self.transition_time) / self.transition_time
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.short_rate, self.long_rate]
    }
}

/// Two-parameter family `[short_rate, long_rate]` of [`LongShortNs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongShortNsParametrization {
    pub transition_time: f64,
}

impl Default for LongShortNsParametrization {
    fn default() -> Self {
        Self {
            transition_time: DEFAULT_TRANSITION_TIME,
        }
    }
}

impl ParametrizedTermStructure for LongShortNsParametrization {
    fn name(&self) -> &str {
        "long_short_ns"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn evaluate(&self, params: &[f64]) -> Result<Box<dyn TermStructure>> {
        check_dimension(self.name(), self.dimension(), params)?;
        Ok(Box::new(LongShortNs {
            short_rate: params[0],
            long_rate: params[1],
            transition_time: self.transition_time,
        }))
    }

    /// Passes exactly through the earliest and the latest point.
    fn fit(&self, points: &[(f64, f64)]) -> Result<Box<dyn TermStructure>> {
        if points.len() < self.dimension() {
            return Err(anyhow!("cannot fit LS Nelson-Siegel with these {} points", points.len()));
        }

        let (t_min, v_min) = points
            .iter()
            .copied()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .ok_or_else(|| anyhow!("cannot fit LS Nelson-Siegel without points"))?;
        let (t_max, v_max) = points
            .iter()
            .copied()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .ok_or_else(|| anyhow!("cannot fit LS Nelson-Siegel without points"))?;

        if t_max <= t_min {
            return Err(anyhow!(
                "cannot fit LS Nelson-Siegel with these {} points: all at t = {}",
                points.len(),
                t_min
            ));
        }

        // v_min = s g1 + l (1 - g1)
        // v_max = s g2 + l (1 - g2)
        let g1 = blend(t_min / self.transition_time);
        let g2 = blend(t_max / self.transition_time);
        let (short_rate, long_rate) = solve_2x2(g1, 1.0 - g1, v_min, g2, 1.0 - g2, v_max)?;

        Ok(Box::new(LongShortNs {
            short_rate,
            long_rate,
            transition_time: self.transition_time,
        }))
    }
}

/// Cramer's rule for `a1 x + b1 y = c1`, `a2 x + b2 y = c2`.
fn solve_2x2(a1: f64, b1: f64, c1: f64, a2: f64, b2: f64, c2: f64) -> Result<(f64, f64)> {
    let det = a1 * b2 - a2 * b1;
    if det == 0.0 || !det.is_finite() {
        return Err(anyhow!("singular 2x2 system (determinant {})", det));
    }
    Ok(((c1 * b2 - b1 * c2) / det, (a1 * c2 - a2 * c1) / det))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(short_rate: f64, long_rate: f64) -> LongShortNs {
        LongShortNs {
            short_rate,
            long_rate,
            transition_time: DEFAULT_TRANSITION_TIME,
        }
    }

    #[test]
    fn test_limits() {
        let ts = curve(0.01, 0.05);
        assert_eq!(ts.value(0.0), 0.01);
        assert!((ts.value(1e-9) - 0.01).abs() < 1e-12);
        // g(x) ~ 1/x for large x
        assert!((ts.value(1.0e6) - 0.05).abs() < 1e-6);
        assert_eq!(ts.parameters(), vec![0.01, 0.05]);
    }

    #[test]
    fn test_value_at_transition_time() {
        let ts = curve(0.01, 0.05);
        let g = 1.0 - (-1.0f64).exp();
        let expected = 0.01 * g + 0.05 * (1.0 - g);
        assert!((ts.value(12.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let ts = curve(0.02, 0.08);
        for &t in &[0.0, 1e-6, 0.5, 3.0, 12.0, 40.0] {
            let h = 1e-5;
            let numeric = (ts.value(t + h) - ts.value((t - h).max(0.0))) / (t + h - (t - h).max(0.0));
            assert!(
                (ts.derivative(t) - numeric).abs() < 1e-8,
                "t={} analytic={} numeric={}",
                t,
                ts.derivative(t),
                numeric
            );
        }
        // g'(0) = -1/2
        assert!((ts.derivative(0.0) - (-0.5 * (0.02 - 0.08) / 12.0)).abs() < 1e-15);
    }

    #[test]
    fn test_evaluate_checks_dimension() {
        let p = LongShortNsParametrization::default();
        assert_eq!(p.dimension(), 2);
        assert!(p.evaluate(&[0.01]).is_err());
        assert_eq!(p.evaluate(&[0.01, 0.02]).unwrap().parameters(), vec![0.01, 0.02]);
    }

    #[test]
    fn test_fit_recovers_parameters() {
        let truth = curve(0.015, 0.045);
        let points: Vec<(f64, f64)> = [1.0, 3.0, 5.0, 10.0]
            .iter()
            .map(|&t| (t, truth.value(t)))
            .collect();
        let fitted = LongShortNsParametrization::default().fit(&points).unwrap();
        let params = fitted.parameters();
        assert!((params[0] - 0.015).abs() < 1e-12, "short {}", params[0]);
        assert!((params[1] - 0.045).abs() < 1e-12, "long {}", params[1]);
    }

    #[test]
    fn test_fit_rejects_degenerate_points() {
        let p = LongShortNsParametrization::default();
        assert!(p.fit(&[]).is_err());
        assert!(p.fit(&[(1.0, 0.02)]).is_err());
        assert!(p.fit(&[(2.0, 0.02), (2.0, 0.03)]).is_err());
    }
}
