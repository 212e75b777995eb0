// src/models/term_structure.rs

//! Hazard-rate term structures and their parametrizations.
//!
//! A [`TermStructure`] is a function of time expressed as a year fraction. A
//! [`ParametrizedTermStructure`] is a family of term structures indexed by a
//! parameter vector; it is what the calibrator searches over.
//!
//! The term structure value `h(t)` is read as an average hazard rate, so the
//! survival probability up to `t` is `exp(-h(t) * t)`.

use anyhow::{anyhow, Context, Result};

use super::interp::PiecewiseLinear;

/// A function of time.
pub trait TermStructure: Send + Sync {
    fn value(&self, t: f64) -> f64;

    /// Time derivative of [`TermStructure::value`].
    fn derivative(&self, t: f64) -> f64;

    /// Parameters describing this instance.
    fn parameters(&self) -> Vec<f64>;
}

/// A family of term structures indexed by a fixed-length parameter vector.
pub trait ParametrizedTermStructure: Send + Sync {
    /// Short identifier (e.g. "flat").
    fn name(&self) -> &str;

    /// Number of parameters expected by [`ParametrizedTermStructure::evaluate`].
    fn dimension(&self) -> usize;

    /// Fails when `params.len() != self.dimension()`.
    fn evaluate(&self, params: &[f64]) -> Result<Box<dyn TermStructure>>;

    /// Closed-form fit through `(t, value)` points.
    fn fit(&self, points: &[(f64, f64)]) -> Result<Box<dyn TermStructure>>;
}

/// `exp(-h(t) * t)`
pub fn survival_probability(ts: &dyn TermStructure, t: f64) -> f64 {
    (-ts.value(t) * t).exp()
}

/// Density of the default time: `-d/dt exp(-h(t) t) = (h(t) + h'(t) t) exp(-h(t) t)`.
pub fn survival_probability_density(ts: &dyn TermStructure, t: f64) -> f64 {
    let value = ts.value(t);
    (value + ts.derivative(t) * t) * (-value * t).exp()
}

pub(crate) fn check_dimension(name: &str, expected: usize, params: &[f64]) -> Result<()> {
    if params.len() != expected {
        return Err(anyhow!(
            "cannot create a {} term structure, number of parameters mismatch: {} provided, {} expected",
            name,
            params.len(),
            expected
        ));
    }
    Ok(())
}

// ================================================================================================
// FLAT
// ================================================================================================

/// Constant term structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTermStructure {
    pub value: f64,
}

impl TermStructure for FlatTermStructure {
    fn value(&self, _t: f64) -> f64 {
        self.value
    }

    fn derivative(&self, _t: f64) -> f64 {
        0.0
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.value]
    }
}

/// One-parameter family of [`FlatTermStructure`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatParametrization;

impl ParametrizedTermStructure for FlatParametrization {
    fn name(&self) -> &str {
        "flat"
    }

    fn dimension(&self) -> usize {
        1
    }

    fn evaluate(&self, params: &[f64]) -> Result<Box<dyn TermStructure>> {
        check_dimension(self.name(), self.dimension(), params)?;
        Ok(Box::new(FlatTermStructure { value: params[0] }))
    }

    /// Uses the first point's value.
    fn fit(&self, points: &[(f64, f64)]) -> Result<Box<dyn TermStructure>> {
        let (_, value) = points
            .first()
            .ok_or_else(|| anyhow!("cannot fit a flat term structure without points"))?;
        Ok(Box::new(FlatTermStructure { value: *value }))
    }
}

// ================================================================================================
// LINEAR THRESHOLD
// ================================================================================================

/// Piecewise-linear term structure, flat before the first and after the last knot.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearThresholdTermStructure {
    interpolator: PiecewiseLinear,
}

impl LinearThresholdTermStructure {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self> {
        let interpolator =
            PiecewiseLinear::new(points).context("could not create linear threshold interpolator")?;
        Ok(Self { interpolator })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        self.interpolator.points()
    }
}

impl TermStructure for LinearThresholdTermStructure {
    fn value(&self, t: f64) -> f64 {
        self.interpolator.value(t)
    }

    fn derivative(&self, t: f64) -> f64 {
        self.interpolator.gradient(t)
    }

    /// Knots flattened as `[x0, y0, x1, y1, ...]`.
    fn parameters(&self) -> Vec<f64> {
        self.interpolator.points().iter().flat_map(|&(x, y)| [x, y]).collect()
    }
}
