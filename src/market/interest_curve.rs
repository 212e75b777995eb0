// src/market/interest_curve.rs

//! Discounting curve built from spot rates quoted by tenor.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};

use super::tenor::Tenor;
use crate::models::term_structure::{LinearThresholdTermStructure, TermStructure};

/// Converts tenor-keyed quotes into `(year fraction, value)` points sorted by time.
pub fn term_structure_points(quotes: &BTreeMap<String, f64>) -> Result<Vec<(f64, f64)>> {
    let mut points = quotes
        .iter()
        .map(|(label, value)| {
            let tenor: Tenor = label
                .parse()
                .context("could not convert the tenor to year fraction")?;
            Ok((tenor.year_fraction(), *value))
        })
        .collect::<Result<Vec<_>>>()?;
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(points)
}

/// Piecewise-linear interpolation of spot rates in year-fraction space.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearCurveModel {
    spot_rates: LinearThresholdTermStructure,
}

impl PiecewiseLinearCurveModel {
    pub fn calibrate(points: Vec<(f64, f64)>) -> Result<Self> {
        let spot_rates = LinearThresholdTermStructure::new(points)
            .context("could not create the piecewise linear interpolator")?;
        Ok(Self { spot_rates })
    }

    pub fn value(&self, t: f64) -> f64 {
        self.spot_rates.value(t)
    }
}

/// Interest-rate curve: the quoted spot rates and the model calibrated on them.
///
/// Only [`InterestRateCurve::build`] creates a curve, so every instance is
/// ready for [`InterestRateCurve::discount_factor`] queries.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestRateCurve {
    quotes: BTreeMap<String, f64>,
    model: PiecewiseLinearCurveModel,
}

impl InterestRateCurve {
    pub fn build(quotes: &BTreeMap<String, f64>) -> Result<Self> {
        if quotes.is_empty() {
            return Err(anyhow!("cannot build an interest rate curve without quotes"));
        }
        let points = term_structure_points(quotes)
            .context("could not convert the term structure data into raw data")?;
        let model = PiecewiseLinearCurveModel::calibrate(points)?;
        Ok(Self {
            quotes: quotes.clone(),
            model,
        })
    }

    pub fn quotes(&self) -> &BTreeMap<String, f64> {
        &self.quotes
    }

    /// Continuously compounded spot rate at year fraction `t`.
    pub fn spot(&self, t: f64) -> f64 {
        self.model.value(t)
    }

    /// `exp(-spot(t) * t)`
    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.spot(t) * t).exp()
    }
}
