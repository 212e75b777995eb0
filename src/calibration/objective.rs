// src/calibration/objective.rs

//! Calibration objective for one issuer.
//!
//! `value(p)` is the sum of squared CDS price errors under the term structure
//! built from `p`, plus two optional penalties scaled by `sqrt(N)` for `N`
//! quotes:
//!
//! - flatness: `(h(short) - h(long))^2 * regularization_weight`
//! - long-term band: squared distance of `h(long)` to
//!   `[long_term_low, long_term_high]`, times `long_term_weight`

use anyhow::Result;
use log::warn;

use crate::calibration::config::{ObjectiveConfig, RateBounds};
use crate::cds::{CdsAsset, CdsPricer};
use crate::models::{ParametrizedTermStructure, TermStructure};
use crate::optimization::ObjectiveFunction;

pub struct CdsObjective<'a> {
    parametrization: &'a dyn ParametrizedTermStructure,
    assets: &'a [CdsAsset],
    pricer: CdsPricer,
    config: ObjectiveConfig,
    bounds: RateBounds,
    gradient_step: f64,
}

impl<'a> CdsObjective<'a> {
    pub fn new(
        parametrization: &'a dyn ParametrizedTermStructure,
        assets: &'a [CdsAsset],
        pricer: CdsPricer,
        config: ObjectiveConfig,
        bounds: RateBounds,
        gradient_step: f64,
    ) -> Self {
        Self {
            parametrization,
            assets,
            pricer,
            config,
            bounds,
            gradient_step,
        }
    }

    pub fn assets(&self) -> &[CdsAsset] {
        self.assets
    }

    /// Objective value, or the error raised while building the term structure.
    pub fn try_value(&self, params: &[f64]) -> Result<f64> {
        let ts = self.parametrization.evaluate(params)?;
        Ok(self.pricer.sum_of_squared_errors(self.assets, ts.as_ref()) + self.penalties(ts.as_ref()))
    }

    /// Flatness and long-term band penalties for `ts`.
    pub fn penalties(&self, ts: &dyn TermStructure) -> f64 {
        let scaling = (self.assets.len() as f64).sqrt();
        let long_term = ts.value(self.config.long_term_maturity);
        let short_term = ts.value(self.config.short_term_maturity);

        let spread = short_term - long_term;
        let mut penalty = spread * spread * scaling * self.config.regularization_weight;

        let outside = if long_term < self.config.long_term_low {
            self.config.long_term_low - long_term
        } else if long_term > self.config.long_term_high {
            long_term - self.config.long_term_high
        } else {
            0.0
        };
        penalty += outside * outside * scaling * self.config.long_term_weight;

        penalty
    }
}

impl ObjectiveFunction for CdsObjective<'_> {
    /// Parameter vectors the parametrization rejects score `+inf`.
    fn value(&self, params: &[f64]) -> f64 {
        match self.try_value(params) {
            Ok(value) => value,
            Err(e) => {
                warn!("rejecting parameters {:?}: {:#}", params, e);
                f64::INFINITY
            }
        }
    }

    /// Central differences, with bumped coordinates kept inside the rate bounds.
    fn gradient(&self, params: &[f64]) -> Vec<f64> {
        let mut bumped = params.to_vec();
        let mut gradient = Vec::with_capacity(params.len());

        for i in 0..params.len() {
            let up = self.bounds.clamp(params[i] + self.gradient_step);
            bumped[i] = up;
            let value_up = self.value(&bumped);

            let down = self.bounds.clamp(params[i] - self.gradient_step);
            bumped[i] = down;
            let value_down = self.value(&bumped);

            gradient.push((value_up - value_down) / (up - down));
            bumped[i] = params[i];
        }

        gradient
    }
}
