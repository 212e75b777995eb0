// src/calibration/types.rs

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::calibration::config::Parametrization;
use crate::models::TermStructure;

/// Result of calibrating one issuer's hazard curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedCurve {
    /// Issuer identifier
    pub issuer: String,
    /// Parametrization the parameters belong to
    pub parametrization: Parametrization,
    /// Optimal parameter vector
    pub parameters: Vec<f64>,
    /// Objective value at the optimum
    pub objective: f64,
    /// Hazard value at each reporting tenor, keyed by tenor label
    pub values: BTreeMap<String, f64>,
    /// Price error of each calibrated CDS, keyed by tenor label
    pub pricing_errors: BTreeMap<String, f64>,
    /// Outer optimizer iterations used
    pub iterations: usize,
}

impl CalibratedCurve {
    /// Rebuilds the calibrated term structure.
    pub fn term_structure(&self) -> Result<Box<dyn TermStructure>> {
        self.parametrization.build().evaluate(&self.parameters)
    }

    /// Largest absolute CDS price error.
    pub fn max_abs_pricing_error(&self) -> f64 {
        self.pricing_errors.values().fold(0.0_f64, |acc, e| acc.max(e.abs()))
    }
}
