// src/calibration/pipeline.rs

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use roots::find_root_brent;

use crate::calibration::config::{ExtractionConfig, InitialGuess, RateBounds, DEFAULT_INITIAL_GUESS};
use crate::calibration::objective::CdsObjective;
use crate::calibration::types::CalibratedCurve;
use crate::cds::{input_to_assets, CdsAsset, CdsInput, CdsPricer};
use crate::market::tenor::Tenor;
use crate::models::{FlatTermStructure, ParametrizedTermStructure};
use crate::optimization::{BoxedProblem, Settings, Solver};

/// Price tolerance of the per-quote flat hazard search.
const BOOTSTRAP_TOLERANCE: f64 = 1e-12;

/// Calibrates hazard curves for one issuer at a time
pub struct Extractor {
    config: ExtractionConfig,
    report_tenors: Vec<Tenor>,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let report_tenors = config.parsed_report_tenors()?;
        Ok(Self { config, report_tenors })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn pricer(&self) -> CdsPricer {
        CdsPricer::new(self.config.integrator)
    }

    /// Fits the configured parametrization to `assets`.
    ///
    /// No assets means nothing to calibrate: `Ok(None)`.
    pub fn extract_curve(&self, assets: &[CdsAsset]) -> Result<Option<CalibratedCurve>> {
        let Some(first) = assets.first() else {
            return Ok(None);
        };

        let parametrization = self.config.parametrization.build();
        let dimension = parametrization.dimension();
        let pricer = self.pricer();
        let bounds = self.config.bounds;

        let objective = CdsObjective::new(
            parametrization.as_ref(),
            assets,
            pricer,
            self.config.objective.clone(),
            bounds,
            self.config.gradient_step,
        );

        let initial_guess = self.initial_guess(parametrization.as_ref(), &pricer, assets);
        debug!("issuer {}: initial guess {:?}", first.id, initial_guess);

        let problem = BoxedProblem::new(
            vec![bounds.min_rate; dimension],
            vec![bounds.max_rate; dimension],
            initial_guess,
            &objective,
        );
        let solver = Solver::new(Settings {
            max_outer_iterations: dimension * self.config.outer_iterations_per_parameter,
            inner: self.config.optimizer.clone(),
        });

        let minimum = solver
            .minimize(&problem)
            .with_context(|| format!("issuer {}: curve optimization failed", first.id))?;

        let curve = parametrization
            .evaluate(&minimum.x)
            .context("curve optimization yielded an inadmissible solution")?;

        let values = self
            .report_tenors
            .iter()
            .map(|tenor| (tenor.to_string(), curve.value(tenor.year_fraction())))
            .collect();
        let pricing_errors = assets
            .iter()
            .map(|cds| (cds.tenor.to_string(), pricer.price_error(cds, curve.as_ref())))
            .collect();

        info!(
            "issuer {}: calibrated {} curve {:?} on {} quotes, objective {:e}, {} outer iterations",
            first.id,
            parametrization.name(),
            minimum.x,
            assets.len(),
            minimum.value,
            minimum.outer_iterations
        );

        Ok(Some(CalibratedCurve {
            issuer: first.id.clone(),
            parametrization: self.config.parametrization.clone(),
            parameters: minimum.x,
            objective: minimum.value,
            values,
            pricing_errors,
            iterations: minimum.outer_iterations,
        }))
    }

    fn initial_guess(
        &self,
        parametrization: &dyn ParametrizedTermStructure,
        pricer: &CdsPricer,
        assets: &[CdsAsset],
    ) -> Vec<f64> {
        let dimension = parametrization.dimension();
        match &self.config.initial_guess {
            InitialGuess::Constant { value } => vec![*value; dimension],
            InitialGuess::Explicit { values } => values.clone(),
            InitialGuess::Bootstrapped => {
                match bootstrapped_guess(parametrization, pricer, assets, self.config.bounds) {
                    Ok(guess) => guess,
                    Err(e) => {
                        warn!("bootstrapped initial guess unavailable, using constant: {:#}", e);
                        vec![self.config.bounds.clamp(DEFAULT_INITIAL_GUESS); dimension]
                    }
                }
            }
        }
    }
}

/// For each CDS, the flat hazard rate that reprices it exactly, as
/// `(maturity year fraction, hazard)`. Quotes without a root inside the
/// bounds are left out.
pub fn bootstrap_flat_hazards(pricer: &CdsPricer, assets: &[CdsAsset], bounds: RateBounds) -> Vec<(f64, f64)> {
    assets
        .iter()
        .filter_map(|cds| {
            let price_error = |h: f64| pricer.price_error(cds, &FlatTermStructure { value: h });
            let mut tolerance = BOOTSTRAP_TOLERANCE;
            match find_root_brent(bounds.min_rate, bounds.max_rate, &price_error, &mut tolerance) {
                Ok(hazard) => Some((cds.maturity_year_fraction(), hazard)),
                Err(e) => {
                    debug!("no flat hazard reprices {} {}: {:?}", cds.id, cds.tenor, e);
                    None
                }
            }
        })
        .collect()
}

/// Fits the parametrization through the bootstrapped flat hazards and clamps
/// the result into the bounds.
pub fn bootstrapped_guess(
    parametrization: &dyn ParametrizedTermStructure,
    pricer: &CdsPricer,
    assets: &[CdsAsset],
    bounds: RateBounds,
) -> Result<Vec<f64>> {
    let points = bootstrap_flat_hazards(pricer, assets, bounds);
    if points.is_empty() {
        return Err(anyhow!("no quote could be bootstrapped"));
    }
    let fitted = parametrization.fit(&points)?;
    Ok(fitted.parameters().into_iter().map(|p| bounds.clamp(p)).collect())
}

/// Builds the issuer's CDS assets and calibrates its hazard curve.
///
/// `Ok(None)` when no quote survives the minimum-tenor filter.
pub fn calibrate_credit_curve(input: &CdsInput, config: &ExtractionConfig) -> Result<Option<CalibratedCurve>> {
    let assets = input_to_assets(input, config.min_tenor_years)
        .with_context(|| format!("could not convert input to assets for issuer {}", input.id))?;
    Extractor::new(config.clone())?.extract_curve(&assets)
}

/// Calibrates every issuer, logging and skipping the ones that fail.
pub fn calibrate_credit_curves(
    inputs: &[CdsInput],
    config: &ExtractionConfig,
) -> Result<BTreeMap<String, CalibratedCurve>> {
    let extractor = Extractor::new(config.clone())?;
    Ok(inputs
        .iter()
        .filter_map(|input| calibrate_with(&extractor, input))
        .collect())
}

/// Parallel version of [`calibrate_credit_curves`], one issuer per task.
pub fn par_calibrate_credit_curves(
    inputs: &[CdsInput],
    config: &ExtractionConfig,
) -> Result<BTreeMap<String, CalibratedCurve>> {
    let extractor = Extractor::new(config.clone())?;
    Ok(inputs
        .par_iter()
        .filter_map(|input| calibrate_with(&extractor, input))
        .collect::<Vec<_>>()
        .into_iter()
        .collect())
}

fn calibrate_with(extractor: &Extractor, input: &CdsInput) -> Option<(String, CalibratedCurve)> {
    let assets = match input_to_assets(input, extractor.config().min_tenor_years) {
        Ok(assets) => assets,
        Err(e) => {
            warn!("could not convert input to asset for issuer {}: {:#}", input.id, e);
            return None;
        }
    };

    match extractor.extract_curve(&assets) {
        Ok(Some(curve)) => Some((input.id.clone(), curve)),
        Ok(None) => {
            warn!("issuer {}: no usable CDS quote", input.id);
            None
        }
        Err(e) => {
            warn!("could not calibrate credit term structure for issuer {}: {:#}", input.id, e);
            None
        }
    }
}
