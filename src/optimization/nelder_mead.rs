// src/optimization/nelder_mead.rs

//! Unconstrained Nelder-Mead search, run through `argmin`.
//!
//! Used as the inner solver of the active-set method, so it never sees the
//! box: the active-set layer handles bounds by pinning coordinates.
//!
//! The search stops once the standard deviation of the vertex values drops
//! below `sd_tolerance`, or after `max_iterations`. The test is absolute, so
//! a large constant floor under the objective (pinned coordinates) does not
//! end the search early.

use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::neldermead::NelderMead;
use log::debug;
use serde::{Deserialize, Serialize};

use super::error::OptimizationError;

/// Settings of the simplex search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadSettings {
    /// Offset applied to each coordinate to build the initial simplex.
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Standard deviation of the vertex values under which the search stops.
    pub sd_tolerance: f64,
    /// Hard cap on iterations. The best vertex is returned when reached.
    pub max_iterations: u64,
}

impl Default for NelderMeadSettings {
    fn default() -> Self {
        Self {
            initial_step: 0.05,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            sd_tolerance: 1e-14,
            max_iterations: 5_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: u64,
    /// False when `max_iterations` ended the search.
    pub converged: bool,
}

/// Adapts a plain closure to `argmin`'s cost function.
struct SimplexCost<F> {
    objective: F,
}

impl<F> CostFunction for SimplexCost<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let value = (self.objective)(param);
        // NaN would break the vertex ordering
        Ok(if value.is_nan() { f64::INFINITY } else { value })
    }
}

fn inner_error<E: std::fmt::Display>(e: E) -> OptimizationError {
    OptimizationError::InnerSolver {
        message: format!("{:#}", e),
    }
}

/// Minimizes `objective` starting from `initial`.
///
/// An empty starting point evaluates the objective once and returns it.
pub fn minimize<F>(
    objective: F,
    initial: &[f64],
    settings: &NelderMeadSettings,
) -> Result<NelderMeadResult, OptimizationError>
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return Ok(NelderMeadResult {
            x: Vec::new(),
            value: objective(initial),
            iterations: 0,
            converged: true,
        });
    }

    let mut simplex = Vec::with_capacity(initial.len() + 1);
    simplex.push(initial.to_vec());
    for d in 0..initial.len() {
        let mut vertex = initial.to_vec();
        vertex[d] += settings.initial_step;
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(settings.sd_tolerance)
        .and_then(|s| s.with_alpha(settings.reflection))
        .and_then(|s| s.with_gamma(settings.expansion))
        .and_then(|s| s.with_rho(settings.contraction))
        .and_then(|s| s.with_sigma(settings.shrink))
        .map_err(inner_error)?;

    let result = Executor::new(SimplexCost { objective }, solver)
        .configure(|state| state.max_iters(settings.max_iterations))
        .run()
        .map_err(inner_error)?;

    let x = result
        .state
        .get_best_param()
        .cloned()
        .ok_or_else(|| inner_error("no vertex was evaluated"))?;
    let value = result.state.get_best_cost();
    let iterations = result.state.get_iter();
    let converged = iterations < settings.max_iterations;

    debug!(
        "nelder-mead stopped after {} iterations (converged: {}), best value {:e}",
        iterations, converged, value
    );

    Ok(NelderMeadResult {
        x,
        value,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let result = minimize(
            |x: &[f64]| (x[0] - 1.5).powi(2) + 2.0 * (x[1] + 0.5).powi(2),
            &[0.0, 0.0],
            &NelderMeadSettings::default(),
        )
        .unwrap();
        assert!((result.x[0] - 1.5).abs() < 1e-4, "x0 = {}", result.x[0]);
        assert!((result.x[1] + 0.5).abs() < 1e-4, "x1 = {}", result.x[1]);
        assert!(result.value < 1e-8);
        assert!(result.converged);
    }

    /// A large constant offset must not make the search stop early.
    #[test]
    fn test_offset_does_not_hide_progress() {
        let result = minimize(
            |x: &[f64]| 100.0 + (x[0] - 3.0).powi(2),
            &[0.3],
            &NelderMeadSettings::default(),
        )
        .unwrap();
        assert!((result.x[0] - 3.0).abs() < 1e-4, "x = {}", result.x[0]);
    }

    #[test]
    fn test_rosenbrock() {
        let result = minimize(
            |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.2, 1.0],
            &NelderMeadSettings::default(),
        )
        .unwrap();
        assert!((result.x[0] - 1.0).abs() < 1e-2, "x0 = {}", result.x[0]);
        assert!((result.x[1] - 1.0).abs() < 2e-2, "x1 = {}", result.x[1]);
    }

    #[test]
    fn test_iteration_limit_returns_best_vertex() {
        let settings = NelderMeadSettings {
            max_iterations: 3,
            ..NelderMeadSettings::default()
        };
        let start = [5.0, 5.0];
        let f = |x: &[f64]| x[0] * x[0] + x[1] * x[1];
        let result = minimize(f, &start, &settings).unwrap();
        assert!(!result.converged);
        assert!(result.value <= f(&start));
    }

    #[test]
    fn test_nan_scored_as_infinity() {
        let result = minimize(
            |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { (x[0] - 0.5).powi(2) },
            &[0.1],
            &NelderMeadSettings::default(),
        )
        .unwrap();
        assert!((result.x[0] - 0.5).abs() < 1e-4, "x = {}", result.x[0]);
    }

    #[test]
    fn test_invalid_coefficients_rejected() {
        let settings = NelderMeadSettings {
            contraction: 0.9,
            ..NelderMeadSettings::default()
        };
        let err = minimize(|x: &[f64]| x[0] * x[0], &[1.0], &settings).unwrap_err();
        assert!(matches!(err, OptimizationError::InnerSolver { .. }));
    }

    #[test]
    fn test_empty_problem() {
        let result = minimize(|_: &[f64]| 4.0, &[], &NelderMeadSettings::default()).unwrap();
        assert!(result.x.is_empty());
        assert_eq!(result.value, 4.0);
    }
}
