// src/optimization/active_set.rs

//! Active-set solver for box-constrained minimization.
//!
//! Each outer iteration pins the active coordinates to their bounds and
//! minimizes the objective over the remaining ones with Nelder-Mead. The step
//! from the current point towards that minimum is cut at the first bound it
//! crosses, and that bound becomes active. Active bounds whose Lagrange
//! multiplier has the wrong sign are released again. The point is optimal
//! when a full outer iteration neither activates nor releases a bound.

use log::debug;
use serde::{Deserialize, Serialize};

use super::boxed::{BoundState, BoxedProblem, ObjectiveFunction, SubProblem};
use super::error::OptimizationError;
use super::nelder_mead::{self, NelderMeadSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Budget of outer (active-set) iterations.
    pub max_outer_iterations: usize,
    /// Settings of the inner unconstrained solver.
    pub inner: NelderMeadSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_outer_iterations: 20,
            inner: NelderMeadSettings::default(),
        }
    }
}

impl Settings {
    pub fn new(max_outer_iterations: usize) -> Self {
        Self {
            max_outer_iterations,
            ..Self::default()
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    /// Outer iterations used, including the final one.
    pub outer_iterations: usize,
    /// Final state of each coordinate.
    pub bound_states: Vec<BoundState>,
}

/// Bound crossed first on the way to the sub-problem minimum.
#[derive(Debug, Clone, Copy)]
struct Blocking {
    index: usize,
    state: BoundState,
    lambda: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Solver {
    settings: Settings,
}

impl Solver {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Minimizes `problem` inside its box.
    ///
    /// Returns a validity error before evaluating anything when the problem is
    /// malformed, and [`OptimizationError::NotConverged`] when the outer budget
    /// runs out.
    pub fn minimize<O: ObjectiveFunction>(&self, problem: &BoxedProblem<O>) -> Result<Minimum, OptimizationError> {
        problem.validate()?;

        let n = problem.dimension();
        let mut current = problem.initial_guess.clone();
        let mut states = vec![BoundState::Free; n];

        for iteration in 1..=self.settings.max_outer_iterations {
            for i in 0..n {
                match states[i] {
                    BoundState::AtLower => current[i] = problem.lower_bounds[i],
                    BoundState::AtUpper => current[i] = problem.upper_bounds[i],
                    BoundState::Free => {}
                }
            }

            let proposed = {
                let sub = SubProblem::new(problem, &states);
                if sub.free_coordinates().is_empty() {
                    sub.to_global(&[])
                } else {
                    let start = sub.restrict(&current);
                    let inner = nelder_mead::minimize(|x: &[f64]| sub.value(x), &start, &self.settings.inner)?;
                    debug!(
                        "outer iteration {}: {} free coordinates, sub-problem value {:e}",
                        iteration,
                        start.len(),
                        inner.value
                    );
                    sub.to_global(&inner.x)
                }
            };

            let blocking = first_blocking_bound(problem, &states, &current, &proposed);
            let lambda = match blocking {
                Some(b) => {
                    states[b.index] = b.state;
                    b.lambda
                }
                None => 1.0,
            };
            for i in 0..n {
                current[i] += lambda * (proposed[i] - current[i]);
            }

            // A bound activated by this step stays active at least until the next sub-problem.
            let gradient = problem.objective.gradient(&current);
            let released = most_negative_multiplier(&states, &gradient, blocking.map(|b| b.index));
            if let Some(index) = released {
                debug!(
                    "outer iteration {}: releasing bound on coordinate {} (gradient {:e})",
                    iteration, index, gradient[index]
                );
                states[index] = BoundState::Free;
            }

            if let Some(b) = blocking {
                debug!(
                    "outer iteration {}: activating {:?} on coordinate {} at lambda {:.6}",
                    iteration, b.state, b.index, b.lambda
                );
            } else if released.is_none() {
                let value = problem.objective.value(&current);
                return Ok(Minimum {
                    x: current,
                    value,
                    outer_iterations: iteration,
                    bound_states: states,
                });
            }
        }

        Err(OptimizationError::NotConverged {
            iterations: self.settings.max_outer_iterations,
        })
    }
}

/// Smallest step fraction at which an inactive bound is reached or crossed
/// while moving from `current` to `proposed`.
fn first_blocking_bound<O>(
    problem: &BoxedProblem<O>,
    states: &[BoundState],
    current: &[f64],
    proposed: &[f64],
) -> Option<Blocking> {
    let mut blocking: Option<Blocking> = None;
    let mut lambda_min = 1.0;

    for i in 0..states.len() {
        let (bound, state) = if states[i] != BoundState::AtLower && proposed[i] <= problem.lower_bounds[i] {
            (problem.lower_bounds[i], BoundState::AtLower)
        } else if states[i] != BoundState::AtUpper && proposed[i] >= problem.upper_bounds[i] {
            (problem.upper_bounds[i], BoundState::AtUpper)
        } else {
            continue;
        };

        let lambda = (bound - current[i]) / (proposed[i] - current[i]);
        if lambda <= lambda_min {
            lambda_min = lambda;
            blocking = Some(Blocking { index: i, state, lambda });
        }
    }

    blocking
}

/// Active coordinate whose multiplier is the most negative, if any.
///
/// At a lower bound the gradient must be non-negative, at an upper bound
/// non-positive.
fn most_negative_multiplier(states: &[BoundState], gradient: &[f64], just_activated: Option<usize>) -> Option<usize> {
    let mut minimum = 0.0;
    let mut index = None;

    for (i, state) in states.iter().enumerate() {
        if just_activated == Some(i) {
            continue;
        }
        let multiplier = match state {
            BoundState::AtLower => gradient[i],
            BoundState::AtUpper => -gradient[i],
            BoundState::Free => continue,
        };
        if multiplier < minimum {
            minimum = multiplier;
            index = Some(i);
        }
    }

    index
}
