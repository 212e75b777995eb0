// src/optimization/boxed.rs

//! Box-constrained problem definition and its restriction to free coordinates.

use super::error::OptimizationError;

/// Objective minimized by the solvers in this module.
pub trait ObjectiveFunction {
    fn value(&self, x: &[f64]) -> f64;

    /// Gradient of [`ObjectiveFunction::value`] at `x`, one entry per coordinate.
    fn gradient(&self, x: &[f64]) -> Vec<f64>;
}

impl<T: ObjectiveFunction + ?Sized> ObjectiveFunction for &T {
    fn value(&self, x: &[f64]) -> f64 {
        (**self).value(x)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        (**self).gradient(x)
    }
}

/// Minimize `objective(x)` subject to `lower_bounds <= x <= upper_bounds`.
#[derive(Debug, Clone)]
pub struct BoxedProblem<O> {
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    pub initial_guess: Vec<f64>,
    pub objective: O,
}

impl<O: ObjectiveFunction> BoxedProblem<O> {
    pub fn new(lower_bounds: Vec<f64>, upper_bounds: Vec<f64>, initial_guess: Vec<f64>, objective: O) -> Self {
        Self {
            lower_bounds,
            upper_bounds,
            initial_guess,
            objective,
        }
    }

    /// Number of unknowns, taken from the initial guess.
    pub fn dimension(&self) -> usize {
        self.initial_guess.len()
    }

    /// Checks bound sizes, bound ordering and that the initial guess is in the box.
    pub fn validate(&self) -> Result<(), OptimizationError> {
        let n = self.dimension();
        if n == 0 {
            return Err(OptimizationError::NoInitialGuess);
        }
        if self.lower_bounds.len() != n {
            return Err(OptimizationError::LowerBoundCount {
                expected: n,
                actual: self.lower_bounds.len(),
            });
        }
        if self.upper_bounds.len() != n {
            return Err(OptimizationError::UpperBoundCount {
                expected: n,
                actual: self.upper_bounds.len(),
            });
        }

        for i in 0..n {
            let (lower, upper, value) = (self.lower_bounds[i], self.upper_bounds[i], self.initial_guess[i]);
            if lower >= upper {
                return Err(OptimizationError::IncompatibleBounds { index: i, lower, upper });
            }
            if value < lower || value > upper {
                return Err(OptimizationError::InitialGuessOutOfDomain {
                    index: i,
                    value,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }
}

/// Whether a coordinate is free or pinned to one of its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundState {
    Free,
    AtLower,
    AtUpper,
}

/// View of a [`BoxedProblem`] over its free coordinates only; pinned
/// coordinates take their bound value.
pub struct SubProblem<'a, O> {
    problem: &'a BoxedProblem<O>,
    states: &'a [BoundState],
    free: Vec<usize>,
}

impl<'a, O: ObjectiveFunction> SubProblem<'a, O> {
    pub fn new(problem: &'a BoxedProblem<O>, states: &'a [BoundState]) -> Self {
        let free = states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == BoundState::Free)
            .map(|(i, _)| i)
            .collect();
        Self { problem, states, free }
    }

    /// Global indices of the free coordinates, in order.
    pub fn free_coordinates(&self) -> &[usize] {
        &self.free
    }

    /// Extracts the free coordinates of a full point.
    pub fn restrict(&self, x: &[f64]) -> Vec<f64> {
        self.free.iter().map(|&i| x[i]).collect()
    }

    /// Rebuilds a full point from the free coordinates.
    pub fn to_global(&self, x: &[f64]) -> Vec<f64> {
        let mut next_free = x.iter();
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| match state {
                BoundState::AtLower => self.problem.lower_bounds[i],
                BoundState::AtUpper => self.problem.upper_bounds[i],
                BoundState::Free => next_free.next().copied().unwrap_or(f64::NAN),
            })
            .collect()
    }

    pub fn value(&self, x: &[f64]) -> f64 {
        self.problem.objective.value(&self.to_global(x))
    }

    /// Gradient of the full objective restricted to the free coordinates.
    pub fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let full = self.problem.objective.gradient(&self.to_global(x));
        self.free.iter().map(|&i| full[i]).collect()
    }
}
