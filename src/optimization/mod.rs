//! Box-constrained minimization.
//!
//! [`Solver`] runs an active-set strategy on a [`BoxedProblem`], delegating
//! the unconstrained sub-problems to the Nelder-Mead simplex in
//! [`nelder_mead`].

pub mod active_set;
pub mod boxed;
pub mod error;
pub mod nelder_mead;

pub use active_set::{Minimum, Settings, Solver};
pub use boxed::{BoundState, BoxedProblem, ObjectiveFunction, SubProblem};
pub use error::OptimizationError;
pub use nelder_mead::NelderMeadSettings;
