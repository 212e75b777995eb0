//! Adaptive numerical integration.
//!
//! The [`Integrator`] combines a 7-point Gauss / 15-point Kronrod rule with
//! interval bisection. Infinite bounds are handled by mapping the domain onto
//! a finite interval before the adaptive scheme runs.

pub mod gauss_kronrod;
pub mod integrator;
pub mod interval;

pub use gauss_kronrod::{gauss_kronrod_15, GaussKronrodEstimate};
pub use integrator::Integrator;
pub use interval::Interval;
