//! Hazard-rate term structures and their parametrizations.

pub mod interp;
pub mod long_short;
pub mod term_structure;

pub use long_short::{LongShortNs, LongShortNsParametrization};
pub use term_structure::{
    survival_probability, survival_probability_density, FlatParametrization, FlatTermStructure,
    LinearThresholdTermStructure, ParametrizedTermStructure, TermStructure,
};
