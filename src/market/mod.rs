//! Market conventions and inputs: tenors, IMM dates, day counts and the
//! interest-rate discount curve.

pub mod imm;
pub mod interest_curve;
pub mod tenor;

pub use imm::{last_imm_date, next_imm_date, year_fraction_act360};
pub use interest_curve::{term_structure_points, InterestRateCurve, PiecewiseLinearCurveModel};
pub use tenor::{Tenor, TenorUnit};
