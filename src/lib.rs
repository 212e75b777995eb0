//! # CDS-Curve-Lib: Credit Default Swap Hazard Curve Calibration
//!
//! `cds-curve-lib` extracts issuer hazard-rate term structures from quoted CDS upfront
//! payments. For each issuer it builds the IMM-dated CDS contracts, prices them under a
//! parametric hazard curve and fits the curve parameters with a box-constrained optimizer.
//!
//! ## Core Features
//!
//! - **Adaptive Quadrature**: Gauss-Kronrod (G7/K15) integration with bisection and infinite bounds
//! - **Box-Constrained Optimization**: active-set strategy over a Nelder-Mead inner solver
//! - **Hazard Models**: flat and long-short Nelson-Siegel style parametrizations
//! - **CDS Pricing**: premium and protection legs discounted on a piecewise linear interest curve
//! - **Batch Calibration**: sequential or parallel (rayon) calibration of many issuers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cds_curve_lib::{calibrate_credit_curve, default_configs, CdsInput};
//!
//! let input = CdsInput::from_json_file("data/ISSUER.json")?;
//! let config = default_configs::standard();
//!
//! if let Some(curve) = calibrate_credit_curve(&input, &config)? {
//!     println!("parameters: {:?}", curve.parameters);
//!     for (tenor, hazard) in &curve.values {
//!         println!("{}: {:.4}%", tenor, hazard * 100.0);
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Configuration Presets
//!
//! - `standard()`: long-short curve, plain least squares on upfronts
//! - `flat()`: a single hazard rate for all maturities
//! - `stabilized()`: long-short curve with long-term band and flatness penalties

// ================================================================================================
// MODULES
// ================================================================================================

pub mod calibration;
pub mod cds;
pub mod integration;
pub mod market;
pub mod models;
pub mod optimization;
pub mod report;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Configuration and results
pub use calibration::{
    config::{ExtractionConfig, InitialGuess, ObjectiveConfig, Parametrization, RateBounds},
    objective::CdsObjective,
    pipeline::{
        bootstrap_flat_hazards, calibrate_credit_curve, calibrate_credit_curves, par_calibrate_credit_curves,
        Extractor,
    },
    types::CalibratedCurve,
};

// Instruments and pricing
pub use cds::{input_to_assets, load_cds_inputs, CdsAsset, CdsInput, CdsPricer, FixedCoupon};

// Numerical building blocks
pub use integration::Integrator;
pub use optimization::{BoxedProblem, NelderMeadSettings, ObjectiveFunction, OptimizationError, Solver};

// Term structures and market conventions
pub use market::{InterestRateCurve, Tenor};
pub use models::{
    survival_probability, survival_probability_density, FlatParametrization, LongShortNsParametrization,
    ParametrizedTermStructure, TermStructure,
};

// Reporting
pub use report::{plot_curves_svg, write_curves_csv, write_curves_csv_file};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured extraction settings.
///
/// # Available Configurations
///
/// - [`standard()`]: long-short curve without penalties
/// - [`flat()`]: flat hazard curve
/// - [`stabilized()`]: penalized long-short curve with a bootstrapped starting point
pub mod default_configs {
    use crate::calibration::config::ExtractionConfig;

    /// Long-short Nelson-Siegel curve with a 12 year transition, fitted by plain least squares.
    ///
    /// **Characteristics:**
    /// - Two parameters (short and long hazard rate), bounded to `[0, 3]`
    /// - Constant initial guess of 5%
    /// - No regularization
    ///
    /// # Example
    ///
    /// ```rust
    /// use cds_curve_lib::default_configs;
    ///
    /// let config = default_configs::standard();
    /// assert_eq!(config.report_tenors.len(), 4);
    /// ```
    pub fn standard() -> ExtractionConfig {
        ExtractionConfig::standard()
    }

    /// One hazard rate for every maturity.
    ///
    /// Useful for issuers quoted on a single tenor, or as a sanity check of the
    /// long-short fit.
    pub fn flat() -> ExtractionConfig {
        ExtractionConfig::flat()
    }

    /// Long-short curve for sparse or noisy quotes.
    ///
    /// **Characteristics:**
    /// - Long-term hazard pulled into `[5%, 15%]` (weight 1e-2)
    /// - Short/long spread penalized (weight 1e-4)
    /// - Initial guess from per-quote flat hazards
    pub fn stabilized() -> ExtractionConfig {
        ExtractionConfig::stabilized()
    }
}
