// src/calibration/config.rs

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cds::asset::DEFAULT_MIN_TENOR_YEARS;
use crate::integration::Integrator;
use crate::market::tenor::Tenor;
use crate::models::long_short::DEFAULT_TRANSITION_TIME;
use crate::models::{FlatParametrization, LongShortNsParametrization, ParametrizedTermStructure};
use crate::optimization::NelderMeadSettings;

/// Term-structure family fitted to the CDS quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parametrization {
    /// One constant hazard rate.
    Flat,
    /// Short and long hazard rates blended around `transition_time`.
    LongShortNs {
        #[serde(default = "default_transition_time")]
        transition_time: f64,
    },
}

impl Default for Parametrization {
    fn default() -> Self {
        Self::LongShortNs {
            transition_time: DEFAULT_TRANSITION_TIME,
        }
    }
}

impl Parametrization {
    pub fn build(&self) -> Box<dyn ParametrizedTermStructure> {
        match self {
            Self::Flat => Box::new(FlatParametrization),
            Self::LongShortNs { transition_time } => Box::new(LongShortNsParametrization {
                transition_time: *transition_time,
            }),
        }
    }
}

/// Penalty terms added to the squared pricing errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    /// Lower edge of the band the long-term hazard is pushed into.
    pub long_term_low: f64,
    /// Upper edge of the band the long-term hazard is pushed into.
    pub long_term_high: f64,
    /// Weight of the long-term band penalty (0 disables it).
    pub long_term_weight: f64,
    /// Weight of the short-vs-long flatness penalty (0 disables it).
    pub regularization_weight: f64,
    /// Maturity (years) where the short-term level is read.
    pub short_term_maturity: f64,
    /// Maturity (years) where the long-term level is read.
    pub long_term_maturity: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            long_term_low: 0.05,
            long_term_high: 0.15,
            long_term_weight: 0.0,
            regularization_weight: 0.0,
            short_term_maturity: 0.1,
            long_term_maturity: 100.0,
        }
    }
}

/// Box applied to every parameter; also clamps finite-difference bumps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateBounds {
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for RateBounds {
    fn default() -> Self {
        Self {
            min_rate: 0.0,
            max_rate: 3.0,
        }
    }
}

impl RateBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_rate, self.max_rate)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min_rate..=self.max_rate).contains(&value)
    }
}

/// Starting point of the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialGuess {
    /// The same value for every parameter.
    Constant { value: f64 },
    /// One value per parameter.
    Explicit { values: Vec<f64> },
    /// Fit the parametrization through per-quote flat hazards, falling back
    /// to the default constant guess when that fails.
    Bootstrapped,
}

impl Default for InitialGuess {
    fn default() -> Self {
        Self::Constant {
            value: DEFAULT_INITIAL_GUESS,
        }
    }
}

pub const DEFAULT_INITIAL_GUESS: f64 = 0.05;

/// Main configuration struct for credit-curve extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub parametrization: Parametrization,

    #[serde(default)]
    pub objective: ObjectiveConfig,

    #[serde(default)]
    pub bounds: RateBounds,

    #[serde(default)]
    pub initial_guess: InitialGuess,

    /// Outer active-set iterations granted per parameter
    #[serde(default = "default_outer_iterations_per_parameter")]
    pub outer_iterations_per_parameter: usize,

    /// Inner simplex settings
    #[serde(default)]
    pub optimizer: NelderMeadSettings,

    /// Quadrature settings for the protection leg
    #[serde(default)]
    pub integrator: Integrator,

    /// Central finite-difference bump for the objective gradient
    #[serde(default = "default_gradient_step")]
    pub gradient_step: f64,

    /// Quotes with a shorter tenor are ignored
    #[serde(default = "default_min_tenor_years")]
    pub min_tenor_years: f64,

    /// Tenors at which the calibrated curve is reported
    #[serde(default = "default_report_tenors")]
    pub report_tenors: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parametrization: Parametrization::default(),
            objective: ObjectiveConfig::default(),
            bounds: RateBounds::default(),
            initial_guess: InitialGuess::default(),
            outer_iterations_per_parameter: default_outer_iterations_per_parameter(),
            optimizer: NelderMeadSettings::default(),
            integrator: Integrator::default(),
            gradient_step: default_gradient_step(),
            min_tenor_years: default_min_tenor_years(),
            report_tenors: default_report_tenors(),
        }
    }
}

impl ExtractionConfig {
    /// Long-short curve, no penalties.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Single flat hazard rate, no penalties.
    pub fn flat() -> Self {
        Self {
            parametrization: Parametrization::Flat,
            ..Self::default()
        }
    }

    /// Long-short curve with the long-term band and flatness penalties switched on.
    pub fn stabilized() -> Self {
        Self {
            objective: ObjectiveConfig {
                long_term_weight: 1.0e-2,
                regularization_weight: 1.0e-4,
                ..ObjectiveConfig::default()
            },
            initial_guess: InitialGuess::Bootstrapped,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("could not parse extraction config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parsed reporting tenors, in configuration order.
    pub fn parsed_report_tenors(&self) -> Result<Vec<Tenor>> {
        self.report_tenors
            .iter()
            .map(|label| label.parse().with_context(|| format!("invalid report tenor {:?}", label)))
            .collect()
    }

    /// Rejects settings the extractor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.bounds.min_rate < self.bounds.max_rate) {
            return Err(anyhow!(
                "invalid rate bounds: min_rate {} must be below max_rate {}",
                self.bounds.min_rate,
                self.bounds.max_rate
            ));
        }
        if let Parametrization::LongShortNs { transition_time } = self.parametrization {
            if !(transition_time > 0.0) {
                return Err(anyhow!("transition_time must be positive, got {}", transition_time));
            }
        }
        match &self.initial_guess {
            InitialGuess::Constant { value } if !self.bounds.contains(*value) => {
                return Err(anyhow!("initial guess {} is outside the rate bounds", value));
            }
            InitialGuess::Explicit { values } => {
                let dimension = self.parametrization.build().dimension();
                if values.len() != dimension {
                    return Err(anyhow!(
                        "initial guess has {} values, the parametrization needs {}",
                        values.len(),
                        dimension
                    ));
                }
                if let Some(v) = values.iter().find(|v| !self.bounds.contains(**v)) {
                    return Err(anyhow!("initial guess {} is outside the rate bounds", v));
                }
            }
            _ => {}
        }
        if self.objective.long_term_low > self.objective.long_term_high {
            return Err(anyhow!(
                "long_term_low {} exceeds long_term_high {}",
                self.objective.long_term_low,
                self.objective.long_term_high
            ));
        }
        if !(self.gradient_step > 0.0) {
            return Err(anyhow!("gradient_step must be positive, got {}", self.gradient_step));
        }
        if !(self.integrator.tolerance > 0.0) {
            return Err(anyhow!("integrator tolerance must be positive"));
        }
        if self.outer_iterations_per_parameter == 0 {
            return Err(anyhow!("outer_iterations_per_parameter must be at least 1"));
        }
        self.parsed_report_tenors()?;
        Ok(())
    }
}

fn default_transition_time() -> f64 {
    DEFAULT_TRANSITION_TIME
}

fn default_outer_iterations_per_parameter() -> usize {
    2
}

fn default_gradient_step() -> f64 {
    1.0e-5
}

fn default_min_tenor_years() -> f64 {
    DEFAULT_MIN_TENOR_YEARS
}

fn default_report_tenors() -> Vec<String> {
    ["M12", "Y7", "Y20", "Y50"].iter().map(|s| s.to_string()).collect()
}
