//! Calibration of issuer curves: configuration, objective and extraction.

pub mod config;
pub mod objective;
pub mod pipeline;
pub mod types;
