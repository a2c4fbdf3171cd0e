//! fairval common - shared configuration, validation, errors, and logging.
//!
//! This crate provides:
//! - Configuration types and modular loading (`config.json` + `valuation.json`)
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod config_loader;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, DcfAssumptions, DdmAssumptions, GrahamAssumptions, ObservabilityConfig,
    PbRoeAssumptions, PegAssumptions, PriceReturnAssumptions, ThreeYearAssumptions,
    ValuationConfig,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};
