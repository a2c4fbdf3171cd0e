//! Configuration validation.
//!
//! Catches structurally meaningless settings (a zero anchor, inverted bands,
//! an empty horizon) before any snapshot is evaluated. Assumption pairs that
//! only make a model undefined for evaluation, such as a DDM growth rate at or
//! above the cost of equity, are left to the model, which reports them as an
//! invalid-assumption result.

use thiserror::Error;

use crate::config::{
    Config, DcfAssumptions, DdmAssumptions, GrahamAssumptions, ObservabilityConfig,
    PbRoeAssumptions, PegAssumptions, PriceReturnAssumptions, ThreeYearAssumptions,
    ValuationConfig, MAX_HORIZON_YEARS,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

fn collect(results: Vec<ValidationResult<()>>) -> ValidationResult<()> {
    let mut errors: Vec<ValidationError> = results.into_iter().filter_map(Result::err).collect();

    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

fn positive(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

fn horizon(field: &str, years: u32) -> ValidationResult<()> {
    if (1..=MAX_HORIZON_YEARS).contains(&years) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            reason: format!("must be between 1 and {} years, got {}", MAX_HORIZON_YEARS, years),
        })
    }
}

fn ordered(low_field: &str, low: f64, high_field: &str, high: f64) -> ValidationResult<()> {
    if low <= high {
        Ok(())
    } else {
        Err(ValidationError::Conflict {
            reason: format!("{} ({}) exceeds {} ({})", low_field, low, high_field, high),
        })
    }
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        collect(vec![self.observability.validate(), self.valuation.validate()])
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for ValuationConfig {
    fn validate(&self) -> ValidationResult<()> {
        collect(vec![
            self.pb_roe.validate(),
            self.price_return.validate(),
            self.graham.validate(),
            self.peg.validate(),
            self.ddm.validate(),
            self.three_year.validate(),
            self.dcf.validate(),
        ])
    }
}

impl Validate for PbRoeAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        collect(vec![
            positive("valuation.pb_roe.anchor_divisor", self.anchor_divisor),
            positive("valuation.pb_roe.buy_band_low", self.buy_band_low),
            positive("valuation.pb_roe.sell_band_low", self.sell_band_low),
            ordered(
                "valuation.pb_roe.buy_band_low",
                self.buy_band_low,
                "valuation.pb_roe.buy_band_high",
                self.buy_band_high,
            ),
            ordered(
                "valuation.pb_roe.sell_band_low",
                self.sell_band_low,
                "valuation.pb_roe.sell_band_high",
                self.sell_band_high,
            ),
            ordered(
                "valuation.pb_roe.buy_band_high",
                self.buy_band_high,
                "valuation.pb_roe.sell_band_low",
                self.sell_band_low,
            ),
        ])
    }
}

impl Validate for PriceReturnAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        collect(vec![
            positive("valuation.price_return.full_payout_ratio", self.full_payout_ratio),
            positive("valuation.price_return.low_payout_ratio", self.low_payout_ratio),
            positive("valuation.price_return.low_payout_factor", self.low_payout_factor),
            ordered(
                "valuation.price_return.low_payout_ratio",
                self.low_payout_ratio,
                "valuation.price_return.full_payout_ratio",
                self.full_payout_ratio,
            ),
            ordered(
                "valuation.price_return.buy_below",
                self.buy_below,
                "valuation.price_return.sell_above",
                self.sell_above,
            ),
        ])
    }
}

impl Validate for GrahamAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        collect(vec![
            positive("valuation.graham.no_growth_pe", self.no_growth_pe),
            positive("valuation.graham.growth_multiplier", self.growth_multiplier),
            positive("valuation.graham.max_growth_percent", self.max_growth_percent),
            positive("valuation.graham.reference_yield", self.reference_yield),
            positive("valuation.graham.aaa_yield", self.aaa_yield),
        ])
    }
}

impl Validate for PegAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        collect(vec![
            positive("valuation.peg.buy_below", self.buy_below),
            ordered(
                "valuation.peg.buy_below",
                self.buy_below,
                "valuation.peg.sell_above",
                self.sell_above,
            ),
        ])
    }
}

impl Validate for DdmAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        if !self.cost_of_equity.is_finite() || !self.growth_rate.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "valuation.ddm".into(),
                reason: "rates must be finite".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ThreeYearAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        let horizon = horizon("valuation.three_year.horizon_years", self.horizon_years);

        let haircut = if self.leverage_haircut > 0.0 && self.leverage_haircut <= 1.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidValue {
                field: "valuation.three_year.leverage_haircut".into(),
                reason: format!("must be in (0, 1], got {}", self.leverage_haircut),
            })
        };

        collect(vec![
            horizon,
            haircut,
            positive("valuation.three_year.max_growth", self.max_growth),
            positive("valuation.three_year.exit_multiple", self.exit_multiple),
            positive("valuation.three_year.return_multiple", self.return_multiple),
            positive("valuation.three_year.sell_multiple", self.sell_multiple),
        ])
    }
}

impl Validate for DcfAssumptions {
    fn validate(&self) -> ValidationResult<()> {
        let horizon = horizon("valuation.dcf.horizon_years", self.horizon_years);

        let margins = match self
            .safety_margins
            .iter()
            .find(|m| !(0.0..1.0).contains(*m))
        {
            Some(bad) => Err(ValidationError::InvalidValue {
                field: "valuation.dcf.safety_margins".into(),
                reason: format!("each margin must be in [0, 1), got {}", bad),
            }),
            None => Ok(()),
        };

        collect(vec![
            horizon,
            margins,
            positive("valuation.dcf.market_cap_fcf_ratio", self.market_cap_fcf_ratio),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test_case("verbose", "pretty" ; "unknown level")]
    #[test_case("info", "xml" ; "unknown format")]
    fn test_observability_rejects(level: &str, format: &str) {
        let config = ObservabilityConfig {
            log_level: level.into(),
            log_format: format.into(),
            excluded_targets: vec![],
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_anchor_rejected() {
        let pb = PbRoeAssumptions {
            anchor_divisor: 0.0,
            ..Default::default()
        };
        let err = pb.validate().unwrap_err();
        assert!(err.to_string().contains("anchor_divisor"));
    }

    #[test]
    fn test_inverted_bands_rejected() {
        let pb = PbRoeAssumptions {
            buy_band_low: 0.9,
            buy_band_high: 0.8,
            ..Default::default()
        };
        assert!(matches!(pb.validate(), Err(ValidationError::Conflict { .. })));
    }

    #[test]
    fn test_ddm_degenerate_rates_are_not_a_config_error() {
        // g == r is reported by the model itself, not rejected up front
        let ddm = DdmAssumptions {
            cost_of_equity: 0.09,
            growth_rate: 0.09,
        };
        assert!(ddm.validate().is_ok());
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.valuation.dcf.horizon_years = 0;
        config.valuation.three_year.leverage_haircut = 1.5;

        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert!(errors.len() >= 2),
            other => panic!("expected multiple errors, got {:?}", other),
        }
    }

    #[test_case(-0.1 ; "negative")]
    #[test_case(0.0 ; "zero")]
    #[test_case(f64::NAN ; "nan")]
    fn test_three_year_growth_cap_rejected(max_growth: f64) {
        let mut config = Config::default();
        config.valuation.three_year.max_growth = max_growth;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("three_year.max_growth"));
    }

    #[test_case(0 ; "zero")]
    #[test_case(MAX_HORIZON_YEARS + 1 ; "past the cap")]
    #[test_case(u32::MAX ; "huge")]
    fn test_horizon_out_of_range(years: u32) {
        let dcf = DcfAssumptions {
            horizon_years: years,
            ..Default::default()
        };
        assert!(dcf.validate().is_err());

        let three_year = ThreeYearAssumptions {
            horizon_years: years,
            ..Default::default()
        };
        assert!(three_year.validate().is_err());
    }

    #[test]
    fn test_horizon_at_cap_accepted() {
        let dcf = DcfAssumptions {
            horizon_years: MAX_HORIZON_YEARS,
            ..Default::default()
        };
        assert!(dcf.validate().is_ok());
    }

    #[test]
    fn test_safety_margin_out_of_range() {
        let dcf = DcfAssumptions {
            safety_margins: vec![0.15, 1.0],
            ..Default::default()
        };
        assert!(dcf.validate().is_err());
    }
}
