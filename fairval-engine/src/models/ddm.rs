//! Gordon growth dividend discount model.
//!
//! ```text
//! D₁ = D₀ × (1 + g)
//! V  = D₁ / (r − g)        requires g < r
//! ```

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::helpers::{best_dividend_yield, margin_of_safety};
use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::round2;
use fairval_common::config::DdmAssumptions;

/// How the current annual dividend was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendSource {
    DividendRate,
    /// Price times the best available dividend yield
    PriceTimesYield,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdmValuation {
    /// Current annual dividend per share (D₀)
    pub dividend: f64,
    pub dividend_source: DividendSource,
    /// Next year's dividend (D₁)
    pub next_dividend: f64,
    pub cost_of_equity: f64,
    pub growth_rate: f64,
    pub intrinsic_value: f64,
    pub margin_of_safety: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct DividendDiscountModel {
    assumptions: DdmAssumptions,
}

impl DividendDiscountModel {
    pub fn new(assumptions: DdmAssumptions) -> Self {
        Self { assumptions }
    }

    fn current_dividend(snapshot: &FinancialSnapshot) -> Option<(f64, DividendSource)> {
        if let Some(rate) = snapshot.get_positive(Field::DividendRate) {
            return Some((rate, DividendSource::DividendRate));
        }

        let price = snapshot.price()?;
        let dividend_yield = best_dividend_yield(snapshot)?;
        Some((price * dividend_yield.value(), DividendSource::PriceTimesYield))
    }
}

impl ValuationModel for DividendDiscountModel {
    type Output = DdmValuation;

    const KIND: ModelKind = ModelKind::Ddm;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        let r = self.assumptions.cost_of_equity;
        let g = self.assumptions.growth_rate;

        // Checked before data so a broken configuration is reported as such
        if g >= r {
            return Err(ValuationError::invalid(format!(
                "growth {:.2}% >= cost of equity {:.2}%",
                g * 100.0,
                r * 100.0
            )));
        }

        let (dividend, dividend_source) = Self::current_dividend(snapshot).ok_or_else(|| {
            ValuationError::missing(&[
                Field::DividendRate.name(),
                Field::TrailingAnnualDividendRate.name(),
                Field::DividendYieldRaw.name(),
            ])
        })?;

        let next_dividend = dividend * (1.0 + g);
        let intrinsic_value = next_dividend / (r - g);

        let margin = snapshot
            .price()
            .and_then(|price| margin_of_safety(intrinsic_value, price));

        Ok(DdmValuation {
            dividend: round2(dividend),
            dividend_source,
            next_dividend: round2(next_dividend),
            cost_of_equity: r,
            growth_rate: g,
            intrinsic_value: round2(intrinsic_value),
            margin_of_safety: margin,
        })
    }
}
