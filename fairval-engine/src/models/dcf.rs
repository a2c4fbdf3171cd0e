//! Discounted cash flow.
//!
//! Projects free cash flow over an explicit horizon, discounts each year at
//! WACC and adds a Gordon-growth terminal value:
//!
//! ```text
//! FCFᵢ      = FCFᵢ₋₁ × (1 + growth)            FCF₀ = base FCF
//! PVᵢ       = FCFᵢ / (1 + wacc)ⁱ
//! TV        = FCFₙ × (1 + g_t) / (wacc − g_t)
//! equity    = Σ PVᵢ + TV / (1 + wacc)ⁿ
//! per share = equity / shares outstanding
//! ```
//!
//! Equity value is taken equal to enterprise value: no cash or debt
//! adjustment is made. Every yearly step is kept in the output so the
//! figure can be audited.
//!
//! Without a reported FCF the model can fall back to a fraction of market
//! cap. That basis says nothing about the business and is flagged with
//! `is_estimated`.

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::helpers::margin_of_safety;
use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::round2;
use fairval_common::config::{DcfAssumptions, MAX_HORIZON_YEARS};

/// Where the base free cash flow came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FcfSource {
    Reported,
    /// Operating cash flow plus (negative) capital expenditures
    DerivedFromCashflows,
    MarketCapProxy,
}

impl FcfSource {
    pub const fn is_estimated(self) -> bool {
        matches!(self, Self::MarketCapProxy)
    }
}

/// Inputs the projection ran with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfParameters {
    pub initial_fcf: f64,
    pub growth_rate: f64,
    pub wacc: f64,
    pub terminal_growth: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfStep {
    pub year: u32,
    pub fcf: f64,
    pub discount_factor: f64,
    pub present_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalValue {
    /// Value at the end of the horizon
    pub future_value: f64,
    pub present_value: f64,
}

/// One rung of the buy-price ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyPrice {
    /// Fractional margin of safety
    pub margin: f64,
    pub price: f64,
    /// `None` without a current price
    pub is_undervalued: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfValuation {
    pub parameters: DcfParameters,
    pub fcf_source: FcfSource,
    pub is_estimated: bool,
    pub steps: Vec<DcfStep>,
    pub terminal_value: TerminalValue,
    pub sum_pv_cash_flows: f64,
    pub equity_value: f64,
    pub shares_outstanding: f64,
    pub fair_value_per_share: f64,
    pub margin_of_safety: Option<f64>,
    pub buy_prices: Vec<BuyPrice>,
}

#[derive(Debug, Clone, Default)]
pub struct DiscountedCashFlowModel {
    assumptions: DcfAssumptions,
}

impl DiscountedCashFlowModel {
    pub fn new(assumptions: DcfAssumptions) -> Self {
        Self { assumptions }
    }

    /// Pick the base FCF: reported, then derived (when enabled), then the
    /// market-cap proxy. Zero is treated as unreported.
    fn base_fcf(&self, snapshot: &FinancialSnapshot) -> Option<(f64, FcfSource)> {
        if let Some(fcf) = snapshot.get(Field::FreeCashflow).filter(|v| *v != 0.0) {
            return Some((fcf, FcfSource::Reported));
        }

        if self.assumptions.derive_fcf_from_cashflows {
            let derived = snapshot
                .get(Field::OperatingCashflow)
                .zip(snapshot.get(Field::CapitalExpenditures))
                .map(|(ocf, capex)| ocf + capex)
                .filter(|v| *v != 0.0);
            if let Some(fcf) = derived {
                return Some((fcf, FcfSource::DerivedFromCashflows));
            }
        }

        let market_cap = snapshot.get_positive(Field::MarketCap)?;
        let fcf = market_cap * self.assumptions.market_cap_fcf_ratio;
        tracing::warn!(
            symbol = snapshot.symbol.as_deref().unwrap_or("-"),
            market_cap,
            fcf,
            ratio = self.assumptions.market_cap_fcf_ratio,
            "No free cash flow reported, using market-cap proxy"
        );
        Some((fcf, FcfSource::MarketCapProxy))
    }

    fn check_assumptions(&self) -> Result<(), ValuationError> {
        let a = &self.assumptions;
        if a.horizon_years == 0 {
            return Err(ValuationError::invalid("DCF horizon must be at least one year"));
        }
        if a.horizon_years > MAX_HORIZON_YEARS {
            return Err(ValuationError::invalid(format!(
                "DCF horizon of {} years exceeds {}",
                a.horizon_years, MAX_HORIZON_YEARS
            )));
        }
        if a.wacc <= a.terminal_growth {
            return Err(ValuationError::invalid(format!(
                "WACC {:.2}% <= terminal growth {:.2}%",
                a.wacc * 100.0,
                a.terminal_growth * 100.0
            )));
        }
        Ok(())
    }
}

impl ValuationModel for DiscountedCashFlowModel {
    type Output = DcfValuation;

    const KIND: ModelKind = ModelKind::Dcf;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        self.check_assumptions()?;

        let (initial_fcf, fcf_source) = self.base_fcf(snapshot).ok_or_else(|| {
            ValuationError::missing(&[Field::FreeCashflow.name(), Field::MarketCap.name()])
        })?;

        let shares = snapshot
            .shares()
            .ok_or_else(|| ValuationError::missing_field(Field::SharesOutstanding))?;

        let a = &self.assumptions;
        let years = a.horizon_years;

        let mut steps = Vec::with_capacity(years as usize);
        let mut fcf = initial_fcf;
        for year in 1..=years {
            fcf *= 1.0 + a.growth_rate;
            let discount_factor = 1.0 / (1.0 + a.wacc).powi(year as i32);
            steps.push(DcfStep {
                year,
                fcf,
                discount_factor,
                present_value: fcf * discount_factor,
            });
        }

        let sum_pv_cash_flows: f64 = steps.iter().map(|s| s.present_value).sum();

        let future_value = fcf * (1.0 + a.terminal_growth) / (a.wacc - a.terminal_growth);
        let terminal_pv = future_value / (1.0 + a.wacc).powi(years as i32);

        let equity_value = sum_pv_cash_flows + terminal_pv;
        let fair_value = equity_value / shares;

        let price = snapshot.price();
        let buy_prices = a
            .safety_margins
            .iter()
            .map(|&margin| {
                let buy_price = fair_value * (1.0 - margin);
                BuyPrice {
                    margin,
                    price: round2(buy_price),
                    is_undervalued: price.map(|p| p < buy_price),
                }
            })
            .collect();

        Ok(DcfValuation {
            parameters: DcfParameters {
                initial_fcf,
                growth_rate: a.growth_rate,
                wacc: a.wacc,
                terminal_growth: a.terminal_growth,
                years,
            },
            fcf_source,
            is_estimated: fcf_source.is_estimated(),
            steps,
            terminal_value: TerminalValue {
                future_value,
                present_value: terminal_pv,
            },
            sum_pv_cash_flows,
            equity_value,
            shares_outstanding: shares,
            fair_value_per_share: round2(fair_value),
            margin_of_safety: price.and_then(|p| margin_of_safety(fair_value, p)),
            buy_prices,
        })
    }
}
