//! Three-year target ("Tang") model.
//!
//! Projects net income three years out, values it at a 25x exit multiple and
//! demands a 2x return on that target before buying. The sell line is today's
//! profit at 50x, the level at which the market has priced in far more than
//! the business can deliver.
//!
//! ```text
//! profit₃   = net income × (1 + g)³       g clamped to [0, 0.25]
//! buy cap   = profit₃ × 25 / 2            × 0.7 when debt/equity > 100
//! sell cap  = net income × 50
//! ```

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::helpers::{estimate_growth, GrowthSource};
use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::{round2, round_to, Ratio};
use fairval_common::config::{ThreeYearAssumptions, MAX_HORIZON_YEARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetIncomeSource {
    NetIncomeToCommon,
    /// Trailing EPS times shares outstanding
    EpsTimesShares,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSignal {
    Buy,
    Hold,
    Sell,
}

impl std::fmt::Display for TargetSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Hold => write!(f, "hold"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreeYearValuation {
    pub net_income: f64,
    pub net_income_source: NetIncomeSource,
    /// Fractional, after clamping
    pub growth_rate: f64,
    pub growth_source: Option<GrowthSource>,
    pub future_profit: f64,
    pub future_market_cap: f64,
    pub buy_market_cap: f64,
    pub sell_market_cap: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub is_high_leverage: bool,
    pub debt_to_equity: Option<f64>,
    pub signal: Option<TargetSignal>,
}

#[derive(Debug, Clone, Default)]
pub struct ThreeYearTargetModel {
    assumptions: ThreeYearAssumptions,
}

impl ThreeYearTargetModel {
    pub fn new(assumptions: ThreeYearAssumptions) -> Self {
        Self { assumptions }
    }

    fn net_income(snapshot: &FinancialSnapshot) -> Option<(f64, NetIncomeSource)> {
        if let Some(income) = snapshot.get(Field::NetIncomeToCommon) {
            return Some((income, NetIncomeSource::NetIncomeToCommon));
        }

        let eps = snapshot.get(Field::TrailingEps)?;
        let shares = snapshot.shares()?;
        Some((eps * shares, NetIncomeSource::EpsTimesShares))
    }

    fn classify(price: f64, buy_price: f64, sell_price: f64) -> TargetSignal {
        if price <= buy_price {
            TargetSignal::Buy
        } else if price >= sell_price {
            TargetSignal::Sell
        } else {
            TargetSignal::Hold
        }
    }
}

impl ValuationModel for ThreeYearTargetModel {
    type Output = ThreeYearValuation;

    const KIND: ModelKind = ModelKind::ThreeYearTarget;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        let (net_income, net_income_source) = Self::net_income(snapshot).ok_or_else(|| {
            ValuationError::missing(&[
                Field::NetIncomeToCommon.name(),
                Field::TrailingEps.name(),
            ])
        })?;

        if net_income <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "three-year target needs positive net income, got {}",
                net_income
            )));
        }

        let shares = snapshot
            .shares()
            .ok_or_else(|| ValuationError::missing_field(Field::SharesOutstanding))?;

        let a = &self.assumptions;
        if a.return_multiple <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "required return multiple must be positive, got {}",
                a.return_multiple
            )));
        }
        if a.max_growth.is_nan() || a.max_growth < 0.0 {
            return Err(ValuationError::invalid(format!(
                "growth cap must be non-negative, got {}",
                a.max_growth
            )));
        }
        if a.horizon_years > MAX_HORIZON_YEARS {
            return Err(ValuationError::invalid(format!(
                "projection horizon of {} years exceeds {}",
                a.horizon_years, MAX_HORIZON_YEARS
            )));
        }

        let estimate = estimate_growth(snapshot);
        let growth = estimate
            .map(|e| e.rate)
            .unwrap_or(Ratio::ZERO)
            .clamp(0.0, a.max_growth)
            .value();

        let future_profit = net_income * (1.0 + growth).powi(a.horizon_years as i32);
        let future_market_cap = future_profit * a.exit_multiple;

        let debt_to_equity = snapshot.get(Field::DebtToEquity);
        let is_high_leverage = debt_to_equity.is_some_and(|de| de > a.leverage_threshold);

        let mut buy_market_cap = future_market_cap / a.return_multiple;
        if is_high_leverage {
            buy_market_cap *= a.leverage_haircut;
        }
        let sell_market_cap = net_income * a.sell_multiple;

        let buy_price = buy_market_cap / shares;
        let sell_price = sell_market_cap / shares;

        let signal = snapshot
            .price()
            .map(|price| Self::classify(price, buy_price, sell_price));

        Ok(ThreeYearValuation {
            net_income,
            net_income_source,
            growth_rate: round_to(growth, 4),
            growth_source: estimate.map(|e| e.source),
            future_profit: round2(future_profit),
            future_market_cap: round2(future_market_cap),
            buy_market_cap: round2(buy_market_cap),
            sell_market_cap: round2(sell_market_cap),
            buy_price: round2(buy_price),
            sell_price: round2(sell_price),
            is_high_leverage,
            debt_to_equity,
            signal,
        })
    }
}
