//! Derivations shared by several models.

use serde::{Deserialize, Serialize};

use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::{round2, Ratio};

/// Best available dividend yield, as a fraction.
///
/// Data sources populate the trailing dividend rate and the reported yield
/// inconsistently, so both are computed and the larger one wins:
///
/// - trailing yield = `trailingAnnualDividendRate / price` (0 when no rate)
/// - reported yield = `dividendYieldRaw`, normalized from percent when > 1
///   (0 when absent)
///
/// Returns `None` without a price, or when neither yield is positive.
pub fn best_dividend_yield(snapshot: &FinancialSnapshot) -> Option<Ratio> {
    let price = snapshot.price()?;

    let ttm_yield = snapshot
        .get(Field::TrailingAnnualDividendRate)
        .map(|rate| Ratio::new(rate / price))
        .unwrap_or(Ratio::ZERO);

    let forward_yield = snapshot
        .get(Field::DividendYieldRaw)
        .map(Ratio::from_ambiguous_yield)
        .unwrap_or(Ratio::ZERO);

    let best = ttm_yield.max(forward_yield);
    (best.value() > 0.0).then_some(best)
}

/// Which snapshot field a growth estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSource {
    Earnings,
    Revenue,
}

/// A growth rate and where it came from. The rate is fractional and
/// unclamped; each model applies its own bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthEstimate {
    pub rate: Ratio,
    pub source: GrowthSource,
}

/// Growth from `earningsGrowth`, else `revenueGrowth`.
pub fn estimate_growth(snapshot: &FinancialSnapshot) -> Option<GrowthEstimate> {
    if let Some(g) = snapshot.get(Field::EarningsGrowth) {
        return Some(GrowthEstimate {
            rate: Ratio::new(g),
            source: GrowthSource::Earnings,
        });
    }

    snapshot
        .get(Field::RevenueGrowth)
        .map(|g| GrowthEstimate {
            rate: Ratio::new(g),
            source: GrowthSource::Revenue,
        })
}

/// Margin of safety (%) of `price` against `value`, rounded for output.
///
/// Positive means the price is below the value. `None` when the value is
/// not positive.
pub fn margin_of_safety(value: f64, price: f64) -> Option<f64> {
    (value > 0.0).then(|| round2((value - price) / value * 100.0))
}
