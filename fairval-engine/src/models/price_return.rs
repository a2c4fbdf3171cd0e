//! Price-to-return ratio (市赚率, PR).
//!
//! PR compares what the market charges (PE) with what the business earns on
//! its equity (ROE in percent). A company with PE 15 and ROE 15% sits at
//! PR = 1.0, the fair line.
//!
//! Low-payout companies retain more earnings than the market pays for, so
//! the canonical ratio scales PE by a dividend-adjustment factor N:
//!
//! | Payout ratio | N |
//! |--------------|---|
//! | missing | 1.0 |
//! | ≥ 50% | 1.0 |
//! | ≤ 25% | 2.0 |
//! | between | 0.5 / payout |
//!
//! Three variants are reported:
//! - `pr1 = PE / ROE%` (unadjusted)
//! - `pr2 = N × PE / ROE%` (canonical, drives the signal)
//! - `pr3 = PB / (ROE% × ROE)` when PB is reported
//!
//! `pr3` mixes a percent-scaled and a fraction-scaled ROE in one
//! denominator. It is kept literally as a book-value cross-check and should
//! be validated against a known-good reference before anyone relies on it.

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::{round_to, Ratio};
use fairval_common::config::PriceReturnAssumptions;

/// PR sub-ratios are reported to three decimals.
const PR_DECIMALS: u32 = 3;

/// Classification of the canonical PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrSignal {
    #[serde(rename = "severely undervalued / buy")]
    Buy,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "overvalued / sell")]
    Sell,
}

impl std::fmt::Display for PrSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "severely undervalued / buy"),
            Self::Hold => write!(f, "hold"),
            Self::Sell => write!(f, "overvalued / sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReturnValuation {
    pub pe: f64,
    /// ROE as reported, fractional
    pub roe: f64,
    pub payout_ratio: Option<f64>,
    /// Dividend-adjustment factor N
    pub n_factor: f64,
    pub pr1: f64,
    pub pr2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr3: Option<f64>,
    pub signal: PrSignal,
}

#[derive(Debug, Clone, Default)]
pub struct PriceReturnModel {
    assumptions: PriceReturnAssumptions,
}

impl PriceReturnModel {
    pub fn new(assumptions: PriceReturnAssumptions) -> Self {
        Self { assumptions }
    }

    /// Dividend-adjustment factor N for a payout ratio.
    pub fn n_factor(&self, payout_ratio: Option<f64>) -> f64 {
        let a = &self.assumptions;
        match payout_ratio {
            None => 1.0,
            Some(dpr) if dpr >= a.full_payout_ratio => 1.0,
            Some(dpr) if dpr <= a.low_payout_ratio => a.low_payout_factor,
            Some(dpr) => a.full_payout_ratio / dpr,
        }
    }

    /// Classify a canonical PR. Both hold boundaries are inclusive.
    pub fn classify(&self, pr: f64) -> PrSignal {
        if pr < self.assumptions.buy_below {
            PrSignal::Buy
        } else if pr > self.assumptions.sell_above {
            PrSignal::Sell
        } else {
            PrSignal::Hold
        }
    }
}

impl ValuationModel for PriceReturnModel {
    type Output = PriceReturnValuation;

    const KIND: ModelKind = ModelKind::PriceReturn;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        let pe = snapshot.get(Field::TrailingPe);
        let roe = snapshot.get(Field::ReturnOnEquity);

        let (Some(pe), Some(roe)) = (pe, roe) else {
            return Err(ValuationError::missing_from(&[
                (Field::TrailingPe.name(), pe.is_some()),
                (Field::ReturnOnEquity.name(), roe.is_some()),
            ]));
        };

        let roe_percent = Ratio::new(roe).to_percent();
        if roe_percent.value() <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "PR is undefined for non-positive ROE ({:.2}%)",
                roe_percent.value()
            )));
        }

        let payout_ratio = snapshot.get(Field::PayoutRatio);
        let n = self.n_factor(payout_ratio);

        let pr1 = pe / roe_percent.value();
        let pr2 = n * pe / roe_percent.value();
        let pr3 = snapshot
            .get(Field::PriceToBook)
            .map(|pb| pb / (roe_percent.value() * roe));

        Ok(PriceReturnValuation {
            pe,
            roe,
            payout_ratio,
            n_factor: n,
            pr1: round_to(pr1, PR_DECIMALS),
            pr2: round_to(pr2, PR_DECIMALS),
            pr3: pr3.map(|v| round_to(v, PR_DECIMALS)),
            signal: self.classify(pr2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn make_snapshot(pe: f64, roe: f64, payout: Option<f64>) -> FinancialSnapshot {
        FinancialSnapshot {
            trailing_pe: Some(pe),
            return_on_equity: Some(roe),
            payout_ratio: payout,
            ..Default::default()
        }
    }

    #[test_case(None, 1.0 ; "missing payout")]
    #[test_case(Some(0.6), 1.0 ; "high payout")]
    #[test_case(Some(0.5), 1.0 ; "payout at full boundary")]
    #[test_case(Some(0.25), 2.0 ; "payout at low boundary")]
    #[test_case(Some(0.1), 2.0 ; "low payout")]
    #[test_case(Some(0.4), 1.25 ; "mid payout")]
    fn test_n_factor(payout: Option<f64>, expected: f64) {
        let n = PriceReturnModel::default().n_factor(payout);
        assert!((n - expected).abs() < 1e-12, "n = {}", n);
    }

    #[test]
    fn test_n_factor_between_bands() {
        let n = PriceReturnModel::default().n_factor(Some(0.3));
        assert!((n - 1.6667).abs() < 1e-4);
    }

    #[test]
    fn test_fair_line_is_hold() {
        // PE 15 on ROE 15% with a full payout sits exactly on PR = 1.0
        let result = PriceReturnModel::default()
            .evaluate(&make_snapshot(15.0, 0.15, Some(0.6)))
            .unwrap();

        assert_eq!(result.n_factor, 1.0);
        assert_eq!(result.pr2, 1.0);
        assert_eq!(result.pr1, 1.0);
        assert_eq!(result.signal, PrSignal::Hold);
    }

    #[test_case(0.59, PrSignal::Buy ; "just below buy line")]
    #[test_case(0.6, PrSignal::Hold ; "buy line is hold")]
    #[test_case(1.0, PrSignal::Hold ; "sell line is hold")]
    #[test_case(1.0001, PrSignal::Sell ; "just above sell line")]
    fn test_classification_boundaries(pr: f64, expected: PrSignal) {
        assert_eq!(PriceReturnModel::default().classify(pr), expected);
    }

    #[test]
    fn test_low_payout_doubles_pr() {
        let result = PriceReturnModel::default()
            .evaluate(&make_snapshot(10.0, 0.20, Some(0.2)))
            .unwrap();
        assert_eq!(result.pr1, 0.5);
        assert_eq!(result.pr2, 1.0);
        assert_eq!(result.signal, PrSignal::Hold);
    }

    #[test]
    fn test_buy_and_sell() {
        let model = PriceReturnModel::default();

        let cheap = model.evaluate(&make_snapshot(6.0, 0.15, Some(0.55))).unwrap();
        assert_eq!(cheap.pr2, 0.4);
        assert_eq!(cheap.signal, PrSignal::Buy);

        let rich = model.evaluate(&make_snapshot(40.0, 0.15, None)).unwrap();
        assert_eq!(rich.pr2, 2.667);
        assert_eq!(rich.signal, PrSignal::Sell);
    }

    #[test]
    fn test_pr3_only_with_price_to_book() {
        let model = PriceReturnModel::default();

        let mut snapshot = make_snapshot(15.0, 0.20, None);
        let without = model.evaluate(&snapshot).unwrap();
        assert_eq!(without.pr3, None);
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("pr3").is_none());

        snapshot.price_to_book = Some(3.0);
        let with = model.evaluate(&snapshot).unwrap();
        // 3.0 / (20 × 0.20)
        assert_eq!(with.pr3, Some(0.75));
    }

    #[test]
    fn test_missing_inputs() {
        let snapshot = FinancialSnapshot {
            return_on_equity: Some(0.15),
            ..Default::default()
        };
        let err = PriceReturnModel::default().evaluate(&snapshot).unwrap_err();
        assert_eq!(err, ValuationError::missing(&["trailingPE"]));
    }

    #[test]
    fn test_non_positive_roe_is_invalid() {
        let err = PriceReturnModel::default()
            .evaluate(&make_snapshot(12.0, -0.02, None))
            .unwrap_err();
        assert!(err.is_invalid_assumption());
    }
}
