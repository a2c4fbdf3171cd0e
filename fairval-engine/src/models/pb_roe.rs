//! PB-ROE anchoring.
//!
//! A company compounding equity at ROE deserves a price-to-book multiple
//! proportional to that ROE. The anchor maps ROE (in percent) to fair PB:
//!
//! ```text
//! fair PB    = ROE% / 7
//! fair value = fair PB × BPS
//! margin     = (fair value − price) / fair value × 100
//! buy band   = fair PB × [0.7, 0.8]
//! sell band  = fair PB × [1.2, 1.3]
//! ```

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::snapshot::{Field, FinancialSnapshot, PRICE};
use crate::units::{round2, Ratio};
use fairval_common::config::PbRoeAssumptions;

/// Conclusion drawn from the margin of safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PbRoeSignal {
    #[serde(rename = "severely undervalued")]
    SeverelyUndervalued,
    #[serde(rename = "slightly undervalued")]
    SlightlyUndervalued,
    #[serde(rename = "overvalued")]
    Overvalued,
}

impl std::fmt::Display for PbRoeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeverelyUndervalued => write!(f, "severely undervalued"),
            Self::SlightlyUndervalued => write!(f, "slightly undervalued"),
            Self::Overvalued => write!(f, "overvalued"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PbRoeValuation {
    /// ROE as reported, fractional
    pub current_roe: f64,
    pub current_pb: Option<f64>,
    /// Book value per share
    pub bps: f64,
    pub price: f64,
    pub target_pb: f64,
    pub fair_value: f64,
    /// Margin of safety (%); negative when the price exceeds fair value
    pub margin: f64,
    pub buy_range_pb: (f64, f64),
    pub buy_range_price: (f64, f64),
    pub sell_range_pb: (f64, f64),
    pub sell_range_price: (f64, f64),
    pub signal: PbRoeSignal,
}

#[derive(Debug, Clone, Default)]
pub struct PbRoeModel {
    assumptions: PbRoeAssumptions,
}

impl PbRoeModel {
    pub fn new(assumptions: PbRoeAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &PbRoeAssumptions {
        &self.assumptions
    }

    fn classify(&self, margin: f64) -> PbRoeSignal {
        if margin > self.assumptions.deep_discount_margin {
            PbRoeSignal::SeverelyUndervalued
        } else if margin > 0.0 {
            PbRoeSignal::SlightlyUndervalued
        } else {
            PbRoeSignal::Overvalued
        }
    }
}

impl ValuationModel for PbRoeModel {
    type Output = PbRoeValuation;

    const KIND: ModelKind = ModelKind::PbRoe;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        let roe = snapshot.get(Field::ReturnOnEquity);
        let bps = snapshot.get(Field::BookValue);
        let price = snapshot.price();

        let (Some(roe), Some(bps), Some(price)) = (roe, bps, price) else {
            return Err(ValuationError::missing_from(&[
                (Field::ReturnOnEquity.name(), roe.is_some()),
                (Field::BookValue.name(), bps.is_some()),
                (PRICE, price.is_some()),
            ]));
        };

        let a = &self.assumptions;
        if a.anchor_divisor <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "PB anchor divisor must be positive, got {}",
                a.anchor_divisor
            )));
        }

        if roe <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "PB-ROE needs positive ROE, got {:.2}%",
                Ratio::new(roe).to_percent().value()
            )));
        }
        if bps <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "PB-ROE needs positive book value per share, got {:.2}",
                bps
            )));
        }

        let roe_percent = Ratio::new(roe).to_percent();
        let target_pb = roe_percent.value() / a.anchor_divisor;
        let fair_value = target_pb * bps;

        let margin = (fair_value - price) / fair_value * 100.0;

        let band = |low: f64, high: f64| (round2(target_pb * low), round2(target_pb * high));
        let price_band =
            |low: f64, high: f64| (round2(target_pb * low * bps), round2(target_pb * high * bps));

        Ok(PbRoeValuation {
            current_roe: roe,
            current_pb: snapshot.get(Field::PriceToBook),
            bps,
            price,
            target_pb: round2(target_pb),
            fair_value: round2(fair_value),
            margin: round2(margin),
            buy_range_pb: band(a.buy_band_low, a.buy_band_high),
            buy_range_price: price_band(a.buy_band_low, a.buy_band_high),
            sell_range_pb: band(a.sell_band_low, a.sell_band_high),
            sell_range_price: price_band(a.sell_band_low, a.sell_band_high),
            signal: self.classify(margin),
        })
    }
}
