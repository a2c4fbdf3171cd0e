//! PE to growth ratio.
//!
//! `PEG = PE / g` with `g` in percent. A data-source PEG is trusted as-is
//! and the implied growth is backed out of it; otherwise growth comes from
//! the snapshot's earnings or revenue growth.

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::helpers::{estimate_growth, GrowthSource};
use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::round2;
use fairval_common::config::PegAssumptions;

/// Which PE figure was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeSource {
    Trailing,
    Forward,
}

/// Where the growth figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PegGrowthSource {
    /// Implied by the data source's own PEG
    ReportedPeg,
    Earnings,
    Revenue,
}

impl From<GrowthSource> for PegGrowthSource {
    fn from(source: GrowthSource) -> Self {
        match source {
            GrowthSource::Earnings => Self::Earnings,
            GrowthSource::Revenue => Self::Revenue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PegSignal {
    Buy,
    Reasonable,
    Sell,
}

impl std::fmt::Display for PegSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Reasonable => write!(f, "reasonable"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PegValuation {
    pub pe: f64,
    pub pe_source: PeSource,
    /// Percent
    pub growth_rate: f64,
    pub growth_source: PegGrowthSource,
    pub peg: f64,
    pub signal: PegSignal,
}

#[derive(Debug, Clone, Default)]
pub struct PegModel {
    assumptions: PegAssumptions,
}

impl PegModel {
    pub fn new(assumptions: PegAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn classify(&self, peg: f64) -> PegSignal {
        if peg < self.assumptions.buy_below {
            PegSignal::Buy
        } else if peg > self.assumptions.sell_above {
            PegSignal::Sell
        } else {
            PegSignal::Reasonable
        }
    }

    fn pe(snapshot: &FinancialSnapshot) -> Option<(f64, PeSource)> {
        snapshot
            .get(Field::TrailingPe)
            .map(|pe| (pe, PeSource::Trailing))
            .or_else(|| snapshot.get(Field::ForwardPe).map(|pe| (pe, PeSource::Forward)))
    }
}

impl ValuationModel for PegModel {
    type Output = PegValuation;

    const KIND: ModelKind = ModelKind::Peg;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        let (pe, pe_source) = Self::pe(snapshot).ok_or_else(|| {
            ValuationError::missing(&[Field::TrailingPe.name(), Field::ForwardPe.name()])
        })?;

        let (peg, growth, growth_source) = match snapshot.get(Field::PegRatio) {
            Some(reported) if reported <= 0.0 => {
                return Err(ValuationError::invalid(format!(
                    "reported PEG must be positive, got {}",
                    reported
                )));
            }
            Some(reported) => (reported, pe / reported, PegGrowthSource::ReportedPeg),
            None => {
                let estimate = estimate_growth(snapshot).ok_or_else(|| {
                    ValuationError::missing(&[
                        Field::EarningsGrowth.name(),
                        Field::RevenueGrowth.name(),
                    ])
                })?;
                let growth = estimate.rate.to_percent().value();
                if growth <= 0.0 {
                    return Err(ValuationError::invalid(format!(
                        "PEG is undefined for non-positive growth ({:.2}%)",
                        growth
                    )));
                }
                (pe / growth, growth, estimate.source.into())
            }
        };

        Ok(PegValuation {
            pe,
            pe_source,
            growth_rate: round2(growth),
            growth_source,
            peg: round2(peg),
            signal: self.classify(peg),
        })
    }
}
