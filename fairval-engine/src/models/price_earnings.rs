//! Price-earnings summary.
//!
//! Passes the headline multiples through unchanged and adds the best
//! available dividend yield. This model never fails: every field is
//! individually nullable.

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::helpers::best_dividend_yield;
use crate::snapshot::{Field, FinancialSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEarningsValuation {
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub forward_eps: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Fractional ROE, as reported
    pub return_on_equity: Option<f64>,
    pub book_value: Option<f64>,
    /// Fractional yield
    pub best_dividend_yield: Option<f64>,
    pub sector: String,
}

#[derive(Debug, Clone, Default)]
pub struct PriceEarningsModel;

impl PriceEarningsModel {
    pub fn new() -> Self {
        Self
    }

    /// Summarize the snapshot's earnings and book multiples.
    pub fn summarize(&self, snapshot: &FinancialSnapshot) -> PriceEarningsValuation {
        PriceEarningsValuation {
            trailing_pe: snapshot.get(Field::TrailingPe),
            forward_pe: snapshot.get(Field::ForwardPe),
            trailing_eps: snapshot.get(Field::TrailingEps),
            forward_eps: snapshot.get(Field::ForwardEps),
            price_to_book: snapshot.get(Field::PriceToBook),
            return_on_equity: snapshot.get(Field::ReturnOnEquity),
            book_value: snapshot.get(Field::BookValue),
            best_dividend_yield: best_dividend_yield(snapshot).map(|y| y.value()),
            sector: snapshot.sector_or_unknown().to_string(),
        }
    }
}

impl ValuationModel for PriceEarningsModel {
    type Output = PriceEarningsValuation;

    const KIND: ModelKind = ModelKind::PriceEarnings;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        Ok(self.summarize(snapshot))
    }
}
