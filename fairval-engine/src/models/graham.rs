//! Benjamin Graham's growth formula.
//!
//! ```text
//! V          = EPS × (8.5 + 2g)            g in percent, clamped to [0, 25]
//! V_adjusted = V × 4.4 / Y                 Y = current AAA bond yield
//! ```

use serde::Serialize;

use super::{ModelKind, ValuationModel};
use crate::error::ValuationError;
use crate::helpers::{estimate_growth, margin_of_safety, GrowthSource};
use crate::snapshot::{Field, FinancialSnapshot};
use crate::units::{round2, Percent};
use fairval_common::config::GrahamAssumptions;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrahamValuation {
    pub eps: f64,
    /// Growth used in the formula, percent after clamping
    pub growth_rate: f64,
    /// `None` when no growth field was reported and 0 was assumed
    pub growth_source: Option<GrowthSource>,
    pub intrinsic_value: f64,
    /// Intrinsic value scaled by the reference / AAA yield ratio
    pub intrinsic_value_adjusted: f64,
    pub margin_of_safety: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct GrahamModel {
    assumptions: GrahamAssumptions,
}

impl GrahamModel {
    pub fn new(assumptions: GrahamAssumptions) -> Self {
        Self { assumptions }
    }
}

impl ValuationModel for GrahamModel {
    type Output = GrahamValuation;

    const KIND: ModelKind = ModelKind::Graham;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError> {
        let eps = snapshot
            .get(Field::TrailingEps)
            .ok_or_else(|| ValuationError::missing_field(Field::TrailingEps))?;

        let a = &self.assumptions;
        if a.aaa_yield <= 0.0 {
            return Err(ValuationError::invalid(format!(
                "AAA bond yield must be positive, got {}",
                a.aaa_yield
            )));
        }

        if a.max_growth_percent.is_nan() || a.max_growth_percent < 0.0 {
            return Err(ValuationError::invalid(format!(
                "growth cap must be non-negative, got {}%",
                a.max_growth_percent
            )));
        }

        let estimate = estimate_growth(snapshot);
        let growth = estimate
            .map(|e| e.rate.to_percent())
            .unwrap_or(Percent::ZERO)
            .clamp(0.0, a.max_growth_percent);

        let multiple = a.no_growth_pe + a.growth_multiplier * growth.value();
        let intrinsic_value = eps * multiple;
        let intrinsic_value_adjusted = intrinsic_value * a.reference_yield / a.aaa_yield;

        let margin = snapshot
            .price()
            .and_then(|price| margin_of_safety(intrinsic_value, price));

        Ok(GrahamValuation {
            eps,
            growth_rate: round2(growth.value()),
            growth_source: estimate.map(|e| e.source),
            intrinsic_value: round2(intrinsic_value),
            intrinsic_value_adjusted: round2(intrinsic_value_adjusted),
            margin_of_safety: margin,
        })
    }
}
