//! Valuation models.
//!
//! Each model is a small struct holding its (immutable) assumptions and a
//! pure `evaluate` over a borrowed [`FinancialSnapshot`]. Models never touch
//! I/O, the clock, or each other, so any subset can run in any order or in
//! parallel against the same snapshot.
//!
//! | Model | Kind | Core formula |
//! |-------|------|--------------|
//! | [`PriceEarningsModel`] | `price_earnings` | pass-through + best dividend yield |
//! | [`PbRoeModel`] | `pb_roe` | fair PB = ROE% / 7 |
//! | [`PriceReturnModel`] | `price_return` | PR = N × PE / ROE% |
//! | [`GrahamModel`] | `graham` | V = EPS × (8.5 + 2g) |
//! | [`PegModel`] | `peg` | PEG = PE / g% |
//! | [`DividendDiscountModel`] | `ddm` | V = D₁ / (r − g) |
//! | [`ThreeYearTargetModel`] | `three_year_target` | buy = profit₃ × 25 / 2 |
//! | [`DiscountedCashFlowModel`] | `dcf` | V = Σ PVᵢ + PV(terminal) |

pub mod dcf;
pub mod ddm;
pub mod graham;
pub mod pb_roe;
pub mod peg;
pub mod price_earnings;
pub mod price_return;
pub mod three_year;

pub use dcf::{
    BuyPrice, DcfParameters, DcfStep, DcfValuation, DiscountedCashFlowModel, FcfSource,
    TerminalValue,
};
pub use ddm::{DdmValuation, DividendDiscountModel, DividendSource};
pub use graham::{GrahamModel, GrahamValuation};
pub use pb_roe::{PbRoeModel, PbRoeSignal, PbRoeValuation};
pub use peg::{PeSource, PegGrowthSource, PegModel, PegSignal, PegValuation};
pub use price_earnings::{PriceEarningsModel, PriceEarningsValuation};
pub use price_return::{PrSignal, PriceReturnModel, PriceReturnValuation};
pub use three_year::{NetIncomeSource, TargetSignal, ThreeYearTargetModel, ThreeYearValuation};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValuationError;
use crate::snapshot::FinancialSnapshot;

/// Identifies a model in requests and reports.
///
/// Ordering follows declaration order, which is also the order models
/// appear in a serialized report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    PriceEarnings,
    PbRoe,
    PriceReturn,
    Graham,
    Peg,
    Ddm,
    ThreeYearTarget,
    Dcf,
}

impl ModelKind {
    pub const ALL: [ModelKind; 8] = [
        Self::PriceEarnings,
        Self::PbRoe,
        Self::PriceReturn,
        Self::Graham,
        Self::Peg,
        Self::Ddm,
        Self::ThreeYearTarget,
        Self::Dcf,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceEarnings => "price_earnings",
            Self::PbRoe => "pb_roe",
            Self::PriceReturn => "price_return",
            Self::Graham => "graham",
            Self::Peg => "peg",
            Self::Ddm => "ddm",
            Self::ThreeYearTarget => "three_year_target",
            Self::Dcf => "dcf",
        }
    }

    /// One-line description for listings.
    pub const fn description(self) -> &'static str {
        match self {
            Self::PriceEarnings => "PE/EPS/PB/ROE pass-through with best dividend yield",
            Self::PbRoe => "PB-ROE anchoring: fair PB = ROE% / 7, buy/sell bands",
            Self::PriceReturn => "Price-to-return ratio PR = N x PE / ROE%, three variants",
            Self::Graham => "Graham growth formula V = EPS x (8.5 + 2g)",
            Self::Peg => "PE to growth ratio",
            Self::Ddm => "Gordon growth dividend discount model",
            Self::ThreeYearTarget => "Three-year profit target with 25x exit and 50x sell",
            Self::Dcf => "Five-year discounted free cash flow with terminal value",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown model identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model '{0}' (expected one of: price_earnings, pb_roe, price_return, graham, peg, ddm, three_year_target, dcf)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "price_earnings" | "pe" => Ok(Self::PriceEarnings),
            "pb_roe" | "pb" => Ok(Self::PbRoe),
            "price_return" | "pr" => Ok(Self::PriceReturn),
            "graham" => Ok(Self::Graham),
            "peg" => Ok(Self::Peg),
            "ddm" => Ok(Self::Ddm),
            "three_year_target" | "three_year" | "tang" => Ok(Self::ThreeYearTarget),
            "dcf" => Ok(Self::Dcf),
            _ => Err(UnknownModel(s.to_string())),
        }
    }
}

/// A valuation model over a single snapshot.
pub trait ValuationModel: Send + Sync {
    /// Successful result payload.
    type Output: Into<ModelOutput>;

    const KIND: ModelKind;

    fn evaluate(&self, snapshot: &FinancialSnapshot) -> Result<Self::Output, ValuationError>;
}

/// Successful result of any model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelOutput {
    PriceEarnings(PriceEarningsValuation),
    PbRoe(PbRoeValuation),
    PriceReturn(PriceReturnValuation),
    Graham(GrahamValuation),
    Peg(PegValuation),
    Ddm(DdmValuation),
    ThreeYearTarget(ThreeYearValuation),
    Dcf(DcfValuation),
}

impl ModelOutput {
    pub const fn kind(&self) -> ModelKind {
        match self {
            Self::PriceEarnings(_) => ModelKind::PriceEarnings,
            Self::PbRoe(_) => ModelKind::PbRoe,
            Self::PriceReturn(_) => ModelKind::PriceReturn,
            Self::Graham(_) => ModelKind::Graham,
            Self::Peg(_) => ModelKind::Peg,
            Self::Ddm(_) => ModelKind::Ddm,
            Self::ThreeYearTarget(_) => ModelKind::ThreeYearTarget,
            Self::Dcf(_) => ModelKind::Dcf,
        }
    }
}

macro_rules! impl_into_output {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ModelOutput {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_into_output! {
    PriceEarnings => PriceEarningsValuation,
    PbRoe => PbRoeValuation,
    PriceReturn => PriceReturnValuation,
    Graham => GrahamValuation,
    Peg => PegValuation,
    Ddm => DdmValuation,
    ThreeYearTarget => ThreeYearValuation,
    Dcf => DcfValuation,
}
