//! Valuation engine: owns every model and fans a snapshot out to them.

use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::error::ValuationError;
use crate::models::{
    DcfValuation, DdmValuation, DiscountedCashFlowModel, DividendDiscountModel, GrahamModel,
    GrahamValuation, ModelKind, PbRoeModel, PbRoeValuation, PegModel, PegValuation,
    PriceEarningsModel, PriceEarningsValuation, PriceReturnModel, PriceReturnValuation,
    ThreeYearTargetModel, ThreeYearValuation, ValuationModel,
};
use crate::report::{ValuationReport, ValuationResult};
use crate::snapshot::FinancialSnapshot;
use fairval_common::config::ValuationConfig;

/// Runs valuation models against a snapshot.
///
/// The engine holds no per-request state: one instance can serve any number
/// of snapshots, from any number of threads.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    config: ValuationConfig,
    price_earnings: PriceEarningsModel,
    pb_roe: PbRoeModel,
    price_return: PriceReturnModel,
    graham: GrahamModel,
    peg: PegModel,
    ddm: DividendDiscountModel,
    three_year: ThreeYearTargetModel,
    dcf: DiscountedCashFlowModel,
}

impl ValuationEngine {
    /// Engine with the classical default assumptions.
    pub fn new() -> Self {
        Self::with_config(ValuationConfig::default())
    }

    pub fn with_config(config: ValuationConfig) -> Self {
        Self {
            price_earnings: PriceEarningsModel::new(),
            pb_roe: PbRoeModel::new(config.pb_roe.clone()),
            price_return: PriceReturnModel::new(config.price_return.clone()),
            graham: GrahamModel::new(config.graham.clone()),
            peg: PegModel::new(config.peg.clone()),
            ddm: DividendDiscountModel::new(config.ddm.clone()),
            three_year: ThreeYearTargetModel::new(config.three_year.clone()),
            dcf: DiscountedCashFlowModel::new(config.dcf.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    // ========================================================================
    // Single models
    // ========================================================================

    pub fn evaluate_price_earnings(
        &self,
        snapshot: &FinancialSnapshot,
    ) -> Result<PriceEarningsValuation, ValuationError> {
        self.price_earnings.evaluate(snapshot)
    }

    pub fn evaluate_pb_roe(
        &self,
        snapshot: &FinancialSnapshot,
    ) -> Result<PbRoeValuation, ValuationError> {
        self.pb_roe.evaluate(snapshot)
    }

    pub fn evaluate_price_return(
        &self,
        snapshot: &FinancialSnapshot,
    ) -> Result<PriceReturnValuation, ValuationError> {
        self.price_return.evaluate(snapshot)
    }

    pub fn evaluate_graham(
        &self,
        snapshot: &FinancialSnapshot,
    ) -> Result<GrahamValuation, ValuationError> {
        self.graham.evaluate(snapshot)
    }

    pub fn evaluate_peg(&self, snapshot: &FinancialSnapshot) -> Result<PegValuation, ValuationError> {
        self.peg.evaluate(snapshot)
    }

    pub fn evaluate_ddm(&self, snapshot: &FinancialSnapshot) -> Result<DdmValuation, ValuationError> {
        self.ddm.evaluate(snapshot)
    }

    pub fn evaluate_three_year_target(
        &self,
        snapshot: &FinancialSnapshot,
    ) -> Result<ThreeYearValuation, ValuationError> {
        self.three_year.evaluate(snapshot)
    }

    pub fn evaluate_dcf(&self, snapshot: &FinancialSnapshot) -> Result<DcfValuation, ValuationError> {
        self.dcf.evaluate(snapshot)
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Run the requested models in parallel and collect their results.
    ///
    /// Never fails as a whole: a model that cannot value the snapshot gets
    /// an error entry. Duplicate kinds are evaluated once.
    pub fn evaluate(&self, snapshot: &FinancialSnapshot, models: &[ModelKind]) -> ValuationReport {
        let mut report = ValuationReport::for_snapshot(snapshot);

        let mut kinds = models.to_vec();
        kinds.sort();
        kinds.dedup();

        report.models = kinds
            .par_iter()
            .map(|&kind| (kind, self.run(kind, snapshot)))
            .collect::<BTreeMap<_, _>>();

        tracing::debug!(
            symbol = report.symbol.as_deref().unwrap_or("-"),
            requested = report.models.len(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Valuation complete"
        );

        report
    }

    /// Run every model.
    pub fn evaluate_all(&self, snapshot: &FinancialSnapshot) -> ValuationReport {
        self.evaluate(snapshot, &ModelKind::ALL)
    }

    fn run(&self, kind: ModelKind, snapshot: &FinancialSnapshot) -> ValuationResult {
        match kind {
            ModelKind::PriceEarnings => settle(&self.price_earnings, snapshot),
            ModelKind::PbRoe => settle(&self.pb_roe, snapshot),
            ModelKind::PriceReturn => settle(&self.price_return, snapshot),
            ModelKind::Graham => settle(&self.graham, snapshot),
            ModelKind::Peg => settle(&self.peg, snapshot),
            ModelKind::Ddm => settle(&self.ddm, snapshot),
            ModelKind::ThreeYearTarget => settle(&self.three_year, snapshot),
            ModelKind::Dcf => settle(&self.dcf, snapshot),
        }
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn settle<M: ValuationModel>(model: &M, snapshot: &FinancialSnapshot) -> ValuationResult {
    let result = model.evaluate(snapshot);
    if let Err(ref err) = result {
        tracing::debug!(model = %M::KIND, error = %err, "Model could not value snapshot");
    }
    result.into()
}
