//! End-to-end tests for the valuation flow.
//!
//! Quote document → snapshot → engine fan-out → report JSON.

use fairval_common::config::{Config, DcfAssumptions, ThreeYearAssumptions, ValuationConfig};
use fairval_engine::models::{FcfSource, ModelOutput, PbRoeSignal, PrSignal};
use fairval_engine::{ErrorKind, FinancialSnapshot, ModelKind, ValuationEngine, ValuationResult};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

/// A full quote document as the market-data collaborator delivers it.
const BANK_QUOTE: &str = r#"{
    "symbol": "600036.SS",
    "longName": "China Merchants Bank Co., Ltd.",
    "shortName": "CM BANK",
    "sector": "Financial Services",
    "industry": "Banks - Regional",
    "currentPrice": 32.5,
    "previousClose": 32.1,
    "trailingPE": 5.8,
    "forwardPE": 5.5,
    "trailingEps": 5.6,
    "forwardEps": 5.9,
    "pegRatio": null,
    "earningsGrowth": 0.06,
    "revenueGrowth": -0.02,
    "netIncomeToCommon": 1.4e11,
    "priceToBook": 0.82,
    "bookValue": 39.6,
    "returnOnEquity": 0.145,
    "dividendRate": 1.97,
    "trailingAnnualDividendRate": 1.97,
    "dividendYield": 6.06,
    "payoutRatio": 0.33,
    "freeCashflow": null,
    "operatingCashflow": 3.1e11,
    "capitalExpenditures": -1.2e10,
    "marketCap": 8.2e11,
    "sharesOutstanding": 2.52e10,
    "debtToEquity": null,
    "exchange": "SHH"
}"#;

fn bank() -> FinancialSnapshot {
    FinancialSnapshot::from_json(BANK_QUOTE).unwrap()
}

fn output(result: Option<&ValuationResult>) -> &ModelOutput {
    result
        .and_then(ValuationResult::output)
        .expect("model should have succeeded")
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_full_quote_values_with_every_model() {
    let report = ValuationEngine::new().evaluate_all(&bank());

    assert_eq!(report.symbol.as_deref(), Some("600036.SS"));
    assert_eq!(report.name.as_deref(), Some("China Merchants Bank Co., Ltd."));
    assert_eq!(report.price, Some(32.5));
    assert_eq!(report.industry, "Banks - Regional");
    assert_eq!(report.models.len(), 8);
    assert_eq!(report.failure_count(), 0);

    match output(report.get(ModelKind::PbRoe)) {
        ModelOutput::PbRoe(pb) => {
            // 14.5 / 7 × 39.6 = 82.03, far above 32.5
            assert_eq!(pb.fair_value, 82.03);
            assert_eq!(pb.signal, PbRoeSignal::SeverelyUndervalued);
        }
        other => panic!("unexpected output {:?}", other),
    }

    match output(report.get(ModelKind::PriceReturn)) {
        ModelOutput::PriceReturn(pr) => {
            // N = 0.5 / 0.33, PR2 = 1.515 × 5.8 / 14.5 = 0.606
            assert_eq!(pr.pr2, 0.606);
            assert_eq!(pr.signal, PrSignal::Hold);
            assert!(pr.pr3.is_some());
        }
        other => panic!("unexpected output {:?}", other),
    }

    match output(report.get(ModelKind::Dcf)) {
        ModelOutput::Dcf(dcf) => {
            assert_eq!(dcf.fcf_source, FcfSource::MarketCapProxy);
            assert!(dcf.is_estimated);
        }
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn test_missing_field_only_fails_affected_model() {
    let mut snapshot = bank();
    snapshot.book_value = None;

    let report = ValuationEngine::new().evaluate_all(&snapshot);
    assert_eq!(report.failure_count(), 1);

    let (kind, failure) = report.failed().next().unwrap();
    assert_eq!(kind, ModelKind::PbRoe);
    assert_eq!(failure.kind, ErrorKind::MissingData);
    assert_eq!(failure.error, "missing data: bookValue");
}

#[test]
fn test_empty_snapshot_still_reports_every_model() {
    let report = ValuationEngine::new().evaluate_all(&FinancialSnapshot::default());

    assert_eq!(report.models.len(), ModelKind::ALL.len());
    // The multiples summary never fails
    assert_eq!(report.success_count(), 1);
    assert!(report.get(ModelKind::PriceEarnings).unwrap().is_ok());
}

#[test]
fn test_report_json_shape() {
    let mut snapshot = bank();
    snapshot.trailing_eps = None;

    let report = ValuationEngine::new().evaluate(&snapshot, &[ModelKind::Graham, ModelKind::Ddm]);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["sector"], "Financial Services");
    assert_eq!(
        json["models"]["graham"],
        serde_json::json!({"error": "missing data: trailingEps", "kind": "missing_data"})
    );
    assert_eq!(json["models"]["ddm"]["dividend_source"], "dividend_rate");
    assert!(json["models"].get("dcf").is_none());
}

#[test]
fn test_report_is_idempotent() {
    let engine = ValuationEngine::new();
    let snapshot = bank();

    let first = serde_json::to_string(&engine.evaluate_all(&snapshot)).unwrap();
    let second = serde_json::to_string(&engine.evaluate_all(&snapshot)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_configuration_overrides_change_results() {
    let config = ValuationConfig {
        dcf: DcfAssumptions {
            derive_fcf_from_cashflows: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let report = ValuationEngine::with_config(config).evaluate(&bank(), &[ModelKind::Dcf]);
    match output(report.get(ModelKind::Dcf)) {
        ModelOutput::Dcf(dcf) => {
            assert_eq!(dcf.fcf_source, FcfSource::DerivedFromCashflows);
            assert_eq!(dcf.parameters.initial_fcf, 2.98e11);
        }
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn test_config_file_drives_engine() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("valuation.json"),
        r#"{"ddm": {"cost_of_equity": 0.04, "growth_rate": 0.05}}"#,
    )
    .unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();

    let report = ValuationEngine::with_config(config.valuation).evaluate_all(&bank());
    let failure = report.get(ModelKind::Ddm).unwrap().failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::InvalidAssumption);
    // Other models are untouched by a broken DDM configuration
    assert_eq!(report.failure_count(), 1);
}

#[test]
fn test_unvalidated_growth_cap_fails_one_model() {
    let config = ValuationConfig {
        three_year: ThreeYearAssumptions {
            max_growth: -0.1,
            ..Default::default()
        },
        ..Default::default()
    };

    let report = ValuationEngine::with_config(config).evaluate_all(&bank());
    assert_eq!(report.models.len(), ModelKind::ALL.len());
    assert_eq!(report.failure_count(), 1);

    let failure = report
        .get(ModelKind::ThreeYearTarget)
        .unwrap()
        .failure()
        .unwrap();
    assert_eq!(failure.kind, ErrorKind::InvalidAssumption);
}
