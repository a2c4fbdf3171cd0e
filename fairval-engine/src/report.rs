//! Valuation report assembled from per-model results.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ErrorKind, ValuationError};
use crate::models::{ModelKind, ModelOutput};
use crate::snapshot::FinancialSnapshot;

/// Serialized form of a failed model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFailure {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&ValuationError> for ModelFailure {
    fn from(err: &ValuationError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Outcome of one model: the full result or the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValuationResult {
    Ok(ModelOutput),
    Err(ModelFailure),
}

impl ValuationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn output(&self) -> Option<&ModelOutput> {
        match self {
            Self::Ok(output) => Some(output),
            Self::Err(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ModelFailure> {
        match self {
            Self::Ok(_) => None,
            Self::Err(failure) => Some(failure),
        }
    }
}

impl<T: Into<ModelOutput>> From<Result<T, ValuationError>> for ValuationResult {
    fn from(result: Result<T, ValuationError>) -> Self {
        match result {
            Ok(output) => Self::Ok(output.into()),
            Err(err) => Self::Err(ModelFailure::from(&err)),
        }
    }
}

/// All requested model results for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub sector: String,
    pub industry: String,
    /// Ordered by model so serialization is stable
    pub models: BTreeMap<ModelKind, ValuationResult>,
}

impl ValuationReport {
    /// Empty report carrying the snapshot's identity header.
    pub fn for_snapshot(snapshot: &FinancialSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol.clone(),
            name: snapshot.display_name().map(str::to_string),
            price: snapshot.price(),
            sector: snapshot.sector_or_unknown().to_string(),
            industry: snapshot.industry_or_unknown().to_string(),
            models: BTreeMap::new(),
        }
    }

    pub fn get(&self, kind: ModelKind) -> Option<&ValuationResult> {
        self.models.get(&kind)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (ModelKind, &ModelOutput)> {
        self.models
            .iter()
            .filter_map(|(kind, result)| result.output().map(|o| (*kind, o)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (ModelKind, &ModelFailure)> {
        self.models
            .iter()
            .filter_map(|(kind, result)| result.failure().map(|f| (*kind, f)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GrahamModel, ValuationModel};

    #[test]
    fn test_failure_serialization() {
        let result: ValuationResult =
            Err::<crate::models::GrahamValuation, _>(ValuationError::missing(&["trailingEps"]))
                .into();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "missing data: trailingEps", "kind": "missing_data"})
        );
    }

    #[test]
    fn test_success_serializes_as_fields() {
        let snapshot = FinancialSnapshot {
            trailing_eps: Some(1.0),
            ..Default::default()
        };
        let result: ValuationResult = GrahamModel::default().evaluate(&snapshot).into();
        assert!(result.is_ok());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intrinsic_value"], 8.5);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_header() {
        let snapshot = FinancialSnapshot {
            symbol: Some("MSFT".into()),
            short_name: Some("Microsoft".into()),
            previous_close: Some(410.0),
            ..Default::default()
        };
        let report = ValuationReport::for_snapshot(&snapshot);
        assert_eq!(report.name.as_deref(), Some("Microsoft"));
        assert_eq!(report.price, Some(410.0));
        assert_eq!(report.sector, "Unknown");
        assert!(report.models.is_empty());
    }
}
