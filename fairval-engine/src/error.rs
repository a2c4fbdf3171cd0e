//! Model evaluation errors.
//!
//! These are values, not failures of the engine: every model returns
//! `Result<Output, ValuationError>` and the report records the error next to
//! the successful results of the other models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::Field;

/// Why a model could not produce a valuation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// Required snapshot fields are absent or unusable for this model
    #[error("missing data: {}", fields.join(", "))]
    MissingData { fields: Vec<&'static str> },

    /// The model's assumptions are mathematically invalid for this input
    #[error("invalid assumption: {0}")]
    InvalidAssumption(String),
}

/// Serializable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingData,
    InvalidAssumption,
}

impl ValuationError {
    pub fn missing(fields: &[&'static str]) -> Self {
        Self::MissingData {
            fields: fields.to_vec(),
        }
    }

    pub fn missing_field(field: Field) -> Self {
        Self::missing(&[field.name()])
    }

    /// Build a missing-data error from `(name, present)` checks, keeping
    /// only the absent names.
    pub fn missing_from(checks: &[(&'static str, bool)]) -> Self {
        Self::MissingData {
            fields: checks
                .iter()
                .filter(|(_, present)| !present)
                .map(|(name, _)| *name)
                .collect(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAssumption(reason.into())
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingData { .. } => ErrorKind::MissingData,
            Self::InvalidAssumption(_) => ErrorKind::InvalidAssumption,
        }
    }

    pub const fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingData { .. })
    }

    pub const fn is_invalid_assumption(&self) -> bool {
        matches!(self, Self::InvalidAssumption(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_from_keeps_absent_names() {
        let err = ValuationError::missing_from(&[
            ("returnOnEquity", true),
            ("bookValue", false),
            ("currentPrice|previousClose", false),
        ]);
        assert_eq!(
            err,
            ValuationError::MissingData {
                fields: vec!["bookValue", "currentPrice|previousClose"]
            }
        );
        assert_eq!(
            err.to_string(),
            "missing data: bookValue, currentPrice|previousClose"
        );
        assert_eq!(err.kind(), ErrorKind::MissingData);
    }

    #[test]
    fn test_invalid_assumption() {
        let err = ValuationError::invalid("growth 9.00% >= cost of equity 9.00%");
        assert!(err.is_invalid_assumption());
        assert_eq!(
            serde_json::to_string(&err.kind()).unwrap(),
            "\"invalid_assumption\""
        );
    }
}
