//! fairval engine
//!
//! Classical equity valuation models over a single market snapshot.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────┐
//!                    │  FinancialSnapshot  │   (one security, one instant)
//!                    └──────────┬──────────┘
//!                               │ &snapshot
//!        ┌──────────┬──────────┬┴─────────┬──────────┬──────────┐
//!        ▼          ▼          ▼          ▼          ▼          ▼
//!     PE / PB    PR (×3)    Graham      PEG       DDM    3-year / DCF
//!        └──────────┴──────────┴────┬─────┴──────────┴──────────┘
//!                                   ▼
//!                          ┌─────────────────┐
//!                          │ ValuationReport │   model → result | error
//!                          └─────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! - Every model is a pure function of the snapshot and its own assumptions.
//!   Models run in parallel and never see each other's output.
//! - A model that cannot value a snapshot returns a [`ValuationError`]; the
//!   report records it next to the other models' results.
//! - Fractional vs percent quantities go through [`units::Ratio`] and
//!   [`units::Percent`], converted once per model.
//!
//! # Example
//!
//! ```
//! use fairval_engine::{FinancialSnapshot, ModelKind, ValuationEngine};
//!
//! let snapshot = FinancialSnapshot {
//!     current_price: Some(15.0),
//!     return_on_equity: Some(0.15),
//!     book_value: Some(10.0),
//!     ..Default::default()
//! };
//!
//! let engine = ValuationEngine::new();
//! let pb = engine.evaluate_pb_roe(&snapshot).unwrap();
//! assert_eq!(pb.target_pb, 2.14);
//!
//! let report = engine.evaluate_all(&snapshot);
//! assert!(report.get(ModelKind::PbRoe).unwrap().is_ok());
//! assert!(!report.get(ModelKind::Dcf).unwrap().is_ok());
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod engine;
pub mod error;
pub mod helpers;
pub mod models;
pub mod report;
pub mod snapshot;
pub mod units;

pub use engine::ValuationEngine;
pub use error::{ErrorKind, ValuationError};
pub use helpers::{best_dividend_yield, estimate_growth, GrowthEstimate, GrowthSource};
pub use models::{ModelKind, ModelOutput, UnknownModel, ValuationModel};
pub use report::{ModelFailure, ValuationReport, ValuationResult};
pub use snapshot::{Field, FinancialSnapshot};
pub use units::{Percent, Ratio};
