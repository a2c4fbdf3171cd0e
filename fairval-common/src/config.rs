//! Configuration management for fairval.
//!
//! Configuration lives in `~/.fairval/` (or `$FAIRVAL_CONFIG_DIR`):
//! `config.json` holds the root document and `valuation.json`, when present,
//! is merged into its `valuation` section.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (FAIRVAL_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `FAIRVAL_CONFIG_DIR` → configuration directory
//! - `FAIRVAL_LOG_LEVEL` → observability.log_level
//! - `FAIRVAL_LOG_FORMAT` → observability.log_format
//! - `FAIRVAL_DDM_COST_OF_EQUITY` → valuation.ddm.cost_of_equity
//! - `FAIRVAL_DDM_GROWTH_RATE` → valuation.ddm.growth_rate
//! - `FAIRVAL_DCF_WACC` → valuation.dcf.wacc
//! - `FAIRVAL_DCF_GROWTH_RATE` → valuation.dcf.growth_rate
//! - `FAIRVAL_DCF_TERMINAL_GROWTH` → valuation.dcf.terminal_growth
//!
//! Every model constant has a default equal to the classical definition of
//! the model, so an empty configuration reproduces the textbook results.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config_loader::load_modular_config;

/// Environment variable that relocates the configuration directory.
pub const CONFIG_DIR_ENV: &str = "FAIRVAL_CONFIG_DIR";

/// Longest projection horizon a model accepts, in years.
pub const MAX_HORIZON_YEARS: u32 = 50;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(shellexpand::tilde(dir.trim()).into_owned());
        }
    }

    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".fairval"),
        |dirs| dirs.home_dir().join(".fairval"),
    )
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Model assumptions for the valuation engine
    #[serde(default)]
    pub valuation: ValuationConfig,
}

impl Config {
    /// Load configuration from a specific directory (`config.json` plus
    /// modular files).
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            tracing::info!(dir = %dir.display(), "Config directory not found, using defaults");
            return Ok(Self::default());
        }

        let value = load_modular_config(Some(dir.to_path_buf()))?;
        serde_json::from_value(value)
            .with_context(|| format!("Failed to parse config from {}", dir.display()))
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("FAIRVAL_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("FAIRVAL_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Some(r) = env_f64("FAIRVAL_DDM_COST_OF_EQUITY") {
            self.valuation.ddm.cost_of_equity = r;
        }
        if let Some(g) = env_f64("FAIRVAL_DDM_GROWTH_RATE") {
            self.valuation.ddm.growth_rate = g;
        }
        if let Some(wacc) = env_f64("FAIRVAL_DCF_WACC") {
            self.valuation.dcf.wacc = wacc;
        }
        if let Some(g) = env_f64("FAIRVAL_DCF_GROWTH_RATE") {
            self.valuation.dcf.growth_rate = g;
        }
        if let Some(g) = env_f64("FAIRVAL_DCF_TERMINAL_GROWTH") {
            self.valuation.dcf.terminal_growth = g;
        }
    }
}

fn env_f64(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            tracing::warn!(var = name, value = %raw, "Ignoring non-numeric override");
            None
        }
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Aliases: "level"
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    /// Aliases: "format"
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to hold at `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Valuation Model Assumptions
// ============================================================================

/// Assumptions for every valuation model, one section per model.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ValuationConfig {
    #[serde(default)]
    pub pb_roe: PbRoeAssumptions,

    #[serde(default)]
    pub price_return: PriceReturnAssumptions,

    #[serde(default)]
    pub graham: GrahamAssumptions,

    #[serde(default)]
    pub peg: PegAssumptions,

    #[serde(default)]
    pub ddm: DdmAssumptions,

    #[serde(default)]
    pub three_year: ThreeYearAssumptions,

    #[serde(default)]
    pub dcf: DcfAssumptions,
}

/// PB-ROE anchoring: fair PB = ROE% / anchor divisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PbRoeAssumptions {
    /// ROE (in percent) per turn of fair PB
    pub anchor_divisor: f64,
    /// Lower edge of the buy band, as a fraction of fair PB
    pub buy_band_low: f64,
    /// Upper edge of the buy band
    pub buy_band_high: f64,
    /// Lower edge of the sell band, as a fraction of fair PB
    pub sell_band_low: f64,
    /// Upper edge of the sell band
    pub sell_band_high: f64,
    /// Margin (%) above which the security is labeled severely undervalued
    pub deep_discount_margin: f64,
}

impl Default for PbRoeAssumptions {
    fn default() -> Self {
        Self {
            anchor_divisor: 7.0,
            buy_band_low: 0.7,
            buy_band_high: 0.8,
            sell_band_low: 1.2,
            sell_band_high: 1.3,
            deep_discount_margin: 30.0,
        }
    }
}

/// Price-to-return ratio (市赚率) thresholds and payout adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriceReturnAssumptions {
    /// Payout ratio at or above which no adjustment applies (N = 1)
    pub full_payout_ratio: f64,
    /// Payout ratio at or below which the maximum adjustment applies
    pub low_payout_ratio: f64,
    /// Adjustment factor for low-payout companies
    pub low_payout_factor: f64,
    /// PR below this is a buy
    pub buy_below: f64,
    /// PR above this is a sell
    pub sell_above: f64,
}

impl Default for PriceReturnAssumptions {
    fn default() -> Self {
        Self {
            full_payout_ratio: 0.50,
            low_payout_ratio: 0.25,
            low_payout_factor: 2.0,
            buy_below: 0.6,
            sell_above: 1.0,
        }
    }
}

/// Graham growth formula: V = EPS × (base PE + multiplier × g).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrahamAssumptions {
    /// PE of a no-growth company
    pub no_growth_pe: f64,
    /// Multiplier applied to the growth rate (percent)
    pub growth_multiplier: f64,
    /// Growth cap, in percent
    pub max_growth_percent: f64,
    /// Graham's reference AAA yield (%)
    pub reference_yield: f64,
    /// Current AAA corporate bond yield (%)
    pub aaa_yield: f64,
}

impl Default for GrahamAssumptions {
    fn default() -> Self {
        Self {
            no_growth_pe: 8.5,
            growth_multiplier: 2.0,
            max_growth_percent: 25.0,
            reference_yield: 4.4,
            aaa_yield: 4.5,
        }
    }
}

/// PEG classification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PegAssumptions {
    pub buy_below: f64,
    pub sell_above: f64,
}

impl Default for PegAssumptions {
    fn default() -> Self {
        Self {
            buy_below: 0.8,
            sell_above: 1.5,
        }
    }
}

/// Gordon growth dividend discount model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DdmAssumptions {
    /// Required return on equity (r), fractional
    pub cost_of_equity: f64,
    /// Perpetual dividend growth (g), fractional
    pub growth_rate: f64,
}

impl Default for DdmAssumptions {
    fn default() -> Self {
        Self {
            cost_of_equity: 0.09,
            growth_rate: 0.03,
        }
    }
}

/// Three-year target (唐朝) model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThreeYearAssumptions {
    /// Projection horizon in years
    pub horizon_years: u32,
    /// Growth cap, fractional
    pub max_growth: f64,
    /// "Rational" PE applied to profit at the horizon
    pub exit_multiple: f64,
    /// Required multiple on capital over the horizon (2 = double)
    pub return_multiple: f64,
    /// PE applied to current profit for the sell target
    pub sell_multiple: f64,
    /// Debt-to-equity (data source scale, 100 = 1:1) above which the buy
    /// target is cut
    pub leverage_threshold: f64,
    /// Multiplier applied to the buy target for high-leverage companies
    pub leverage_haircut: f64,
}

impl Default for ThreeYearAssumptions {
    fn default() -> Self {
        Self {
            horizon_years: 3,
            max_growth: 0.25,
            exit_multiple: 25.0,
            return_multiple: 2.0,
            sell_multiple: 50.0,
            leverage_threshold: 100.0,
            leverage_haircut: 0.7,
        }
    }
}

/// Discounted cash flow model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DcfAssumptions {
    /// Annual FCF growth during the explicit horizon, fractional
    pub growth_rate: f64,
    /// Discount rate, fractional
    pub wacc: f64,
    /// Perpetual growth after the horizon, fractional
    pub terminal_growth: f64,
    /// Number of explicitly projected years
    pub horizon_years: u32,
    /// FCF proxy as a fraction of market cap when no FCF is reported
    pub market_cap_fcf_ratio: f64,
    /// Try operating cash flow + capex before the market-cap proxy
    pub derive_fcf_from_cashflows: bool,
    /// Margins of safety for the buy-price ladder, fractional
    pub safety_margins: Vec<f64>,
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self {
            growth_rate: 0.05,
            wacc: 0.10,
            terminal_growth: 0.02,
            horizon_years: 5,
            market_cap_fcf_ratio: 0.03,
            derive_fcf_from_cashflows: false,
            safety_margins: vec![0.15, 0.30, 0.50],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_classical_constants() {
        let config = ValuationConfig::default();
        assert_eq!(config.pb_roe.anchor_divisor, 7.0);
        assert_eq!(config.graham.no_growth_pe, 8.5);
        assert_eq!(config.ddm.cost_of_equity, 0.09);
        assert_eq!(config.ddm.growth_rate, 0.03);
        assert_eq!(config.three_year.exit_multiple, 25.0);
        assert_eq!(config.three_year.sell_multiple, 50.0);
        assert_eq!(config.three_year.leverage_haircut, 0.7);
        assert_eq!(config.dcf.horizon_years, 5);
        assert_eq!(config.dcf.wacc, 0.10);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let json = r#"{ "valuation": { "dcf": { "wacc": 0.12 } } }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.valuation.dcf.wacc, 0.12);
        assert_eq!(config.valuation.dcf.terminal_growth, 0.02);
        assert_eq!(config.valuation.dcf.safety_margins, vec![0.15, 0.30, 0.50]);
        assert_eq!(config.valuation.ddm, DdmAssumptions::default());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_observability_aliases() {
        let json = r#"{ "observability": { "level": "debug", "format": "json" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from_dir(&tmp.path().join("nope")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_dir_merges_valuation_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.json"),
            r#"{ "observability": { "log_level": "warn" }, "valuation": { "ddm": { "growth_rate": 0.04 } } }"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("valuation.json"),
            r#"{ "ddm": { "cost_of_equity": 0.11 }, "pb_roe": { "anchor_divisor": 8.0 } }"#,
        )
        .unwrap();

        let config = Config::load_from_dir(tmp.path()).unwrap();
        assert_eq!(config.observability.log_level, "warn");
        assert_eq!(config.valuation.ddm.growth_rate, 0.04);
        assert_eq!(config.valuation.ddm.cost_of_equity, 0.11);
        assert_eq!(config.valuation.pb_roe.anchor_divisor, 8.0);
    }

    #[test]
    fn test_load_from_dir_rejects_malformed_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), "{ valuation: ").unwrap();
        let err = Config::load_from_dir(tmp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("FAIRVAL_DCF_WACC", "0.08");
        std::env::set_var("FAIRVAL_DDM_GROWTH_RATE", "not-a-number");
        let mut config = Config::default();
        config.apply_env_overrides();
        std::env::remove_var("FAIRVAL_DCF_WACC");
        std::env::remove_var("FAIRVAL_DDM_GROWTH_RATE");

        assert_eq!(config.valuation.dcf.wacc, 0.08);
        assert_eq!(config.valuation.ddm.growth_rate, 0.03);
    }
}
