//! Financial snapshot: one security's market and fundamental metrics at one
//! point in time.
//!
//! The snapshot is produced by an external market-data collaborator and
//! handed to the engine by reference. Field names follow the data source's
//! camelCase keys so a quote document deserializes directly.

use serde::{Deserialize, Serialize};

/// Numeric snapshot fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CurrentPrice,
    PreviousClose,
    TrailingPe,
    ForwardPe,
    TrailingEps,
    ForwardEps,
    PriceToBook,
    BookValue,
    ReturnOnEquity,
    DividendRate,
    TrailingAnnualDividendRate,
    DividendYieldRaw,
    PayoutRatio,
    EarningsGrowth,
    RevenueGrowth,
    PegRatio,
    FreeCashflow,
    OperatingCashflow,
    CapitalExpenditures,
    MarketCap,
    NetIncomeToCommon,
    SharesOutstanding,
    DebtToEquity,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CurrentPrice => "currentPrice",
            Self::PreviousClose => "previousClose",
            Self::TrailingPe => "trailingPE",
            Self::ForwardPe => "forwardPE",
            Self::TrailingEps => "trailingEps",
            Self::ForwardEps => "forwardEps",
            Self::PriceToBook => "priceToBook",
            Self::BookValue => "bookValue",
            Self::ReturnOnEquity => "returnOnEquity",
            Self::DividendRate => "dividendRate",
            Self::TrailingAnnualDividendRate => "trailingAnnualDividendRate",
            Self::DividendYieldRaw => "dividendYieldRaw",
            Self::PayoutRatio => "payoutRatio",
            Self::EarningsGrowth => "earningsGrowth",
            Self::RevenueGrowth => "revenueGrowth",
            Self::PegRatio => "pegRatio",
            Self::FreeCashflow => "freeCashflow",
            Self::OperatingCashflow => "operatingCashflow",
            Self::CapitalExpenditures => "capitalExpenditures",
            Self::MarketCap => "marketCap",
            Self::NetIncomeToCommon => "netIncomeToCommon",
            Self::SharesOutstanding => "sharesOutstanding",
            Self::DebtToEquity => "debtToEquity",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name used in missing-data errors when no usable price exists.
pub const PRICE: &str = "currentPrice|previousClose";

/// Market and fundamental metrics for one security.
///
/// Every field is optional. `null`, absent, and non-finite values all read
/// as "not reported" through [`FinancialSnapshot::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    // === Identity (display only) ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    // === Price ===
    /// Last traded price
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Previous session close, used when the market is shut
    #[serde(default)]
    pub previous_close: Option<f64>,

    // === Earnings ===
    #[serde(default, rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(default, rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(default)]
    pub trailing_eps: Option<f64>,
    #[serde(default)]
    pub forward_eps: Option<f64>,
    /// Pre-computed PEG from the data source
    #[serde(default)]
    pub peg_ratio: Option<f64>,
    /// Year-over-year earnings growth, fractional
    #[serde(default)]
    pub earnings_growth: Option<f64>,
    /// Year-over-year revenue growth, fractional
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default)]
    pub net_income_to_common: Option<f64>,

    // === Book value ===
    #[serde(default)]
    pub price_to_book: Option<f64>,
    /// Book value per share (BPS)
    #[serde(default)]
    pub book_value: Option<f64>,
    /// Return on equity, fractional (0.15 = 15%)
    #[serde(default)]
    pub return_on_equity: Option<f64>,

    // === Dividends ===
    /// Forward annual dividend per share
    #[serde(default)]
    pub dividend_rate: Option<f64>,
    /// Trailing twelve-month dividend per share
    #[serde(default)]
    pub trailing_annual_dividend_rate: Option<f64>,
    /// Dividend yield as reported: either fractional (0.079) or percent (7.9)
    #[serde(default, alias = "dividendYield")]
    pub dividend_yield_raw: Option<f64>,
    /// Fraction of earnings paid out, 0-1
    #[serde(default)]
    pub payout_ratio: Option<f64>,

    // === Cash flow & capital structure ===
    #[serde(default)]
    pub free_cashflow: Option<f64>,
    #[serde(default)]
    pub operating_cashflow: Option<f64>,
    /// Usually reported negative
    #[serde(default)]
    pub capital_expenditures: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    /// Debt-to-equity on the data source's scale (100 = 1:1)
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
}

impl FinancialSnapshot {
    /// Parse a snapshot from a JSON quote document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a numeric field, treating non-finite values as absent.
    pub fn get(&self, field: Field) -> Option<f64> {
        let raw = match field {
            Field::CurrentPrice => self.current_price,
            Field::PreviousClose => self.previous_close,
            Field::TrailingPe => self.trailing_pe,
            Field::ForwardPe => self.forward_pe,
            Field::TrailingEps => self.trailing_eps,
            Field::ForwardEps => self.forward_eps,
            Field::PriceToBook => self.price_to_book,
            Field::BookValue => self.book_value,
            Field::ReturnOnEquity => self.return_on_equity,
            Field::DividendRate => self.dividend_rate,
            Field::TrailingAnnualDividendRate => self.trailing_annual_dividend_rate,
            Field::DividendYieldRaw => self.dividend_yield_raw,
            Field::PayoutRatio => self.payout_ratio,
            Field::EarningsGrowth => self.earnings_growth,
            Field::RevenueGrowth => self.revenue_growth,
            Field::PegRatio => self.peg_ratio,
            Field::FreeCashflow => self.free_cashflow,
            Field::OperatingCashflow => self.operating_cashflow,
            Field::CapitalExpenditures => self.capital_expenditures,
            Field::MarketCap => self.market_cap,
            Field::NetIncomeToCommon => self.net_income_to_common,
            Field::SharesOutstanding => self.shares_outstanding,
            Field::DebtToEquity => self.debt_to_equity,
        };
        raw.filter(|v| v.is_finite())
    }

    /// Read a field that only makes sense when strictly positive.
    pub fn get_positive(&self, field: Field) -> Option<f64> {
        self.get(field).filter(|v| *v > 0.0)
    }

    /// Current price, falling back to the previous close.
    pub fn price(&self) -> Option<f64> {
        self.get_positive(Field::CurrentPrice)
            .or_else(|| self.get_positive(Field::PreviousClose))
    }

    /// Share count, when positive.
    pub fn shares(&self) -> Option<f64> {
        self.get_positive(Field::SharesOutstanding)
    }

    /// Display name: long name, then short name, then symbol.
    pub fn display_name(&self) -> Option<&str> {
        self.long_name
            .as_deref()
            .or(self.short_name.as_deref())
            .or(self.symbol.as_deref())
    }

    pub fn sector_or_unknown(&self) -> &str {
        self.sector.as_deref().unwrap_or("Unknown")
    }

    pub fn industry_or_unknown(&self) -> &str {
        self.industry.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote_document() {
        let json = r#"{
            "symbol": "600036.SS",
            "shortName": "CMB",
            "currentPrice": 35.2,
            "trailingPE": 6.1,
            "forwardPE": null,
            "returnOnEquity": 0.142,
            "dividendYield": 5.4,
            "debtToEquity": 120.5,
            "somethingElse": [1, 2, 3]
        }"#;

        let snapshot = FinancialSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.symbol.as_deref(), Some("600036.SS"));
        assert_eq!(snapshot.get(Field::TrailingPe), Some(6.1));
        assert_eq!(snapshot.get(Field::ForwardPe), None);
        assert_eq!(snapshot.get(Field::DividendYieldRaw), Some(5.4));
        assert_eq!(snapshot.get(Field::DebtToEquity), Some(120.5));
        assert_eq!(snapshot.display_name(), Some("CMB"));
    }

    #[test]
    fn test_price_falls_back_to_previous_close() {
        let snapshot = FinancialSnapshot {
            current_price: None,
            previous_close: Some(41.0),
            ..Default::default()
        };
        assert_eq!(snapshot.price(), Some(41.0));

        let zero_price = FinancialSnapshot {
            current_price: Some(0.0),
            previous_close: Some(40.0),
            ..Default::default()
        };
        assert_eq!(zero_price.price(), Some(40.0));

        assert_eq!(FinancialSnapshot::default().price(), None);
    }

    #[test]
    fn test_non_finite_reads_as_absent() {
        let snapshot = FinancialSnapshot {
            book_value: Some(f64::NAN),
            market_cap: Some(f64::INFINITY),
            ..Default::default()
        };
        assert_eq!(snapshot.get(Field::BookValue), None);
        assert_eq!(snapshot.get(Field::MarketCap), None);
    }

    #[test]
    fn test_field_names_match_wire_keys() {
        let snapshot = FinancialSnapshot {
            trailing_pe: Some(12.0),
            free_cashflow: Some(1.0e9),
            dividend_yield_raw: Some(0.03),
            ..Default::default()
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value[Field::TrailingPe.name()], 12.0);
        assert_eq!(value[Field::FreeCashflow.name()], 1.0e9);
        assert_eq!(value[Field::DividendYieldRaw.name()], 0.03);
    }

    #[test]
    fn test_display_defaults() {
        let snapshot = FinancialSnapshot::default();
        assert_eq!(snapshot.sector_or_unknown(), "Unknown");
        assert_eq!(snapshot.industry_or_unknown(), "Unknown");
        assert_eq!(snapshot.display_name(), None);
    }
}
