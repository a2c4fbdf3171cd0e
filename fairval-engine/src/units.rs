//! Unit types for quantities whose scale is ambiguous across data sources.
//!
//! Market data mixes fractional figures (ROE 0.15) with "×100" figures
//! (ROE 15.0). Each model converts between the two exactly once, through
//! [`Ratio::to_percent`] or [`Percent::to_ratio`], so the scale in use is
//! always visible at the call site.

use serde::{Deserialize, Serialize};

/// A fractional quantity: 0.15 means 15%.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(f64);

/// A "×100" quantity: 15.0 means 15%.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(f64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Convert to percent units (×100).
    pub fn to_percent(self) -> Percent {
        Percent(self.0 * 100.0)
    }

    /// Normalize a dividend yield whose unit depends on the data source.
    ///
    /// Values above 1 are read as percentages (7.9 → 0.079); anything else
    /// is taken as already fractional.
    pub fn from_ambiguous_yield(raw: f64) -> Self {
        if raw > 1.0 {
            Percent(raw).to_ratio()
        } else {
            Self(raw)
        }
    }

    pub fn clamp(self, min: f64, max: f64) -> Self {
        Self(self.0.clamp(min, max))
    }

    pub fn max(self, other: Ratio) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Percent {
    pub const ZERO: Percent = Percent(0.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Convert to fractional units (÷100).
    pub fn to_ratio(self) -> Ratio {
        Ratio(self.0 / 100.0)
    }

    pub fn clamp(self, min: f64, max: f64) -> Self {
        Self(self.0.clamp(min, max))
    }
}

/// Round half away from zero to a fixed number of decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round a money or ratio field for output.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_percent_conversion() {
        let roe = Ratio::new(0.15);
        assert!((roe.to_percent().value() - 15.0).abs() < 1e-9);
        assert!((Percent::new(15.0).to_ratio().value() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_ambiguous_yield_normalization() {
        // Percent-scaled input
        assert!((Ratio::from_ambiguous_yield(7.9).value() - 0.079).abs() < 1e-12);
        // Already fractional
        assert_eq!(Ratio::from_ambiguous_yield(0.079).value(), 0.079);
        // Exactly 1 is read as a fraction (100%)
        assert_eq!(Ratio::from_ambiguous_yield(1.0).value(), 1.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(15.0 / 7.0), 2.14);
        assert_eq!(round_to(1.0 / 3.0, 3), 0.333);
        assert_eq!(round2(-2.345_67), -2.35);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Ratio::new(0.25)).unwrap();
        assert_eq!(json, "0.25");
    }
}
