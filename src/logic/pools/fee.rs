use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const FEE_DENOMINATOR: u32 = 1_000_000;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeeError {
    #[error("fee {0} is outside [0, 1)")]
    OutOfRange(String),
}

/// Swap fee kept by the pool, as an exact fraction of the input amount.
///
/// Stored in lowest terms, so equal fees compare and hash equal however they were built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fee {
    numerator: u32,
    denominator: u32,
}

impl Fee {
    pub const ZERO: Fee = Fee { numerator: 0, denominator: 1 };

    pub fn new(numerator: u32, denominator: u32) -> Result<Self, FeeError> {
        if denominator == 0 || numerator >= denominator {
            return Err(FeeError::OutOfRange(format!("{numerator}/{denominator}")));
        }
        let divisor = gcd(numerator, denominator);
        Ok(Self { numerator: numerator / divisor, denominator: denominator / divisor })
    }

    pub fn from_bps(bps: u32) -> Result<Self, FeeError> {
        Self::new(bps, 10_000)
    }

    /// Parse a decimal fraction such as `0.003`, kept to six decimal places.
    pub fn from_fraction(fraction: f64) -> Result<Self, FeeError> {
        if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
            return Err(FeeError::OutOfRange(fraction.to_string()));
        }
        let numerator = (fraction * FEE_DENOMINATOR as f64).round() as u32;
        Self::new(numerator, FEE_DENOMINATOR)
    }

    pub fn numerator(&self) -> U256 {
        U256::from(self.numerator)
    }

    pub fn denominator(&self) -> U256 {
        U256::from(self.denominator)
    }

    /// `(1 - fee) * denominator`, the share of the input that reaches the curve.
    pub fn retained(&self) -> U256 {
        U256::from(self.denominator - self.numerator)
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for Fee {
    fn default() -> Self {
        Self { numerator: 3, denominator: 1_000 }
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Display for Fee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.as_f64() * 100.0)
    }
}

impl TryFrom<f64> for Fee {
    type Error = FeeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Fee::from_fraction(value)
    }
}

impl From<Fee> for f64 {
    fn from(fee: Fee) -> Self {
        fee.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_is_thirty_bps() -> eyre::Result<()> {
        let fee = Fee::default();
        assert_eq!(fee.as_f64(), Fee::from_bps(30)?.as_f64());
        assert_eq!(fee.as_f64(), 0.003);
        Ok(())
    }

    #[test]
    fn test_from_fraction() {
        let fee = Fee::from_fraction(0.003).unwrap();
        assert_eq!(fee.numerator(), U256::from(3));
        assert_eq!(fee.denominator(), U256::from(1_000));
        assert_eq!(fee.retained(), U256::from(997));

        let fine = Fee::from_fraction(0.000_123).unwrap();
        assert_eq!(fine.denominator(), U256::from(FEE_DENOMINATOR));
    }

    #[test]
    fn test_equal_fees_compare_and_hash_equal() -> eyre::Result<()> {
        let default = Fee::default();
        assert_eq!(default, Fee::from_fraction(0.003)?);
        assert_eq!(default, Fee::from_bps(30)?);
        assert_eq!(default, Fee::new(3_000, FEE_DENOMINATOR)?);
        assert_eq!(Fee::ZERO, Fee::from_fraction(0.0)?);

        let fees: HashSet<Fee> = [default, Fee::from_fraction(0.003)?, Fee::from_bps(30)?, Fee::from_bps(25)?].into_iter().collect();
        assert_eq!(fees.len(), 2);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        assert!(Fee::from_fraction(1.0).is_err());
        assert!(Fee::from_fraction(-0.1).is_err());
        assert!(Fee::from_fraction(f64::NAN).is_err());
        assert!(Fee::new(5, 5).is_err());
        assert!(Fee::new(0, 0).is_err());
    }

    #[test]
    fn test_serde_as_fraction() -> eyre::Result<()> {
        let fee: Fee = serde_json::from_str("0.0025")?;
        assert_eq!(fee, Fee::from_bps(25)?);
        assert_eq!(fee.retained(), U256::from(399));
        assert_eq!(serde_json::to_string(&fee)?, "0.0025");
        assert!(serde_json::from_str::<Fee>("1.5").is_err());
        Ok(())
    }
}
