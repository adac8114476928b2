use alloy_primitives::U256;

/// Lossy conversion used by the optimizer and for display.
pub fn u256_to_f64(value: U256) -> f64 {
    match u128::try_from(value) {
        Ok(v) => v as f64,
        Err(_) => value.to_string().parse::<f64>().unwrap_or(f64::MAX),
    }
}

/// Rounds to the nearest integer. Negative and NaN inputs map to zero, values past `u128::MAX` saturate.
pub fn f64_to_u256(value: f64) -> U256 {
    if value.is_nan() || value <= 0.0 {
        return U256::ZERO;
    }
    U256::from(value.round() as u128)
}

/// `a - b` as a signed float without going through two lossy conversions first.
pub fn signed_difference(a: U256, b: U256) -> f64 {
    if a >= b { u256_to_f64(a - b) } else { -u256_to_f64(b - a) }
}

/// `numerator / denominator` rounded up. Returns `None` on a zero denominator.
pub fn div_ceil(numerator: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let (quotient, remainder) = numerator.div_rem(denominator);
    if remainder.is_zero() { Some(quotient) } else { quotient.checked_add(U256::from(1)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_to_f64() {
        assert_eq!(u256_to_f64(U256::ZERO), 0.0);
        assert_eq!(u256_to_f64(U256::from(1_000_000u64)), 1_000_000.0);

        let huge = U256::from(u128::MAX) * U256::from(4);
        assert!(u256_to_f64(huge) > u128::MAX as f64);
    }

    #[test]
    fn test_f64_to_u256() {
        assert_eq!(f64_to_u256(-3.0), U256::ZERO);
        assert_eq!(f64_to_u256(f64::NAN), U256::ZERO);
        assert_eq!(f64_to_u256(41.6), U256::from(42));
        assert_eq!(f64_to_u256(41.4), U256::from(41));
    }

    #[test]
    fn test_signed_difference() {
        assert_eq!(signed_difference(U256::from(10), U256::from(4)), 6.0);
        assert_eq!(signed_difference(U256::from(4), U256::from(10)), -6.0);
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(U256::from(10), U256::from(5)), Some(U256::from(2)));
        assert_eq!(div_ceil(U256::from(11), U256::from(5)), Some(U256::from(3)));
        assert_eq!(div_ceil(U256::from(11), U256::ZERO), None);
    }
}
