// crates/drip-economics/src/math.rs
//
// Integer-only fixed-point helpers.
//
// Every ledger quantity is a `u128`. Products of two ledger quantities and
// the per-share accumulator are carried at 256-bit width and narrowed back
// with a checked conversion, so only a result that genuinely exceeds `u128`
// surfaces as `DripError::ArithmeticOverflow`. Division always truncates
// toward zero; callers control rounding by the order in which they chain
// `mul`/`div` steps.

use drip_core::error::DripError;
use primitive_types::U256;

/// Scale of the per-share reward accumulator.
pub const ACC_DRIP_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Scale representing a 1.0x boost multiplier.
pub const BOOST_PRECISION: u128 = 1_000_000_000_000;

/// Seconds in a day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a (365-day) year.
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Checked `a * b`.
pub fn mul(a: u128, b: u128, context: &'static str) -> Result<u128, DripError> {
    a.checked_mul(b).ok_or(DripError::ArithmeticOverflow(context))
}

/// Checked `a + b`.
pub fn add(a: u128, b: u128, context: &'static str) -> Result<u128, DripError> {
    a.checked_add(b).ok_or(DripError::ArithmeticOverflow(context))
}

/// Checked `a - b`.
pub fn sub(a: u128, b: u128, context: &'static str) -> Result<u128, DripError> {
    a.checked_sub(b).ok_or(DripError::ArithmeticOverflow(context))
}

/// Truncating `a / b`. Division by zero is reported as an overflow of the
/// named computation.
pub fn div(a: u128, b: u128, context: &'static str) -> Result<u128, DripError> {
    a.checked_div(b).ok_or(DripError::ArithmeticOverflow(context))
}

/// Narrow a 256-bit intermediate back to a ledger quantity.
pub fn narrow(value: U256, context: &'static str) -> Result<u128, DripError> {
    if value > U256::from(u128::MAX) {
        return Err(DripError::ArithmeticOverflow(context));
    }
    Ok(value.low_u128())
}

/// `a * b / denominator` with truncation after the multiply. The product is
/// taken at 256 bits, so only the quotient has to fit.
pub fn mul_div(a: u128, b: u128, denominator: u128, context: &'static str) -> Result<u128, DripError> {
    if denominator == 0 {
        return Err(DripError::ArithmeticOverflow(context));
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(denominator), context)
}

/// Accumulator growth for `emitted` reward spread over `total_shares`:
/// `emitted * ACC_DRIP_PRECISION / total_shares`.
pub fn per_share(emitted: U256, total_shares: u128, context: &'static str) -> Result<U256, DripError> {
    if total_shares == 0 {
        return Err(DripError::ArithmeticOverflow(context));
    }
    emitted
        .checked_mul(U256::from(ACC_DRIP_PRECISION))
        .map(|scaled| scaled / U256::from(total_shares))
        .ok_or(DripError::ArithmeticOverflow(context))
}

/// A position's share of the reward stream: `amount * boost / BOOST_PRECISION`.
pub fn boosted_amount(amount: u128, boost_multiplier: u128) -> Result<u128, DripError> {
    mul_div(amount, boost_multiplier, BOOST_PRECISION, "boosted amount")
}

/// Reward already accounted to `boosted` shares at accumulator value `acc`.
pub fn accrued(boosted: u128, acc_drip_per_share: U256) -> Result<u128, DripError> {
    let product = U256::from(boosted)
        .checked_mul(acc_drip_per_share)
        .ok_or(DripError::ArithmeticOverflow("accrued reward"))?;
    narrow(product / U256::from(ACC_DRIP_PRECISION), "accrued reward")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_truncates() {
        assert_eq!(mul_div(10, 3, 4, "t").unwrap(), 7);
        assert_eq!(mul_div(1, 1, 2, "t").unwrap(), 0);
    }

    #[test]
    fn test_mul_overflow_is_reported() {
        let err = mul(u128::MAX, 2, "product").unwrap_err();
        assert_eq!(err, DripError::ArithmeticOverflow("product"));
    }

    #[test]
    fn test_sub_underflow_is_reported() {
        assert!(sub(1, 2, "difference").is_err());
    }

    #[test]
    fn test_div_by_zero_is_reported() {
        assert!(div(1, 0, "quotient").is_err());
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // The product is far beyond u128 but the quotient fits.
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX, "t").unwrap(), u128::MAX);
        assert_eq!(mul_div(u128::MAX, 2, 1, "t").unwrap_err(), DripError::ArithmeticOverflow("t"));
        assert!(mul_div(1, 1, 0, "t").is_err());
    }

    #[test]
    fn test_accrued_past_u128_product() {
        // 1M tokens at a 1.19x boost holding an index worth 10,000 DRIP per share.
        let boosted = 1_191_780_821_917_000_000_000_000u128;
        let acc = U256::from(10_000u128) * U256::from(ACC_DRIP_PRECISION) * U256::from(ACC_DRIP_PRECISION)
            / U256::from(boosted);
        let reward = accrued(boosted, acc).unwrap();
        assert!(reward <= 10_000 * ACC_DRIP_PRECISION);
        assert!(10_000 * ACC_DRIP_PRECISION - reward < ACC_DRIP_PRECISION);
    }

    #[test]
    fn test_narrow_rejects_wide_values() {
        assert_eq!(narrow(U256::from(7u64), "t").unwrap(), 7);
        assert!(narrow(U256::from(u128::MAX) + U256::one(), "t").is_err());
    }

    #[test]
    fn test_boosted_amount_at_unit_boost() {
        assert_eq!(boosted_amount(12_345, BOOST_PRECISION).unwrap(), 12_345);
    }

    #[test]
    fn test_boosted_amount_large_stake_fits() {
        // 1,000,000 tokens with 18 decimals at a 2x boost.
        let amount = 1_000_000 * 10u128.pow(18);
        assert_eq!(
            boosted_amount(amount, 2 * BOOST_PRECISION).unwrap(),
            2 * amount
        );
    }

    #[test]
    fn test_seconds_per_year() {
        assert_eq!(SECONDS_PER_YEAR, 31_536_000);
    }
}
