// crates/drip-economics/src/boost.rs
//
// Lock-duration boost.
//
//   multiplier = floor(BOOST_WEIGHT * lock_period / SECONDS_PER_YEAR) + BOOST_PRECISION
//
// With BOOST_WEIGHT equal to BOOST_PRECISION a one-year lock doubles a
// position's share. The bonus grows linearly with the lock and is rounded
// down.

use drip_core::error::DripError;

use crate::math::{self, BOOST_PRECISION, SECONDS_PER_YEAR};

/// Bonus weight of a full year of lock, in `BOOST_PRECISION` units.
pub const BOOST_WEIGHT: u128 = 100 * 10_000_000_000;

/// Convert a lock period (seconds) into a scaled multiplier.
///
/// # Errors
/// Returns `DripError::InvalidLockPeriod` for a zero lock period.
pub fn compute_boost(lock_period: u64) -> Result<u128, DripError> {
    if lock_period == 0 {
        return Err(DripError::InvalidLockPeriod);
    }
    let bonus = math::mul_div(
        BOOST_WEIGHT,
        lock_period as u128,
        SECONDS_PER_YEAR as u128,
        "boost multiplier",
    )?;
    math::add(bonus, BOOST_PRECISION, "boost multiplier")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::SECONDS_PER_DAY;

    #[test]
    fn test_zero_lock_rejected() {
        assert_eq!(compute_boost(0), Err(DripError::InvalidLockPeriod));
    }

    #[test]
    fn test_seventy_day_lock() {
        let lock = 70 * SECONDS_PER_DAY;
        let expected = BOOST_WEIGHT * lock as u128 / SECONDS_PER_YEAR as u128 + BOOST_PRECISION;
        assert_eq!(compute_boost(lock).unwrap(), expected);
        // 70/365 of a full bonus, truncated.
        assert_eq!(expected, 1_191_780_821_917);
    }

    #[test]
    fn test_one_year_lock_doubles() {
        assert_eq!(compute_boost(SECONDS_PER_YEAR).unwrap(), 2 * BOOST_PRECISION);
    }

    #[test]
    fn test_one_second_lock_rounds_down() {
        // 10^12 / 31,536,000 = 31709.79... -> 31709
        assert_eq!(compute_boost(1).unwrap(), BOOST_PRECISION + 31_709);
    }

    #[test]
    fn test_boost_never_below_unit() {
        for lock in [1, 60, SECONDS_PER_DAY, 7 * SECONDS_PER_DAY] {
            assert!(compute_boost(lock).unwrap() >= BOOST_PRECISION);
        }
    }
}
