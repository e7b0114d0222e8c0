// crates/drip-economics/src/emission.rs
//
// Annual mint schedule.
//
// The reward token inflates by 5% of `total_supply_year` per year, minted
// into the staking pool in proportion to the seconds elapsed since the last
// mint:
//
//   minted = total_supply_year / 20 * (now - last_mint_time) / SECONDS_PER_YEAR
//
// The division by 20 happens before the multiply; the resulting truncation
// is part of the schedule and must not be simplified away.

use serde::{Deserialize, Serialize};

use drip_core::error::DripError;
use drip_core::identity::AccountId;
use drip_core::traits::TokenLedger;

use crate::math::{self, SECONDS_PER_YEAR};

/// Divisor turning the annual base into the yearly emission (1/20 = 5%).
pub const ANNUAL_EMISSION_DIVISOR: u128 = 20;

/// Emission owed for `elapsed` seconds against an annual base.
pub fn prorated_emission(total_supply_year: u128, elapsed: u64) -> Result<u128, DripError> {
    let yearly = total_supply_year / ANNUAL_EMISSION_DIVISOR;
    math::mul_div(yearly, elapsed as u128, SECONDS_PER_YEAR as u128, "mint schedule")
}

/// Mint schedule state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintScheduler {
    /// Timestamp of the last applied mint.
    last_mint_time: u64,
    /// Annual emission base (absolute token quantity).
    total_supply_year: u128,
}

impl MintScheduler {
    /// Start the schedule at `start_time` with the given annual base.
    pub fn new(start_time: u64, total_supply_year: u128) -> Self {
        Self {
            last_mint_time: start_time,
            total_supply_year,
        }
    }

    pub fn last_mint_time(&self) -> u64 {
        self.last_mint_time
    }

    pub fn total_supply_year(&self) -> u128 {
        self.total_supply_year
    }

    /// Amount `advance(timestamp)` would mint, without minting.
    pub fn pending_mint(&self, timestamp: u64) -> Result<u128, DripError> {
        let elapsed = timestamp.saturating_sub(self.last_mint_time);
        prorated_emission(self.total_supply_year, elapsed)
    }

    /// Mint everything owed up to `timestamp` into `pool`.
    ///
    /// A timestamp at or before the last mint is a no-op, so an interval is
    /// never minted twice.
    pub fn advance<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        minter: &AccountId,
        pool: &AccountId,
        timestamp: u64,
    ) -> Result<u128, DripError> {
        if timestamp <= self.last_mint_time {
            return Ok(0);
        }
        let minted = self.pending_mint(timestamp)?;
        if minted > 0 {
            ledger.mint(minter, pool, minted)?;
            tracing::info!(
                "Minted {} into pool {} for {}s of emission",
                minted,
                pool,
                timestamp - self.last_mint_time
            );
        }
        self.last_mint_time = timestamp;
        Ok(minted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    const SUPPLY: u128 = 100_000 * 1_000_000_000_000_000_000;

    fn setup() -> (Token, AccountId, AccountId) {
        let owner = AccountId::new("owner");
        let pool = AccountId::new("pool");
        let mut token = Token::new(owner.clone());
        token.mint(&owner, &owner, SUPPLY).unwrap();
        (token, owner, pool)
    }

    #[test]
    fn test_full_year_mints_five_percent() {
        assert_eq!(prorated_emission(SUPPLY, SECONDS_PER_YEAR).unwrap(), SUPPLY / 20);
    }

    #[test]
    fn test_divide_before_multiply() {
        // Two years on a base of 39: (39 / 20) * 2 = 2, where 39 * 2 / 20 would give 3.
        assert_eq!(prorated_emission(39, 2 * SECONDS_PER_YEAR).unwrap(), 2);
        assert_eq!(prorated_emission(19, SECONDS_PER_YEAR).unwrap(), 0);
    }

    #[test]
    fn test_advance_mints_into_pool() {
        let (mut token, owner, pool) = setup();
        let mut scheduler = MintScheduler::new(1_000, SUPPLY);
        let minted = scheduler.advance(&mut token, &owner, &pool, 2_001).unwrap();
        assert_eq!(minted, SUPPLY / 20 * 1_001 / SECONDS_PER_YEAR as u128);
        assert_eq!(token.balance_of(&pool), minted);
        assert_eq!(token.total_supply(), SUPPLY + minted);
        assert_eq!(scheduler.last_mint_time(), 2_001);
    }

    #[test]
    fn test_same_interval_not_minted_twice() {
        let (mut token, owner, pool) = setup();
        let mut scheduler = MintScheduler::new(0, SUPPLY);
        let first = scheduler.advance(&mut token, &owner, &pool, 500).unwrap();
        assert!(first > 0);
        assert_eq!(scheduler.advance(&mut token, &owner, &pool, 500).unwrap(), 0);
        assert_eq!(scheduler.advance(&mut token, &owner, &pool, 400).unwrap(), 0);
        assert_eq!(scheduler.last_mint_time(), 500);
        assert_eq!(token.balance_of(&pool), first);
    }

    #[test]
    fn test_pending_mint_matches_advance() {
        let (mut token, owner, pool) = setup();
        let mut scheduler = MintScheduler::new(0, SUPPLY);
        let expected = scheduler.pending_mint(86_400).unwrap();
        assert_eq!(scheduler.advance(&mut token, &owner, &pool, 86_400).unwrap(), expected);
    }
}
