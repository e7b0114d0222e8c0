// crates/drip-economics/src/staking.rs
//
// Stake registry: per-user, per-position lock records.
//
// Position ids are a per-user sequence starting at 0. `current_staked_id`
// returns the next id to be assigned, which is also the number of positions
// the user has ever opened. Withdrawn positions are removed; their ids are
// never reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use drip_core::error::DripError;
use drip_core::identity::AccountId;

use crate::math;

/// A single time-locked LP stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Staked LP amount.
    pub amount: u128,
    /// Reward already accounted to this position, scaled like the accrued
    /// reward (`boosted * acc / ACC_DRIP_PRECISION`).
    pub reward_debt: u128,
    /// Lock boost, scaled by `BOOST_PRECISION`.
    pub boost_multiplier: u128,
    /// Timestamp the stake was opened.
    pub lock_start_time: u64,
    /// Timestamp from which the stake can be withdrawn.
    pub lock_end_time: u64,
}

impl StakePosition {
    /// This position's share of the reward stream.
    pub fn boosted_amount(&self) -> Result<u128, DripError> {
        math::boosted_amount(self.amount, self.boost_multiplier)
    }

    /// Whether the lock window has closed at `timestamp`.
    pub fn is_unlocked(&self, timestamp: u64) -> bool {
        timestamp >= self.lock_end_time
    }
}

/// Owns every live position, indexed by (user, id).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StakeRegistry {
    positions: BTreeMap<AccountId, BTreeMap<u64, StakePosition>>,
    next_id: BTreeMap<AccountId, u64>,
}

impl StakeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new position and return its id.
    ///
    /// # Errors
    /// Returns `DripError::InvalidAmount` for a zero amount,
    /// `DripError::InvalidLockPeriod` for a zero lock, and
    /// `DripError::ArithmeticOverflow` if the lock end is unrepresentable.
    pub fn open(
        &mut self,
        user: &AccountId,
        amount: u128,
        boost_multiplier: u128,
        lock_start_time: u64,
        lock_period: u64,
        reward_debt: u128,
    ) -> Result<u64, DripError> {
        if amount == 0 {
            return Err(DripError::InvalidAmount);
        }
        if lock_period == 0 {
            return Err(DripError::InvalidLockPeriod);
        }
        let lock_end_time = lock_start_time
            .checked_add(lock_period)
            .ok_or(DripError::ArithmeticOverflow("lock end time"))?;

        let id = self.current_staked_id(user);
        let next = id
            .checked_add(1)
            .ok_or(DripError::ArithmeticOverflow("position id"))?;

        self.positions.entry(user.clone()).or_default().insert(
            id,
            StakePosition {
                amount,
                reward_debt,
                boost_multiplier,
                lock_start_time,
                lock_end_time,
            },
        );
        self.next_id.insert(user.clone(), next);
        Ok(id)
    }

    /// Look up a live position.
    ///
    /// # Errors
    /// Returns `DripError::PositionNotFound` for unknown or withdrawn ids.
    pub fn get(&self, user: &AccountId, id: u64) -> Result<&StakePosition, DripError> {
        self.positions
            .get(user)
            .and_then(|positions| positions.get(&id))
            .ok_or_else(|| not_found(user, id))
    }

    /// Mutable lookup of a live position.
    pub fn get_mut(&mut self, user: &AccountId, id: u64) -> Result<&mut StakePosition, DripError> {
        self.positions
            .get_mut(user)
            .and_then(|positions| positions.get_mut(&id))
            .ok_or_else(|| not_found(user, id))
    }

    /// Remove a position, returning it.
    pub fn remove(&mut self, user: &AccountId, id: u64) -> Result<StakePosition, DripError> {
        let positions = self.positions.get_mut(user).ok_or_else(|| not_found(user, id))?;
        let position = positions.remove(&id).ok_or_else(|| not_found(user, id))?;
        if positions.is_empty() {
            self.positions.remove(user);
        }
        Ok(position)
    }

    /// Next id to be assigned to `user` (the count of positions ever opened).
    pub fn current_staked_id(&self, user: &AccountId) -> u64 {
        self.next_id.get(user).copied().unwrap_or(0)
    }

    /// All live positions of `user`, ordered by id.
    pub fn positions_of(&self, user: &AccountId) -> Vec<(u64, StakePosition)> {
        self.positions
            .get(user)
            .map(|positions| positions.iter().map(|(id, p)| (*id, p.clone())).collect())
            .unwrap_or_default()
    }

    /// Iterate over every live position as (user, id, position).
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, u64, &StakePosition)> {
        self.positions
            .iter()
            .flat_map(|(user, positions)| positions.iter().map(move |(id, p)| (user, *id, p)))
    }

    /// Total staked LP across all live positions.
    pub fn total_staked(&self) -> u128 {
        self.iter().map(|(_, _, p)| p.amount).sum()
    }
}

fn not_found(user: &AccountId, id: u64) -> DripError {
    DripError::PositionNotFound {
        user: user.clone(),
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::BOOST_PRECISION;

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    #[test]
    fn test_open_assigns_sequential_ids() {
        let mut registry = StakeRegistry::new();
        assert_eq!(registry.current_staked_id(&alice()), 0);
        let first = registry.open(&alice(), 100, BOOST_PRECISION, 1_000, 60, 0).unwrap();
        let second = registry.open(&alice(), 200, BOOST_PRECISION, 1_010, 60, 0).unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(registry.current_staked_id(&alice()), 2);
    }

    #[test]
    fn test_open_records_lock_window() {
        let mut registry = StakeRegistry::new();
        let id = registry.open(&alice(), 100, BOOST_PRECISION, 1_000, 60, 7).unwrap();
        let position = registry.get(&alice(), id).unwrap();
        assert_eq!(position.lock_start_time, 1_000);
        assert_eq!(position.lock_end_time, 1_060);
        assert_eq!(position.reward_debt, 7);
        assert!(!position.is_unlocked(1_059));
        assert!(position.is_unlocked(1_060));
    }

    #[test]
    fn test_open_rejects_zero_amount_and_lock() {
        let mut registry = StakeRegistry::new();
        assert_eq!(
            registry.open(&alice(), 0, BOOST_PRECISION, 0, 60, 0),
            Err(DripError::InvalidAmount)
        );
        assert_eq!(
            registry.open(&alice(), 1, BOOST_PRECISION, 0, 0, 0),
            Err(DripError::InvalidLockPeriod)
        );
        assert_eq!(registry.current_staked_id(&alice()), 0);
    }

    #[test]
    fn test_open_rejects_overflowing_lock_end() {
        let mut registry = StakeRegistry::new();
        assert!(matches!(
            registry.open(&alice(), 1, BOOST_PRECISION, u64::MAX, 1, 0),
            Err(DripError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn test_remove_then_lookup_fails() {
        let mut registry = StakeRegistry::new();
        let id = registry.open(&alice(), 100, BOOST_PRECISION, 0, 60, 0).unwrap();
        let removed = registry.remove(&alice(), id).unwrap();
        assert_eq!(removed.amount, 100);
        assert_eq!(
            registry.get(&alice(), id),
            Err(DripError::PositionNotFound { user: alice(), id })
        );
        assert!(registry.remove(&alice(), id).is_err());
        // Ids are not reused.
        assert_eq!(registry.current_staked_id(&alice()), 1);
    }

    #[test]
    fn test_positions_of_and_total() {
        let mut registry = StakeRegistry::new();
        registry.open(&alice(), 100, BOOST_PRECISION, 0, 60, 0).unwrap();
        registry.open(&AccountId::new("bob"), 50, BOOST_PRECISION, 0, 60, 0).unwrap();
        registry.open(&alice(), 25, BOOST_PRECISION, 0, 60, 0).unwrap();
        let ids: Vec<u64> = registry.positions_of(&alice()).iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(registry.total_staked(), 175);
        assert_eq!(registry.iter().count(), 3);
    }

    #[test]
    fn test_boosted_amount() {
        let position = StakePosition {
            amount: 1_000,
            reward_debt: 0,
            boost_multiplier: 3 * BOOST_PRECISION / 2,
            lock_start_time: 0,
            lock_end_time: 1,
        };
        assert_eq!(position.boosted_amount().unwrap(), 1_500);
    }
}
