// crates/drip-core/src/traits.rs

use crate::error::DripError;
use crate::identity::AccountId;

/// Fungible-token bookkeeping consumed by the staking engine.
///
/// Implemented by the in-memory reference ledger in drip-economics. Both the
/// staked LP asset and the reward token are driven through this trait. A
/// ledger may apply a transfer tax, so `transfer` reports the amount that
/// actually reached the recipient.
pub trait TokenLedger {
    /// Current balance of `account`.
    fn balance_of(&self, account: &AccountId) -> u128;

    /// Total circulating supply.
    fn total_supply(&self) -> u128;

    /// Move `amount` from `from` to `to`. Returns the amount credited to `to`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128)
        -> Result<u128, DripError>;

    /// Create `amount` of new supply in `to`, on behalf of `minter`.
    fn mint(&mut self, minter: &AccountId, to: &AccountId, amount: u128) -> Result<(), DripError>;

    /// Whether transfers touching `account` bypass the tax skim.
    fn is_tax_exempt(&self, account: &AccountId) -> bool;
}
