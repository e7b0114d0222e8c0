// crates/drip-economics/src/treasury.rs
//
// Treasury payout into the staking reward pool.
//
// The payout base is the treasury balance plus one tenth of the tax vault:
//
//   base = treasury_balance + vault_balance / 10
//
// The first payout ever (last_payout_time == 0) is a flat
// `base * payout_rate / 100`. Every later payout is a per-day rate prorated
// by elapsed seconds:
//
//   payout = base * payout_rate / 100 / 86400 * (now - last_payout_time)
//
// with each division truncating in exactly that order. When the treasury's
// own balance does not cover the payout, the shortfall is drawn from the
// vault's tenth through the vault whitelist.

use serde::{Deserialize, Serialize};

use drip_core::error::DripError;
use drip_core::identity::AccountId;
use drip_core::traits::TokenLedger;

use crate::math::{self, SECONDS_PER_DAY};
use crate::vault::Vault;

/// Default daily payout rate, in percent.
pub const DEFAULT_PAYOUT_RATE: u128 = 1;

/// The vault contributes `1 / VAULT_PAYOUT_DIVISOR` of its balance to the base.
pub const VAULT_PAYOUT_DIVISOR: u128 = 10;

/// Payout owed at `timestamp` for the given base.
pub fn payout_amount(
    base: u128,
    payout_rate: u128,
    last_payout_time: u64,
    timestamp: u64,
) -> Result<u128, DripError> {
    let percent = math::mul_div(base, payout_rate, 100, "treasury payout")?;
    if last_payout_time == 0 {
        return Ok(percent);
    }
    let per_second = percent / SECONDS_PER_DAY as u128;
    let elapsed = timestamp.saturating_sub(last_payout_time) as u128;
    math::mul(per_second, elapsed, "treasury payout")
}

/// Protocol treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    /// Ledger account holding treasury funds.
    account: AccountId,
    /// May wire the treasury to a staking pool.
    owner: AccountId,
    /// Reward pool receiving payouts; payouts are skipped until set.
    staking_contract: Option<AccountId>,
    /// Timestamp of the last payout, 0 if none has run.
    last_payout_time: u64,
    /// Daily payout rate in percent.
    payout_rate: u128,
}

impl Treasury {
    /// Create a treasury at `account` with the default payout rate.
    pub fn new(account: AccountId, owner: AccountId) -> Self {
        Self {
            account,
            owner,
            staking_contract: None,
            last_payout_time: 0,
            payout_rate: DEFAULT_PAYOUT_RATE,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn staking_contract(&self) -> Option<&AccountId> {
        self.staking_contract.as_ref()
    }

    pub fn last_payout_time(&self) -> u64 {
        self.last_payout_time
    }

    pub fn payout_rate(&self) -> u128 {
        self.payout_rate
    }

    /// Point payouts at `pool`. Owner only.
    pub fn set_staking_contract(&mut self, caller: &AccountId, pool: AccountId) -> Result<(), DripError> {
        if *caller != self.owner {
            return Err(DripError::Unauthorized(format!(
                "{} is not the treasury owner",
                caller
            )));
        }
        tracing::info!("Treasury {} now pays into {}", self.account, pool);
        self.staking_contract = Some(pool);
        Ok(())
    }

    /// Payout base: treasury balance plus the vault's tenth.
    pub fn payout_base<L: TokenLedger>(&self, ledger: &L, vault: &Vault) -> Result<u128, DripError> {
        let vault_share = vault.balance(ledger) / VAULT_PAYOUT_DIVISOR;
        math::add(ledger.balance_of(&self.account), vault_share, "treasury payout base")
    }

    /// Amount `advance(timestamp)` would pay, before any solvency cap.
    pub fn pending_payout<L: TokenLedger>(
        &self,
        ledger: &L,
        vault: &Vault,
        timestamp: u64,
    ) -> Result<u128, DripError> {
        let base = self.payout_base(ledger, vault)?;
        payout_amount(base, self.payout_rate, self.last_payout_time, timestamp)
    }

    /// Pay everything owed up to `timestamp` into the staking pool. Returns
    /// the amount the pool received.
    pub fn advance<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        vault: &Vault,
        timestamp: u64,
    ) -> Result<u128, DripError> {
        let pool = match &self.staking_contract {
            Some(pool) => pool.clone(),
            None => return Ok(0),
        };
        if self.last_payout_time != 0 && timestamp <= self.last_payout_time {
            return Ok(0);
        }

        let treasury_balance = ledger.balance_of(&self.account);
        let vault_share = vault.balance(ledger) / VAULT_PAYOUT_DIVISOR;
        let reachable = math::add(treasury_balance, vault_share, "treasury payout base")?;
        let owed = payout_amount(reachable, self.payout_rate, self.last_payout_time, timestamp)?;

        let payout = if owed > reachable {
            tracing::warn!(
                "Treasury payout {} exceeds reachable funds {}; capping",
                owed,
                reachable
            );
            reachable
        } else {
            owed
        };

        let shortfall = payout.saturating_sub(treasury_balance);
        if shortfall > 0 {
            vault.release(&self.account, ledger, &self.account, shortfall)?;
        }

        let received = if payout > 0 {
            ledger.transfer(&self.account, &pool, payout)?
        } else {
            0
        };
        tracing::info!(
            "Treasury paid {} into {} (vault drawn {}, base {})",
            received,
            pool,
            shortfall,
            reachable
        );

        self.last_payout_time = timestamp;
        Ok(received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    const UNIT: u128 = 1_000_000_000_000_000_000;

    struct Fixture {
        token: Token,
        vault: Vault,
        treasury: Treasury,
        pool: AccountId,
    }

    fn fixture(vault_funds: u128, treasury_funds: u128) -> Fixture {
        let owner = AccountId::new("owner");
        let pool = AccountId::new("pool");
        let mut token = Token::new(owner.clone());
        token.set_vault_address(&owner, "vault".into()).unwrap();
        token.exclude_account(&owner, "treasury".into()).unwrap();
        token.exclude_account(&owner, pool.clone()).unwrap();
        token.mint(&owner, &"vault".into(), vault_funds).unwrap();
        token.mint(&owner, &"treasury".into(), treasury_funds).unwrap();

        let mut vault = Vault::new("vault".into());
        vault.add_address_to_whitelist("treasury".into());
        let mut treasury = Treasury::new("treasury".into(), owner.clone());
        treasury.set_staking_contract(&owner, pool.clone()).unwrap();
        Fixture {
            token,
            vault,
            treasury,
            pool,
        }
    }

    #[test]
    fn test_first_payout_is_flat_percent() {
        // (0 + 10^18 / 10) * 1 / 100
        assert_eq!(payout_amount(UNIT / 10, 1, 0, 5_000).unwrap(), 1_000_000_000_000_000);
    }

    #[test]
    fn test_later_payout_is_prorated() {
        let base = 1_100 * UNIT / 10;
        let expected = base * 1 / 100 / 86_400 * 1_001;
        assert_eq!(payout_amount(base, 1, 10_000, 11_001).unwrap(), expected);
        assert_eq!(expected, 12_744_212_962_962_481);
    }

    #[test]
    fn test_division_order_truncates_per_second_rate() {
        // 100 * 1 / 100 = 1 per day, 1 / 86400 = 0 per second.
        assert_eq!(payout_amount(100, 1, 1, 86_401).unwrap(), 0);
    }

    #[test]
    fn test_unwired_treasury_pays_nothing() {
        let owner = AccountId::new("owner");
        let mut token = Token::new(owner.clone());
        token.mint(&owner, &"treasury".into(), UNIT).unwrap();
        let vault = Vault::new("vault".into());
        let mut treasury = Treasury::new("treasury".into(), owner);
        assert_eq!(treasury.advance(&mut token, &vault, 100).unwrap(), 0);
        assert_eq!(treasury.last_payout_time(), 0);
    }

    #[test]
    fn test_only_owner_wires_pool() {
        let mut treasury = Treasury::new("treasury".into(), "owner".into());
        assert!(treasury.set_staking_contract(&"mallory".into(), "pool".into()).is_err());
    }

    #[test]
    fn test_first_payout_draws_from_vault() {
        let mut f = fixture(UNIT, 0);
        let paid = f.treasury.advance(&mut f.token, &f.vault, 1_000).unwrap();
        assert_eq!(paid, UNIT / 10 / 100);
        assert_eq!(f.token.balance_of(&f.pool), paid);
        assert_eq!(f.token.balance_of(&"vault".into()), UNIT - paid);
        assert_eq!(f.token.balance_of(&"treasury".into()), 0);
        assert_eq!(f.treasury.last_payout_time(), 1_000);
    }

    #[test]
    fn test_second_payout_uses_elapsed_seconds() {
        let mut f = fixture(UNIT, 50 * UNIT);
        f.treasury.advance(&mut f.token, &f.vault, 1_000).unwrap();
        let expected = f.treasury.pending_payout(&f.token, &f.vault, 2_000).unwrap();
        let base = f.treasury.payout_base(&f.token, &f.vault).unwrap();
        assert_eq!(expected, base / 100 / 86_400 * 1_000);

        let before = f.token.balance_of(&f.pool);
        let paid = f.treasury.advance(&mut f.token, &f.vault, 2_000).unwrap();
        assert_eq!(paid, expected);
        assert_eq!(f.token.balance_of(&f.pool) - before, expected);
    }

    #[test]
    fn test_repeat_timestamp_pays_once() {
        let mut f = fixture(UNIT, 50 * UNIT);
        f.treasury.advance(&mut f.token, &f.vault, 1_000).unwrap();
        assert_eq!(f.treasury.advance(&mut f.token, &f.vault, 1_000).unwrap(), 0);
    }

    #[test]
    fn test_long_gap_is_capped_to_reachable_funds() {
        let mut f = fixture(0, 100 * UNIT);
        f.treasury.advance(&mut f.token, &f.vault, 1).unwrap();
        // 200 days at 1% per day would exceed the treasury.
        let paid = f
            .treasury
            .advance(&mut f.token, &f.vault, 1 + 200 * 86_400)
            .unwrap();
        assert_eq!(paid, 99 * UNIT);
        assert_eq!(f.token.balance_of(&"treasury".into()), 0);
    }
}
