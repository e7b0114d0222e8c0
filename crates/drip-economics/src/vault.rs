// crates/drip-economics/src/vault.rs
//
// Transfer-tax skimming and the tax vault.
//
// Ordinary reward-token transfers between two non-excluded accounts send
// TAX_RATE_PERCENT of the amount to the vault. The staking pool, treasury,
// and vault are excluded so internal reward flows are never taxed. The vault
// balance lives on the token ledger; only whitelisted callers (the treasury)
// may move it out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use drip_core::error::DripError;
use drip_core::identity::AccountId;
use drip_core::traits::TokenLedger;

use crate::math;

/// Share of a taxed transfer routed to the vault, in percent.
pub const TAX_RATE_PERCENT: u128 = 10;

/// How a transfer amount divides between recipient and vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxSplit {
    /// Amount credited to the recipient.
    pub net: u128,
    /// Amount skimmed into the vault.
    pub tax: u128,
}

/// Tax hook configuration carried by a taxed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSkimmer {
    vault: AccountId,
    rate_percent: u128,
    excluded: BTreeSet<AccountId>,
}

impl TaxSkimmer {
    /// Skim into `vault` at the default rate. The vault itself is excluded.
    pub fn new(vault: AccountId) -> Self {
        let mut excluded = BTreeSet::new();
        excluded.insert(vault.clone());
        Self {
            vault,
            rate_percent: TAX_RATE_PERCENT,
            excluded,
        }
    }

    pub fn vault(&self) -> &AccountId {
        &self.vault
    }

    pub fn rate_percent(&self) -> u128 {
        self.rate_percent
    }

    /// Exempt `account` from the skim.
    pub fn exclude(&mut self, account: AccountId) {
        self.excluded.insert(account);
    }

    pub fn is_excluded(&self, account: &AccountId) -> bool {
        self.excluded.contains(account)
    }

    /// Split a transfer of `amount` from `from` to `to`.
    pub fn split(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<TaxSplit, DripError> {
        if self.is_excluded(from) || self.is_excluded(to) {
            return Ok(TaxSplit { net: amount, tax: 0 });
        }
        let tax = math::mul_div(amount, self.rate_percent, 100, "transfer tax")?;
        Ok(TaxSplit {
            net: amount - tax,
            tax,
        })
    }
}

/// The vault account and its withdrawal whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    account: AccountId,
    whitelist: BTreeSet<AccountId>,
}

impl Vault {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            whitelist: BTreeSet::new(),
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Allow `account` to withdraw from the vault.
    pub fn add_address_to_whitelist(&mut self, account: AccountId) {
        tracing::info!("Vault {} whitelisted {}", self.account, account);
        self.whitelist.insert(account);
    }

    pub fn is_whitelisted(&self, account: &AccountId) -> bool {
        self.whitelist.contains(account)
    }

    /// Accumulated tax revenue.
    pub fn balance<L: TokenLedger>(&self, ledger: &L) -> u128 {
        ledger.balance_of(&self.account)
    }

    /// Move `amount` of vault funds to `to` on behalf of `caller`.
    ///
    /// # Errors
    /// Returns `DripError::Unauthorized` if `caller` is not whitelisted.
    pub fn release<L: TokenLedger>(
        &self,
        caller: &AccountId,
        ledger: &mut L,
        to: &AccountId,
        amount: u128,
    ) -> Result<u128, DripError> {
        if !self.is_whitelisted(caller) {
            return Err(DripError::Unauthorized(format!(
                "{} may not withdraw from vault {}",
                caller, self.account
            )));
        }
        ledger.transfer(&self.account, to, amount)
    }
}
