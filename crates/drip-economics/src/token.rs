// crates/drip-economics/src/token.rs
//
// In-memory fungible token ledger and amount formatting.
//
// Amounts are integers in the token's smallest unit; DRIP and the LP token
// both use 18 decimals (1 token = 10^18 units). `Token` is the reference
// implementation of the `TokenLedger` collaborator: balances, a minter
// whitelist, and an optional transfer-tax hook that skims into a vault.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use drip_core::error::DripError;
use drip_core::identity::AccountId;
use drip_core::traits::TokenLedger;

use crate::math;
use crate::vault::TaxSkimmer;

/// Number of decimal places in a whole token.
pub const DECIMALS: u32 = 18;

/// Units in one whole token (10^18).
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Format an amount in units as a decimal token string, trimming trailing
/// zeros (e.g. `1500000000000000000` -> `"1.5"`).
pub fn format_units(amount: u128) -> String {
    let whole = amount / UNITS_PER_TOKEN;
    let frac = amount % UNITS_PER_TOKEN;
    if frac == 0 {
        format!("{}", whole)
    } else {
        let frac_str = format!("{:018}", frac);
        let trimmed = frac_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}

/// Parse a decimal token string (e.g. `"1.5"`) into units.
///
/// # Errors
/// Returns `DripError::InvalidState` on malformed input or more than 18
/// fractional digits, and `DripError::ArithmeticOverflow` if the value does
/// not fit.
pub fn parse_units(text: &str) -> Result<u128, DripError> {
    let malformed = || DripError::InvalidState(format!("Malformed token amount: {:?}", text));
    let (whole, frac) = match text.trim().split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text.trim(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(malformed());
    }
    if frac.len() > DECIMALS as usize
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| DripError::ArithmeticOverflow("token amount"))?
    };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<18}", frac);
        padded.parse().map_err(|_| malformed())?
    };
    math::add(math::mul(whole, UNITS_PER_TOKEN, "token amount")?, frac, "token amount")
}

/// An in-memory token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    owner: AccountId,
    balances: BTreeMap<AccountId, u128>,
    total_supply: u128,
    minters: BTreeSet<AccountId>,
    tax: Option<TaxSkimmer>,
}

impl Token {
    /// Create an untaxed token. The owner may mint and manage the whitelist.
    pub fn new(owner: AccountId) -> Self {
        let mut minters = BTreeSet::new();
        minters.insert(owner.clone());
        Self {
            owner,
            balances: BTreeMap::new(),
            total_supply: 0,
            minters,
            tax: None,
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Allow `account` to mint. Owner only.
    pub fn add_address_to_whitelist(&mut self, caller: &AccountId, account: AccountId) -> Result<(), DripError> {
        self.require_owner(caller, "whitelist a minter")?;
        self.minters.insert(account);
        Ok(())
    }

    /// Route transfer tax into `vault`. Owner only.
    pub fn set_vault_address(&mut self, caller: &AccountId, vault: AccountId) -> Result<(), DripError> {
        self.require_owner(caller, "set the vault address")?;
        let skimmer = match self.tax.take() {
            Some(previous) => {
                let mut skimmer = TaxSkimmer::new(vault);
                skimmer.exclude(previous.vault().clone());
                skimmer
            }
            None => TaxSkimmer::new(vault),
        };
        tracing::info!("Transfer tax now skims into {}", skimmer.vault());
        self.tax = Some(skimmer);
        Ok(())
    }

    /// Current vault address, if a tax hook is installed.
    pub fn vault_address(&self) -> Option<&AccountId> {
        self.tax.as_ref().map(|t| t.vault())
    }

    /// Exempt `account` from transfer tax. Owner only; requires a vault.
    pub fn exclude_account(&mut self, caller: &AccountId, account: AccountId) -> Result<(), DripError> {
        self.require_owner(caller, "exclude an account")?;
        let tax = self
            .tax
            .as_mut()
            .ok_or_else(|| DripError::InvalidState("No vault address set".to_string()))?;
        tax.exclude(account);
        Ok(())
    }

    fn require_owner(&self, caller: &AccountId, action: &str) -> Result<(), DripError> {
        if *caller != self.owner {
            return Err(DripError::Unauthorized(format!(
                "{} is not the token owner and may not {}",
                caller, action
            )));
        }
        Ok(())
    }

    fn debit(&mut self, account: &AccountId, amount: u128) -> Result<(), DripError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(DripError::InsufficientBalance {
                account: account.clone(),
                requested: amount,
                available,
            });
        }
        self.balances.insert(account.clone(), available - amount);
        Ok(())
    }

    fn credit(&mut self, account: &AccountId, amount: u128) -> Result<(), DripError> {
        let balance = math::add(self.balance_of(account), amount, "token balance")?;
        self.balances.insert(account.clone(), balance);
        Ok(())
    }
}

impl TokenLedger for Token {
    fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128) -> Result<u128, DripError> {
        let (net, tax) = match &self.tax {
            Some(skimmer) => {
                let split = skimmer.split(from, to, amount)?;
                (split.net, split.tax)
            }
            None => (amount, 0),
        };
        self.debit(from, amount)?;
        self.credit(to, net)?;
        if tax > 0 {
            if let Some(vault) = self.vault_address().cloned() {
                self.credit(&vault, tax)?;
            }
        }
        Ok(net)
    }

    fn mint(&mut self, minter: &AccountId, to: &AccountId, amount: u128) -> Result<(), DripError> {
        if !self.minters.contains(minter) {
            return Err(DripError::Unauthorized(format!("{} is not a whitelisted minter", minter)));
        }
        self.total_supply = math::add(self.total_supply, amount, "total supply")?;
        self.credit(to, amount)
    }

    fn is_tax_exempt(&self, account: &AccountId) -> bool {
        match &self.tax {
            Some(skimmer) => skimmer.is_excluded(account),
            None => true,
        }
    }
}
