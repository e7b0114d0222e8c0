// crates/drip-core/src/identity.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an account on the ledger (a user, the staking pool, the
/// treasury, or the tax vault).
///
/// Accounts are opaque names; the engine never interprets them beyond
/// equality and ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in chain time, supplied by the caller on every operation.
///
/// Two clocks advance side by side: `block` drives reward accrual (the
/// emission rate is denominated per block) and `timestamp` (seconds) drives
/// lock windows, the mint schedule, and the treasury payout schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Moment {
    /// Block height.
    pub block: u64,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
}

impl Moment {
    pub fn new(block: u64, timestamp: u64) -> Self {
        Self { block, timestamp }
    }

    /// Return a moment `blocks` blocks and `seconds` seconds later.
    pub fn after(&self, blocks: u64, seconds: u64) -> Self {
        Self {
            block: self.block.saturating_add(blocks),
            timestamp: self.timestamp.saturating_add(seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_display() {
        let account = AccountId::new("alice");
        assert_eq!(format!("{}", account), "alice");
        assert_eq!(account, AccountId::from("alice"));
    }

    #[test]
    fn test_account_serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountId::new("pool")).unwrap();
        assert_eq!(json, "\"pool\"");
    }

    #[test]
    fn test_moment_after() {
        let m = Moment::new(10, 1_000).after(5, 15);
        assert_eq!(m, Moment::new(15, 1_015));
    }
}
