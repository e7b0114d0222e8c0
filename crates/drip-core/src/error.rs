// crates/drip-core/src/error.rs

use thiserror::Error;

use crate::identity::AccountId;

/// Protocol-wide error types for the Drip staking engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DripError {
    /// Stake amount was zero.
    #[error("Invalid amount: stake amount must be greater than zero")]
    InvalidAmount,

    /// Lock period was zero.
    #[error("Invalid lock period: lock period must be greater than zero")]
    InvalidLockPeriod,

    /// Unknown or already-withdrawn position.
    #[error("Position {id} not found for {user}")]
    PositionNotFound { user: AccountId, id: u64 },

    /// Withdraw attempted before the lock window closed.
    #[error("Lock not expired: position unlocks at {lock_end}, current time is {now}")]
    LockNotExpired { lock_end: u64, now: u64 },

    /// Privileged operation attempted by a non-privileged caller.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An intermediate product or sum left the representable range.
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// Ledger collaborator could not cover a debit.
    #[error("Insufficient balance for {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        requested: u128,
        available: u128,
    },

    /// Invalid state transition or configuration.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error while loading or persisting a snapshot.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for DripError {
    fn from(e: serde_json::Error) -> Self {
        DripError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for DripError {
    fn from(e: std::io::Error) -> Self {
        DripError::Io(e.to_string())
    }
}
