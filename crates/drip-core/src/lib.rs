// crates/drip-core/src/lib.rs
//
// drip-core: Core types, errors, and collaborator traits for the Drip
// staking engine.
//
// This is the leaf crate that the engine and the CLI depend on. It defines
// account identity, the two-clock time input, the error enum, and the ledger
// trait the engine drives.

pub mod error;
pub mod identity;
pub mod traits;

pub use error::DripError;
pub use identity::{AccountId, Moment};
pub use traits::TokenLedger;
