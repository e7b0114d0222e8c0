// crates/drip-economics/src/lib.rs
//
// drip-economics: boosted LP staking, DRIP emission, treasury payout, and
// the transfer-tax vault.
//
// All monetary values are integers in the smallest token unit
// (1 DRIP = 10^18 units). Rewards are distributed with a per-share
// accumulator; nothing in this crate uses floating point.

pub mod accumulator;
pub mod boost;
pub mod emission;
pub mod engine;
pub mod math;
pub mod staking;
pub mod token;
pub mod treasury;
pub mod vault;

// Re-export key types for ergonomic access from downstream crates.
pub use accumulator::RewardAccumulator;
pub use boost::{compute_boost, BOOST_WEIGHT};
pub use emission::{prorated_emission, MintScheduler, ANNUAL_EMISSION_DIVISOR};
pub use engine::{DripEngine, EngineState, EngineStatus, Genesis, Withdrawal};
pub use math::{ACC_DRIP_PRECISION, BOOST_PRECISION, SECONDS_PER_DAY, SECONDS_PER_YEAR};
pub use primitive_types::U256;
pub use staking::{StakePosition, StakeRegistry};
pub use token::{format_units, parse_units, Token, UNITS_PER_TOKEN};
pub use treasury::{payout_amount, Treasury, DEFAULT_PAYOUT_RATE, VAULT_PAYOUT_DIVISOR};
pub use vault::{TaxSkimmer, TaxSplit, Vault, TAX_RATE_PERCENT};
