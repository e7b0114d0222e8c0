// crates/drip-cli/src/config.rs
//
// Runtime configuration for the Drip CLI.
// Loaded from a TOML file or populated with sensible defaults.
//
// Token amounts are decimal strings ("0.035", "100000") because TOML
// integers cannot hold 18-decimal quantities.

use serde::Deserialize;
use std::fs;

use drip_core::identity::{AccountId, Moment};
use drip_economics::{parse_units, Genesis};

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Path of the JSON engine snapshot.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Account that deploys and administers the engine.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Timestamp of block 0, used to derive a block height from a timestamp.
    #[serde(default)]
    pub genesis_timestamp: u64,

    /// Seconds per block.
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    /// Reward supply minted to the owner at init (annual emission base).
    #[serde(default = "default_initial_supply")]
    pub initial_supply: String,

    /// Tax revenue seeded into the vault at init.
    #[serde(default = "default_initial_vault_tax")]
    pub initial_vault_tax: String,

    /// Reward tokens pre-funded into the staking pool at init.
    #[serde(default = "default_initial_pool_funding")]
    pub initial_pool_funding: String,

    /// LP supply minted to the owner at init.
    #[serde(default = "default_initial_lp_supply")]
    pub initial_lp_supply: String,

    /// Reward tokens emitted per block.
    #[serde(default = "default_initial_drip_per_block")]
    pub initial_drip_per_block: String,

    /// Longest lock the CLI accepts, in days.
    #[serde(default = "default_max_lock_days")]
    pub max_lock_days: u64,
}

fn default_state_file() -> String {
    "~/.drip/state.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_owner() -> String {
    "deployer".to_string()
}

fn default_block_time_secs() -> u64 {
    3
}

fn default_initial_supply() -> String {
    "100000".to_string()
}

fn default_initial_vault_tax() -> String {
    "1".to_string()
}

fn default_initial_pool_funding() -> String {
    "0".to_string()
}

fn default_initial_lp_supply() -> String {
    "10000000".to_string()
}

fn default_initial_drip_per_block() -> String {
    "0.035".to_string()
}

fn default_max_lock_days() -> u64 {
    4 * 365
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            log_level: default_log_level(),
            owner: default_owner(),
            genesis_timestamp: 0,
            block_time_secs: default_block_time_secs(),
            initial_supply: default_initial_supply(),
            initial_vault_tax: default_initial_vault_tax(),
            initial_pool_funding: default_initial_pool_funding(),
            initial_lp_supply: default_initial_lp_supply(),
            initial_drip_per_block: default_initial_drip_per_block(),
            max_lock_days: default_max_lock_days(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn owner(&self) -> AccountId {
        AccountId::new(self.owner.clone())
    }

    /// Deployment parameters for `drip init`.
    pub fn genesis(&self) -> Result<Genesis, Box<dyn std::error::Error>> {
        let mut genesis = Genesis::new(self.owner());
        genesis.initial_supply = parse_units(&self.initial_supply)?;
        genesis.initial_vault_tax = parse_units(&self.initial_vault_tax)?;
        genesis.initial_pool_funding = parse_units(&self.initial_pool_funding)?;
        genesis.initial_lp_supply = parse_units(&self.initial_lp_supply)?;
        genesis.drip_per_block = parse_units(&self.initial_drip_per_block)?;
        Ok(genesis)
    }

    /// Resolve the chain moment for a command. Missing values default to the
    /// wall clock and the block height implied by `block_time_secs`.
    pub fn moment(&self, block: Option<u64>, timestamp: Option<u64>) -> Moment {
        let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64);
        let block = block.unwrap_or_else(|| {
            timestamp.saturating_sub(self.genesis_timestamp) / self.block_time_secs.max(1)
        });
        Moment::new(block, timestamp)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
