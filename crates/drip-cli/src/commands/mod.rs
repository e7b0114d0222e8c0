// crates/drip-cli/src/commands/mod.rs
//
// Command module declarations for the Drip CLI.

pub mod admin;
pub mod init;
pub mod stake;
pub mod status;
pub mod token;

use drip_core::identity::{AccountId, Moment};

use crate::config::CliConfig;
use crate::output::OutputFormat;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub config: CliConfig,
    pub state_file: String,
    pub format: OutputFormat,
    pub now: Moment,
}

impl Context {
    /// Acting account: the `--from` value, or the configured owner.
    pub fn caller(&self, from: &Option<String>) -> AccountId {
        match from {
            Some(name) => AccountId::new(name.clone()),
            None => self.config.owner(),
        }
    }
}
