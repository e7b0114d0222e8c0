// crates/drip-cli/src/commands/admin.rs
//
// `drip {set-rate, set-treasury}` — owner-only engine administration.

use clap::Subcommand;

use drip_core::identity::AccountId;
use drip_economics::{format_units, parse_units};

use super::Context;
use crate::output::{self, FieldRow};
use crate::state_store;

/// Owner subcommands.
#[derive(Debug, Subcommand)]
pub enum AdminCmd {
    /// Change the per-block reward emission. Accrual up to now uses the old rate.
    SetRate {
        /// Reward tokens per block (e.g. "0.035").
        #[arg(long)]
        drip_per_block: String,
        #[arg(long)]
        from: Option<String>,
    },
    /// Wire the treasury that funds the reward pool. Allowed once.
    SetTreasury {
        /// Treasury account name.
        #[arg(long)]
        account: String,
        #[arg(long)]
        from: Option<String>,
    },
}

/// Run the admin subcommand.
pub fn run(cmd: &AdminCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let engine = state_store::load(&ctx.state_file)?;

    match cmd {
        AdminCmd::SetRate { drip_per_block, from } => {
            let caller = ctx.caller(from);
            let rate = parse_units(drip_per_block)?;
            engine.update_emission_rate(&caller, rate, ctx.now)?;
            state_store::save(&ctx.state_file, &engine)?;

            let status = engine.status()?;
            let rows = [
                FieldRow::new("Drip per block", format_units(status.drip_per_block)),
                FieldRow::new("Last reward block", status.last_reward_block),
            ];
            output::emit(ctx.format, &status, &rows);
        }
        AdminCmd::SetTreasury { account, from } => {
            let caller = ctx.caller(from);
            engine.update_treasury_address(&caller, AccountId::new(account.clone()))?;
            state_store::save(&ctx.state_file, &engine)?;

            let status = engine.status()?;
            let rows = [FieldRow::new("Treasury", account)];
            output::emit(ctx.format, &status, &rows);
        }
    }

    Ok(())
}
