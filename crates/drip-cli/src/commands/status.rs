// crates/drip-cli/src/commands/status.rs
//
// `drip status` — display the engine's global state.

use drip_economics::format_units;

use super::Context;
use crate::output::{self, FieldRow};
use crate::state_store;

/// Run the status command.
pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let engine = state_store::load(&ctx.state_file)?;
    let status = engine.status()?;

    let treasury = status
        .treasury
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "(unset)".to_string());
    let rows = [
        FieldRow::new("Owner", &status.owner),
        FieldRow::new("Staking pool", &status.pool),
        FieldRow::new("Treasury", treasury),
        FieldRow::new("Vault", &status.vault),
        FieldRow::new("Drip per block", format_units(status.drip_per_block)),
        FieldRow::new("Last reward block", status.last_reward_block),
        FieldRow::new("Acc drip per share", status.acc_drip_per_share),
        FieldRow::new("Total staked LP", format_units(status.total_staked)),
        FieldRow::new("Total boosted share", format_units(status.total_boosted_share)),
        FieldRow::new("Pool reward balance", format_units(status.pool_reward_balance)),
        FieldRow::new("Vault balance", format_units(status.vault_balance)),
        FieldRow::new("Last mint time", status.last_mint_time),
        FieldRow::new("Annual emission base", format_units(status.total_supply_year)),
        FieldRow::new("Last payout time", status.last_payout_time),
        FieldRow::new("Payout rate (%/day)", status.payout_rate),
        FieldRow::new("DRIP total supply", format_units(status.reward_total_supply)),
    ];
    output::emit(ctx.format, &status, &rows);

    Ok(())
}
