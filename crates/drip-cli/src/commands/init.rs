// crates/drip-cli/src/commands/init.rs
//
// `drip init` — deploy a fresh engine from the configured genesis parameters.

use std::path::Path;

use drip_economics::{format_units, DripEngine};

use super::Context;
use crate::state_store;

/// Run the init command.
///
/// With `without_treasury` the treasury is left unset so it can be wired later
/// with `drip set-treasury`.
pub fn run(ctx: &Context, force: bool, without_treasury: bool) -> Result<(), Box<dyn std::error::Error>> {
    if Path::new(&ctx.state_file).exists() && !force {
        return Err(format!(
            "State file {} already exists; pass --force to overwrite",
            ctx.state_file
        )
        .into());
    }

    let mut genesis = ctx.config.genesis()?;
    if without_treasury {
        genesis.treasury = None;
    }
    let engine = DripEngine::bootstrap(&genesis, ctx.now)?;
    state_store::save(&ctx.state_file, &engine)?;
    tracing::info!("Initialized engine at {}", ctx.state_file);

    println!("Drip engine initialized");
    println!("  State file:     {}", ctx.state_file);
    println!("  Owner:          {}", genesis.owner);
    println!("  Staking pool:   {}", genesis.pool);
    match &genesis.treasury {
        Some(treasury) => println!("  Treasury:       {}", treasury),
        None => println!("  Treasury:       (unset, wire it with `drip set-treasury`)"),
    }
    println!("  Vault:          {}", genesis.vault);
    println!("  Drip per block: {}", format_units(genesis.drip_per_block));
    println!("  Start:          block {} / timestamp {}", ctx.now.block, ctx.now.timestamp);

    Ok(())
}
