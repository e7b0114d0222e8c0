// crates/drip-cli/src/commands/token.rs
//
// `drip {transfer, mint, balance}` — reward and LP token ledger commands.

use clap::{Subcommand, ValueEnum};
use serde::Serialize;

use drip_core::identity::AccountId;
use drip_core::traits::TokenLedger;
use drip_economics::{format_units, parse_units};

use super::Context;
use crate::output::{self, FieldRow};
use crate::state_store;

/// Which ledger a token command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Asset {
    /// The reward token (taxed on transfer).
    Drip,
    /// The staked LP token.
    Lp,
}

/// Token subcommands.
#[derive(Debug, Subcommand)]
pub enum TokenCmd {
    /// Move tokens between accounts. Reward-token transfers are taxed.
    Transfer {
        #[arg(long)]
        to: String,
        /// Amount in whole tokens.
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum, default_value = "drip")]
        asset: Asset,
        #[arg(long)]
        from: Option<String>,
    },
    /// Create new supply. Only the token owner and whitelisted minters may mint.
    Mint {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum, default_value = "drip")]
        asset: Asset,
        #[arg(long)]
        from: Option<String>,
    },
    /// Show reward and LP balances of an account.
    Balance {
        /// Account to inspect. Defaults to the configured owner.
        #[arg(long)]
        account: Option<String>,
    },
}

#[derive(Serialize)]
struct TransferReceipt {
    from: AccountId,
    to: AccountId,
    sent: u128,
    received: u128,
}

#[derive(Serialize)]
struct Balances {
    account: AccountId,
    drip: u128,
    lp: u128,
}

/// Run the token subcommand.
pub fn run(cmd: &TokenCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let engine = state_store::load(&ctx.state_file)?;

    match cmd {
        TokenCmd::Transfer {
            to,
            amount,
            asset,
            from,
        } => {
            let sender = ctx.caller(from);
            let recipient = AccountId::new(to.clone());
            let amount = parse_units(amount)?;
            let received = engine.with_ledgers(|lp, drip| match asset {
                Asset::Drip => drip.transfer(&sender, &recipient, amount),
                Asset::Lp => lp.transfer(&sender, &recipient, amount),
            })?;
            state_store::save(&ctx.state_file, &engine)?;

            let rows = [
                FieldRow::new("From", &sender),
                FieldRow::new("To", &recipient),
                FieldRow::new("Sent", format_units(amount)),
                FieldRow::new("Received", format_units(received)),
            ];
            let receipt = TransferReceipt {
                from: sender,
                to: recipient,
                sent: amount,
                received,
            };
            output::emit(ctx.format, &receipt, &rows);
        }
        TokenCmd::Mint {
            to,
            amount,
            asset,
            from,
        } => {
            let minter = ctx.caller(from);
            let recipient = AccountId::new(to.clone());
            let amount = parse_units(amount)?;
            engine.with_ledgers(|lp, drip| match asset {
                Asset::Drip => drip.mint(&minter, &recipient, amount),
                Asset::Lp => lp.mint(&minter, &recipient, amount),
            })?;
            state_store::save(&ctx.state_file, &engine)?;

            let data = serde_json::json!({ "minter": minter, "to": recipient, "amount": amount });
            let rows = [
                FieldRow::new("Minter", &minter),
                FieldRow::new("To", &recipient),
                FieldRow::new("Amount", format_units(amount)),
            ];
            output::emit(ctx.format, &data, &rows);
        }
        TokenCmd::Balance { account } => {
            let account = ctx.caller(account);
            let balances = Balances {
                drip: engine.reward_balance(&account)?,
                lp: engine.lp_balance(&account)?,
                account,
            };
            let rows = [
                FieldRow::new("Account", &balances.account),
                FieldRow::new("DRIP", format_units(balances.drip)),
                FieldRow::new("LP", format_units(balances.lp)),
            ];
            output::emit(ctx.format, &balances, &rows);
        }
    }

    Ok(())
}
