// crates/drip-cli/src/commands/stake.rs
//
// `drip {stake, claim, withdraw, pending, position}` — staking commands.

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use drip_core::identity::AccountId;
use drip_economics::{format_units, parse_units, StakePosition, SECONDS_PER_DAY};

use super::Context;
use crate::output::{self, FieldRow};
use crate::state_store;

/// Staking subcommands.
#[derive(Debug, Subcommand)]
pub enum StakeCmd {
    /// Lock LP tokens for a number of days.
    Stake {
        /// LP amount, in whole tokens (e.g. "12.5").
        #[arg(long)]
        amount: String,
        /// Lock duration in days.
        #[arg(long)]
        lock_days: u64,
        /// Staking account. Defaults to the configured owner.
        #[arg(long)]
        from: Option<String>,
    },
    /// Collect the pending reward of a position.
    Claim {
        /// Position id.
        #[arg(long)]
        id: u64,
        #[arg(long)]
        from: Option<String>,
    },
    /// Close an unlocked position, returning its LP and final reward.
    Withdraw {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        from: Option<String>,
    },
    /// Show the reward a claim would pay now.
    Pending {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        from: Option<String>,
    },
    /// List live positions of an account.
    Position {
        /// Only show this position.
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        from: Option<String>,
    },
}

/// A row in the position table.
#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Boost")]
    boost: String,
    #[tabled(rename = "Lock Start")]
    lock_start_time: u64,
    #[tabled(rename = "Lock End")]
    lock_end_time: u64,
    #[tabled(rename = "Unlocked")]
    unlocked: bool,
    #[tabled(rename = "Pending")]
    pending: String,
}

#[derive(Serialize)]
struct PositionView {
    user: AccountId,
    id: u64,
    #[serde(flatten)]
    position: StakePosition,
    unlocked: bool,
    pending_reward: u128,
}

/// Run the stake subcommand.
pub fn run(cmd: &StakeCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let engine = state_store::load(&ctx.state_file)?;

    match cmd {
        StakeCmd::Stake {
            amount,
            lock_days,
            from,
        } => {
            let user = ctx.caller(from);
            if *lock_days > ctx.config.max_lock_days {
                return Err(format!(
                    "Lock of {} days exceeds the configured maximum of {} days",
                    lock_days, ctx.config.max_lock_days
                )
                .into());
            }
            let amount = parse_units(amount)?;
            let lock_period = lock_days
                .checked_mul(SECONDS_PER_DAY)
                .ok_or("Lock duration overflows")?;
            let id = engine.stake(&user, amount, lock_period, ctx.now)?;
            state_store::save(&ctx.state_file, &engine)?;

            let position = engine.user_info(&user, id)?;
            let rows = [
                FieldRow::new("Account", &user),
                FieldRow::new("Position", id),
                FieldRow::new("Staked", format_units(position.amount)),
                FieldRow::new("Boost", format_boost(position.boost_multiplier)),
                FieldRow::new("Unlocks at", position.lock_end_time),
            ];
            output::emit(ctx.format, &view(&user, id, position, 0, ctx), &rows);
        }
        StakeCmd::Claim { id, from } => {
            let user = ctx.caller(from);
            let reward = engine.claim(&user, *id, ctx.now)?;
            state_store::save(&ctx.state_file, &engine)?;

            let data = serde_json::json!({ "user": user, "id": id, "reward": reward });
            let rows = [
                FieldRow::new("Account", &user),
                FieldRow::new("Position", id),
                FieldRow::new("Reward paid", format_units(reward)),
            ];
            output::emit(ctx.format, &data, &rows);
        }
        StakeCmd::Withdraw { id, from } => {
            let user = ctx.caller(from);
            let withdrawal = engine.withdraw(&user, *id, ctx.now)?;
            state_store::save(&ctx.state_file, &engine)?;

            let rows = [
                FieldRow::new("Account", &user),
                FieldRow::new("Position", id),
                FieldRow::new("LP returned", format_units(withdrawal.stake_returned)),
                FieldRow::new("Reward paid", format_units(withdrawal.reward)),
                FieldRow::new("Reward unpaid", format_units(withdrawal.reward_unpaid)),
            ];
            output::emit(ctx.format, &withdrawal, &rows);
        }
        StakeCmd::Pending { id, from } => {
            let user = ctx.caller(from);
            let pending = engine.pending_reward(&user, *id, ctx.now)?;

            let data = serde_json::json!({ "user": user, "id": id, "pending_reward": pending });
            let rows = [
                FieldRow::new("Account", &user),
                FieldRow::new("Position", id),
                FieldRow::new("Pending", format_units(pending)),
            ];
            output::emit(ctx.format, &data, &rows);
        }
        StakeCmd::Position { id, from } => {
            let user = ctx.caller(from);
            let positions = match id {
                Some(id) => vec![(*id, engine.user_info(&user, *id)?)],
                None => engine.positions_of(&user)?,
            };

            let mut views = Vec::with_capacity(positions.len());
            for (id, position) in positions {
                let pending = engine.pending_reward(&user, id, ctx.now)?;
                views.push(view(&user, id, position, pending, ctx));
            }
            if views.is_empty() && ctx.format == output::OutputFormat::Table {
                println!("{} has no open positions", user);
                return Ok(());
            }
            let rows: Vec<PositionRow> = views
                .iter()
                .map(|v| PositionRow {
                    id: v.id,
                    amount: format_units(v.position.amount),
                    boost: format_boost(v.position.boost_multiplier),
                    lock_start_time: v.position.lock_start_time,
                    lock_end_time: v.position.lock_end_time,
                    unlocked: v.unlocked,
                    pending: format_units(v.pending_reward),
                })
                .collect();
            output::emit(ctx.format, &views, &rows);
        }
    }

    Ok(())
}

fn view(user: &AccountId, id: u64, position: StakePosition, pending_reward: u128, ctx: &Context) -> PositionView {
    PositionView {
        user: user.clone(),
        id,
        unlocked: position.is_unlocked(ctx.now.timestamp),
        position,
        pending_reward,
    }
}

/// Render a `BOOST_PRECISION`-scaled multiplier as e.g. "1.1918x".
fn format_boost(boost: u128) -> String {
    let scaled = boost / (drip_economics::BOOST_PRECISION / 10_000);
    format!("{}.{:04}x", scaled / 10_000, scaled % 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{cleanup, temp_context};
    use crate::commands::{init, Context};
    use drip_core::identity::Moment;
    use drip_economics::UNITS_PER_TOKEN;

    fn at(ctx: &Context, block: u64, timestamp: u64) -> Context {
        Context {
            config: ctx.config.clone(),
            state_file: ctx.state_file.clone(),
            format: ctx.format,
            now: Moment::new(block, timestamp),
        }
    }

    #[test]
    fn test_format_boost() {
        assert_eq!(format_boost(1_000_000_000_000), "1.0000x");
        assert_eq!(format_boost(2_000_000_000_000), "2.0000x");
        assert_eq!(format_boost(1_191_780_821_917), "1.1917x");
    }

    #[test]
    fn test_stake_claim_withdraw_through_state_file() {
        let ctx = temp_context("stake_flow", Moment::new(0, 0));
        init::run(&ctx, false, false).unwrap();

        run(
            &StakeCmd::Stake {
                amount: "10".to_string(),
                lock_days: 1,
                from: None,
            },
            &at(&ctx, 1, 3),
        )
        .unwrap();

        let engine = state_store::load(&ctx.state_file).unwrap();
        let owner = ctx.config.owner();
        assert_eq!(engine.current_staked_id(&owner).unwrap(), 1);
        assert_eq!(engine.user_info(&owner, 0).unwrap().amount, 10 * UNITS_PER_TOKEN);

        run(&StakeCmd::Claim { id: 0, from: None }, &at(&ctx, 11, 33)).unwrap();
        let before = state_store::load(&ctx.state_file)
            .unwrap()
            .reward_balance(&owner)
            .unwrap();

        let early = run(&StakeCmd::Withdraw { id: 0, from: None }, &at(&ctx, 12, 36));
        assert!(early.is_err());

        run(
            &StakeCmd::Withdraw { id: 0, from: None },
            &at(&ctx, 30_000, 90_000),
        )
        .unwrap();
        let engine = state_store::load(&ctx.state_file).unwrap();
        assert!(engine.user_info(&owner, 0).is_err());
        assert!(engine.reward_balance(&owner).unwrap() >= before);
        engine.check_invariants().unwrap();
        cleanup(&ctx);
    }

    #[test]
    fn test_lock_longer_than_max_rejected() {
        let ctx = temp_context("stake_max", Moment::new(0, 0));
        init::run(&ctx, false, false).unwrap();
        let result = run(
            &StakeCmd::Stake {
                amount: "1".to_string(),
                lock_days: ctx.config.max_lock_days + 1,
                from: None,
            },
            &ctx,
        );
        assert!(result.is_err());
        cleanup(&ctx);
    }

    #[test]
    fn test_failed_stake_leaves_state_untouched() {
        let ctx = temp_context("stake_fail", Moment::new(0, 0));
        init::run(&ctx, false, false).unwrap();
        let before = state_store::load(&ctx.state_file).unwrap().status().unwrap();

        // "bob" holds no LP.
        let result = run(
            &StakeCmd::Stake {
                amount: "1".to_string(),
                lock_days: 7,
                from: Some("bob".to_string()),
            },
            &at(&ctx, 5, 15),
        );
        assert!(result.is_err());
        let after = state_store::load(&ctx.state_file).unwrap().status().unwrap();
        assert_eq!(before, after);
        cleanup(&ctx);
    }
}
