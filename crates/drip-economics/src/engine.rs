// crates/drip-economics/src/engine.rs
//
// The staking engine: one serialized critical section around the accrual
// index, the stake registry, the mint schedule, the treasury, the vault, and
// both token ledgers.
//
// Every state-changing call runs against a draft copy of the state and is
// committed only if it succeeds, so an error never leaves a half-advanced
// accumulator or a half-applied mint or payout behind.

use std::sync::{Mutex, MutexGuard};

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use drip_core::error::DripError;
use drip_core::identity::{AccountId, Moment};
use drip_core::traits::TokenLedger;

use crate::accumulator::{self, RewardAccumulator};
use crate::boost;
use crate::emission::MintScheduler;
use crate::math;
use crate::staking::{StakePosition, StakeRegistry};
use crate::token::Token;
use crate::treasury::Treasury;
use crate::vault::Vault;

/// Outcome of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Reward paid out during settlement.
    pub reward: u128,
    /// LP returned to the staker.
    pub stake_returned: u128,
    /// Reward the pool could not cover when the position closed.
    pub reward_unpaid: u128,
}

/// Read-only summary of the engine's global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub owner: AccountId,
    pub pool: AccountId,
    pub treasury: Option<AccountId>,
    pub vault: AccountId,
    pub acc_drip_per_share: U256,
    pub total_boosted_share: u128,
    pub last_reward_block: u64,
    pub drip_per_block: u128,
    pub last_mint_time: u64,
    pub total_supply_year: u128,
    pub last_payout_time: u64,
    pub payout_rate: u128,
    pub total_staked: u128,
    pub pool_reward_balance: u128,
    pub vault_balance: u128,
    pub reward_total_supply: u128,
}

/// Everything the engine owns. Serializable so a host can persist and reload
/// a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState<A, R> {
    owner: AccountId,
    pool: AccountId,
    accumulator: RewardAccumulator,
    registry: StakeRegistry,
    mint: MintScheduler,
    treasury: Option<Treasury>,
    vault: Vault,
    lp: A,
    drip: R,
}

impl<A: TokenLedger, R: TokenLedger> EngineState<A, R> {
    fn require_owner(&self, caller: &AccountId, action: &str) -> Result<(), DripError> {
        if *caller != self.owner {
            return Err(DripError::Unauthorized(format!(
                "{} is not the engine owner and may not {}",
                caller, action
            )));
        }
        Ok(())
    }

    fn stake(
        &mut self,
        user: &AccountId,
        amount: u128,
        lock_period: u64,
        now: Moment,
    ) -> Result<u64, DripError> {
        if amount == 0 {
            return Err(DripError::InvalidAmount);
        }
        let boost_multiplier = boost::compute_boost(lock_period)?;
        self.accumulator.advance(now.block)?;

        let boosted = math::boosted_amount(amount, boost_multiplier)?;
        let reward_debt = math::accrued(boosted, self.accumulator.acc_drip_per_share())?;

        let received = self.lp.transfer(user, &self.pool, amount)?;
        if received != amount {
            return Err(DripError::InvalidState(format!(
                "Pool {} received {} of a {} stake; LP transfers into the pool must be untaxed",
                self.pool, received, amount
            )));
        }
        let id = self.registry.open(
            user,
            amount,
            boost_multiplier,
            now.timestamp,
            lock_period,
            reward_debt,
        )?;
        self.accumulator.add_share(boosted)?;

        tracing::info!(
            "{} staked {} as position {} (lock {}s, boost {}, boosted share {})",
            user,
            amount,
            id,
            lock_period,
            boost_multiplier,
            boosted
        );
        Ok(id)
    }

    /// Advance every schedule to `now`, pay the position's pending reward,
    /// and settle its debt by what was paid. Returns (boosted share, reward
    /// paid, reward still owed).
    fn settle(&mut self, user: &AccountId, id: u64, now: Moment) -> Result<(u128, u128, u128), DripError> {
        self.registry.get(user, id)?;

        self.accumulator.advance(now.block)?;
        self.mint.advance(&mut self.drip, &self.pool, &self.pool, now.timestamp)?;
        if let Some(treasury) = self.treasury.as_mut() {
            treasury.advance(&mut self.drip, &self.vault, now.timestamp)?;
        }

        let acc = self.accumulator.acc_drip_per_share();
        let position = self.registry.get(user, id)?;
        let boosted = position.boosted_amount()?;
        let pending = accumulator::pending_at(acc, boosted, position.reward_debt)?;

        let paid = self.pay_reward(user, pending)?;
        let position = self.registry.get_mut(user, id)?;
        position.reward_debt = if paid == pending {
            math::accrued(boosted, acc)?
        } else {
            // Short pool: the unpaid remainder stays pending.
            math::add(position.reward_debt, paid, "reward debt")?
        };
        Ok((boosted, paid, pending - paid))
    }

    /// Transfer up to `pending` from the reward pool to `user`.
    fn pay_reward(&mut self, user: &AccountId, pending: u128) -> Result<u128, DripError> {
        if pending == 0 {
            return Ok(0);
        }
        let available = self.drip.balance_of(&self.pool);
        let amount = if pending > available {
            tracing::warn!(
                "Reward pool {} holds {} but {} is owed {}; paying what is available",
                self.pool,
                available,
                user,
                pending
            );
            available
        } else {
            pending
        };
        if amount == 0 {
            return Ok(0);
        }
        self.drip.transfer(&self.pool, user, amount)
    }

    fn claim(&mut self, user: &AccountId, id: u64, now: Moment) -> Result<u128, DripError> {
        let (_, paid, _) = self.settle(user, id, now)?;
        tracing::info!("{} claimed {} from position {}", user, paid, id);
        Ok(paid)
    }

    fn withdraw(&mut self, user: &AccountId, id: u64, now: Moment) -> Result<Withdrawal, DripError> {
        let position = self.registry.get(user, id)?;
        if !position.is_unlocked(now.timestamp) {
            return Err(DripError::LockNotExpired {
                lock_end: position.lock_end_time,
                now: now.timestamp,
            });
        }

        let (boosted, reward, reward_unpaid) = self.settle(user, id, now)?;
        if reward_unpaid > 0 {
            tracing::warn!(
                "{} closed position {} with {} reward the pool could not cover",
                user,
                id,
                reward_unpaid
            );
        }
        let position = self.registry.remove(user, id)?;
        self.accumulator.remove_share(boosted)?;
        let stake_returned = self.lp.transfer(&self.pool, user, position.amount)?;

        tracing::info!(
            "{} withdrew position {}: {} LP returned, {} reward paid",
            user,
            id,
            stake_returned,
            reward
        );
        Ok(Withdrawal {
            reward,
            stake_returned,
            reward_unpaid,
        })
    }

    fn pending_reward(&self, user: &AccountId, id: u64, now: Moment) -> Result<u128, DripError> {
        let position = self.registry.get(user, id)?;
        let acc = self.accumulator.projected_acc(now.block)?;
        accumulator::pending_at(acc, position.boosted_amount()?, position.reward_debt)
    }

    fn update_emission_rate(
        &mut self,
        caller: &AccountId,
        drip_per_block: u128,
        now: Moment,
    ) -> Result<(), DripError> {
        self.require_owner(caller, "update the emission rate")?;
        self.accumulator.advance(now.block)?;
        self.accumulator.set_drip_per_block(drip_per_block);
        tracing::info!("Emission rate set to {} per block at block {}", drip_per_block, now.block);
        Ok(())
    }

    fn update_treasury_address(&mut self, caller: &AccountId, account: AccountId) -> Result<(), DripError> {
        self.require_owner(caller, "update the treasury address")?;
        if let Some(existing) = &self.treasury {
            return Err(DripError::InvalidState(format!(
                "Treasury already set to {}",
                existing.account()
            )));
        }
        let mut treasury = Treasury::new(account.clone(), self.owner.clone());
        treasury.set_staking_contract(&self.owner, self.pool.clone())?;
        self.vault.add_address_to_whitelist(account);
        self.treasury = Some(treasury);
        Ok(())
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            owner: self.owner.clone(),
            pool: self.pool.clone(),
            treasury: self.treasury.as_ref().map(|t| t.account().clone()),
            vault: self.vault.account().clone(),
            acc_drip_per_share: self.accumulator.acc_drip_per_share(),
            total_boosted_share: self.accumulator.total_boosted_share(),
            last_reward_block: self.accumulator.last_reward_block(),
            drip_per_block: self.accumulator.drip_per_block(),
            last_mint_time: self.mint.last_mint_time(),
            total_supply_year: self.mint.total_supply_year(),
            last_payout_time: self.treasury.as_ref().map(|t| t.last_payout_time()).unwrap_or(0),
            payout_rate: self
                .treasury
                .as_ref()
                .map(|t| t.payout_rate())
                .unwrap_or(crate::treasury::DEFAULT_PAYOUT_RATE),
            total_staked: self.registry.total_staked(),
            pool_reward_balance: self.drip.balance_of(&self.pool),
            vault_balance: self.vault.balance(&self.drip),
            reward_total_supply: self.drip.total_supply(),
        }
    }

    fn check_invariants(&self) -> Result<(), DripError> {
        let mut boosted_sum: u128 = 0;
        for (_, _, position) in self.registry.iter() {
            boosted_sum = math::add(boosted_sum, position.boosted_amount()?, "boosted share sum")?;
        }
        if boosted_sum != self.accumulator.total_boosted_share() {
            return Err(DripError::InvalidState(format!(
                "Total boosted share {} does not match live positions {}",
                self.accumulator.total_boosted_share(),
                boosted_sum
            )));
        }
        let custody = self.lp.balance_of(&self.pool);
        let staked = self.registry.total_staked();
        if custody < staked {
            return Err(DripError::InvalidState(format!(
                "Pool custody {} is below total staked {}",
                custody, staked
            )));
        }
        Ok(())
    }
}

/// Thread-safe handle around a single engine instance.
pub struct DripEngine<A, R> {
    state: Mutex<EngineState<A, R>>,
}

impl<A, R> DripEngine<A, R>
where
    A: TokenLedger + Clone,
    R: TokenLedger + Clone,
{
    /// Create an engine whose pool account `pool` holds staked LP and the
    /// reward pool. The annual emission base is the reward token's supply at
    /// construction; emission starts at rate zero.
    ///
    /// Both ledgers must exempt the pool from transfer tax, otherwise staked
    /// custody and reward payouts would leak to the vault.
    pub fn new(
        owner: AccountId,
        pool: AccountId,
        vault: AccountId,
        lp: A,
        drip: R,
        now: Moment,
    ) -> Result<Self, DripError> {
        if !lp.is_tax_exempt(&pool) || !drip.is_tax_exempt(&pool) {
            return Err(DripError::InvalidState(format!(
                "Pool {} must be exempt from transfer tax on both ledgers",
                pool
            )));
        }
        let total_supply_year = drip.total_supply();
        Ok(Self::from_state(EngineState {
            owner,
            pool,
            accumulator: RewardAccumulator::new(now.block, 0),
            registry: StakeRegistry::new(),
            mint: MintScheduler::new(now.timestamp, total_supply_year),
            treasury: None,
            vault: Vault::new(vault),
            lp,
            drip,
        }))
    }

    /// Resume from a persisted snapshot.
    pub fn from_state(state: EngineState<A, R>) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState<A, R>>, DripError> {
        self.state
            .lock()
            .map_err(|_| DripError::InvalidState("Engine state lock poisoned".to_string()))
    }

    /// Run `op` against a draft of the state and commit it only on success.
    fn transact<T>(
        &self,
        op: impl FnOnce(&mut EngineState<A, R>) -> Result<T, DripError>,
    ) -> Result<T, DripError> {
        let mut guard = self.lock()?;
        let mut draft = guard.clone();
        let result = op(&mut draft)?;
        *guard = draft;
        Ok(result)
    }

    fn read<T>(&self, op: impl FnOnce(&EngineState<A, R>) -> Result<T, DripError>) -> Result<T, DripError> {
        let guard = self.lock()?;
        op(&*guard)
    }

    /// Lock `amount` LP for `lock_period` seconds. Returns the position id.
    pub fn stake(&self, user: &AccountId, amount: u128, lock_period: u64, now: Moment) -> Result<u64, DripError> {
        self.transact(|state| state.stake(user, amount, lock_period, now))
    }

    /// Pay the position's pending reward. A zero reward is not an error.
    pub fn claim(&self, user: &AccountId, id: u64, now: Moment) -> Result<u128, DripError> {
        self.transact(|state| state.claim(user, id, now))
    }

    /// Settle and close an unlocked position.
    pub fn withdraw(&self, user: &AccountId, id: u64, now: Moment) -> Result<Withdrawal, DripError> {
        self.transact(|state| state.withdraw(user, id, now))
    }

    /// Reward a claim at `now` would pay, given a funded pool.
    pub fn pending_reward(&self, user: &AccountId, id: u64, now: Moment) -> Result<u128, DripError> {
        self.read(|state| state.pending_reward(user, id, now))
    }

    /// Change the per-block emission rate. Owner only.
    pub fn update_emission_rate(&self, caller: &AccountId, drip_per_block: u128, now: Moment) -> Result<(), DripError> {
        self.transact(|state| state.update_emission_rate(caller, drip_per_block, now))
    }

    /// Wire the treasury that funds the reward pool. Owner only, once.
    pub fn update_treasury_address(&self, caller: &AccountId, account: AccountId) -> Result<(), DripError> {
        self.transact(|state| state.update_treasury_address(caller, account))
    }

    /// A live position.
    pub fn user_info(&self, user: &AccountId, id: u64) -> Result<StakePosition, DripError> {
        self.read(|state| state.registry.get(user, id).cloned())
    }

    /// Next position id for `user`, equal to the number of stakes ever opened.
    pub fn current_staked_id(&self, user: &AccountId) -> Result<u64, DripError> {
        self.read(|state| Ok(state.registry.current_staked_id(user)))
    }

    /// Every live position of `user`.
    pub fn positions_of(&self, user: &AccountId) -> Result<Vec<(u64, StakePosition)>, DripError> {
        self.read(|state| Ok(state.registry.positions_of(user)))
    }

    pub fn status(&self) -> Result<EngineStatus, DripError> {
        self.read(|state| Ok(state.status()))
    }

    /// Reward-token balance of `account`.
    pub fn reward_balance(&self, account: &AccountId) -> Result<u128, DripError> {
        self.read(|state| Ok(state.drip.balance_of(account)))
    }

    /// LP balance of `account`.
    pub fn lp_balance(&self, account: &AccountId) -> Result<u128, DripError> {
        self.read(|state| Ok(state.lp.balance_of(account)))
    }

    /// Recompute the boosted-share total from live positions and check LP
    /// custody covers every stake.
    pub fn check_invariants(&self) -> Result<(), DripError> {
        self.read(|state| state.check_invariants())
    }

    /// Run ordinary ledger activity (transfers, mints, tax) inside the same
    /// critical section as engine operations.
    pub fn with_ledgers<T>(&self, op: impl FnOnce(&mut A, &mut R) -> Result<T, DripError>) -> Result<T, DripError> {
        self.transact(|state| op(&mut state.lp, &mut state.drip))
    }

    /// Copy of the full state, for persistence.
    pub fn snapshot(&self) -> Result<EngineState<A, R>, DripError> {
        self.read(|state| Ok(state.clone()))
    }
}

/// Initial wiring for an engine over the in-memory reference tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    pub owner: AccountId,
    pub pool: AccountId,
    /// Treasury wired at deployment. `None` leaves it for a later
    /// `update_treasury_address`.
    pub treasury: Option<AccountId>,
    pub vault: AccountId,
    /// Reward supply minted to the owner before the engine exists. This is
    /// the annual emission base.
    pub initial_supply: u128,
    /// Tax revenue seeded into the vault.
    pub initial_vault_tax: u128,
    /// Reward tokens pre-funded into the staking pool.
    pub initial_pool_funding: u128,
    /// LP supply minted to the owner.
    pub initial_lp_supply: u128,
    pub drip_per_block: u128,
}

impl Genesis {
    /// Default account names for a given owner, with nothing minted.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            pool: AccountId::new("drip-staking"),
            treasury: Some(AccountId::new("treasury")),
            vault: AccountId::new("vault"),
            initial_supply: 0,
            initial_vault_tax: 0,
            initial_pool_funding: 0,
            initial_lp_supply: 0,
            drip_per_block: 0,
        }
    }
}

impl DripEngine<Token, Token> {
    /// Deploy the reward token, LP token, vault, treasury, and staking pool
    /// and wire them together.
    pub fn bootstrap(genesis: &Genesis, now: Moment) -> Result<Self, DripError> {
        let owner = &genesis.owner;

        let mut drip = Token::new(owner.clone());
        if genesis.initial_supply > 0 {
            drip.mint(owner, owner, genesis.initial_supply)?;
        }
        let mut lp = Token::new(owner.clone());
        if genesis.initial_lp_supply > 0 {
            lp.mint(owner, owner, genesis.initial_lp_supply)?;
        }

        drip.set_vault_address(owner, genesis.vault.clone())?;
        drip.exclude_account(owner, genesis.pool.clone())?;
        if let Some(treasury) = &genesis.treasury {
            drip.exclude_account(owner, treasury.clone())?;
        }
        drip.exclude_account(owner, genesis.vault.clone())?;
        drip.add_address_to_whitelist(owner, genesis.pool.clone())?;

        let engine = Self::new(
            owner.clone(),
            genesis.pool.clone(),
            genesis.vault.clone(),
            lp,
            drip,
            now,
        )?;

        engine.with_ledgers(|_, drip| {
            if genesis.initial_vault_tax > 0 {
                drip.mint(&genesis.owner, &genesis.vault, genesis.initial_vault_tax)?;
            }
            if genesis.initial_pool_funding > 0 {
                drip.mint(&genesis.owner, &genesis.pool, genesis.initial_pool_funding)?;
            }
            Ok(())
        })?;
        if let Some(treasury) = &genesis.treasury {
            engine.update_treasury_address(owner, treasury.clone())?;
        }
        engine.update_emission_rate(owner, genesis.drip_per_block, now)?;

        tracing::info!(
            "Bootstrapped staking pool {} (treasury {:?}, vault {}, {} per block)",
            genesis.pool,
            genesis.treasury,
            genesis.vault,
            genesis.drip_per_block
        );
        Ok(engine)
    }
}
