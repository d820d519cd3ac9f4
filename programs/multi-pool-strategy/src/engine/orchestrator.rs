use anchor_lang::prelude::*;

use crate::constants::WITHDRAW_DUST;
use crate::engine::allocation::{apply_plan, rebalance_by_yield, AllocationPlan, PlanOutcome, YieldEstimate};
use crate::engine::boost::reset_and_read;
use crate::engine::converter::{convert_rewards, ClaimedPool};
use crate::engine::fees::{charge_fees, FeeSplit};
use crate::engine::host::{RewardPools, StrategyHost};
use crate::engine::ledger::{deposit_to_pool, emergency_exit_pool, require_known_pool, withdraw_from_pool};
use crate::errors::StrategyErrorCode;
use crate::state::{PoolRewardRoute, RewardHandling, Strategy};
use crate::utils::{apply_bps, boost_provision};

/// Harvest cycle phases, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HarvestPhase {
    Idle,
    Claiming,
    Converting,
    FeeCharging,
    BoostPaying,
    Reinvesting,
}

struct HarvestCycle {
    phase: HarvestPhase,
}

impl HarvestCycle {
    fn start() -> Self {
        HarvestCycle { phase: HarvestPhase::Idle }
    }

    fn enter(&mut self, next: HarvestPhase) {
        debug_assert!(next > self.phase, "harvest phases run forward only");
        msg!("Harvest: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestResult {
    pub harvested_value: u64,
    pub boost_value: u64,
    pub boost_fraction_bps: u64,
    pub fees: FeeSplit,
    pub boost_payout: u64,
    /// Stake tokens deposited into the default pool.
    pub reinvested: u64,
}

/// Stake whatever managed asset is on hand. Returns the asset amount staked.
pub fn stake_idle_want<H: StrategyHost>(strategy: &Strategy, host: &mut H) -> Result<u64> {
    let idle = host.balance_of(&strategy.want_mint)?;
    if idle > 0 {
        host.enter(idle)?;
    }
    Ok(idle)
}

/// Stake idle managed asset and park every stake token on hand in the default pool.
fn deposit_idle<H: StrategyHost>(strategy: &mut Strategy, host: &mut H) -> Result<u64> {
    stake_idle_want(strategy, host)?;
    let shares = host.balance_of(&strategy.stake_mint)?;
    if shares == 0 {
        return Ok(0);
    }
    require!(
        strategy.rewards.route(strategy.default_pool).is_some(),
        StrategyErrorCode::PoolNotConfigured
    );
    deposit_to_pool(&mut strategy.ledger, host, strategy.default_pool, shares)?;
    Ok(shares)
}

/// Pay the boost share of `distributable`, the harvested value left after fees.
fn pay_boost<H: StrategyHost>(
    strategy: &Strategy,
    host: &mut H,
    distributable: u64,
    boost_fraction_bps: u64,
) -> Result<u64> {
    let Some(beneficiary) = strategy.boost_beneficiary else {
        return Ok(0);
    };
    if boost_fraction_bps == 0 {
        return Ok(0);
    }
    let balance = host.balance_of(&strategy.accounting_mint)?.min(distributable);
    let payout = boost_provision(balance, boost_fraction_bps, strategy.provision_rate_bps)?;
    if payout == 0 {
        return Ok(0);
    }
    host.transfer(&strategy.accounting_mint, &beneficiary, payout)?;
    host.process_rewards()?;
    msg!("Boost payout {} to {} ({} bps of harvest)", payout, beneficiary, boost_fraction_bps);
    Ok(payout)
}

fn reinvest<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, now: i64) -> Result<u64> {
    if strategy.accounting_mint != strategy.want_mint {
        let balance = host.balance_of(&strategy.accounting_mint)?;
        if balance > 0 {
            let route = strategy.reinvest_route.clone();
            let out = host.swap_exact_in(balance, 0, &route, now)?;
            msg!("Swapped {} accounting units into {} managed asset", balance, out);
        }
    }
    deposit_idle(strategy, host)
}

/// Configured pools outside the active set that still hold boost credit or
/// whose reward token has an unconverted balance, e.g. rewards paid out when
/// the pool was drained by a withdraw or rebalance.
fn claim_idle_pools<H: StrategyHost>(strategy: &mut Strategy, host: &mut H) -> Result<Vec<ClaimedPool>> {
    let idle = strategy
        .rewards
        .routes
        .iter()
        .filter(|route| !strategy.ledger.is_active(route.pool_id))
        .map(|route| (route.pool_id, route.reward_token, matches!(route.handling, RewardHandling::Passthrough)))
        .collect::<Vec<_>>();

    let mut claimed = Vec::new();
    for (pool_id, reward_token, passthrough) in idle {
        let unconverted = if passthrough { 0 } else { host.balance_of(&reward_token)? };
        if unconverted == 0 && strategy.ledger.acc_boost_of(pool_id) == 0 {
            continue;
        }
        let boost_credit = reset_and_read(&mut strategy.ledger, pool_id);
        claimed.push(ClaimedPool { pool_id, boost_credit });
    }
    Ok(claimed)
}

fn run_harvest<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, caller: &Pubkey, now: i64) -> Result<HarvestResult> {
    strategy.require_live()?;
    let mut cycle = HarvestCycle::start();
    let baseline = host.balance_of(&strategy.accounting_mint)?;

    cycle.enter(HarvestPhase::Claiming);
    let mut claimed = Vec::with_capacity(strategy.ledger.active.len());
    for pool_id in strategy.ledger.active_pools() {
        withdraw_from_pool(&mut strategy.ledger, host, pool_id, 0)?;
        let boost_credit = reset_and_read(&mut strategy.ledger, pool_id);
        claimed.push(ClaimedPool { pool_id, boost_credit });
    }
    claimed.extend(claim_idle_pools(strategy, host)?);

    cycle.enter(HarvestPhase::Converting);
    let conversion = convert_rewards(strategy, host, &claimed, baseline, now)?;

    cycle.enter(HarvestPhase::FeeCharging);
    let fees = charge_fees(strategy, host, caller, conversion.harvested_value)?;

    cycle.enter(HarvestPhase::BoostPaying);
    let distributable = conversion.harvested_value.saturating_sub(fees.total_fee);
    let boost_payout = pay_boost(strategy, host, distributable, conversion.boost_fraction_bps)?;

    cycle.enter(HarvestPhase::Reinvesting);
    let reinvested = reinvest(strategy, host, now)?;

    strategy.last_harvest_timestamp = now;
    strategy.total_harvested = strategy.total_harvested.saturating_add(conversion.harvested_value);
    strategy.total_fees_charged = strategy.total_fees_charged.saturating_add(fees.total_fee);
    strategy.total_boost_paid = strategy.total_boost_paid.saturating_add(boost_payout);

    Ok(HarvestResult {
        harvested_value: conversion.harvested_value,
        boost_value: conversion.boost_value,
        boost_fraction_bps: conversion.boost_fraction_bps,
        fees,
        boost_payout,
        reinvested,
    })
}

/// Claim, convert, charge fees, pay the boost share and reinvest, all or nothing.
pub fn harvest<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, caller: &Pubkey, now: i64) -> Result<HarvestResult> {
    strategy.atomically(|s| run_harvest(s, host, caller, now))
}

/// Vault deposit: stake idle managed asset into the default pool.
pub fn deposit<H: StrategyHost>(strategy: &mut Strategy, host: &mut H) -> Result<u64> {
    strategy.atomically(|s| {
        s.require_live()?;
        deposit_idle(s, host)
    })
}

/// Draw `shares` stake tokens out of the pools, one pool at a time in
/// active-set order until the need is met.
fn draw_from_pools<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, shares: u64) -> Result<u64> {
    let mut remaining = shares;
    for pool_id in strategy.ledger.active_pools() {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(strategy.ledger.balance_of(pool_id));
        withdraw_from_pool(&mut strategy.ledger, host, pool_id, take)?;
        remaining -= take;
    }
    Ok(shares - remaining)
}

fn run_withdraw<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, amount: u64) -> Result<u64> {
    require_gt!(amount, 0, StrategyErrorCode::ZeroAmount);
    let want = strategy.want_mint;
    let mut want_balance = host.balance_of(&want)?;

    if want_balance < amount {
        let shortfall = amount - want_balance;
        let shares_needed = host.shares_for_asset(shortfall)?;
        let idle_shares = host.balance_of(&strategy.stake_mint)?;
        if shares_needed > idle_shares {
            draw_from_pools(strategy, host, shares_needed - idle_shares)?;
        }
        let shares = host.balance_of(&strategy.stake_mint)?.min(shares_needed);
        if shares > 0 {
            host.leave(shares)?;
        }
        want_balance = host.balance_of(&want)?;
    }

    if want_balance < amount {
        require!(amount - want_balance <= WITHDRAW_DUST, StrategyErrorCode::InsufficientLiquidity);
    }
    let withdrawable = want_balance.min(amount);
    let fee = apply_bps(withdrawable, strategy.fees.withdraw_fee_bps)?;
    let payout = withdrawable - fee;
    host.transfer(&want, &strategy.vault, payout)?;

    msg!("Withdrew {} to vault (requested {}, fee {})", payout, amount, fee);
    Ok(payout)
}

/// Vault withdraw. Pays out up to `amount` of managed asset, less the
/// withdraw fee. Allowed while paused so the vault can always exit.
pub fn withdraw<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, amount: u64) -> Result<u64> {
    strategy.atomically(|s| run_withdraw(s, host, amount))
}

pub fn rebalance<H: StrategyHost>(strategy: &mut Strategy, host: &mut H, plan: &AllocationPlan) -> Result<PlanOutcome> {
    strategy.atomically(|s| {
        s.require_live()?;
        apply_plan(s, host, plan)
    })
}

pub fn rebalance_yield_ranked<H: StrategyHost>(
    strategy: &mut Strategy,
    host: &mut H,
    estimates: &[YieldEstimate],
    now: i64,
) -> Result<PlanOutcome> {
    strategy.atomically(|s| {
        s.require_live()?;
        rebalance_by_yield(s, host, estimates, now)
    })
}

/// Total managed value: idle asset plus the asset value of idle and deposited stake tokens.
pub fn balance_of<H: StrategyHost>(strategy: &Strategy, host: &mut H) -> Result<u64> {
    let idle_want = host.balance_of(&strategy.want_mint)?;
    let shares = host
        .balance_of(&strategy.stake_mint)?
        .checked_add(strategy.ledger.total_pool_balance)
        .ok_or(StrategyErrorCode::MathOverflow)?;
    let staked_value = host.asset_for_shares(shares)?;
    Ok(idle_want
        .checked_add(staked_value)
        .ok_or(StrategyErrorCode::MathOverflow)?)
}

/// Emergency exit: pull every pool without claiming, have the boost
/// beneficiary unstake, unstake everything and stop for good.
pub fn panic<H: StrategyHost>(strategy: &mut Strategy, host: &mut H) -> Result<u64> {
    strategy.atomically(|s| {
        require!(!s.panicked, StrategyErrorCode::StrategyPanicked);
        let mut recovered = 0u64;
        for pool_id in s.ledger.active_pools() {
            recovered = recovered.saturating_add(emergency_exit_pool(&mut s.ledger, host, pool_id)?);
        }
        if s.boost_beneficiary.is_some() {
            host.mass_unstake()?;
        }
        let shares = host.balance_of(&s.stake_mint)?;
        if shares > 0 {
            host.leave(shares)?;
        }
        s.paused = true;
        s.panicked = true;
        msg!("Panic: recovered {} stake tokens from pools", recovered);
        Ok(recovered)
    })
}

/// Drain every pool (claiming normally), unstake and send all managed asset
/// to the vault, then pause.
pub fn retire<H: StrategyHost>(strategy: &mut Strategy, host: &mut H) -> Result<u64> {
    strategy.atomically(|s| {
        for pool_id in s.ledger.active_pools() {
            let balance = s.ledger.balance_of(pool_id);
            withdraw_from_pool(&mut s.ledger, host, pool_id, balance)?;
        }
        let shares = host.balance_of(&s.stake_mint)?;
        if shares > 0 {
            host.leave(shares)?;
        }
        let want = host.balance_of(&s.want_mint)?;
        if want > 0 {
            host.transfer(&s.want_mint, &s.vault, want)?;
        }
        s.paused = true;
        msg!("Retired strategy, returned {} to vault", want);
        Ok(want)
    })
}

/// Validate a pool's reward route against the reward program and store it.
pub fn set_pool_route<H: RewardPools>(strategy: &mut Strategy, host: &mut H, route: PoolRewardRoute) -> Result<()> {
    route.validate(&strategy.accounting_mint)?;
    require_known_pool(host, route.pool_id)?;
    strategy.rewards.upsert(route)
}

pub fn pause(strategy: &mut Strategy) -> Result<()> {
    require!(!strategy.paused, StrategyErrorCode::StrategyPaused);
    strategy.paused = true;
    Ok(())
}

/// Lift a pause and put idle funds back to work. A panicked strategy stays down.
pub fn unpause<H: StrategyHost>(strategy: &mut Strategy, host: &mut H) -> Result<u64> {
    strategy.atomically(|s| {
        require!(!s.panicked, StrategyErrorCode::StrategyPanicked);
        require!(s.paused, StrategyErrorCode::StrategyNotPaused);
        s.paused = false;
        deposit_idle(s, host)
    })
}
