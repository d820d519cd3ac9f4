//! In-memory collaborators for engine tests.

use std::collections::{BTreeMap, HashMap};

use anchor_lang::prelude::*;

use crate::constants::PERCENT_DIVISOR;
use crate::engine::host::*;
use crate::errors::StrategyErrorCode;
use crate::state::*;

#[derive(Debug, Clone, Default)]
pub struct MockPool {
    pub reward_token: Pubkey,
    pub reward_rate: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub others_staked: u64,
    pub staked: u64,
    pub pending_reward: u64,
    pub pending_boost: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub pool_deposit: bool,
    pub pool_withdraw: bool,
    pub swap: bool,
    pub handler: bool,
    pub unwrap: bool,
}

#[derive(Debug, Clone)]
pub struct MockHost {
    pub me: Pubkey,
    pub want: Pubkey,
    pub stake: Pubkey,
    pub accounting: Pubkey,
    pub balances: HashMap<(Pubkey, Pubkey), u64>,
    pub pools: BTreeMap<u32, MockPool>,
    /// Accounting value of one unit of each mint, in bps. Missing mints are 1:1.
    pub prices_bps: HashMap<Pubkey, u64>,
    /// Managed asset per stake token, in bps.
    pub share_price_bps: u64,
    pub failures: Failures,
    pub calls: Vec<String>,
}

impl MockHost {
    pub fn new() -> Self {
        MockHost {
            me: Pubkey::new_unique(),
            want: Pubkey::new_unique(),
            stake: Pubkey::new_unique(),
            accounting: Pubkey::new_unique(),
            balances: HashMap::new(),
            pools: BTreeMap::new(),
            prices_bps: HashMap::new(),
            share_price_bps: PERCENT_DIVISOR,
            failures: Failures::default(),
            calls: Vec::new(),
        }
    }

    pub fn add_pool(&mut self, pool_id: u32, reward_token: Pubkey, others_staked: u64) {
        self.pools.insert(
            pool_id,
            MockPool {
                reward_token,
                reward_rate: 1,
                end_time: i64::MAX,
                others_staked,
                ..Default::default()
            },
        );
    }

    pub fn accrue(&mut self, pool_id: u32, reward: u64, boost: u64) {
        let pool = self.pools.get_mut(&pool_id).expect("unknown mock pool");
        pool.pending_reward += reward;
        pool.pending_boost += boost;
    }

    pub fn mint_to(&mut self, owner: Pubkey, mint: Pubkey, amount: u64) {
        *self.balances.entry((owner, mint)).or_default() += amount;
    }

    pub fn give(&mut self, mint: Pubkey, amount: u64) {
        let me = self.me;
        self.mint_to(me, mint, amount);
    }

    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        self.balances.get(&(*owner, *mint)).copied().unwrap_or(0)
    }

    pub fn own(&self, mint: &Pubkey) -> u64 {
        self.balance(&self.me, mint)
    }

    fn debit(&mut self, mint: &Pubkey, amount: u64) -> Result<()> {
        let entry = self.balances.entry((self.me, *mint)).or_default();
        require!(*entry >= amount, StrategyErrorCode::ExternalCallFailed);
        *entry -= amount;
        Ok(())
    }

    fn price(&self, mint: &Pubkey) -> u64 {
        self.prices_bps.get(mint).copied().unwrap_or(PERCENT_DIVISOR)
    }

    fn pay_pending(&mut self, pool_id: u32) {
        let pool = self.pools.get_mut(&pool_id).expect("unknown mock pool");
        let reward = std::mem::take(&mut pool.pending_reward);
        pool.pending_boost = 0;
        let token = pool.reward_token;
        self.give(token, reward);
    }
}

impl RewardPools for MockHost {
    fn pool_deposit(&mut self, pool_id: u32, amount: u64) -> Result<()> {
        require!(!self.failures.pool_deposit, StrategyErrorCode::ExternalCallFailed);
        require!(self.pools.contains_key(&pool_id), StrategyErrorCode::ExternalCallFailed);
        let stake = self.stake;
        self.debit(&stake, amount)?;
        self.pay_pending(pool_id);
        self.pools.get_mut(&pool_id).unwrap().staked += amount;
        self.calls.push(format!("deposit:{pool_id}:{amount}"));
        Ok(())
    }

    fn pool_withdraw(&mut self, pool_id: u32, amount: u64) -> Result<()> {
        require!(!self.failures.pool_withdraw, StrategyErrorCode::ExternalCallFailed);
        let pool = self.pools.get_mut(&pool_id).ok_or(StrategyErrorCode::ExternalCallFailed)?;
        require!(pool.staked >= amount, StrategyErrorCode::ExternalCallFailed);
        pool.staked -= amount;
        self.pay_pending(pool_id);
        let stake = self.stake;
        self.give(stake, amount);
        self.calls.push(format!("withdraw:{pool_id}:{amount}"));
        Ok(())
    }

    fn pending_rewards(&mut self, pool_id: u32) -> Result<PendingRewards> {
        let pool = self.pools.get(&pool_id).ok_or(StrategyErrorCode::ExternalCallFailed)?;
        Ok(PendingRewards {
            reward_amount: pool.pending_reward,
            boost_amount: pool.pending_boost,
        })
    }

    fn pool_info(&mut self, pool_id: u32) -> Result<PoolInfo> {
        let pool = self.pools.get(&pool_id).ok_or(StrategyErrorCode::ExternalCallFailed)?;
        Ok(PoolInfo {
            reward_token: pool.reward_token,
            reward_rate: pool.reward_rate,
            start_time: pool.start_time,
            end_time: pool.end_time,
            total_staked: pool.others_staked + pool.staked,
        })
    }

    fn emergency_withdraw(&mut self, pool_id: u32) -> Result<()> {
        let pool = self.pools.get_mut(&pool_id).ok_or(StrategyErrorCode::ExternalCallFailed)?;
        let amount = std::mem::take(&mut pool.staked);
        pool.pending_reward = 0;
        pool.pending_boost = 0;
        let stake = self.stake;
        self.give(stake, amount);
        self.calls.push(format!("emergency:{pool_id}"));
        Ok(())
    }

    fn pool_length(&mut self) -> Result<u32> {
        Ok(self.pools.len() as u32)
    }
}

impl StakeVault for MockHost {
    fn enter(&mut self, asset_amount: u64) -> Result<()> {
        let (want, stake) = (self.want, self.stake);
        let shares = self.shares_for_asset(asset_amount)?;
        self.debit(&want, asset_amount)?;
        self.give(stake, shares);
        Ok(())
    }

    fn leave(&mut self, share_amount: u64) -> Result<()> {
        let (want, stake) = (self.want, self.stake);
        let assets = self.asset_for_shares(share_amount)?;
        self.debit(&stake, share_amount)?;
        self.give(want, assets);
        Ok(())
    }

    fn shares_for_asset(&mut self, asset_amount: u64) -> Result<u64> {
        Ok(asset_amount * PERCENT_DIVISOR / self.share_price_bps)
    }

    fn asset_for_shares(&mut self, share_amount: u64) -> Result<u64> {
        Ok(share_amount * self.share_price_bps / PERCENT_DIVISOR)
    }
}

impl SwapRouter for MockHost {
    fn swap_exact_in(&mut self, amount_in: u64, min_out: u64, route: &[Pubkey], _deadline: i64) -> Result<u64> {
        require!(!self.failures.swap, StrategyErrorCode::ExternalCallFailed);
        let (input, output) = (route[0], route[route.len() - 1]);
        let out = amount_in * self.price(&input) / self.price(&output);
        require!(out >= min_out, StrategyErrorCode::ExternalCallFailed);
        self.debit(&input, amount_in)?;
        self.give(output, out);
        self.calls.push(format!("swap:{amount_in}"));
        Ok(out)
    }
}

impl RewardHandler for MockHost {
    fn handle(&mut self, _handler: &Pubkey, token: &Pubkey, amount: u64) -> Result<()> {
        require!(!self.failures.handler, StrategyErrorCode::ExternalCallFailed);
        let out = amount * self.price(token) / self.price(&self.accounting);
        self.debit(token, amount)?;
        let accounting = self.accounting;
        self.give(accounting, out);
        self.calls.push(format!("handle:{amount}"));
        Ok(())
    }

    fn unwrap_derivative(&mut self, derivative: &Pubkey, base: &Pubkey, amount: u64) -> Result<()> {
        require!(!self.failures.unwrap, StrategyErrorCode::ExternalCallFailed);
        self.debit(derivative, amount)?;
        self.give(*base, amount);
        self.calls.push(format!("unwrap:{amount}"));
        Ok(())
    }
}

impl BoostBeneficiary for MockHost {
    fn process_rewards(&mut self) -> Result<()> {
        self.calls.push("process_rewards".to_string());
        Ok(())
    }

    fn mass_unstake(&mut self) -> Result<()> {
        self.calls.push("mass_unstake".to_string());
        Ok(())
    }
}

impl TokenBank for MockHost {
    fn balance_of(&mut self, mint: &Pubkey) -> Result<u64> {
        Ok(self.own(mint))
    }

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        self.debit(mint, amount)?;
        self.mint_to(*to, *mint, amount);
        Ok(())
    }
}

/// Strategy wired to the mock's mints with fees switched off and pool 0 as
/// the default pool (rewarding in the accounting unit).
pub fn test_strategy(host: &MockHost) -> Strategy {
    let mut rewards = RewardRoutes::default();
    rewards
        .upsert(PoolRewardRoute {
            pool_id: 0,
            reward_token: host.accounting,
            handling: RewardHandling::Passthrough,
        })
        .unwrap();

    Strategy {
        vault: Pubkey::new_unique(),
        manager: Pubkey::new_unique(),
        keeper: Pubkey::new_unique(),
        treasury: Pubkey::new_unique(),
        strategist: None,
        boost_beneficiary: None,
        want_mint: host.want,
        stake_mint: host.stake,
        accounting_mint: host.accounting,
        programs: ExternalPrograms::default(),
        fees: FeeConfig {
            total_fee_bps: 0,
            call_fee_bps: 0,
            strategist_fee_bps: 0,
            withdraw_fee_bps: 0,
        },
        provision_rate_bps: 5_000,
        dilution_factor: 5,
        default_pool: 0,
        reinvest_route: vec![host.accounting, host.want],
        ledger: PoolLedger::default(),
        rewards,
        last_harvest_timestamp: 0,
        total_harvested: 0,
        total_fees_charged: 0,
        total_boost_paid: 0,
        paused: false,
        panicked: false,
        bump: 255,
    }
}

/// Adds a pool paying `reward_token`, swapped straight into the accounting unit.
pub fn add_swap_pool(strategy: &mut Strategy, host: &mut MockHost, pool_id: u32, reward_token: Pubkey, others_staked: u64) {
    host.add_pool(pool_id, reward_token, others_staked);
    strategy
        .rewards
        .upsert(PoolRewardRoute {
            pool_id,
            reward_token,
            handling: RewardHandling::DirectSwap { route: vec![reward_token, host.accounting] },
        })
        .unwrap();
}

/// Mock host plus strategy with the default pool 0 registered on both sides.
pub fn setup() -> (MockHost, Strategy) {
    let mut host = MockHost::new();
    let accounting = host.accounting;
    host.add_pool(0, accounting, 1_000_000);
    let strategy = test_strategy(&host);
    (host, strategy)
}
