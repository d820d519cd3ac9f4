use anchor_lang::prelude::*;

declare_id!("7QyTX18ddQLHUHnqXjsGwuUgXqNMXUNnbaizTSTZiirR");

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use engine::allocation::YieldEstimate;
use instructions::*;
use state::{FeeConfig, PoolRewardRoute};

#[program]
pub mod multi_pool_strategy {

    use super::*;

    pub fn initialize_strategy(ctx: Context<InitializeStrategy>, params: InitializeStrategyParams) -> Result<()> {
        instructions::initialize_strategy::handler(ctx, params)
    }

    // ===== VAULT =====

    /// Stake the managed asset the vault sent over and deposit it into the default pool
    pub fn deposit<'info>(ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>) -> Result<()> {
        instructions::deposit::handler(ctx)
    }

    /// Free up to `amount` of managed asset and send it to the vault
    pub fn withdraw<'info>(ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>, amount: u64) -> Result<u64> {
        instructions::withdraw::handler(ctx, amount)
    }

    pub fn retire<'info>(ctx: Context<'_, '_, 'info, 'info, Retire<'info>>) -> Result<()> {
        instructions::retire::handler(ctx)
    }

    pub fn balance_of<'info>(ctx: Context<'_, '_, 'info, 'info, BalanceOf<'info>>) -> Result<u64> {
        instructions::balance_of::handler(ctx)
    }

    // ===== KEEPER =====

    /// Returns the caller fee
    pub fn harvest<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<u64> {
        instructions::harvest::handler(ctx)
    }

    pub fn rebalance<'info>(
        ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
        withdraw_pool_ids: Vec<u32>,
        withdraw_amounts: Vec<u64>,
        deposit_pool_ids: Vec<u32>,
        deposit_amounts: Vec<u64>,
    ) -> Result<()> {
        instructions::rebalance::handler(ctx, withdraw_pool_ids, withdraw_amounts, deposit_pool_ids, deposit_amounts)
    }

    pub fn rebalance_by_yield<'info>(
        ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
        estimates: Vec<YieldEstimate>,
    ) -> Result<()> {
        instructions::rebalance::by_yield_handler(ctx, estimates)
    }

    // ===== MANAGER =====

    pub fn panic<'info>(ctx: Context<'_, '_, 'info, 'info, Panic<'info>>) -> Result<()> {
        instructions::panic::handler(ctx)
    }

    pub fn pause(ctx: Context<SetPaused>) -> Result<()> {
        instructions::pause::pause(ctx)
    }

    pub fn unpause<'info>(ctx: Context<'_, '_, 'info, 'info, SetPaused<'info>>) -> Result<()> {
        instructions::pause::unpause(ctx)
    }

    pub fn set_fees(ctx: Context<Configure>, fees: FeeConfig) -> Result<()> {
        instructions::configure::set_fees(ctx, fees)
    }

    pub fn set_provision_rate(ctx: Context<Configure>, provision_rate_bps: u16) -> Result<()> {
        instructions::configure::set_provision_rate(ctx, provision_rate_bps)
    }

    pub fn set_dilution_factor(ctx: Context<Configure>, dilution_factor: u64) -> Result<()> {
        instructions::configure::set_dilution_factor(ctx, dilution_factor)
    }

    pub fn set_default_pool(ctx: Context<Configure>, pool_id: u32) -> Result<()> {
        instructions::configure::set_default_pool(ctx, pool_id)
    }

    /// Remaining accounts: the reward pool program and its state accounts
    pub fn set_pool_route<'info>(
        ctx: Context<'_, '_, 'info, 'info, ConfigurePool<'info>>,
        route: PoolRewardRoute,
    ) -> Result<()> {
        instructions::configure::set_pool_route(ctx, route)
    }

    pub fn set_reinvest_route(ctx: Context<Configure>, route: Vec<Pubkey>) -> Result<()> {
        instructions::configure::set_reinvest_route(ctx, route)
    }

    pub fn set_boost_beneficiary(
        ctx: Context<Configure>,
        beneficiary: Option<Pubkey>,
        beneficiary_program: Option<Pubkey>,
    ) -> Result<()> {
        instructions::configure::set_boost_beneficiary(ctx, beneficiary, beneficiary_program)
    }

    pub fn set_derivative(ctx: Context<Configure>, derivative_mint: Pubkey, base_mint: Option<Pubkey>) -> Result<()> {
        instructions::configure::set_derivative(ctx, derivative_mint, base_mint)
    }

    pub fn set_unwrap_program(ctx: Context<Configure>, unwrap_program: Option<Pubkey>) -> Result<()> {
        instructions::configure::set_unwrap_program(ctx, unwrap_program)
    }

    pub fn set_keeper(ctx: Context<Configure>, keeper: Pubkey) -> Result<()> {
        instructions::configure::set_keeper(ctx, keeper)
    }

    pub fn set_strategist(ctx: Context<Configure>, strategist: Option<Pubkey>) -> Result<()> {
        instructions::configure::set_strategist(ctx, strategist)
    }
}
