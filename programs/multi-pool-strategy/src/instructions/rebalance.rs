use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::STRATEGY_SEED;
use crate::engine::allocation::{AllocationPlan, PlanOutcome, YieldEstimate};
use crate::engine::orchestrator;
use crate::errors::StrategyErrorCode;
use crate::events::Rebalanced;
use crate::instructions::program_host::ProgramHost;
use crate::state::Strategy;

#[derive(Accounts)]
pub struct Rebalance<'info> {
    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.vault.as_ref()],
        bump = strategy.bump,
        has_one = keeper @ StrategyErrorCode::UnauthorizedKeeper
    )]
    pub strategy: Account<'info, Strategy>,

    pub keeper: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

fn emit_outcome(strategy: Pubkey, outcome: &PlanOutcome, yield_ranked: bool) -> Result<()> {
    emit!(Rebalanced {
        strategy,
        withdrawn: outcome.withdrawn,
        deposited: outcome.deposited,
        skipped_deposits: outcome.skipped_deposits,
        yield_ranked,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

/// Apply an explicit keeper plan given as parallel id/amount arrays.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
    withdraw_pool_ids: Vec<u32>,
    withdraw_amounts: Vec<u64>,
    deposit_pool_ids: Vec<u32>,
    deposit_amounts: Vec<u64>,
) -> Result<()> {
    let plan = AllocationPlan::from_parallel(
        &withdraw_pool_ids,
        &withdraw_amounts,
        &deposit_pool_ids,
        &deposit_amounts,
    )?;
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let outcome = orchestrator::rebalance(strategy, &mut host, &plan)?;
    emit_outcome(strategy.key(), &outcome, false)
}

/// Drain every pool and reallocate by estimated yield.
pub fn by_yield_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
    estimates: Vec<YieldEstimate>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let mut host = ProgramHost::new(
        &ctx.accounts.strategy,
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let strategy = &mut ctx.accounts.strategy;
    let outcome = orchestrator::rebalance_yield_ranked(strategy, &mut host, &estimates, now)?;
    emit_outcome(strategy.key(), &outcome, true)
}
